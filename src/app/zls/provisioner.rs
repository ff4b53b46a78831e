//! `ZlsProvisioner` (spec §4.7): clone-or-fetch the zls repository, check
//! out a matching commit, build it with the just-installed compiler, and
//! copy the artifact next to that compiler.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::task;

use super::{cert, commit};
use crate::app::constants::ZLS_REPO_URL;
use crate::app::layout::InstallLayout;
use crate::app::paths;
use crate::app::prompt::Prompter;
use crate::types::{VersionSpec, ZigupError};

pub struct ZlsProvisioner {
    layout: InstallLayout,
    prompter: Arc<dyn Prompter>,
}

impl ZlsProvisioner {
    pub fn new(layout: InstallLayout, prompter: Arc<dyn Prompter>) -> Self {
        ZlsProvisioner { layout, prompter }
    }

    /// Builds and installs zls for `id`, whose compiler is already present
    /// at `compiler_bin(id)`. A no-op if a build already exists and `spec`
    /// resolves to an immutable tagged release.
    pub async fn install_zls(&self, id: &str, spec: &VersionSpec) -> Result<(), ZigupError> {
        let zls_bin = self.layout.zls_bin(id);
        if zls_bin.exists() {
            if !spec.may_need_zls_rebuild() {
                tracing::debug!(target: "zigup::zls", "{id} already has a zls build, skipping");
                return Ok(());
            }
            if !self.prompter.confirm("zls is already built for this version, rebuild?", Some(false)) {
                return Ok(());
            }
        }

        let zls_repo = self.layout.zls_repo();
        let numeric_version = id.strip_prefix("zig-").unwrap_or(id).to_string();
        let spec_owned = spec.clone();
        let prompter = Arc::clone(&self.prompter);
        let repo_path = zls_repo.clone();

        task::spawn_blocking(move || {
            checkout_commit(&repo_path, &spec_owned, &numeric_version, prompter.as_ref())
        })
        .await
        .map_err(panicked)??;

        let compiler_bin = self.layout.compiler_bin(id);
        build_zls(&compiler_bin, &zls_repo).await?;

        let built = zls_repo.join("zig-out").join("bin").join(paths::zls_exe_name());
        tokio::fs::copy(&built, &zls_bin).await.map_err(|source| {
            ZigupError::General(color_eyre::eyre::eyre!(
                "zls build succeeded but {} was not produced: {source}",
                built.display()
            ))
        })?;

        tracing::info!(target: "zigup::zls", "zls built for {id}");
        Ok(())
    }
}

/// Steps 2-6: open-or-clone, resolve the target commit, detached-HEAD
/// checkout. Runs on a blocking thread — libgit2 is synchronous throughout.
fn checkout_commit(
    repo_path: &Path,
    spec: &VersionSpec,
    numeric_version: &str,
    prompter: &dyn Prompter,
) -> Result<(), ZigupError> {
    let repo = open_or_clone(repo_path, prompter)?;
    let oid = commit::resolve_zls_commit(&repo, spec, numeric_version, prompter)?;

    repo.set_head_detached(oid).map_err(|source| ZigupError::FailedCheckout {
        reference: oid.to_string(),
        source: color_eyre::eyre::eyre!(source),
    })?;

    let mut checkout = git2::build::CheckoutBuilder::new();
    checkout.force();
    repo.checkout_head(Some(&mut checkout)).map_err(|source| ZigupError::FailedCheckout {
        reference: oid.to_string(),
        source: color_eyre::eyre::eyre!(source),
    })
}

fn open_or_clone(repo_path: &Path, prompter: &dyn Prompter) -> Result<git2::Repository, ZigupError> {
    if repo_path.join(".git").is_dir() {
        let repo = git2::Repository::open(repo_path)
            .map_err(|e| ZigupError::General(color_eyre::eyre::eyre!("failed to open {}: {e}", repo_path.display())))?;
        if prompter.confirm("fetch the latest zls sources from origin?", Some(true)) {
            fetch_origin(&repo, prompter).map_err(|source| ZigupError::FailedFetch(source_report(source)))?;
        }
        return Ok(repo);
    }

    clone_repo(repo_path, prompter)
}

fn clone_repo(repo_path: &Path, prompter: &dyn Prompter) -> Result<git2::Repository, ZigupError> {
    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.remote_callbacks(remote_callbacks(prompter));

    git2::build::RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(ZLS_REPO_URL, repo_path)
        .map_err(|source| ZigupError::FailedClone { url: ZLS_REPO_URL.to_string(), source: source_report(source) })
}

fn fetch_origin(repo: &git2::Repository, prompter: &dyn Prompter) -> Result<(), git2::Error> {
    let mut remote = repo.find_remote("origin")?;
    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.remote_callbacks(remote_callbacks(prompter));
    remote.fetch(&[] as &[&str], Some(&mut fetch_options), None).map_err(|e| {
        tracing::warn!(
            target: "zigup::zls",
            "fetch failed ({e}); if this persists, delete the zls-repo directory and retry"
        );
        e
    })
}

fn remote_callbacks(prompter: &dyn Prompter) -> git2::RemoteCallbacks<'_> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.certificate_check(move |certificate, valid, host| cert::check(certificate, valid, host, prompter));
    callbacks.transfer_progress(|progress| {
        tracing::trace!(
            target: "zigup::zls",
            "received {}/{} objects",
            progress.received_objects(),
            progress.total_objects()
        );
        true
    });
    callbacks
}

/// Step 7: `zig build --release=safe` with `cwd = zls_repo`.
async fn build_zls(compiler_bin: &Path, zls_repo: &Path) -> Result<(), ZigupError> {
    let status = tokio::process::Command::new(compiler_bin)
        .arg("build")
        .arg("--release=safe")
        .current_dir(zls_repo)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await?;

    if status.success() {
        Ok(())
    } else {
        Err(ZigupError::FailedCompile(color_eyre::eyre::eyre!("zig build exited with {status}")))
    }
}

fn source_report(err: git2::Error) -> color_eyre::Report {
    color_eyre::eyre::eyre!(err)
}

fn panicked(err: tokio::task::JoinError) -> ZigupError {
    ZigupError::General(color_eyre::eyre::eyre!("zls provisioning task panicked: {err}"))
}
