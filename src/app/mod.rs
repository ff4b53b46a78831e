//! Wires the components in §4 together into the operations the CLI drives
//! (spec §2, "Control flow").

pub mod config;
pub mod constants;
pub mod default_pointer;
pub mod installer;
pub mod layout;
pub mod lifecycle;
pub mod network;
pub mod paths;
pub mod prompt;
pub mod resolver;
pub mod zls;

use std::path::PathBuf;
use std::sync::Arc;

use config::ResolvedConfig;
use installer::CompilerInstaller;
use layout::InstallLayout;
use lifecycle::InstalledEntry;
use network::{Downloader, IndexStore, create_client};
use prompt::Prompter;
use resolver::{ResolveContext, VersionResolver};
use zls::ZlsProvisioner;

use crate::types::{NetErr, VersionSpec, ZigupError};

/// What a successful subcommand produced, beyond "no error" — `main` maps
/// this to an exit code (spec §6).
pub enum Outcome {
    Success,
    /// `run`'s child exit code, or a platform default when it terminated
    /// abnormally (spec §6).
    ChildExit(i32),
}

/// Everything a dispatched operation needs: resolved paths, the shared HTTP
/// client, the index cache, and the prompter. One instance per invocation.
pub struct App {
    pub config: ResolvedConfig,
    layout: InstallLayout,
    index: IndexStore,
    downloader: Downloader,
    prompter: Arc<dyn Prompter>,
}

impl App {
    pub fn new(config: ResolvedConfig, prompter: Arc<dyn Prompter>) -> Result<Self, ZigupError> {
        let client = create_client()
            .map_err(|e| ZigupError::DownloadFailed(NetErr::connect_or_send(e)))?;
        let cache_dir = paths::cache_dir()?;
        let layout = InstallLayout::new(config.install_dir.clone());
        let index = IndexStore::new(client.clone(), cache_dir);
        let downloader = Downloader::new(client);

        Ok(App { config, layout, index, downloader, prompter })
    }

    pub fn layout(&self) -> &InstallLayout {
        &self.layout
    }

    /// Resolves `spec`, installs the compiler archive, then provisions zls
    /// against it. ZLS build failures are logged as warnings, not fatal —
    /// the compiler install itself already succeeded (spec §7).
    async fn install_and_provision(&mut self, spec: &VersionSpec) -> Result<String, ZigupError> {
        let mut resolver = VersionResolver::new(spec.clone());
        let mut ctx = ResolveContext { index: &mut self.index, layout: &self.layout };
        let id = resolver.id(&mut ctx).await?;
        let url = resolver.url(&mut ctx).await?;

        let installer = CompilerInstaller::new(&self.downloader, &self.layout);
        installer.install(&id, &url).await?;

        let zls = ZlsProvisioner::new(self.layout.clone(), Arc::clone(&self.prompter));
        if let Err(e) = zls.install_zls(&id, spec).await {
            tracing::warn!(target: "zigup::app", "zls provisioning for {id} did not complete: {e}");
        }

        Ok(id)
    }

    /// `zigup <VERSION>`: install, provision zls, and set it as default.
    pub async fn install_and_set_default(&mut self, spec: &VersionSpec) -> Result<String, ZigupError> {
        let id = self.install_and_provision(spec).await?;
        self.set_default(&id)?;
        Ok(id)
    }

    /// `fetch <VERSION>`: install and provision zls, without touching the
    /// default pointer.
    pub async fn fetch(&mut self, spec: &VersionSpec) -> Result<String, ZigupError> {
        self.install_and_provision(spec).await
    }

    pub fn set_default(&self, id: &str) -> Result<(), ZigupError> {
        default_pointer::set_default(&self.config.zig_symlink, &self.layout.compiler_bin(id))?;
        let zls_bin = self.layout.zls_bin(id);
        if zls_bin.exists() {
            default_pointer::set_default(&self.config.zls_symlink, &zls_bin)?;
        }
        Ok(())
    }

    pub fn read_default(&self) -> Result<Option<String>, ZigupError> {
        default_pointer::read_default_id(&self.config.zig_symlink)
    }

    pub fn list(&self) -> Result<Vec<InstalledEntry>, ZigupError> {
        lifecycle::list(&self.layout)
    }

    pub fn keep(&self, id: &str) -> Result<(), ZigupError> {
        lifecycle::keep(&self.layout, id)
    }

    pub fn clean(&self, id: &str) -> Result<(), ZigupError> {
        lifecycle::clean(&self.layout, id)
    }

    pub fn clean_outdated(&self) -> Result<Vec<String>, ZigupError> {
        lifecycle::clean_outdated(&self.layout)
    }

    pub async fn run(&self, id: &str, args: &[String]) -> Result<Outcome, ZigupError> {
        let status = lifecycle::run(&self.layout, id, args).await?;
        match status.code() {
            Some(code) => Ok(Outcome::ChildExit(code)),
            None => Err(ZigupError::General(color_eyre::eyre::eyre!(
                "{id} terminated abnormally ({status})"
            ))),
        }
    }

    /// `fetch-index` / `fetch-mach-index`: forces a refetch and reports how
    /// many releases came back.
    pub async fn refresh_index(&mut self, kind: network::IndexKind) -> Result<usize, ZigupError> {
        let document = self
            .index
            .get(kind, network::CachePolicy::NeverCache)
            .await
            .map_err(ZigupError::DownloadFailed)?;
        Ok(document.releases.len())
    }

    pub fn set_install_dir(&mut self, dir: PathBuf) -> Result<(), ZigupError> {
        self.config.install_dir = dir;
        self.layout = InstallLayout::new(self.config.install_dir.clone());
        self.config.save().map_err(|e| ZigupError::General(e))
    }

    pub fn set_zig_symlink(&mut self, path: PathBuf) -> Result<(), ZigupError> {
        self.config.zig_symlink = path;
        self.config.save().map_err(|e| ZigupError::General(e))
    }

    pub fn set_zls_symlink(&mut self, path: PathBuf) -> Result<(), ZigupError> {
        self.config.zls_symlink = path;
        self.config.save().map_err(|e| ZigupError::General(e))
    }
}

/// Literal install-directory name a user-supplied `keep`/`clean`/`run`
/// argument refers to: these commands address an *existing install*, not a
/// resolvable spec, so `0.13.0` and `zig-0.13.0` are equivalent.
pub fn normalize_installed_id(raw: &str) -> String {
    format!("zig-{}", raw.strip_prefix("zig-").unwrap_or(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_installed_id_accepts_either_form() {
        assert_eq!(normalize_installed_id("0.13.0"), "zig-0.13.0");
        assert_eq!(normalize_installed_id("zig-0.13.0"), "zig-0.13.0");
    }
}
