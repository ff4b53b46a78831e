//! Commit resolution for a ZLS build (spec §4.7 `resolve_zls_commit`): try
//! the numeric version as a ref name, fall back to `origin/master` for
//! master-class specs, then drop into an interactive re-prompt loop.

use crate::app::prompt::Prompter;
use crate::types::{VersionSpec, ZigupError};

/// `numeric_version` is the id with any `zig-` prefix stripped, e.g.
/// `0.13.0` — tags in the zls repository are named after the Zig release
/// they target, not the `zig-` install id.
pub fn resolve_zls_commit(
    repo: &git2::Repository,
    spec: &VersionSpec,
    numeric_version: &str,
    prompter: &dyn Prompter,
) -> Result<git2::Oid, ZigupError> {
    if let Some(oid) = revparse(repo, numeric_version) {
        return Ok(oid);
    }

    if matches!(spec, VersionSpec::Master)
        && prompter.confirm("use origin/master for the zls build?", Some(true))
    {
        if let Some(oid) = revparse(repo, "origin/master") {
            return Ok(oid);
        }
    }

    loop {
        let Some(input) = prompter.ask_line("zls commit (master, a full SHA, or any git revision)")
        else {
            return Err(ZigupError::FailedCheckout {
                reference: numeric_version.to_string(),
                source: color_eyre::eyre::eyre!("no commit was resolved for the zls build"),
            });
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }
        let candidate = if trimmed == "master" { "origin/master" } else { trimmed };
        if let Some(oid) = revparse(repo, candidate) {
            return Ok(oid);
        }
        tracing::warn!(target: "zigup::zls", "could not resolve {candidate:?} to a commit, try again");
    }
}

/// `revparse_single` already performs dwim-style resolution of short branch
/// and tag names, in addition to full git revision syntax.
fn revparse(repo: &git2::Repository, revision: &str) -> Option<git2::Oid> {
    let object = repo.revparse_single(revision).ok()?;
    let commit = object.peel_to_commit().ok()?;
    Some(commit.id())
}
