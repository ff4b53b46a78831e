//! List/keep/clean/run operations over installed compilers (spec §4.8).

use std::process::Stdio;

use crate::app::layout::InstallLayout;
use crate::types::ZigupError;

/// One row of `list` output: the install id and whether it carries a
/// `.keep` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledEntry {
    pub id: String,
    pub kept: bool,
}

/// Sorted ascending by id, annotated with keep status (spec §4.8 `list`).
pub fn list(layout: &InstallLayout) -> Result<Vec<InstalledEntry>, ZigupError> {
    let ids = layout.installed_ids()?;
    Ok(ids
        .into_iter()
        .map(|id| {
            let kept = layout.has_keep_marker(&id);
            InstalledEntry { id, kept }
        })
        .collect())
}

/// Marks `id` as kept. An existing marker is a no-op; a missing install is
/// a user error.
pub fn keep(layout: &InstallLayout, id: &str) -> Result<(), ZigupError> {
    if !layout.is_installed(id) {
        return Err(ZigupError::General(color_eyre::eyre::eyre!("{id} is not installed")));
    }
    if layout.has_keep_marker(id) {
        return Ok(());
    }
    std::fs::write(layout.keep_marker(id), b"")?;
    Ok(())
}

/// Deletes the install tree for `id`. A missing install directory is a
/// no-op, matching the teacher's idempotent-delete convention.
pub fn clean(layout: &InstallLayout, id: &str) -> Result<(), ZigupError> {
    let dir = layout.compiler_dir(id);
    match std::fs::remove_dir_all(&dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ZigupError::Io(e)),
    }
}

/// Deletes every install that is neither the overall latest nor the latest
/// stable, and does not carry a `.keep` marker. `zls-repo` is never
/// touched.
pub fn clean_outdated(layout: &InstallLayout) -> Result<Vec<String>, ZigupError> {
    let ids = layout.installed_ids()?;

    let parsed: Vec<(semver::Version, &String)> = ids
        .iter()
        .filter_map(|id| {
            let raw = id.strip_prefix("zig-")?;
            semver::Version::parse(raw).ok().map(|v| (v, id))
        })
        .collect();

    let latest = parsed.iter().max_by(|(a, _), (b, _)| a.cmp(b)).map(|(_, id)| (*id).clone());
    let latest_stable = parsed
        .iter()
        .filter(|(v, _)| v.pre.is_empty())
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, id)| (*id).clone());

    let mut removed = Vec::new();
    for id in ids {
        if Some(&id) == latest.as_ref() || Some(&id) == latest_stable.as_ref() {
            continue;
        }
        if layout.has_keep_marker(&id) {
            continue;
        }
        clean(layout, &id)?;
        removed.push(id);
    }
    Ok(removed)
}

/// Spawns `compiler_bin(id)` with `args`, forwarding standard streams, and
/// waits for it to exit.
pub async fn run(layout: &InstallLayout, id: &str, args: &[String]) -> Result<std::process::ExitStatus, ZigupError> {
    if !layout.is_installed(id) {
        return Err(ZigupError::General(color_eyre::eyre::eyre!("{id} is not installed")));
    }

    let status = tokio::process::Command::new(layout.compiler_bin(id))
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_sorts_and_annotates_keep() {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path().to_path_buf());
        for id in ["zig-0.13.0", "zig-0.12.0"] {
            let files = layout.files_dir(id);
            std::fs::create_dir_all(&files).unwrap();
            std::fs::write(layout.compiler_bin(id), b"").unwrap();
        }
        std::fs::write(layout.keep_marker("zig-0.12.0"), b"").unwrap();

        let entries = list(&layout).unwrap();
        assert_eq!(
            entries,
            vec![
                InstalledEntry { id: "zig-0.12.0".to_string(), kept: true },
                InstalledEntry { id: "zig-0.13.0".to_string(), kept: false },
            ]
        );
    }

    #[test]
    fn keep_is_idempotent_and_rejects_missing_install() {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path().to_path_buf());
        assert!(keep(&layout, "zig-0.13.0").is_err());

        std::fs::create_dir_all(layout.files_dir("zig-0.13.0")).unwrap();
        std::fs::write(layout.compiler_bin("zig-0.13.0"), b"").unwrap();
        keep(&layout, "zig-0.13.0").unwrap();
        keep(&layout, "zig-0.13.0").unwrap();
        assert!(layout.has_keep_marker("zig-0.13.0"));
    }

    #[test]
    fn clean_missing_install_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path().to_path_buf());
        clean(&layout, "zig-0.13.0").unwrap();
    }

    #[test]
    fn clean_outdated_keeps_latest_latest_stable_and_keep_marked() {
        let dir = tempfile::tempdir().unwrap();
        let layout = InstallLayout::new(dir.path().to_path_buf());
        for id in ["zig-0.11.0", "zig-0.12.0", "zig-0.13.0", "zig-0.14.0-dev.1+abc"] {
            std::fs::create_dir_all(layout.files_dir(id)).unwrap();
            std::fs::write(layout.compiler_bin(id), b"").unwrap();
        }
        std::fs::write(layout.keep_marker("zig-0.11.0"), b"").unwrap();

        let removed = clean_outdated(&layout).unwrap();
        assert_eq!(removed, vec!["zig-0.12.0".to_string()]);

        let remaining = layout.installed_ids().unwrap();
        assert_eq!(
            remaining,
            vec![
                "zig-0.11.0".to_string(),
                "zig-0.13.0".to_string(),
                "zig-0.14.0-dev.1+abc".to_string(),
            ]
        );
    }
}
