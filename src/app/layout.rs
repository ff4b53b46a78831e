//! Install-root path conventions (spec §3/§4.3/§6): pure path arithmetic,
//! no I/O beyond existence checks that tolerate missing paths.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::app::paths;

pub const ZLS_REPO_DIRNAME: &str = "zls-repo";
pub const KEEP_MARKER_NAME: &str = ".keep";
pub const INSTALLING_SUFFIX: &str = ".installing";

#[derive(Debug, Clone)]
pub struct InstallLayout {
    install_dir: PathBuf,
}

impl InstallLayout {
    pub fn new(install_dir: PathBuf) -> Self {
        InstallLayout { install_dir }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// `install_dir / id`, e.g. `install_dir/zig-0.13.0`.
    pub fn compiler_dir(&self, id: &str) -> PathBuf {
        self.install_dir.join(id)
    }

    /// `compiler_dir(id)/files/zig[.exe]`.
    pub fn compiler_bin(&self, id: &str) -> PathBuf {
        self.compiler_dir(id).join("files").join(paths::zig_exe_name())
    }

    /// `compiler_dir(id)/zls[.exe]`, populated by `ZlsProvisioner`.
    pub fn zls_bin(&self, id: &str) -> PathBuf {
        self.compiler_dir(id).join(paths::zls_exe_name())
    }

    /// `compiler_dir(id)/files`, the extraction target and rename source.
    pub fn files_dir(&self, id: &str) -> PathBuf {
        self.compiler_dir(id).join("files")
    }

    /// `compiler_dir(id) + ".installing"`, a sibling directory so the final
    /// rename stays on one filesystem.
    pub fn installing_dir(&self, id: &str) -> PathBuf {
        let mut name = id.to_string();
        name.push_str(INSTALLING_SUFFIX);
        self.install_dir.join(name)
    }

    pub fn keep_marker(&self, id: &str) -> PathBuf {
        self.compiler_dir(id).join(KEEP_MARKER_NAME)
    }

    pub fn zls_repo(&self) -> PathBuf {
        self.install_dir.join(ZLS_REPO_DIRNAME)
    }

    pub fn is_installed(&self, id: &str) -> bool {
        self.compiler_dir(id).is_dir() && self.compiler_bin(id).exists()
    }

    pub fn has_keep_marker(&self, id: &str) -> bool {
        self.keep_marker(id).exists()
    }

    /// Completed install directories under `install_dir`: names starting
    /// with `zig-` and not ending in `.installing` (spec §4.8 `list`).
    /// `max_depth(1)` keeps this to immediate children, the same way the
    /// teacher's own bin-directory sweep bounds its `WalkDir`.
    pub fn installed_ids(&self) -> std::io::Result<Vec<String>> {
        if !self.install_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<String> = WalkDir::new(&self.install_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| name.starts_with("zig-") && !name.ends_with(INSTALLING_SUFFIX))
            .collect();

        ids.sort();
        Ok(ids)
    }

    /// Recovers the install id an install directory/symlink path implies:
    /// `…/zig-<ver>/files/zig` → `zig-<ver>` (spec §4.6 `install_path_to_version`).
    pub fn install_path_to_version(path: &Path) -> Option<String> {
        let files_dir = path.parent()?; // …/zig-<ver>/files
        let compiler_dir = files_dir.parent()?; // …/zig-<ver>
        compiler_dir.file_name()?.to_str().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_derived_consistently() {
        let layout = InstallLayout::new(PathBuf::from("/opt/zigup"));
        assert_eq!(layout.compiler_dir("zig-0.13.0"), PathBuf::from("/opt/zigup/zig-0.13.0"));
        assert_eq!(
            layout.installing_dir("zig-0.13.0"),
            PathBuf::from("/opt/zigup/zig-0.13.0.installing")
        );
        assert_eq!(
            layout.keep_marker("zig-0.13.0"),
            PathBuf::from("/opt/zigup/zig-0.13.0/.keep")
        );
        assert_eq!(layout.zls_repo(), PathBuf::from("/opt/zigup/zls-repo"));
    }

    #[test]
    fn install_path_to_version_round_trips() {
        let bin = Path::new("/opt/zigup/zig-0.13.0/files/zig");
        assert_eq!(
            InstallLayout::install_path_to_version(bin),
            Some("zig-0.13.0".to_string())
        );
    }
}
