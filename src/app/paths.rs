//! Platform directory resolution (spec §6, "Filesystem layout").

use std::path::PathBuf;

use crate::app::constants::{CACHE_SUBDIR, CONFIG_DIR_ENV, CONFIG_FILE_NAME};
use crate::types::ZigupError;

/// Platform "data directory", used as the default install root.
pub fn data_dir() -> Result<PathBuf, ZigupError> {
    dirs::data_dir().ok_or(ZigupError::NoDataDirectory)
}

/// `<cache_dir>/zigup`, home of the two index caches.
pub fn cache_dir() -> Result<PathBuf, ZigupError> {
    let base = dirs::cache_dir().ok_or(ZigupError::NoCacheDirectory)?;
    Ok(base.join(CACHE_SUBDIR))
}

/// Directory holding `zigup.conf`. Honors `ZIGUP_CONFIG` as a directory
/// override, in the spirit of the teacher's `ZV_DIR` env override.
pub fn config_dir() -> Result<PathBuf, ZigupError> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::config_dir().ok_or(ZigupError::NoConfigDirectory)
}

/// Absolute path to `zigup.conf`.
pub fn config_file_path() -> Result<PathBuf, ZigupError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Default install root when the user hasn't set one: `<data_dir>/zigup`.
pub fn default_install_dir() -> Result<PathBuf, ZigupError> {
    Ok(data_dir()?.join("zigup"))
}

/// Default location of the `zig` default-pointer, under the install root's
/// `bin/` directory so it can be added to `$PATH` as a unit.
pub fn default_zig_symlink(install_dir: &std::path::Path) -> PathBuf {
    install_dir.join("bin").join(zig_exe_name())
}

/// Default location of the `zls` default-pointer.
pub fn default_zls_symlink(install_dir: &std::path::Path) -> PathBuf {
    install_dir.join("bin").join(zls_exe_name())
}

pub fn zig_exe_name() -> &'static str {
    if cfg!(windows) { "zig.exe" } else { "zig" }
}

pub fn zls_exe_name() -> &'static str {
    if cfg!(windows) { "zls.exe" } else { "zls" }
}
