//! `DefaultPointer` (spec §4.6): the platform default-toolchain pointer,
//! abstracted behind `set`/`read` with two implementations selected at
//! compile time — a POSIX symlink, or a spliced launcher executable on
//! platforms without usable symlinks.

use std::path::{Path, PathBuf};

use crate::types::ZigupError;

#[cfg(unix)]
mod posix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use posix::SymlinkPointer as PlatformPointer;
#[cfg(windows)]
pub use windows::LauncherPointer as PlatformPointer;

/// Points `pointer_path` at `target` (a `compiler_bin`/`zls_bin` path) and
/// reports back which install id a pointer currently targets.
pub trait DefaultPointer {
    fn set(pointer_path: &Path, target: &Path) -> Result<(), ZigupError>;
    fn read(pointer_path: &Path) -> Result<Option<PathBuf>, ZigupError>;
}

/// Reads `pointer_path` and recovers the install id of its target, if any.
pub fn read_default_id(pointer_path: &Path) -> Result<Option<String>, ZigupError> {
    let target = PlatformPointer::read(pointer_path)?;
    Ok(target.and_then(|t| crate::app::layout::InstallLayout::install_path_to_version(&t)))
}

pub fn set_default(pointer_path: &Path, target: &Path) -> Result<(), ZigupError> {
    PlatformPointer::set(pointer_path, target)
}
