//! POSIX default-pointer: a symlink whose target is `compiler_bin(id)`/
//! `zls_bin(id)` (spec §4.6).

use std::ffi::{CString, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

use super::DefaultPointer;
use crate::types::ZigupError;

/// `readlink(2)` needs a caller-sized buffer; `PATH_MAX` is the conventional
/// choice. A result exactly this long is a truncation signal, not a valid
/// target (spec §4.6: "some systems silently truncate").
const READLINK_BUF_LEN: usize = libc::PATH_MAX as usize;

pub struct SymlinkPointer;

impl DefaultPointer for SymlinkPointer {
    /// Deletes any existing file at `pointer_path` then creates the symlink,
    /// per spec §4.6.
    fn set(pointer_path: &Path, target: &Path) -> Result<(), ZigupError> {
        if let Some(parent) = pointer_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match std::fs::remove_file(pointer_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ZigupError::Io(e)),
        }
        std::os::unix::fs::symlink(target, pointer_path)?;
        Ok(())
    }

    fn read(pointer_path: &Path) -> Result<Option<PathBuf>, ZigupError> {
        if !pointer_path.is_symlink() {
            return Ok(None);
        }

        let c_path = CString::new(pointer_path.as_os_str().as_bytes()).map_err(|e| {
            ZigupError::General(color_eyre::eyre::eyre!("pointer path has an interior NUL: {e}"))
        })?;

        let mut buf = vec![0u8; READLINK_BUF_LEN];
        let n = unsafe { libc::readlink(c_path.as_ptr(), buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };

        if n < 0 {
            let err = std::io::Error::last_os_error();
            return if err.kind() == std::io::ErrorKind::NotFound { Ok(None) } else { Err(ZigupError::Io(err)) };
        }

        let n = n as usize;
        if n == buf.len() {
            return Err(ZigupError::General(color_eyre::eyre::eyre!(
                "default pointer at {} read back exactly {n} bytes (readlink buffer length); target is likely truncated",
                pointer_path.display()
            )));
        }

        buf.truncate(n);
        Ok(Some(PathBuf::from(OsString::from_vec(buf))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("zig-0.13.0").join("files").join("zig");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"#!/bin/sh\n").unwrap();

        let pointer = dir.path().join("bin").join("zig");
        SymlinkPointer::set(&pointer, &target).unwrap();

        let read_back = SymlinkPointer::read(&pointer).unwrap().unwrap();
        assert_eq!(read_back, target);
    }

    #[test]
    fn missing_pointer_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let pointer = dir.path().join("bin").join("zig");
        assert_eq!(SymlinkPointer::read(&pointer).unwrap(), None);
    }
}
