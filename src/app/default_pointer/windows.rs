//! Windows-style default-pointer: a spliced copy of the compiled
//! `zigup-launcher` binary (spec §4.6/§6). Windows symlinks need elevated
//! privileges by default, so the pointer is instead a real, runnable
//! executable that re-execs whatever path is spliced into it.

include!("../../../launcher/src/marker.rs");

use std::io::Write;
use std::path::{Path, PathBuf};

use super::DefaultPointer;
use crate::types::ZigupError;

/// The compiled `zigup-launcher.exe`, embedded at build time by `build.rs`,
/// which also asserts the marker occurs exactly once (spec §9).
static LAUNCHER_TEMPLATE: &[u8] = include_bytes!(env!("ZIGUP_LAUNCHER_PATH"));

pub struct LauncherPointer;

impl DefaultPointer for LauncherPointer {
    fn set(pointer_path: &Path, target: &Path) -> Result<(), ZigupError> {
        let offset = marker_offset(LAUNCHER_TEMPLATE)?;
        let buf_start = offset + MARKER.len();

        let target_str = target.to_string_lossy();
        let target_bytes = target_str.as_bytes();
        if target_bytes.len() >= PATH_BUF_LEN {
            return Err(ZigupError::General(color_eyre::eyre::eyre!(
                "default target path is longer than the launcher's path buffer ({} >= {PATH_BUF_LEN})",
                target_bytes.len()
            )));
        }

        let mut payload = LAUNCHER_TEMPLATE.to_vec();
        for b in &mut payload[buf_start..buf_start + PATH_BUF_LEN] {
            *b = 0;
        }
        payload[buf_start..buf_start + target_bytes.len()].copy_from_slice(target_bytes);

        if let Some(parent) = pointer_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(pointer_path)?;
        file.write_all(&payload)?;
        Ok(())
    }

    fn read(pointer_path: &Path) -> Result<Option<PathBuf>, ZigupError> {
        let bytes = match std::fs::read(pointer_path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ZigupError::Io(e)),
        };

        let Ok(offset) = marker_offset(&bytes) else {
            return Ok(None); // not a zigup pointer file
        };

        let buf_start = offset + MARKER.len();
        let buf_end = buf_start + PATH_BUF_LEN;
        if buf_end > bytes.len() {
            return Err(ZigupError::General(color_eyre::eyre::eyre!(
                "default pointer at {} is truncated (corrupt shim)",
                pointer_path.display()
            )));
        }
        let buf = &bytes[buf_start..buf_end];

        let Some(nul) = buf.iter().position(|&b| b == 0) else {
            return Err(ZigupError::General(color_eyre::eyre::eyre!(
                "default pointer at {} is missing its null terminator (corrupt shim)",
                pointer_path.display()
            )));
        };
        if nul == 0 {
            return Ok(None);
        }

        let path_str = std::str::from_utf8(&buf[..nul]).map_err(|e| {
            ZigupError::General(color_eyre::eyre::eyre!("default pointer at {} is not valid UTF-8: {e}", pointer_path.display()))
        })?;
        Ok(Some(PathBuf::from(path_str)))
    }
}

/// Finds [`MARKER`]'s single occurrence in `bytes`. More than one occurrence
/// is treated as a build defect upstream (`build.rs` already asserts this at
/// compile time); here it's just another reason to refuse to proceed.
fn marker_offset(bytes: &[u8]) -> Result<usize, ZigupError> {
    let mut offsets =
        bytes.windows(MARKER.len()).enumerate().filter(|(_, w)| *w == &MARKER[..]).map(|(i, _)| i);
    let first = offsets
        .next()
        .ok_or_else(|| ZigupError::General(color_eyre::eyre::eyre!("launcher marker not found")))?;
    if offsets.next().is_some() {
        return Err(ZigupError::General(color_eyre::eyre::eyre!("launcher marker found more than once")));
    }
    Ok(first)
}
