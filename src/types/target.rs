//! Host platform tokens used to build Zig's own download filenames.
//!
//! Zig's release filenames are not cargo/rustc target triples; ziglang.org
//! uses its own `<os>`/`<arch>` vocabulary (spec §4.4: "linux", "macos",
//! "windows"; "x86_64", "aarch64", "armv7a" for arm).

use crate::types::ZigupError;

/// `(os, arch)` tokens as ziglang.org spells them, for the running host.
pub fn host_zig_tokens() -> Result<(&'static str, &'static str), ZigupError> {
    use target_lexicon::{Architecture, HOST, OperatingSystem};

    let os = match HOST.operating_system {
        OperatingSystem::Linux => "linux",
        OperatingSystem::MacOSX { .. } | OperatingSystem::Darwin => "macos",
        OperatingSystem::Windows => "windows",
        other => {
            return Err(ZigupError::UnsupportedSystem(format!(
                "unsupported operating system: {other}"
            )));
        }
    };

    let arch = match HOST.architecture {
        Architecture::X86_64 => "x86_64",
        Architecture::Aarch64(_) => "aarch64",
        Architecture::Arm(_) => "armv7a",
        other => {
            return Err(ZigupError::UnsupportedSystem(format!(
                "unsupported architecture: {other}"
            )));
        }
    };

    Ok((os, arch))
}

/// Filename extension Zig uses to package archives for an OS token.
pub fn archive_ext_for_os(os: &str) -> &'static str {
    if os == "windows" { "zip" } else { "tar.xz" }
}

/// Builds `zig-<os>-<arch>-<version>.<ext>` or, from 0.14.1 onward,
/// `zig-<arch>-<os>-<version>.<ext>` (the naming convention changed in
/// Zig 0.14.1; see `CompilerInstaller`/`VersionResolver` design notes).
pub fn zig_archive_basename(os: &str, arch: &str, version: &semver::Version) -> String {
    let ext = archive_ext_for_os(os);
    if *version <= semver::Version::new(0, 14, 0) {
        format!("zig-{os}-{arch}-{version}.{ext}")
    } else {
        format!("zig-{arch}-{os}-{version}.{ext}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_flip_at_0_14_1() {
        let pre = semver::Version::new(0, 14, 0);
        assert_eq!(
            zig_archive_basename("linux", "x86_64", &pre),
            "zig-linux-x86_64-0.14.0.tar.xz"
        );

        let post = semver::Version::new(0, 14, 1);
        assert_eq!(
            zig_archive_basename("linux", "x86_64", &post),
            "zig-x86_64-linux-0.14.1.tar.xz"
        );
    }

    #[test]
    fn windows_uses_zip() {
        let v = semver::Version::new(0, 13, 0);
        assert_eq!(
            zig_archive_basename("windows", "x86_64", &v),
            "zig-windows-x86_64-0.13.0.zip"
        );
    }
}
