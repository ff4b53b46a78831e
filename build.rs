//! Compiles the `zigup-launcher` workspace member and embeds the resulting
//! binary so `app::default_pointer::windows` can write it out verbatim and
//! splice a target path into it. See spec.md §4.6/§6.
//!
//! Only does any of this on Windows; POSIX uses a plain symlink and never
//! touches the launcher crate.

use std::path::{Path, PathBuf};
use std::process::Command;

include!("launcher/src/marker.rs");

fn main() {
    println!("cargo:rerun-if-changed=launcher/src/main.rs");
    println!("cargo:rerun-if-changed=launcher/src/marker.rs");
    println!("cargo:rerun-if-changed=launcher/Cargo.toml");

    if std::env::var("CARGO_CFG_WINDOWS").is_err() {
        return;
    }

    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let target_dir = out_dir.join("launcher-build");

    let status = Command::new(std::env::var("CARGO").unwrap_or_else(|_| "cargo".into()))
        .args([
            "build",
            "--release",
            "--package",
            "zigup-launcher",
            "--target-dir",
        ])
        .arg(&target_dir)
        .current_dir(&manifest_dir)
        .status()
        .expect("failed to invoke cargo to build zigup-launcher");

    if !status.success() {
        panic!("building zigup-launcher failed with status {status}");
    }

    let built = target_dir.join("release").join("zigup-launcher.exe");
    let embed_path = out_dir.join("zigup-launcher.exe");
    std::fs::copy(&built, &embed_path)
        .unwrap_or_else(|e| panic!("failed to copy {}: {e}", built.display()));

    assert_marker_occurs_once(&embed_path);

    println!(
        "cargo:rustc-env=ZIGUP_LAUNCHER_PATH={}",
        embed_path.display()
    );
}

/// Fails the build if the launcher binary doesn't contain [`MARKER`] exactly
/// once, the same check `zigup-launcher` itself performs at runtime.
fn assert_marker_occurs_once(path: &Path) {
    let bytes = std::fs::read(path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    let count = bytes
        .windows(MARKER.len())
        .filter(|w| *w == &MARKER[..])
        .count();
    assert_eq!(
        count, 1,
        "zigup-launcher.exe must contain the splice marker exactly once, found {count}"
    );
}
