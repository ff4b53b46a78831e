use std::{io, path::Path, path::PathBuf};

/// Cross-platform canonicalize function that avoids UNC paths on Windows
pub fn canonicalize<P: AsRef<Path>>(path: P) -> io::Result<PathBuf> {
    dunce::canonicalize(path)
}

/// Check if we're running in a TTY environment
#[inline]
pub(crate) fn is_tty() -> bool {
    yansi::is_enabled()
}

/// Check if the current environment supports interactive prompts
pub(crate) fn supports_interactive_prompts() -> bool {
    if !is_tty() {
        return false;
    }

    if std::env::var("CI").is_ok() {
        return false;
    }

    if let Ok(term) = std::env::var("TERM")
        && term == "dumb"
    {
        return false;
    }

    if std::env::var("DEBIAN_FRONTEND").as_deref() == Ok("noninteractive") {
        return false;
    }

    true
}
