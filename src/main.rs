use clap::Parser;
use color_eyre::config::{HookBuilder, Theme};

mod app;
mod cli;
mod tools;
mod types;

pub use types::Result;

#[tokio::main]
async fn main() -> Result<()> {
    yansi::whenever(yansi::Condition::TTY_AND_COLOR);
    if yansi::is_enabled() {
        color_eyre::install()?;
    } else {
        HookBuilder::default().theme(Theme::new()).install()?;
    }

    #[cfg(windows)]
    apply_windows_security_mitigations();

    let args = cli::normalize_args(std::env::args().collect());
    let parsed = cli::Cli::parse_from(args);

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(parsed.verbose))
        .with_writer(std::io::stderr)
        .init();

    match cli::execute(parsed).await {
        Ok(app::Outcome::Success) => std::process::exit(0),
        Ok(app::Outcome::ChildExit(code)) => std::process::exit(code),
        Err(report) => {
            eprintln!("error: {report:#}");
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG` wins if set; `ZIGUP_LOG` is the zigup-specific alternative in
/// the same spirit as the teacher's own env-var overrides; otherwise `-v`
/// repeated on the command line bumps the default `zigup=info` filter.
fn log_filter(verbose: u8) -> String {
    if let Ok(filter) = std::env::var("RUST_LOG") {
        return filter;
    }
    if let Ok(filter) = std::env::var("ZIGUP_LOG") {
        return filter;
    }
    match verbose {
        0 => "zigup=info".to_string(),
        1 => "zigup=debug".to_string(),
        _ => "zigup=trace".to_string(),
    }
}

/// Restricts DLL loading to system directories, closing the default-search
/// DLL-planting vector on Windows.
#[cfg(windows)]
pub fn apply_windows_security_mitigations() {
    use windows_sys::Win32::System::LibraryLoader::{
        LOAD_LIBRARY_SEARCH_SYSTEM32, LOAD_LIBRARY_SEARCH_USER_DIRS, SetDefaultDllDirectories,
    };

    let search_flags = LOAD_LIBRARY_SEARCH_SYSTEM32 | LOAD_LIBRARY_SEARCH_USER_DIRS;
    unsafe {
        let result = SetDefaultDllDirectories(search_flags);
        assert_ne!(result, 0, "Failed to set secure DLL directories");
    }
}
