//! Argument grammar and dispatch (spec §6).

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::app::config::ResolvedConfig;
use crate::app::network::IndexKind;
use crate::app::prompt::DialoguerPrompter;
use crate::app::{App, Outcome, normalize_installed_id};
use crate::types::VersionSpec;

/// Subcommand literals recognized by [`normalize_args`]; anything else in
/// that position is treated as the implicit `<VERSION>` form.
const KNOWN_SUBCOMMANDS: &[&str] = &[
    "fetch",
    "default",
    "list",
    "keep",
    "clean",
    "run",
    "set-install-dir",
    "set-zig-symlink",
    "set-zls-symlink",
    "fetch-index",
    "fetch-mach-index",
    "help",
];

const GLOBAL_VALUE_FLAGS: &[&str] = &["--install-dir", "--zig-symlink", "--zls-symlink"];

/// Global flags that take no value (repeatable verbosity counter).
fn is_verbose_flag(arg: &str) -> bool {
    arg == "--verbose"
        || (arg.len() > 1
            && arg.starts_with('-')
            && !arg.starts_with("--")
            && arg[1..].bytes().all(|b| b == b'v'))
}

/// Inserts the hidden `install` subcommand token when the user wrote the
/// bare `zigup <VERSION>` form, so clap's normal subcommand dispatch can
/// still parse it (spec §6 grammar line 1).
pub fn normalize_args(mut args: Vec<String>) -> Vec<String> {
    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg == "-h" || arg == "--help" || arg == "-V" || arg == "--version" {
            return args;
        }
        if is_verbose_flag(arg) {
            i += 1;
            continue;
        }
        if GLOBAL_VALUE_FLAGS.contains(&arg) {
            i += 2;
            continue;
        }
        if arg.starts_with("--")
            && arg.contains('=')
            && GLOBAL_VALUE_FLAGS.contains(&arg.split('=').next().unwrap())
        {
            i += 1;
            continue;
        }
        break;
    }

    if i < args.len() && !KNOWN_SUBCOMMANDS.contains(&args[i].as_str()) {
        args.insert(i, "install".to_string());
    }
    args
}

#[derive(Parser, Debug)]
#[command(name = "zigup", about = "A side-by-side version manager for the Zig compiler and ZLS")]
pub struct Cli {
    #[arg(long, global = true, value_name = "DIR")]
    pub install_dir: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    pub zig_symlink: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    pub zls_symlink: Option<PathBuf>,

    /// Increases log verbosity; repeatable (`-v`, `-vv`). Overridden by
    /// `RUST_LOG`/`ZIGUP_LOG` when set.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download + set default (invoked as `zigup <VERSION>`, not `zigup install <VERSION>`).
    #[command(hide = true)]
    Install { spec: VersionSpec },

    /// Download only.
    Fetch { spec: VersionSpec },

    /// Read or set the default toolchain.
    Default { spec: Option<VersionSpec> },

    /// List installed compilers.
    List,

    /// Protect an install from `clean outdated`.
    Keep { id: String },

    /// Delete an install, or every install `clean outdated` doesn't exempt.
    Clean { target: String },

    /// Run an installed compiler.
    #[command(trailing_var_arg = true)]
    Run {
        id: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    SetInstallDir { dir: PathBuf },
    SetZigSymlink { path: PathBuf },
    SetZlsSymlink { path: PathBuf },

    FetchIndex,
    FetchMachIndex,
}

/// Layers `--install-dir`/`--zig-symlink`/`--zls-symlink` over the loaded
/// config, constructs the `App`, and runs one subcommand to completion.
pub async fn execute(cli: Cli) -> crate::Result<Outcome> {
    let mut config = ResolvedConfig::load()?;
    if let Some(dir) = cli.install_dir {
        config.install_dir = dir;
    }
    if let Some(path) = cli.zig_symlink {
        config.zig_symlink = path;
    }
    if let Some(path) = cli.zls_symlink {
        config.zls_symlink = path;
    }

    let mut app = App::new(config, Arc::new(DialoguerPrompter))?;

    match cli.command {
        Commands::Install { spec } => {
            let id = app.install_and_set_default(&spec).await?;
            println!("{id}");
            Ok(Outcome::Success)
        }
        Commands::Fetch { spec } => {
            let id = app.fetch(&spec).await?;
            println!("{id}");
            Ok(Outcome::Success)
        }
        Commands::Default { spec: Some(spec) } => {
            let id = app.install_and_set_default(&spec).await?;
            println!("{id}");
            Ok(Outcome::Success)
        }
        Commands::Default { spec: None } => {
            match app.read_default()? {
                Some(id) => println!("{id}"),
                None => println!("no default toolchain is set"),
            }
            Ok(Outcome::Success)
        }
        Commands::List => {
            for entry in app.list()? {
                if entry.kept {
                    println!("{} (kept)", entry.id);
                } else {
                    println!("{}", entry.id);
                }
            }
            Ok(Outcome::Success)
        }
        Commands::Keep { id } => {
            app.keep(&normalize_installed_id(&id))?;
            Ok(Outcome::Success)
        }
        Commands::Clean { target } => {
            if target == "outdated" {
                for id in app.clean_outdated()? {
                    println!("removed {id}");
                }
            } else {
                app.clean(&normalize_installed_id(&target))?;
            }
            Ok(Outcome::Success)
        }
        Commands::Run { id, args } => app.run(&normalize_installed_id(&id), &args).await,
        Commands::SetInstallDir { dir } => {
            app.set_install_dir(dir)?;
            Ok(Outcome::Success)
        }
        Commands::SetZigSymlink { path } => {
            app.set_zig_symlink(path)?;
            Ok(Outcome::Success)
        }
        Commands::SetZlsSymlink { path } => {
            app.set_zls_symlink(path)?;
            Ok(Outcome::Success)
        }
        Commands::FetchIndex => {
            let count = app.refresh_index(IndexKind::Zig).await?;
            println!("fetched {count} releases");
            Ok(Outcome::Success)
        }
        Commands::FetchMachIndex => {
            let count = app.refresh_index(IndexKind::Mach).await?;
            println!("fetched {count} releases");
            Ok(Outcome::Success)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        std::iter::once("zigup".to_string()).chain(s.split_whitespace().map(String::from)).collect()
    }

    #[test]
    fn bare_version_gets_the_hidden_install_token() {
        assert_eq!(normalize_args(args("0.13.0")), args("install 0.13.0"));
    }

    #[test]
    fn known_subcommands_pass_through_untouched() {
        assert_eq!(normalize_args(args("list")), args("list"));
        assert_eq!(normalize_args(args("fetch 0.13.0")), args("fetch 0.13.0"));
        assert_eq!(normalize_args(args("clean outdated")), args("clean outdated"));
    }

    #[test]
    fn global_flags_before_the_version_are_skipped_over() {
        assert_eq!(
            normalize_args(args("--install-dir /tmp/zigup 0.13.0")),
            args("--install-dir /tmp/zigup install 0.13.0")
        );
    }

    #[test]
    fn verbose_flags_are_skipped_over_too() {
        assert_eq!(normalize_args(args("-v 0.13.0")), args("-v install 0.13.0"));
        assert_eq!(normalize_args(args("-vv 0.13.0")), args("-vv install 0.13.0"));
        assert_eq!(normalize_args(args("--verbose list")), args("--verbose list"));
    }

    #[test]
    fn help_flags_are_left_entirely_alone() {
        assert_eq!(normalize_args(args("--help")), args("--help"));
        assert_eq!(normalize_args(args("-h")), args("-h"));
    }
}
