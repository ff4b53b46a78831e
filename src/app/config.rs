//! `zigup.conf`: a line-oriented `key=value` file (spec §6), and the
//! `ResolvedConfig` that layers it under CLI overrides.

use std::path::{Path, PathBuf};

use crate::app::paths;
use crate::types::CfgErr;

/// What's actually persisted to `zigup.conf`. Every field is optional;
/// absence means "use the platform default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub install_dir: Option<PathBuf>,
    pub zig_symlink: Option<PathBuf>,
    pub zls_symlink: Option<PathBuf>,
}

impl FileConfig {
    /// Parses `key=value` lines. Blank lines and `#`-prefixed lines are
    /// ignored; everything else must be a recognized key.
    pub fn parse(content: &str, path: &Path) -> Result<Self, CfgErr> {
        let mut cfg = FileConfig::default();

        for (idx, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(CfgErr::MalformedLine {
                    path: path.to_path_buf(),
                    line: idx + 1,
                });
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "install_dir" => cfg.install_dir = Some(PathBuf::from(value)),
                "zig_symlink" => cfg.zig_symlink = Some(PathBuf::from(value)),
                "zls_symlink" => cfg.zls_symlink = Some(PathBuf::from(value)),
                other => {
                    return Err(CfgErr::UnknownKey {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        key: other.to_string(),
                    });
                }
            }
        }

        Ok(cfg)
    }

    /// Serializes back to `key=value` lines, keys in a fixed order so
    /// `parse(render(c)) == c`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(dir) = &self.install_dir {
            out.push_str(&format!("install_dir={}\n", dir.display()));
        }
        if let Some(link) = &self.zig_symlink {
            out.push_str(&format!("zig_symlink={}\n", link.display()));
        }
        if let Some(link) = &self.zls_symlink {
            out.push_str(&format!("zls_symlink={}\n", link.display()));
        }
        out
    }

    /// Loads `zigup.conf`; a missing file yields `Ok(default)` per spec §6.
    pub fn load(path: &Path) -> Result<Self, CfgErr> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(CfgErr::NotFound(e)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), CfgErr> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| CfgErr::WriteFail {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, self.render()).map_err(|source| CfgErr::WriteFail {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The fully resolved set of paths zigup acts on: `zigup.conf` values
/// layered under platform defaults (spec §3, `ResolvedConfig`).
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub install_dir: PathBuf,
    pub zig_symlink: PathBuf,
    pub zls_symlink: PathBuf,
    pub config_path: PathBuf,
}

impl ResolvedConfig {
    /// Loads `zigup.conf` and fills in any unset field with the platform
    /// default, matching the filesystem layout in spec §6.
    pub fn load() -> crate::Result<Self> {
        let config_path = paths::config_file_path()?;
        let file = FileConfig::load(&config_path)?;
        Self::from_file_config(file, config_path)
    }

    fn from_file_config(file: FileConfig, config_path: PathBuf) -> crate::Result<Self> {
        let install_dir = match file.install_dir {
            Some(dir) => dir,
            None => paths::default_install_dir()?,
        };
        let zig_symlink = file
            .zig_symlink
            .unwrap_or_else(|| paths::default_zig_symlink(&install_dir));
        let zls_symlink = file
            .zls_symlink
            .unwrap_or_else(|| paths::default_zls_symlink(&install_dir));

        Ok(ResolvedConfig {
            install_dir,
            zig_symlink,
            zls_symlink,
            config_path,
        })
    }

    /// Persists the current paths back to `zigup.conf` (used by
    /// `set-install-dir`/`set-zig-symlink`/`set-zls-symlink`).
    pub fn save(&self) -> crate::Result<()> {
        let file = FileConfig {
            install_dir: Some(self.install_dir.clone()),
            zig_symlink: Some(self.zig_symlink.clone()),
            zls_symlink: Some(self.zls_symlink.clone()),
        };
        file.save(&self.config_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let cfg = FileConfig {
            install_dir: Some(PathBuf::from("/opt/zigup")),
            zig_symlink: Some(PathBuf::from("/usr/local/bin/zig")),
            zls_symlink: Some(PathBuf::from("/usr/local/bin/zls")),
        };
        let rendered = cfg.render();
        let parsed = FileConfig::parse(&rendered, Path::new("zigup.conf")).unwrap();
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let err = FileConfig::parse("bogus=1\n", Path::new("zigup.conf")).unwrap_err();
        assert!(matches!(err, CfgErr::UnknownKey { .. }));
    }

    #[test]
    fn malformed_line_is_an_error() {
        let err = FileConfig::parse("no-equals-sign\n", Path::new("zigup.conf")).unwrap_err();
        assert!(matches!(err, CfgErr::MalformedLine { .. }));
    }

    #[test]
    fn comments_and_blanks_are_ignored() {
        let cfg = FileConfig::parse("# comment\n\ninstall_dir=/tmp/x\n", Path::new("zigup.conf"))
            .unwrap();
        assert_eq!(cfg.install_dir, Some(PathBuf::from("/tmp/x")));
    }
}
