//! Parsing and classification of the user-supplied version spec (spec §3).

use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::types::ResolveError;

/// A parsed, classified version spec. Classification alone decides which
/// [`crate::app::resolver::VersionResolver`] resolution rule applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    Stable,
    Master,
    LatestInstalled,
    StableInstalled,
    MachLatest,
    /// A `<raw>-mach` spec; `raw` is kept unparsed since it need not be a
    /// semver (the id falls back to `zig-<raw>` when it isn't).
    Mach(String),
    /// Semver with no pre-release component.
    Tagged(Version),
    /// Semver with a pre-release component (e.g. `0.13.0-dev.351+abc`).
    Dev(Version),
}

impl VersionSpec {
    /// Whether a ZLS build against this spec can drift without a new
    /// `zigup` invocation (master branches, mach builds, dev snapshots) as
    /// opposed to resolving to an immutable tagged release.
    pub fn may_need_zls_rebuild(&self) -> bool {
        !matches!(self, VersionSpec::Stable | VersionSpec::StableInstalled | VersionSpec::Tagged(_))
    }
}

impl FromStr for VersionSpec {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "stable" => return Ok(VersionSpec::Stable),
            "master" => return Ok(VersionSpec::Master),
            "latest-installed" => return Ok(VersionSpec::LatestInstalled),
            "stable-installed" => return Ok(VersionSpec::StableInstalled),
            "mach-latest" => return Ok(VersionSpec::MachLatest),
            _ => {}
        }

        if let Some(rest) = s.strip_suffix("-mach") {
            let rest = rest.strip_prefix("zig-").unwrap_or(rest);
            if rest.is_empty() {
                return Err(ResolveError::InvalidVersion(s.to_string()));
            }
            return Ok(VersionSpec::Mach(rest.to_string()));
        }

        let rest = s.strip_prefix("zig-").unwrap_or(s);
        let version =
            Version::parse(rest).map_err(|_| ResolveError::InvalidVersion(s.to_string()))?;

        if version.pre.is_empty() {
            Ok(VersionSpec::Tagged(version))
        } else {
            Ok(VersionSpec::Dev(version))
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Stable => write!(f, "stable"),
            VersionSpec::Master => write!(f, "master"),
            VersionSpec::LatestInstalled => write!(f, "latest-installed"),
            VersionSpec::StableInstalled => write!(f, "stable-installed"),
            VersionSpec::MachLatest => write!(f, "mach-latest"),
            VersionSpec::Mach(raw) => write!(f, "{raw}-mach"),
            VersionSpec::Tagged(v) | VersionSpec::Dev(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_keywords() {
        assert_eq!("stable".parse::<VersionSpec>().unwrap(), VersionSpec::Stable);
        assert_eq!("master".parse::<VersionSpec>().unwrap(), VersionSpec::Master);
        assert_eq!(
            "latest-installed".parse::<VersionSpec>().unwrap(),
            VersionSpec::LatestInstalled
        );
        assert_eq!(
            "stable-installed".parse::<VersionSpec>().unwrap(),
            VersionSpec::StableInstalled
        );
        assert_eq!(
            "mach-latest".parse::<VersionSpec>().unwrap(),
            VersionSpec::MachLatest
        );
    }

    #[test]
    fn mach_suffix() {
        assert_eq!(
            "0.13.0-mach".parse::<VersionSpec>().unwrap(),
            VersionSpec::Mach("0.13.0".to_string())
        );
        assert_eq!(
            "zig-0.13.0-mach".parse::<VersionSpec>().unwrap(),
            VersionSpec::Mach("0.13.0".to_string())
        );
    }

    #[test]
    fn tagged_vs_dev() {
        let tagged: VersionSpec = "0.13.0".parse().unwrap();
        assert!(matches!(tagged, VersionSpec::Tagged(_)));

        let dev: VersionSpec = "0.13.0-dev.351+abc".parse().unwrap();
        assert!(matches!(dev, VersionSpec::Dev(_)));
    }

    #[test]
    fn zig_prefix_stripped() {
        let v: VersionSpec = "zig-0.13.0".parse().unwrap();
        assert_eq!(v, VersionSpec::Tagged(Version::parse("0.13.0").unwrap()));
    }

    #[test]
    fn invalid_version_rejected() {
        assert!("not-a-version".parse::<VersionSpec>().is_err());
    }
}
