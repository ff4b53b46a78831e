//! `VersionResolver` (spec §4.4): maps a [`VersionSpec`] to `{id, url, date}`,
//! lazily and with sticky-error memoization.

use crate::app::constants::ZIG_BASE_DOWNLOAD_URL;
use crate::app::layout::InstallLayout;
use crate::app::network::models::{NetworkRelease, ReleaseRecord};
use crate::app::network::{CachePolicy, IndexKind, IndexStore};
use crate::types::{ResolveError, VersionSpec, host_zig_tokens, zig_archive_basename};

/// Bundles the collaborators a resolution attempt needs: the index cache and
/// the install layout (for the `*-installed` specs). Borrowed for the
/// lifetime of one `resolve` call; `VersionResolver` itself stores nothing
/// beyond the spec and its memoized outcome.
pub struct ResolveContext<'a> {
    pub index: &'a mut IndexStore,
    pub layout: &'a InstallLayout,
}

/// Lazy, memoized resolution of one [`VersionSpec`] into a [`ReleaseRecord`].
///
/// `id()`/`url()`/`date()` all funnel through a single resolution attempt
/// (spec §9, "Lazy resolution with shared error memoization"). `NoDate` is
/// not a sticky failure of the whole resolver — a successful resolution can
/// simply carry no date, in which case `id`/`url` succeed and `date` alone
/// reports [`ResolveError::NoDate`].
pub struct VersionResolver {
    spec: VersionSpec,
    memo: Option<Result<ReleaseRecord, ResolveError>>,
}

impl VersionResolver {
    pub fn new(spec: VersionSpec) -> Self {
        VersionResolver { spec, memo: None }
    }

    pub fn spec(&self) -> &VersionSpec {
        &self.spec
    }

    pub async fn id(&mut self, ctx: &mut ResolveContext<'_>) -> Result<String, ResolveError> {
        self.record(ctx).await.map(|r| r.id.clone())
    }

    pub async fn url(&mut self, ctx: &mut ResolveContext<'_>) -> Result<String, ResolveError> {
        self.record(ctx).await.map(|r| r.url.clone())
    }

    /// Fails with [`ResolveError::NoDate`] when the resolved record has no
    /// date, even though `id`/`url` above treat the same record as a success.
    pub async fn date(&mut self, ctx: &mut ResolveContext<'_>) -> Result<String, ResolveError> {
        let record = self.record(ctx).await?;
        record.date.clone().ok_or(ResolveError::NoDate)
    }

    async fn record(&mut self, ctx: &mut ResolveContext<'_>) -> Result<&ReleaseRecord, ResolveError> {
        if self.memo.is_none() {
            self.memo = Some(resolve(&self.spec, ctx).await);
        }
        self.memo.as_ref().expect("just populated").as_ref().map_err(Clone::clone)
    }
}

async fn resolve(spec: &VersionSpec, ctx: &mut ResolveContext<'_>) -> Result<ReleaseRecord, ResolveError> {
    match spec {
        VersionSpec::Stable => resolve_stable(ctx).await,
        VersionSpec::Master => resolve_keyed(ctx, IndexKind::Zig, CachePolicy::NeverCache, "master").await,
        VersionSpec::MachLatest => {
            resolve_keyed(ctx, IndexKind::Mach, CachePolicy::NeverCache, "mach-latest").await
        }
        VersionSpec::Mach(raw) => resolve_mach(ctx, raw).await,
        VersionSpec::Tagged(version) => resolve_tagged(ctx, &version.to_string()).await,
        VersionSpec::Dev(version) => resolve_dev(version),
        VersionSpec::LatestInstalled => resolve_latest_installed(ctx, false),
        VersionSpec::StableInstalled => resolve_stable_installed(ctx).await,
    }
}

fn index_err(e: crate::types::NetErr) -> ResolveError {
    match e {
        crate::types::NetErr::ParseFailed(err) => ResolveError::InvalidIndexJson(err.to_string()),
        other => ResolveError::InvalidIndexJson(other.to_string()),
    }
}

fn artifact_url(release: &NetworkRelease) -> Result<String, ResolveError> {
    let (os, arch) = host_zig_tokens().map_err(|e| ResolveError::UnsupportedSystem(e.to_string()))?;
    let key = format!("{arch}-{os}");
    release
        .targets
        .get(&key)
        .map(|artifact| artifact.tarball.clone())
        .ok_or_else(|| ResolveError::UnsupportedSystem(format!("no {key} artifact in release index")))
}

async fn resolve_stable(ctx: &mut ResolveContext<'_>) -> Result<ReleaseRecord, ResolveError> {
    let document = ctx
        .index
        .get(IndexKind::Zig, CachePolicy::NeverCache)
        .await
        .map_err(index_err)?;

    let (os, arch) = host_zig_tokens().map_err(|e| ResolveError::UnsupportedSystem(e.to_string()))?;
    let target_key = format!("{arch}-{os}");

    let best = document
        .releases
        .iter()
        .filter_map(|(key, release)| {
            let version = semver::Version::parse(key).ok()?;
            if !version.pre.is_empty() {
                return None;
            }
            release.targets.get(&target_key)?;
            Some((version, key, release))
        })
        .max_by(|(a, ..), (b, ..)| a.cmp(b));

    let (version, _key, release) = best.ok_or_else(|| {
        ResolveError::InvalidVersion("no stable release found in zig index".to_string())
    })?;

    Ok(ReleaseRecord {
        id: format!("zig-{version}"),
        url: release.targets[&target_key].tarball.clone(),
        date: Some(release.date.clone()),
    })
}

async fn resolve_keyed(
    ctx: &mut ResolveContext<'_>,
    kind: IndexKind,
    policy: CachePolicy,
    key: &str,
) -> Result<ReleaseRecord, ResolveError> {
    let document = ctx.index.get(kind, policy).await.map_err(index_err)?;
    let release = document
        .releases
        .get(key)
        .ok_or_else(|| ResolveError::InvalidVersion(key.to_string()))?;

    let version_str = release.version.clone().unwrap_or_else(|| key.to_string());
    let url = artifact_url(release)?;

    Ok(ReleaseRecord {
        id: format!("zig-{version_str}"),
        url,
        date: Some(release.date.clone()),
    })
}

async fn resolve_mach(ctx: &mut ResolveContext<'_>, raw: &str) -> Result<ReleaseRecord, ResolveError> {
    let document = ctx
        .index
        .get(IndexKind::Mach, CachePolicy::TryCache)
        .await
        .map_err(index_err)?;

    if let Some(release) = document.releases.get(raw) {
        let id = match semver::Version::parse(raw) {
            Ok(v) => format!("zig-{v}"),
            Err(_) => format!("zig-{raw}"),
        };
        return Ok(ReleaseRecord { id, url: artifact_url(release)?, date: Some(release.date.clone()) });
    }

    // Miss under try_cache: retry with a forced refetch before giving up.
    let document = ctx.index.refetch(IndexKind::Mach).await.map_err(index_err)?;
    let release = document
        .releases
        .get(raw)
        .ok_or_else(|| ResolveError::InvalidVersion(format!("{raw}-mach")))?;

    let id = match semver::Version::parse(raw) {
        Ok(v) => format!("zig-{v}"),
        Err(_) => format!("zig-{raw}"),
    };
    Ok(ReleaseRecord { id, url: artifact_url(release)?, date: Some(release.date.clone()) })
}

async fn resolve_tagged(ctx: &mut ResolveContext<'_>, key: &str) -> Result<ReleaseRecord, ResolveError> {
    let document = ctx
        .index
        .get(IndexKind::Zig, CachePolicy::TryCache)
        .await
        .map_err(index_err)?;
    if let Some(release) = document.releases.get(key) {
        return Ok(ReleaseRecord {
            id: format!("zig-{key}"),
            url: artifact_url(release)?,
            date: Some(release.date.clone()),
        });
    }

    let document = ctx.index.refetch(IndexKind::Zig).await.map_err(index_err)?;
    let release = document
        .releases
        .get(key)
        .ok_or_else(|| ResolveError::InvalidVersion(key.to_string()))?;

    Ok(ReleaseRecord { id: format!("zig-{key}"), url: artifact_url(release)?, date: Some(release.date.clone()) })
}

/// Semver with a pre-release: no index round-trip, the URL is synthesized
/// from the host-platform template. Always `NoDate` (spec §4.4 table).
fn resolve_dev(version: &semver::Version) -> Result<ReleaseRecord, ResolveError> {
    let (os, arch) = host_zig_tokens().map_err(|e| ResolveError::UnsupportedSystem(e.to_string()))?;
    let basename = zig_archive_basename(os, arch, version);
    let url = format!("{ZIG_BASE_DOWNLOAD_URL}{basename}");
    Ok(ReleaseRecord { id: format!("zig-{version}"), url, date: None })
}

/// Scans `install_dir` for the highest installed version; `stable_only`
/// excludes pre-release directory names.
fn resolve_latest_installed(
    ctx: &ResolveContext<'_>,
    stable_only: bool,
) -> Result<ReleaseRecord, ResolveError> {
    let ids = ctx
        .layout
        .installed_ids()
        .map_err(|e| ResolveError::FailedInstallSearch(e.to_string()))?;

    let best = ids
        .iter()
        .filter_map(|id| {
            let raw = id.strip_prefix("zig-")?;
            let version = semver::Version::parse(raw).ok()?;
            if stable_only && !version.pre.is_empty() {
                return None;
            }
            Some((version, id))
        })
        .max_by(|(a, _), (b, _)| a.cmp(b));

    let (version, id) = best.ok_or(ResolveError::NoInstalledVersions)?;

    let (os, arch) = host_zig_tokens().map_err(|e| ResolveError::UnsupportedSystem(e.to_string()))?;
    let basename = zig_archive_basename(os, arch, &version);
    let url = format!("{ZIG_BASE_DOWNLOAD_URL}{basename}");

    Ok(ReleaseRecord { id: id.clone(), url, date: None })
}

/// `stable-installed`: pick the highest non-prerelease installed version,
/// then look its url/date up in the zig index with `always_cache` so the
/// record is complete (unlike the synthesized-only `latest-installed`).
async fn resolve_stable_installed(ctx: &mut ResolveContext<'_>) -> Result<ReleaseRecord, ResolveError> {
    let installed = resolve_latest_installed(ctx, true)?;
    let version_str = installed.id.strip_prefix("zig-").unwrap_or(&installed.id).to_string();

    let document = ctx
        .index
        .get(IndexKind::Zig, CachePolicy::AlwaysCache)
        .await
        .map_err(index_err)?;

    match document.releases.get(&version_str) {
        Some(release) => Ok(ReleaseRecord {
            id: installed.id,
            url: artifact_url(release)?,
            date: Some(release.date.clone()),
        }),
        None => Ok(installed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_spec_has_no_date() {
        let version = semver::Version::parse("0.13.0-dev.351+abc").unwrap();
        let record = resolve_dev(&version).unwrap();
        assert!(record.date.is_none());
        assert_eq!(record.id, "zig-0.13.0-dev.351+abc");
    }
}
