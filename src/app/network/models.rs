//! Wire shapes for the two release indexes (spec §3/§6): ziglang.org's
//! `index.json` and machengine.org's Mach-nominated counterpart share the
//! same schema, so one set of types serves both.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A single `<os>-<arch>` artifact entry inside a release.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkArtifact {
    pub tarball: String,
    #[serde(default)]
    pub shasum: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_str_to_u64")]
    pub size: Option<u64>,
}

fn deserialize_opt_str_to_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    s.map(|s| s.parse::<u64>().map_err(de::Error::custom))
        .transpose()
}

/// One version's worth of release data: a date, an optional concrete
/// version (present on `master`), and per-platform artifacts.
///
/// Deserialized with a custom visitor because the real documents interleave
/// metadata fields (`docs`, `notes`, `bootstrap`, ...) with platform keys at
/// the same level — those are skipped rather than rejected.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkRelease {
    pub date: String,
    pub version: Option<String>,
    pub targets: HashMap<String, NetworkArtifact>,
}

const SKIPPED_FIELDS: &[&str] = &["docs", "stdDocs", "langRef", "notes", "bootstrap", "src"];

impl<'de> Deserialize<'de> for NetworkRelease {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ReleaseVisitor;

        impl<'de> Visitor<'de> for ReleaseVisitor {
            type Value = NetworkRelease;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a release object")
            }

            fn visit_map<V>(self, mut map: V) -> Result<NetworkRelease, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut date = None;
                let mut version = None;
                let mut targets = HashMap::new();

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "date" => date = Some(map.next_value()?),
                        "version" => version = Some(map.next_value()?),
                        k if SKIPPED_FIELDS.contains(&k) => {
                            let _: serde_json::Value = map.next_value()?;
                        }
                        _ => {
                            // Read as a generic value first: a failed
                            // `next_value::<NetworkArtifact>()` would leave
                            // this MapAccess mid-value, corrupting the rest
                            // of the parse. Decoding into `Value` always
                            // succeeds, so the artifact conversion below can
                            // fail freely without losing our place.
                            let raw: serde_json::Value = map.next_value()?;
                            if let Ok(artifact) = serde_json::from_value::<NetworkArtifact>(raw) {
                                targets.insert(key, artifact);
                            }
                        }
                    }
                }

                let date = date.ok_or_else(|| de::Error::missing_field("date"))?;
                Ok(NetworkRelease { date, version, targets })
            }
        }

        deserializer.deserialize_map(ReleaseVisitor)
    }
}

/// Raw document shape: a flat map of version-key (`"0.13.0"`, `"master"`) to
/// release data, exactly as published at the remote endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexDocument {
    #[serde(flatten)]
    pub releases: HashMap<String, NetworkRelease>,
}

/// A fully resolved reference to one downloadable toolchain: the install id
/// it resolves to, the artifact URL, and (if known) its release date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub id: String,
    pub url: String,
    pub date: Option<String>,
}

/// On-disk cache wrapper: the document plus when it was fetched, purely for
/// logging a corrupt-cache's age — not part of IndexStore's policy logic.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheEnvelope {
    pub fetched_at: DateTime<Utc>,
    pub document: IndexDocument,
}
