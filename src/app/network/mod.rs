//! Networking: `Downloader` (spec §4.1) and `IndexStore` (spec §4.2).

mod downloader;
mod index_store;
pub mod models;

pub use downloader::{Downloader, create_client};
pub use index_store::{CachePolicy, IndexKind, IndexStore};
pub use models::{IndexDocument, NetworkArtifact, NetworkRelease, ReleaseRecord};
