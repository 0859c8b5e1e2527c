//! Artifact cache
//!
//! Maps a source URL to the artifacts derived from it (`raw` fetched bytes
//! and the `ocr` searchable PDF). Keys are content-addressed from the URL, so
//! the same URL always lands on the same files.

mod key;
mod store;

pub use key::{ArtifactKind, CacheKey};
pub use store::{ArtifactState, CacheError, CacheStats, CacheStore};
