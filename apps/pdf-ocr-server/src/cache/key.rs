//! Cache keys and artifact kinds

use std::fmt;

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the URL digest
const KEY_LEN: usize = 16;

/// Deterministic key derived from a source URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Truncated SHA-256 of the URL string
    pub fn from_url(url: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(KEY_LEN);
        Self(digest)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of artifact stored under a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Bytes exactly as fetched
    Raw,
    /// Searchable PDF, safe to serve or render
    Ocr,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Ocr => "ocr",
        }
    }

    /// File name for this artifact under `key`
    pub fn file_name(&self, key: &CacheKey) -> String {
        format!("{}_{}.pdf", key, self.as_str())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
