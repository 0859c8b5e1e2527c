//! File-backed artifact store
//!
//! Artifacts live as flat files named `{key}_{kind}.pdf` in a single
//! directory. Every write is staged under a unique scratch name and then
//! renamed into place, so readers only ever see complete files and
//! concurrent writers resolve as last-writer-wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tempfile::TempDir;

use super::key::{ArtifactKind, CacheKey};

const STAGING_SUFFIX: &str = ".tmp";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Artifact {kind} not found for key {key}")]
    NotFound { key: CacheKey, kind: ArtifactKind },

    #[error("Cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How far a key has progressed through fetch and OCR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    NoArtifacts,
    RawCached,
    OcrReady,
}

/// Counts reported by the health endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub artifacts: usize,
    pub bytes: u64,
}

/// Process-wide artifact store
#[derive(Clone)]
pub struct CacheStore {
    inner: Arc<CacheStoreInner>,
}

struct CacheStoreInner {
    root: PathBuf,
    /// Keeps a temporary root alive; dropping it removes the directory
    _temp_dir: Option<TempDir>,
}

impl CacheStore {
    /// Store rooted in a fresh temporary directory, removed on drop
    pub fn temporary() -> Result<Self, CacheError> {
        let temp_dir = tempfile::Builder::new()
            .prefix("pdf-ocr-cache-")
            .tempdir()
            .map_err(|e| CacheError::io(&std::env::temp_dir(), e))?;

        Ok(Self {
            inner: Arc::new(CacheStoreInner {
                root: temp_dir.path().to_path_buf(),
                _temp_dir: Some(temp_dir),
            }),
        })
    }

    /// Store rooted in a persistent directory, created if missing
    pub fn persistent(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| CacheError::io(&root, e))?;

        Ok(Self {
            inner: Arc::new(CacheStoreInner {
                root,
                _temp_dir: None,
            }),
        })
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Final location of an artifact
    pub fn path(&self, key: &CacheKey, kind: ArtifactKind) -> PathBuf {
        self.inner.root.join(kind.file_name(key))
    }

    /// Unique scratch path for an artifact that is still being produced
    pub fn staging_path(&self, key: &CacheKey, kind: ArtifactKind) -> PathBuf {
        self.inner.root.join(format!(
            ".{}.{}{}",
            kind.file_name(key),
            uuid::Uuid::new_v4(),
            STAGING_SUFFIX
        ))
    }

    pub async fn exists(&self, key: &CacheKey, kind: ArtifactKind) -> bool {
        tokio::fs::try_exists(self.path(key, kind))
            .await
            .unwrap_or(false)
    }

    pub async fn state(&self, key: &CacheKey) -> ArtifactState {
        if self.exists(key, ArtifactKind::Ocr).await {
            ArtifactState::OcrReady
        } else if self.exists(key, ArtifactKind::Raw).await {
            ArtifactState::RawCached
        } else {
            ArtifactState::NoArtifacts
        }
    }

    pub async fn read(&self, key: &CacheKey, kind: ArtifactKind) -> Result<Vec<u8>, CacheError> {
        let path = self.path(key, kind);
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CacheError::NotFound {
                    key: key.clone(),
                    kind,
                }
            } else {
                CacheError::io(&path, e)
            }
        })
    }

    pub async fn write(
        &self,
        key: &CacheKey,
        kind: ArtifactKind,
        data: &[u8],
    ) -> Result<PathBuf, CacheError> {
        let staged = self.staging_path(key, kind);
        if let Err(e) = tokio::fs::write(&staged, data).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(CacheError::io(&staged, e));
        }
        self.publish(&staged, key, kind).await
    }

    /// Move a fully written staging file into its final place
    pub async fn publish(
        &self,
        staged: &Path,
        key: &CacheKey,
        kind: ArtifactKind,
    ) -> Result<PathBuf, CacheError> {
        let target = self.path(key, kind);
        if let Err(e) = tokio::fs::rename(staged, &target).await {
            let _ = tokio::fs::remove_file(staged).await;
            return Err(CacheError::io(&target, e));
        }
        Ok(target)
    }

    /// Byte-for-byte copy of one artifact into another kind
    pub async fn copy(
        &self,
        key: &CacheKey,
        from: ArtifactKind,
        to: ArtifactKind,
    ) -> Result<PathBuf, CacheError> {
        let source = self.path(key, from);
        let staged = self.staging_path(key, to);
        if let Err(e) = tokio::fs::copy(&source, &staged).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(if e.kind() == ErrorKind::NotFound {
                CacheError::NotFound {
                    key: key.clone(),
                    kind: from,
                }
            } else {
                CacheError::io(&source, e)
            });
        }
        self.publish(&staged, key, to).await
    }

    /// Count published artifacts and their total size
    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        let root = self.root();
        let mut entries = tokio::fs::read_dir(root)
            .await
            .map_err(|e| CacheError::io(root, e))?;

        let mut stats = CacheStats::default();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::io(root, e))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') || name.ends_with(STAGING_SUFFIX) {
                continue;
            }
            if let Ok(metadata) = entry.metadata().await {
                if metadata.is_file() {
                    stats.artifacts += 1;
                    stats.bytes += metadata.len();
                }
            }
        }

        Ok(stats)
    }
}
