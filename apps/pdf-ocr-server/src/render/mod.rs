//! Page rendering
//!
//! Opens a searchable PDF and derives read-only outputs from it: page count,
//! per-page text and PNG rasters.
//!
//! # Handle lifetime
//!
//! A [`DocumentHandle`] is owned by exactly one operation and closed when it
//! is dropped. [`with_document`] opens the handle on a blocking thread, runs
//! the operation and drops the handle before returning, on the error path
//! as well as on success.

mod mupdf_backend;
mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use mupdf_backend::{MupdfDocument, MupdfRenderer};
pub use types::{Dpi, PageNumber};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Page {requested} not found (PDF has {available} pages)")]
    PageNotFound { requested: usize, available: usize },

    #[error("Failed to open document: {0}")]
    Open(String),

    #[error("Failed to render page: {0}")]
    Render(String),

    #[error("Image encoding error: {0}")]
    Image(String),

    #[error("Render task failed: {0}")]
    Task(String),
}

/// Opens documents for rendering
pub trait DocumentRenderer: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, RenderError>;
}

/// An opened document; released on drop
pub trait DocumentHandle {
    fn page_count(&self) -> usize;

    /// Plain text of one page, trimmed
    fn page_text(&self, page: PageNumber) -> Result<String, RenderError>;

    /// PNG image of one page
    fn rasterize(&self, page: PageNumber, dpi: Dpi) -> Result<Vec<u8>, RenderError>;

    fn ensure_page(&self, page: PageNumber) -> Result<(), RenderError> {
        let available = self.page_count();
        if page.get() > available {
            return Err(RenderError::PageNotFound {
                requested: page.get(),
                available,
            });
        }
        Ok(())
    }
}

/// Open `path`, run `f` against the handle on the blocking pool, close it
pub async fn with_document<F, R>(
    renderer: Arc<dyn DocumentRenderer>,
    path: PathBuf,
    f: F,
) -> Result<R, RenderError>
where
    F: FnOnce(&dyn DocumentHandle) -> Result<R, RenderError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let handle = renderer.open(&path)?;
        let result = f(&*handle);
        drop(handle);
        result
    })
    .await
    .map_err(|e| RenderError::Task(e.to_string()))?
}
