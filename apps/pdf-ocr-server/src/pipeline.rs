//! Fetch → OCR → derive orchestration
//!
//! Every operation first drives the URL's artifacts to `OcrReady`:
//!
//! ```text
//! NoArtifacts --fetch--> RawCached --ocr--> OcrReady
//! ```
//!
//! The cache is consulted right before each step, so a URL is fetched and
//! OCR'd at most once per cache lifetime. Once the `ocr` artifact exists,
//! text extraction and rendering only read it.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::{ArtifactKind, ArtifactState, CacheKey, CacheStore};
use crate::config::OcrConfig;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::ocr::{OcrEngine, OcrOptions, OcrOutcome};
use crate::render::{self, DocumentRenderer, Dpi, PageNumber};

/// Text of one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageText {
    pub page: PageNumber,
    pub text: String,
}

/// Text of a whole document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextExtraction {
    pub url: String,
    pub page_count: usize,
    pub pages: Vec<PageText>,
}

/// Orchestrates fetching, OCR and rendering over the artifact cache
#[derive(Clone)]
pub struct OcrPipeline {
    inner: Arc<OcrPipelineInner>,
}

struct OcrPipelineInner {
    cache: CacheStore,
    fetcher: Arc<dyn Fetcher>,
    engine: Arc<dyn OcrEngine>,
    renderer: Arc<dyn DocumentRenderer>,
    ocr_config: OcrConfig,
}

impl OcrPipeline {
    pub fn new(
        cache: CacheStore,
        fetcher: Arc<dyn Fetcher>,
        engine: Arc<dyn OcrEngine>,
        renderer: Arc<dyn DocumentRenderer>,
        ocr_config: OcrConfig,
    ) -> Self {
        Self {
            inner: Arc::new(OcrPipelineInner {
                cache,
                fetcher,
                engine,
                renderer,
                ocr_config,
            }),
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.inner.cache
    }

    /// Drive `url` to `OcrReady` and return the searchable PDF's path
    pub async fn ensure_ocr(&self, url: &str) -> Result<PathBuf> {
        let key = CacheKey::from_url(url);
        let cache = &self.inner.cache;

        match cache.state(&key).await {
            ArtifactState::OcrReady => {
                tracing::debug!(key = %key, "OCR artifact cached");
                return Ok(cache.path(&key, ArtifactKind::Ocr));
            }
            ArtifactState::NoArtifacts => self.fetch_raw(url, &key).await?,
            ArtifactState::RawCached => {
                tracing::debug!(key = %key, "Raw artifact cached, OCR pending");
            }
        }

        self.run_ocr(&key).await
    }

    async fn fetch_raw(&self, url: &str, key: &CacheKey) -> Result<()> {
        tracing::info!(key = %key, url = %url, "Fetching source PDF");
        let data = self.inner.fetcher.fetch(url).await?;
        self.inner
            .cache
            .write(key, ArtifactKind::Raw, &data)
            .await?;
        tracing::info!(key = %key, bytes = data.len(), "Raw artifact stored");
        Ok(())
    }

    async fn run_ocr(&self, key: &CacheKey) -> Result<PathBuf> {
        let cache = &self.inner.cache;
        let input = cache.path(key, ArtifactKind::Raw);
        let staged = cache.staging_path(key, ArtifactKind::Ocr);
        let options = OcrOptions::from_config(&self.inner.ocr_config);

        tracing::info!(key = %key, language = %options.language, "Running OCR");
        let outcome = match self.inner.engine.run(&input, &staged, &options).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let _ = tokio::fs::remove_file(&staged).await;
                return Err(e.into());
            }
        };

        let path = match outcome {
            OcrOutcome::Success => cache.publish(&staged, key, ArtifactKind::Ocr).await?,
            OcrOutcome::AlreadyHasText => {
                let _ = tokio::fs::remove_file(&staged).await;
                cache.copy(key, ArtifactKind::Raw, ArtifactKind::Ocr).await?
            }
        };

        tracing::info!(key = %key, outcome = ?outcome, "OCR artifact stored");
        Ok(path)
    }

    /// The searchable PDF, byte for byte as cached
    pub async fn ocr_pdf(&self, url: &str) -> Result<Vec<u8>> {
        self.ensure_ocr(url).await?;
        let key = CacheKey::from_url(url);
        Ok(self.inner.cache.read(&key, ArtifactKind::Ocr).await?)
    }

    /// Trimmed text of every page
    pub async fn extract_text(&self, url: &str) -> Result<TextExtraction> {
        let path = self.ensure_ocr(url).await?;

        let pages = render::with_document(self.inner.renderer.clone(), path, |doc| {
            let mut pages = Vec::with_capacity(doc.page_count());
            for page in PageNumber::all(doc.page_count()) {
                pages.push(PageText {
                    page,
                    text: doc.page_text(page)?,
                });
            }
            Ok(pages)
        })
        .await?;

        Ok(TextExtraction {
            url: url.to_string(),
            page_count: pages.len(),
            pages,
        })
    }

    /// One page as PNG
    pub async fn render_page(&self, url: &str, page: PageNumber, dpi: Dpi) -> Result<Vec<u8>> {
        let path = self.ensure_ocr(url).await?;

        let png = render::with_document(self.inner.renderer.clone(), path, move |doc| {
            doc.ensure_page(page)?;
            doc.rasterize(page, dpi)
        })
        .await?;

        tracing::debug!(page = %page, dpi = %dpi, bytes = png.len(), "Rendered page");
        Ok(png)
    }

    /// Low-resolution page image at 72 dpi
    pub async fn render_thumbnail(&self, url: &str, page: PageNumber) -> Result<Vec<u8>> {
        self.render_page(url, page, Dpi::THUMBNAIL).await
    }
}
