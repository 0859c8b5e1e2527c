//! Shared fakes and fixtures for pipeline and route tests
//!
//! The fake renderer understands a tiny line-based document format:
//!
//! ```text
//! %FAKEPDF
//! page:<text of page 1>
//! page:<text of page 2>
//! ```
//!
//! A scanned page is a `page:` line with no text. The fake OCR engine fills
//! those in, mimicking ocrmypdf adding a text layer.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use pdf_ocr_server::cache::CacheStore;
use pdf_ocr_server::config::OcrConfig;
use pdf_ocr_server::fetch::{FetchError, Fetcher};
use pdf_ocr_server::ocr::{OcrEngine, OcrError, OcrOptions, OcrOutcome};
use pdf_ocr_server::pipeline::OcrPipeline;
use pdf_ocr_server::render::{DocumentHandle, DocumentRenderer, Dpi, PageNumber, RenderError};
use pdf_ocr_server::state::AppState;

pub const SCANNED_URL: &str = "https://docs.example.com/scanned.pdf";
pub const TEXT_URL: &str = "https://docs.example.com/text.pdf";
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/unreachable.pdf";

const MAGIC: &str = "%FAKEPDF";
const PAGE_PREFIX: &str = "page:";

/// Build a fake document with one `page:` line per entry
pub fn fake_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = format!("{}\n", MAGIC);
    for page in pages {
        doc.push_str(PAGE_PREFIX);
        doc.push_str(page);
        doc.push('\n');
    }
    doc.into_bytes()
}

fn parse_fake_pdf(data: &[u8]) -> Option<Vec<String>> {
    let text = std::str::from_utf8(data).ok()?;
    let mut lines = text.lines();
    if lines.next()? != MAGIC {
        return None;
    }
    Some(
        lines
            .filter_map(|line| line.strip_prefix(PAGE_PREFIX))
            .map(str::to_string)
            .collect(),
    )
}

// ============================================================================
// Fetcher
// ============================================================================

/// Serves canned bodies; unknown URLs behave like a refused connection
#[derive(Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_body(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Transport(format!("error sending request for url ({}): connection refused", url)))
    }
}

// ============================================================================
// OCR engine
// ============================================================================

#[derive(Debug, Clone)]
pub enum OcrMode {
    /// Report prior text when any page has text, otherwise transcribe
    Auto,
    /// Always report prior text
    PriorText,
    /// Always fail with this reason
    Fail(String),
}

pub struct FakeOcrEngine {
    mode: OcrMode,
    calls: AtomicUsize,
    last_options: Mutex<Option<OcrOptions>>,
}

impl FakeOcrEngine {
    pub fn new(mode: OcrMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<OcrOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrEngine for FakeOcrEngine {
    async fn run(
        &self,
        input: &Path,
        output: &Path,
        options: &OcrOptions,
    ) -> Result<OcrOutcome, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(options.clone());

        match &self.mode {
            OcrMode::Fail(reason) => return Err(OcrError::Failed(reason.clone())),
            OcrMode::PriorText => return Ok(OcrOutcome::AlreadyHasText),
            OcrMode::Auto => {}
        }

        let data = tokio::fs::read(input)
            .await
            .map_err(|e| OcrError::Failed(e.to_string()))?;
        let pages = parse_fake_pdf(&data)
            .ok_or_else(|| OcrError::Failed("input is not a PDF".to_string()))?;

        if pages.iter().any(|page| !page.trim().is_empty()) {
            return Ok(OcrOutcome::AlreadyHasText);
        }

        let recognized: Vec<String> = (1..=pages.len())
            .map(|n| format!("  recognized text {}  ", n))
            .collect();
        let recognized: Vec<&str> = recognized.iter().map(String::as_str).collect();
        tokio::fs::write(output, fake_pdf(&recognized))
            .await
            .map_err(|e| OcrError::Failed(e.to_string()))?;

        Ok(OcrOutcome::Success)
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Tracks how many handles were opened and how many are still open
#[derive(Default)]
pub struct FakeRenderer {
    opened: Arc<AtomicUsize>,
    open_now: Arc<AtomicUsize>,
}

impl FakeRenderer {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn open_now(&self) -> usize {
        self.open_now.load(Ordering::SeqCst)
    }
}

impl DocumentRenderer for FakeRenderer {
    fn open(&self, path: &Path) -> Result<Box<dyn DocumentHandle>, RenderError> {
        let data = std::fs::read(path).map_err(|e| RenderError::Open(e.to_string()))?;
        let pages = parse_fake_pdf(&data)
            .ok_or_else(|| RenderError::Open("not a PDF document".to_string()))?;

        self.opened.fetch_add(1, Ordering::SeqCst);
        self.open_now.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeDocument {
            pages,
            open_now: self.open_now.clone(),
        }))
    }
}

struct FakeDocument {
    pages: Vec<String>,
    open_now: Arc<AtomicUsize>,
}

impl Drop for FakeDocument {
    fn drop(&mut self) {
        self.open_now.fetch_sub(1, Ordering::SeqCst);
    }
}

impl DocumentHandle for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, page: PageNumber) -> Result<String, RenderError> {
        self.ensure_page(page)?;
        Ok(self.pages[page.index()].trim().to_string())
    }

    fn rasterize(&self, page: PageNumber, dpi: Dpi) -> Result<Vec<u8>, RenderError> {
        self.ensure_page(page)?;
        Ok(format!("\u{89}PNG page={} dpi={}", page, dpi).into_bytes())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub dir: TempDir,
    pub pipeline: OcrPipeline,
    pub fetcher: Arc<FakeFetcher>,
    pub engine: Arc<FakeOcrEngine>,
    pub renderer: Arc<FakeRenderer>,
}

impl Harness {
    /// Scanned and text documents on their URLs, OCR in `mode`
    pub fn new(mode: OcrMode) -> Self {
        let fetcher = FakeFetcher::default()
            .with_body(SCANNED_URL, fake_pdf(&["", ""]))
            .with_body(TEXT_URL, fake_pdf(&["Already searchable", "Second page"]));
        Self::with_fetcher(fetcher, mode)
    }

    pub fn with_fetcher(fetcher: FakeFetcher, mode: OcrMode) -> Self {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::persistent(dir.path()).unwrap();

        let fetcher = Arc::new(fetcher);
        let engine = Arc::new(FakeOcrEngine::new(mode));
        let renderer = Arc::new(FakeRenderer::default());

        let pipeline = OcrPipeline::new(
            cache,
            fetcher.clone(),
            engine.clone(),
            renderer.clone(),
            OcrConfig::default(),
        );

        Self {
            dir,
            pipeline,
            fetcher,
            engine,
            renderer,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.pipeline.clone(), true)
    }
}
