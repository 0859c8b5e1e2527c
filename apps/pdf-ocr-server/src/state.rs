//! Application state management

use std::sync::Arc;

use crate::pipeline::OcrPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pipeline: OcrPipeline,
    /// Result of the startup probe for the OCR engine
    ocr_engine_available: bool,
}

impl AppState {
    pub fn new(pipeline: OcrPipeline, ocr_engine_available: bool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pipeline,
                ocr_engine_available,
            }),
        }
    }

    /// Get the OCR pipeline
    pub fn pipeline(&self) -> &OcrPipeline {
        &self.inner.pipeline
    }

    pub fn ocr_engine_available(&self) -> bool {
        self.inner.ocr_engine_available
    }
}
