//! OCR Types

use crate::config::{self, OcrConfig};

/// Options passed to the OCR engine for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOptions {
    /// Straighten rotated scans before recognition
    pub deskew: bool,
    /// Leave pages that already carry text untouched
    pub skip_text: bool,
    /// Output optimization level (0-3)
    pub optimize: u8,
    /// Tesseract language code(s), e.g. "eng" or "eng+deu"
    pub language: String,
}

impl OcrOptions {
    /// Fixed pipeline options; the language is read from the environment
    /// every time this is called.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            deskew: true,
            skip_text: true,
            optimize: config.optimize,
            language: config::ocr_language(),
        }
    }
}

/// Result of a successful engine run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrOutcome {
    /// The engine wrote a searchable PDF to the output path
    Success,
    /// The input already carries a text layer; nothing was written and the
    /// input should be used as-is
    AlreadyHasText,
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("Invalid OCR language code: {0}")]
    InvalidLanguage(String),

    #[error("{0}")]
    Failed(String),
}
