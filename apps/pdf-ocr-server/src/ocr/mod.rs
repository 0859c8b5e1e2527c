//! OCR Module
//!
//! Adds a searchable text layer to scanned PDFs by running ocrmypdf with a
//! fixed set of options (deskew, skip pages that already have text,
//! optimization level, language).
//!
//! A PDF that already carries text is not an error: the engine reports
//! [`OcrOutcome::AlreadyHasText`] and the caller keeps the original bytes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pdf_ocr_server::ocr::{OcrEngine, OcrOptions, OcrOutcome, OcrmypdfEngine};
//!
//! let engine = OcrmypdfEngine::new(config.ocr.clone());
//! let options = OcrOptions::from_config(&config.ocr);
//!
//! match engine.run(&raw_path, &output_path, &options).await? {
//!     OcrOutcome::Success => { /* output_path holds the searchable PDF */ }
//!     OcrOutcome::AlreadyHasText => { /* reuse raw_path as-is */ }
//! }
//! ```

mod injector;
mod types;

pub use injector::{OcrEngine, OcrmypdfEngine};
pub use types::{OcrError, OcrOptions, OcrOutcome};
