//! OCR Text Layer Injector
//!
//! Embeds OCR text layers into PDF files using ocrmypdf.
//! The resulting PDF becomes searchable and has copy-able text.
//!
//! ## Requirements
//!
//! - `ocrmypdf` must be installed and available in PATH (or `OCRMYPDF_PATH`)
//! - Tesseract must be installed (used by ocrmypdf), with the language data
//!   for every language requested

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::types::{OcrError, OcrOptions, OcrOutcome};
use crate::config::OcrConfig;

/// ocrmypdf exit status for `PriorOcrFoundError`
const EXIT_ALREADY_DONE_OCR: i32 = 6;

/// Exception name ocrmypdf prints when a page already has text
const PRIOR_OCR_MARKER: &str = "PriorOcrFoundError";

/// Runs an OCR pass from an input PDF file to an output PDF file
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn run(
        &self,
        input: &Path,
        output: &Path,
        options: &OcrOptions,
    ) -> Result<OcrOutcome, OcrError>;
}

/// OCR engine backed by the ocrmypdf command line tool
pub struct OcrmypdfEngine {
    config: OcrConfig,
}

impl OcrmypdfEngine {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Validate language code to prevent argument injection
    fn validate_language(lang: &str) -> Result<(), OcrError> {
        // Language codes should be alphanumeric with optional underscore/plus (e.g., "eng", "eng+deu", "chi_sim")
        if lang.is_empty() || lang.len() > 20 {
            return Err(OcrError::InvalidLanguage(format!(
                "{:?} has invalid length",
                lang
            )));
        }
        if let Some(c) = lang
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '+' && *c != '_')
        {
            return Err(OcrError::InvalidLanguage(format!(
                "{:?} contains {:?}",
                lang, c
            )));
        }
        Ok(())
    }

    /// Command line arguments for one run, in invocation order
    fn build_args(&self, input: &Path, output: &Path, options: &OcrOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        args.push("-l".into());
        args.push(options.language.clone().into());

        if options.deskew {
            args.push("--deskew".into());
        }

        // Skip text - don't OCR pages that already have text
        if options.skip_text {
            args.push("--skip-text".into());
        }

        args.push("--optimize".into());
        args.push(options.optimize.to_string().into());

        if let Some(jobs) = self.config.jobs {
            args.push("-j".into());
            args.push(jobs.to_string().into());
        }

        args.push("-q".into());
        args.push(input.as_os_str().to_owned());
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Get ocrmypdf version
    pub async fn version(&self) -> Result<String, OcrError> {
        let output = Command::new(&self.config.ocrmypdf_path)
            .arg("--version")
            .output()
            .await
            .map_err(|e| OcrError::EngineNotAvailable(format!("Failed to run ocrmypdf: {}", e)))?;

        if !output.status.success() {
            return Err(OcrError::EngineNotAvailable(
                "ocrmypdf not available".to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Sort a failed ocrmypdf exit into "already has text" or a real failure
fn classify_failure(code: Option<i32>, stderr: &str) -> Result<OcrOutcome, OcrError> {
    if code == Some(EXIT_ALREADY_DONE_OCR) || stderr.contains(PRIOR_OCR_MARKER) {
        return Ok(OcrOutcome::AlreadyHasText);
    }

    let stderr = stderr.trim();
    let reason = match code {
        Some(code) if stderr.is_empty() => format!("ocrmypdf exited with status {}", code),
        Some(code) => format!("ocrmypdf exited with status {}: {}", code, stderr),
        None => format!("ocrmypdf terminated by signal: {}", stderr),
    };
    Err(OcrError::Failed(reason))
}

#[async_trait]
impl OcrEngine for OcrmypdfEngine {
    async fn run(
        &self,
        input: &Path,
        output: &Path,
        options: &OcrOptions,
    ) -> Result<OcrOutcome, OcrError> {
        Self::validate_language(&options.language)?;

        let start_time = std::time::Instant::now();
        let result = Command::new(&self.config.ocrmypdf_path)
            .args(self.build_args(input, output, options))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| OcrError::Failed(format!("Failed to run ocrmypdf: {}", e)))?;

        let outcome = if result.status.success() {
            OcrOutcome::Success
        } else {
            let stderr = String::from_utf8_lossy(&result.stderr);
            // ocrmypdf may leave a partial output behind on failure
            let _ = tokio::fs::remove_file(output).await;
            classify_failure(result.status.code(), &stderr)?
        };

        tracing::debug!(
            input = %input.display(),
            outcome = ?outcome,
            elapsed_secs = start_time.elapsed().as_secs_f64(),
            "ocrmypdf finished"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn options(language: &str) -> OcrOptions {
        OcrOptions {
            deskew: true,
            skip_text: true,
            optimize: 2,
            language: language.to_string(),
        }
    }

    fn args_as_strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_build_args_fixed_options() {
        let engine = OcrmypdfEngine::new(OcrConfig::default());
        let args = args_as_strings(engine.build_args(
            &PathBuf::from("/cache/in.pdf"),
            &PathBuf::from("/cache/out.pdf"),
            &options("eng"),
        ));

        assert_eq!(
            args,
            vec![
                "-l",
                "eng",
                "--deskew",
                "--skip-text",
                "--optimize",
                "2",
                "-q",
                "/cache/in.pdf",
                "/cache/out.pdf",
            ]
        );
    }

    #[test]
    fn test_build_args_with_jobs() {
        let engine = OcrmypdfEngine::new(OcrConfig {
            jobs: Some(4),
            ..OcrConfig::default()
        });
        let args = args_as_strings(engine.build_args(
            &PathBuf::from("in.pdf"),
            &PathBuf::from("out.pdf"),
            &options("eng+deu"),
        ));

        let jobs_at = args.iter().position(|a| a == "-j").unwrap();
        assert_eq!(args[jobs_at + 1], "4");
        assert_eq!(args[1], "eng+deu");
    }

    #[test]
    fn test_validate_language() {
        assert!(OcrmypdfEngine::validate_language("eng").is_ok());
        assert!(OcrmypdfEngine::validate_language("eng+deu").is_ok());
        assert!(OcrmypdfEngine::validate_language("chi_sim").is_ok());

        assert!(OcrmypdfEngine::validate_language("").is_err());
        assert!(OcrmypdfEngine::validate_language("eng --force-ocr").is_err());
        assert!(OcrmypdfEngine::validate_language("-q").is_err());
        assert!(OcrmypdfEngine::validate_language(&"a".repeat(21)).is_err());
    }

    #[test]
    fn test_prior_ocr_exit_code_is_not_an_error() {
        let outcome = classify_failure(Some(6), "").unwrap();
        assert_eq!(outcome, OcrOutcome::AlreadyHasText);
    }

    #[test]
    fn test_prior_ocr_stderr_is_not_an_error() {
        let outcome = classify_failure(
            Some(1),
            "ocrmypdf.exceptions.PriorOcrFoundError: page already has text!",
        )
        .unwrap();
        assert_eq!(outcome, OcrOutcome::AlreadyHasText);
    }

    #[test]
    fn test_text_phrase_alone_is_still_a_failure() {
        let result = classify_failure(Some(15), "error: page already has text on page 3\n");
        assert!(matches!(result, Err(OcrError::Failed(_))));
    }

    #[test]
    fn test_other_failures_carry_reason() {
        let err = classify_failure(Some(2), "InputFileError: not a PDF\n").unwrap_err();
        match err {
            OcrError::Failed(reason) => {
                assert!(reason.contains("status 2"));
                assert!(reason.contains("not a PDF"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(classify_failure(None, "killed"), Err(OcrError::Failed(_))));
    }

    #[tokio::test]
    async fn test_invalid_language_rejected_before_spawn() {
        let engine = OcrmypdfEngine::new(OcrConfig {
            ocrmypdf_path: "/nonexistent/ocrmypdf".to_string(),
            ..OcrConfig::default()
        });
        let result = engine
            .run(
                &PathBuf::from("in.pdf"),
                &PathBuf::from("out.pdf"),
                &options("eng;rm"),
            )
            .await;
        assert!(matches!(result, Err(OcrError::InvalidLanguage(_))));
    }

    #[tokio::test]
    async fn test_missing_binary_has_no_version() {
        let engine = OcrmypdfEngine::new(OcrConfig {
            ocrmypdf_path: "/nonexistent/ocrmypdf".to_string(),
            ..OcrConfig::default()
        });
        assert!(matches!(
            engine.version().await,
            Err(OcrError::EngineNotAvailable(_))
        ));
    }
}
