//! Configuration management for the PDF OCR server

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Environment variable holding the OCR language, read on every OCR run
pub const OCR_LANGUAGE_VAR: &str = "OCR_LANGUAGE";

/// Language used when `OCR_LANGUAGE` is unset
pub const DEFAULT_OCR_LANGUAGE: &str = "eng";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Persistent cache directory. `None` means a temporary directory
    /// that is removed when the process exits.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Path to ocrmypdf executable
    pub ocrmypdf_path: String,
    /// Optimization level: 0 (fastest, largest) to 3 (slowest, smallest)
    pub optimize: u8,
    /// Number of parallel ocrmypdf jobs (ocrmypdf picks when unset)
    pub jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            cache: CacheConfig::default(),
            fetch: FetchConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            max_redirects: 10,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            ocrmypdf_path: "ocrmypdf".to_string(),
            optimize: 2,
            jobs: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let optimize: u8 = parse_var("OCR_OPTIMIZE")?.unwrap_or(defaults.ocr.optimize);
        if optimize > 3 {
            return Err(ConfigError::InvalidValue {
                var: "OCR_OPTIMIZE",
                value: optimize.to_string(),
                reason: "must be between 0 and 3".to_string(),
            });
        }

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT")?.unwrap_or(defaults.server.port),
            },
            cache: CacheConfig {
                dir: env::var("CACHE_DIR")
                    .ok()
                    .filter(|dir| !dir.trim().is_empty())
                    .map(PathBuf::from),
            },
            fetch: FetchConfig {
                timeout: parse_var("FETCH_TIMEOUT_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.fetch.timeout),
                max_redirects: parse_var("FETCH_MAX_REDIRECTS")?
                    .unwrap_or(defaults.fetch.max_redirects),
            },
            ocr: OcrConfig {
                ocrmypdf_path: env::var("OCRMYPDF_PATH").unwrap_or(defaults.ocr.ocrmypdf_path),
                optimize,
                jobs: parse_var("OCR_JOBS")?,
            },
        })
    }
}

/// Read the OCR language at call time, falling back to `eng`
pub fn ocr_language() -> String {
    env::var(OCR_LANGUAGE_VAR)
        .ok()
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .unwrap_or_else(|| DEFAULT_OCR_LANGUAGE.to_string())
}

fn parse_var<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                var,
                value,
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
