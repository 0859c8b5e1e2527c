//! Error types for the PDF OCR server

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::cache::CacheError;
use crate::fetch::FetchError;
use crate::ocr::OcrError;
use crate::render::RenderError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to download PDF: {0}")]
    FetchFailed(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Page {requested} not found (PDF has {available} pages)")]
    PageNotFound { requested: usize, available: usize },

    #[error("Cache storage error: {0}")]
    StorageFailed(String),

    #[error("Failed to render PDF: {0}")]
    RenderFailed(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::FetchFailed(_) | Self::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Self::PageNotFound { .. } => StatusCode::NOT_FOUND,
            Self::OcrFailed(_) | Self::StorageFailed(_) | Self::RenderFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchFailed(_) => "fetch_failed",
            Self::OcrFailed(_) => "ocr_failed",
            Self::PageNotFound { .. } => "page_not_found",
            Self::StorageFailed(_) => "storage_failed",
            Self::RenderFailed(_) => "render_failed",
            Self::InvalidParameter(_) => "invalid_parameter",
        }
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::FetchFailed(e.to_string())
    }
}

impl From<OcrError> for AppError {
    fn from(e: OcrError) -> Self {
        AppError::OcrFailed(e.to_string())
    }
}

impl From<CacheError> for AppError {
    fn from(e: CacheError) -> Self {
        AppError::StorageFailed(e.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::PageNotFound {
                requested,
                available,
            } => AppError::PageNotFound {
                requested,
                available,
            },
            other => AppError::RenderFailed(other.to_string()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidParameter(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "{}", self);
        } else {
            tracing::debug!(kind = self.kind(), "{}", self);
        }

        let body = Json(ErrorResponse {
            error: self.kind(),
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}
