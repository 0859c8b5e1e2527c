//! PDF endpoints
//!
//! Every endpoint takes the source document as a `url` query parameter:
//! - `/ocr`: the searchable PDF
//! - `/text`: per-page text as JSON
//! - `/page-image`: one page as PNG at a chosen resolution
//! - `/thumbnail`: one page as a 72 dpi PNG

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::pipeline::TextExtraction;
use crate::render::{Dpi, PageNumber};
use crate::routes::query::ApiQuery;
use crate::state::AppState;

/// Suggested download name for the searchable PDF
const OCR_FILENAME: &str = "ocr-result.pdf";

/// Query parameters naming only the source document
#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    /// URL of the PDF
    pub url: String,
}

/// Query parameters for page rendering
#[derive(Debug, Deserialize)]
pub struct PageImageQuery {
    /// URL of the PDF
    pub url: String,
    /// Page number (1-based, default: 1)
    #[serde(default = "default_page")]
    pub page: usize,
    /// Resolution (72-600, default: 200)
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

/// Query parameters for thumbnails
#[derive(Debug, Deserialize)]
pub struct ThumbnailQuery {
    /// URL of the PDF
    pub url: String,
    /// Page number (1-based, default: 1)
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    PageNumber::FIRST.get()
}

fn default_dpi() -> u32 {
    Dpi::DEFAULT.get()
}

fn parse_page(page: usize) -> Result<PageNumber> {
    PageNumber::new(page)
        .ok_or_else(|| AppError::InvalidParameter(format!("page must be at least 1, got {}", page)))
}

fn parse_dpi(dpi: u32) -> Result<Dpi> {
    Dpi::new(dpi).ok_or_else(|| {
        AppError::InvalidParameter(format!(
            "dpi must be between {} and {}, got {}",
            Dpi::MIN,
            Dpi::MAX,
            dpi
        ))
    })
}

fn png_response(data: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "max-age=3600"),
        ],
        data,
    )
        .into_response()
}

/// Create the PDF router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ocr", get(ocr_pdf))
        .route("/text", get(extract_text))
        .route("/page-image", get(page_image))
        .route("/thumbnail", get(thumbnail))
}

/// Download, OCR if needed, and return the searchable PDF
async fn ocr_pdf(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UrlQuery>,
) -> Result<Response> {
    let data = state.pipeline().ocr_pdf(&query.url).await?;

    let disposition = format!("attachment; filename=\"{}\"", OCR_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// OCR if needed, then return the text of each page
async fn extract_text(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UrlQuery>,
) -> Result<Json<TextExtraction>> {
    let extraction = state.pipeline().extract_text(&query.url).await?;
    Ok(Json(extraction))
}

/// Render a single page of the searchable PDF as PNG
async fn page_image(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageImageQuery>,
) -> Result<Response> {
    // Validate before any fetch or render work
    let page = parse_page(query.page)?;
    let dpi = parse_dpi(query.dpi)?;

    let data = state.pipeline().render_page(&query.url, page, dpi).await?;
    Ok(png_response(data))
}

/// Low-resolution (72 dpi) image of a page
async fn thumbnail(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ThumbnailQuery>,
) -> Result<Response> {
    let page = parse_page(query.page)?;

    let data = state.pipeline().render_thumbnail(&query.url, page).await?;
    Ok(png_response(data))
}
