//! Route modules for the PDF OCR server

pub mod health;
pub mod pdf;
pub mod query;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Service status and the list of available operations
pub async fn index() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "endpoints": {
            "/ocr?url=": "Returns searchable PDF",
            "/text?url=": "Returns JSON with per-page text",
            "/page-image?url=&page=1&dpi=200": "Returns a page as PNG",
            "/thumbnail?url=&page=1": "Returns a low-res page thumbnail",
        },
    }))
}

/// All routes, without state or middleware layers
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .merge(pdf::router())
        .merge(health::router())
}
