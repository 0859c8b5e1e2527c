//! PDF OCR Server Library
//!
//! Fetches a remote PDF, makes sure it carries a searchable text layer, and
//! serves the derived artifacts. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `cache`: content-addressed artifact store keyed by source URL
//! - `fetch`: remote PDF download
//! - `ocr`: ocrmypdf text-layer injection
//! - `render`: page text and PNG rendering via MuPDF
//! - `pipeline`: fetch → OCR → derive orchestration
//! - `routes`: HTTP handlers

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ocr;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Full application router with tracing and CORS layers
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
