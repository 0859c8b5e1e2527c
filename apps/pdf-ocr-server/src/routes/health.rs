//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub ocr_engine_available: bool,
    pub cache: Option<CacheStats>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = match state.pipeline().cache().stats().await {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::warn!("Failed to read cache stats: {}", e);
            None
        }
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "pdf-ocr-server",
        ocr_engine_available: state.ocr_engine_available(),
        cache,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
