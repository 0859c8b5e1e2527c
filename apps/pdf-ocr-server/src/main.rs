//! PDF OCR Server
//!
//! Fetches remote PDFs, adds a searchable text layer with ocrmypdf, and
//! serves the OCR'd PDF, per-page text and page images.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_ocr_server::cache::CacheStore;
use pdf_ocr_server::config::Config;
use pdf_ocr_server::fetch::HttpFetcher;
use pdf_ocr_server::ocr::OcrmypdfEngine;
use pdf_ocr_server::pipeline::OcrPipeline;
use pdf_ocr_server::render::MupdfRenderer;
use pdf_ocr_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "pdf_ocr_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    // A malformed variable aborts startup
    let config = Config::from_env().context("Invalid configuration")?;

    tracing::info!("Starting PDF OCR Server v{}", env!("CARGO_PKG_VERSION"));

    let cache = match &config.cache.dir {
        Some(dir) => CacheStore::persistent(dir),
        None => CacheStore::temporary(),
    }
    .context("Failed to initialize artifact cache")?;
    tracing::info!("Artifact cache at {}", cache.root().display());

    let fetcher = HttpFetcher::new(&config.fetch).context("Failed to initialize HTTP client")?;

    let engine = OcrmypdfEngine::new(config.ocr.clone());
    let ocr_engine_available = match engine.version().await {
        Ok(version) => {
            tracing::info!("Using ocrmypdf {}", version);
            true
        }
        Err(e) => {
            tracing::warn!("{}; OCR requests will fail until it is installed", e);
            false
        }
    };

    let pipeline = OcrPipeline::new(
        cache,
        Arc::new(fetcher),
        Arc::new(engine),
        Arc::new(MupdfRenderer),
        config.ocr.clone(),
    );

    let app = pdf_ocr_server::app(AppState::new(pipeline, ocr_engine_available));

    // Start server with graceful shutdown
    let ip = config
        .server
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("Invalid SERVER_HOST {:?}", config.server.host))?;
    let addr = SocketAddr::new(ip, config.server.port);
    tracing::info!("PDF OCR Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The temporary cache directory is removed as the state drops here
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
