//! Tumour Classification Service
//!
//! Serves a single pre-trained classifier over a small REST API (Axum).

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use oncoserve::api::rest::{AppState, create_rest_router};
use oncoserve::config::Config;
use oncoserve::engine::ModelProvider;
use oncoserve::service::PredictionService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration before logging so the configured level applies
    let config_path = Config::default_path();
    let loaded = Config::load(&config_path);
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize logging, RUST_LOG wins over the config file
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting Tumour Classification Service v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = &loaded {
        info!("Using default config ({}: {})", config_path, e);
    }

    info!("Configuration loaded:");
    info!("  Bind address: {}", config.bind_addr());
    info!("  Model path: {}", config.model.path.display());
    info!("  Expected features: {}", config.model.n_features);

    // Load the model once; nothing is served without it
    let provider = ModelProvider::load(&config.model.path)
        .with_context(|| format!("failed to load model from {}", config.model.path.display()))?;

    if let Some(source) = provider.source() {
        info!("Serving {} model from {}", provider.kind(), source.display());
    }

    if provider.n_features() != config.model.n_features {
        bail!(
            "model expects {} features but model.n_features is {}",
            provider.n_features(),
            config.model.n_features
        );
    }

    let service = Arc::new(PredictionService::new(Arc::new(provider)));
    let app_state = Arc::new(AppState::new(service));
    let rest_router = create_rest_router(app_state, config.server.max_body_bytes);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("REST API listening on http://{}", addr);
    info!("Tumour Classification Service is ready!");

    axum::serve(listener, rest_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Goodbye!");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received, cleaning up...");
    }
}
