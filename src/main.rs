//! Fraud Detection App - Main Entry Point
//!
//! Serves the transaction form, scores submissions with the trained bundle and
//! renders a per-feature explanation of every prediction.

use anyhow::{Context, Result};
use clap::Parser;
use fraud_detection_app::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    models::ArtifactCache,
    telemetry,
    ui::{create_router, AppState},
};
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "fraud-app", version, about = "Interactive fraud scoring with explanations")]
struct Args {
    /// Configuration file (missing file means built-in defaults)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the artifact bundle path
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load_from_path(&args.config)?;
    if let Some(path) = args.artifacts {
        config.artifacts.path = path;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    telemetry::init_logging(&config.logging)?;
    info!("Starting Fraud Detection App");

    let state = AppState::new(ArtifactCache::new(&config.artifacts.path));

    // Load the bundle up front so the first visitor does not pay for it
    match state.artifacts.get() {
        Ok(bundle) => info!(
            model = bundle.model.name(),
            features = bundle.features.len(),
            "Model and artifacts loaded successfully!"
        ),
        Err(e) if e.is_missing_resource() => warn!(
            error = %e,
            "Serving the error page until the bundle is exported"
        ),
        Err(e) => error!(error = %e, "Artifact bundle could not be loaded"),
    }

    let app = create_router(state.clone());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("App shutting down...");
    state.metrics.print_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
