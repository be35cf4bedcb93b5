//! Consensus API server.
//!
//! Reads configuration, builds the validation pipeline once, and serves it
//! until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use consensus_runtime::{ApiCredential, OPENAI_API_KEY_ENV};
use consensus_server::{build_pipeline, router, Cli, ServiceConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ServiceConfig::resolve(&cli).context("failed to load configuration")?;

    let credential = ApiCredential::from_env_optional(OPENAI_API_KEY_ENV, "OpenAI API key");
    let pipeline = build_pipeline(&config, credential).context("failed to build judge client")?;
    let app = router(Arc::new(pipeline));

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;

    tracing::info!(addr = %config.listen, "Consensus API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
