use anyhow::{Context, Result};
use clap::Parser;
use ossdir::api;
use ossdir::core::config::{Cli, Config};
use ossdir::core::telemetry::logging::init_logging;
use ossdir::services::store::ObjectStoreGateway;
use ossdir::DirectoryService;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    config.apply_cli(&cli);
    config.validate()?;

    let gateway = Arc::new(ObjectStoreGateway::from_config(&config)?);
    let service = Arc::new(DirectoryService::from_config(gateway, &config));

    // Serve even when the first listing fails; the next list request retries it.
    if let Err(err) = service.initialize().await {
        tracing::warn!("initial directory refresh failed: {}", err);
    }

    let app = api::router(Arc::clone(&service), config.max_upload_bytes);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot listen on {addr}"))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
