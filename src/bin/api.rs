//! GoProject API Server
//!
//! Run with: cargo run --bin goproject-api
//!
//! # Configuration
//!
//! Read from `~/.config/goproject/config.toml`, `/etc/goproject/config.toml`
//! or `./config.toml`, whichever exists first. Environment variables win:
//! - `GOPROJECT_HOST`: Host to bind to (default: 127.0.0.1)
//! - `GOPROJECT_PORT`: Port to listen on (default: 8000)
//! - `GOPROJECT_PUBLIC_URL`: Base of absolute media URLs
//! - `GOPROJECT_DATA_DIR`: Database and media directory
//! - `GOPROJECT_JWT_SECRET`: Token signing secret
//! - `GOPROJECT_LOG_LEVEL` / `RUST_LOG`: Log filter
//! - `GOPROJECT_LOG_FORMAT`: `pretty` or `json`

use anyhow::Context;
use goproject::api::{serve, AppState};
use goproject::{logging, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    logging::init(&config.logging);

    tracing::info!("Starting GoProject API server v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.uses_development_secret() {
        tracing::warn!("Using the built-in JWT secret; set GOPROJECT_JWT_SECRET before deploying");
    }

    tracing::info!("Database: {:?}", config.storage.database_path());
    tracing::info!("Media directory: {:?}", config.storage.media_path());

    let state = AppState::open(&config).context("failed to open storage")?;

    serve(state).await?;

    tracing::info!("GoProject API server stopped");
    Ok(())
}
