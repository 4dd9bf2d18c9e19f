//! autodiagd - diagnosis proxy daemon
//!
//! Relays symptom descriptions to the remote assistant and serves the
//! response interpreter.

use anyhow::Result;
use autodiagd::config::{Config, Secrets};
use autodiagd::server::{self, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("autodiagd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    let state = AppState::from_config(&config, Secrets::from_env())?;

    server::run(state, &config.server).await?;

    info!("autodiagd stopped");
    Ok(())
}
