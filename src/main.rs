//! PancakeSwap DEX Gateway
//!
//! HTTP backend for PancakeSwap swaps, quotes and the custom token registry.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pancake_dex_gateway::{http, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!(
        port = config.port,
        store = ?config.store_backend,
        "Starting PancakeSwap DEX Gateway"
    );

    // Build services
    let state = http::AppState::from_config(&config).await?;

    // Serve until Ctrl-C
    http::start_server(state, config.port).await?;

    Ok(())
}
