//! Portal Sandbox Server
//!
//! Run with: cargo run --bin haven-sandbox
//!
//! # Configuration
//!
//! Reads `config.toml` from the usual locations, then environment overrides:
//! - `HAVEN_SANDBOX_HOST`: Host to bind to (default: 127.0.0.1)
//! - `HAVEN_SANDBOX_PORT`: Port to listen on (default: 8000)
//! - `HAVEN_LOG_LEVEL`: Log level (default: info)

use haven::config::Config;
use haven::sandbox;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load_with_env(std::path::Path::new(&path))?,
        None => Config::load_default(),
    };
    config.logging.init();

    tracing::info!("Starting portal sandbox v{}", env!("CARGO_PKG_VERSION"));
    if config.sandbox.cors_origins.is_empty() {
        tracing::info!("CORS: any origin");
    } else {
        tracing::info!("CORS origins: {:?}", config.sandbox.cors_origins);
    }

    sandbox::serve(config.sandbox).await?;
    Ok(())
}
