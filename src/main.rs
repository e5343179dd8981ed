//! Setlist Backend
//!
//! HTTP service in front of a paginated upstream song catalog: artist
//! resolution, full-catalog aggregation, and streaming delivery.

use setlist::{api, core};

use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging system based on configuration
    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Configuration loaded successfully");
    info!("Starting Setlist Backend v{}", env!("CARGO_PKG_VERSION"));
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        base_url = %config.catalog.base_url,
        page_size = config.catalog.page_size,
        max_pages = config.catalog.max_pages,
        "Catalog configuration"
    );

    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(config)?;

    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
