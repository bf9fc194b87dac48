//! otrs-mcp - MCP server for the OTRS generic interface
//!
//! This binary runs as an MCP server using stdio transport, allowing
//! MCP clients to work with OTRS tickets and configuration items.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `OTRS_BASE_URL`: webservice base URL
//! - `OTRS_USERNAME`: agent login
//! - `OTRS_PASSWORD`: agent password
//!
//! # Usage
//!
//! ```bash
//! OTRS_BASE_URL=https://otrs.example.com/otrs/nph-genericinterface.pl/Webservice/TestInterface \
//! OTRS_USERNAME=agent OTRS_PASSWORD=xxx ./otrs-mcp
//! ```

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{fmt, EnvFilter};

use otrs_mcp::{config, models::Operation, otrs_client, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout carries MCP JSON-RPC frames, so logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("otrs_mcp=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting OTRS MCP server v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        base_url = %config.base_url,
        username = %config.username,
        verify_ssl = config.verify_ssl,
        default_queue = %config.default_queue,
        default_state = %config.default_state,
        default_priority = %config.default_priority,
        default_type = %config.default_type,
        "Configuration loaded"
    );
    if let Some(forced) = &config.customer_user_override {
        tracing::info!(customer_user = %forced, "New tickets will use a fixed customer user");
    }

    let otrs_client =
        otrs_client::OtrsClient::new(&config).context("Failed to create OTRS client")?;

    tracing::info!("Testing connection to OTRS...");
    if let Err(e) = otrs_client.test_connection().await {
        tracing::error!(error = %e, "Connection test failed");
        // Start anyway; the webservice may come up later
        tracing::warn!(
            "Server will start but may not be able to reach OTRS. \
             Check configuration and network connectivity."
        );
    }

    let server = server::OtrsServer::new(otrs_client);

    let operations: Vec<&str> = Operation::ALL.iter().map(|op| op.as_str()).collect();
    tracing::info!(operations = %operations.join(", "), "Server initialized, starting stdio transport");

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })
        .context("Failed to start server")?;

    tracing::info!("Server running, waiting for requests");

    service
        .waiting()
        .await
        .context("Server error during operation")?;

    tracing::info!("Server shutting down");

    Ok(())
}
