//! offgrid server entry point.
//!
//! Boots the interception engine behind an MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use offgrid_client::{FetchClient, FetchConfig, ServiceWorker};
use offgrid_core::{AppConfig, StoreDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod host;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        version_tag = %config.version_tag,
        db_path = %config.db_path.display(),
        origin = %config.origin,
        "Starting offgrid server on stdio transport"
    );

    let db = StoreDb::open(&config.db_path).await?;
    let fetcher = FetchClient::new(FetchConfig::from_app_config(&config)?)?;
    let worker = ServiceWorker::new(Arc::new(config), db.clone(), Arc::new(fetcher), Arc::new(host::LogHost))?;

    let handler = handler::OffgridServer::new(Arc::new(worker));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    db.close().await?;
    tracing::info!("store database closed");

    Ok(())
}
