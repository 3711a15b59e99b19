//! SQL Server MCP Server
//!
//! Exposes parameter-safe SQL Server operations (CRUD, batches, schema
//! introspection, stored procedures, transactions, bulk load) to AI agents
//! over the Model Context Protocol, speaking JSON-RPC over stdio.

mod config;
mod inputs;
mod registry;
mod service;

use config::Config;
use rmcp::{ServiceExt, transport::stdio};
use service::GateService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout is the MCP wire; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let pool = sqlgate::create_pool_with_config(
        &config.connect,
        config.pool_size,
        config.acquire_timeout,
    )
    .await?;

    tracing::info!(
        host = %config.connect.host,
        port = config.connect.port,
        "sqlgate-mcp listening on stdio"
    );

    let service = GateService::new(pool, config).serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
