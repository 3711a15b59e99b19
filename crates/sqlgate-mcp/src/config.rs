//! Environment-driven server configuration.

use anyhow::Context;
use sqlgate::ConnectOptions;
use std::time::Duration;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub connect: ConnectOptions,
    /// Connection pool size
    pub pool_size: u32,
    /// Pool acquire timeout
    pub acquire_timeout: Duration,
    /// Per-statement execution timeout
    pub query_timeout: Duration,
    /// Ceiling on rows returned to the agent, independent of any
    /// caller-requested limit
    pub max_rows: usize,
    /// Rows per batched INSERT statement during imports
    pub import_chunk_size: usize,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    var(name).unwrap_or_else(|| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {name}={raw}: {e}")),
        None => Ok(default),
    }
}

fn parse_bool(name: &str, default: bool) -> anyhow::Result<bool> {
    match var(name).as_deref() {
        None => Ok(default),
        Some("1") | Some("true") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("no") => Ok(false),
        Some(other) => Err(anyhow::anyhow!("Invalid {name}={other}: expected a boolean")),
    }
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// `MSSQL_USER` and `MSSQL_PASSWORD` are required; everything else has
    /// a development-friendly default.
    pub fn from_env() -> anyhow::Result<Self> {
        let connect = ConnectOptions {
            host: var_or("MSSQL_HOST", "localhost"),
            port: parse_var("MSSQL_PORT", 1433)?,
            database: var("MSSQL_DATABASE"),
            user: var("MSSQL_USER").context("MSSQL_USER is required")?,
            password: var("MSSQL_PASSWORD").context("MSSQL_PASSWORD is required")?,
            encrypt: parse_bool("MSSQL_ENCRYPT", false)?,
            trust_cert: parse_bool("MSSQL_TRUST_CERT", true)?,
        };

        Ok(Self {
            connect,
            pool_size: parse_var("SQLGATE_POOL_SIZE", 8)?,
            acquire_timeout: Duration::from_secs(parse_var("SQLGATE_ACQUIRE_TIMEOUT_SECS", 30)?),
            query_timeout: Duration::from_secs(parse_var("SQLGATE_QUERY_TIMEOUT_SECS", 30)?),
            max_rows: parse_var("SQLGATE_MAX_ROWS", 500)?,
            import_chunk_size: parse_var("SQLGATE_IMPORT_CHUNK_SIZE", sqlgate::import::DEFAULT_CHUNK_SIZE)?,
        })
    }
}
