//! Connection pool utilities

use crate::error::{GateError, GateResult};
use bb8::Pool;
use bb8_tiberius::ConnectionManager;
use tiberius::{AuthMethod, Config, EncryptionLevel};

/// A pooled set of SQL Server connections.
pub type TdsPool = Pool<ConnectionManager>;

/// A connection checked out of the pool for exclusive long-lived use
/// (e.g. pinned to an open transaction). Dropping it returns it to the pool.
pub type OwnedTds = bb8::PooledConnection<'static, ConnectionManager>;

/// Check a connection out of the pool without borrowing the pool handle.
pub async fn get_owned(pool: &TdsPool) -> GateResult<OwnedTds> {
    Ok(pool.get_owned().await?)
}

/// Connection settings for [`create_pool_with_config`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub user: String,
    pub password: String,
    /// Require TLS on the wire
    pub encrypt: bool,
    /// Accept the server certificate without verification (dev setups)
    pub trust_cert: bool,
}

impl ConnectOptions {
    fn to_tiberius(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.host);
        config.port(self.port);
        config.authentication(AuthMethod::sql_server(&self.user, &self.password));
        if let Some(db) = &self.database {
            if !db.is_empty() {
                config.database(db);
            }
        }
        config.encryption(if self.encrypt {
            EncryptionLevel::Required
        } else {
            EncryptionLevel::NotSupported
        });
        if self.trust_cert {
            config.trust_cert();
        }
        config
    }
}

/// Create a connection pool with small default settings (suitable for
/// local/dev). For production, prefer [`create_pool_with_config`] to inject
/// pool tuning.
pub async fn create_pool(options: &ConnectOptions) -> GateResult<TdsPool> {
    create_pool_with_config(options, 8, std::time::Duration::from_secs(30)).await
}

/// Create a connection pool with custom size and acquire timeout.
pub async fn create_pool_with_config(
    options: &ConnectOptions,
    max_size: u32,
    acquire_timeout: std::time::Duration,
) -> GateResult<TdsPool> {
    let manager = ConnectionManager::new(options.to_tiberius());
    Pool::builder()
        .max_size(max_size)
        .connection_timeout(acquire_timeout)
        .build(manager)
        .await
        .map_err(|e| GateError::Connection(e.to_string()))
}
