//! Error types for sqlgate

use thiserror::Error;

/// Result type alias for sqlgate operations
pub type GateResult<T> = Result<T, GateError>;

/// Error types for statement construction and execution
#[derive(Debug, Error)]
pub enum GateError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tiberius::error::Error),

    /// Input validation error (malformed predicate, missing filter,
    /// ambiguous pagination, bad identifier, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bulk-load parse or shape error
    #[error("Import error: {0}")]
    Import(String),

    /// Named resource not found (e.g. unknown transaction id)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),
}

impl GateError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an import error
    pub fn import(message: impl Into<String>) -> Self {
        Self::Import(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(feature = "pool")]
impl From<bb8::RunError<bb8_tiberius::Error>> for GateError {
    fn from(err: bb8::RunError<bb8_tiberius::Error>) -> Self {
        match err {
            bb8::RunError::User(e) => Self::Pool(e.to_string()),
            bb8::RunError::TimedOut => Self::Pool("connection acquire timed out".to_string()),
        }
    }
}
