//! Error types for PostgreSQL operations.

use strata_migrate::MigrationError;
use thiserror::Error;

/// Result type for PostgreSQL operations.
pub type PgResult<T> = Result<T, PgError>;

/// Errors that can occur during PostgreSQL operations.
#[derive(Error, Debug)]
pub enum PgError {
    /// PostgreSQL error.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Row deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl PgError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Postgres(e) => e.is_closed() || e.code().is_none(),
            _ => false,
        }
    }
}

/// Render a driver error with the server's detail, when there is one.
///
/// `tokio_postgres::Error` displays only "db error" for server-side failures;
/// the useful message lives in the attached `DbError`.
pub fn describe(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => {
            let mut message = format!("{}: {} ({})", db.severity(), db.message(), db.code().code());
            if let Some(position) = db.position() {
                message.push_str(&format!(" at {:?}", position));
            }
            message
        }
        None => err.to_string(),
    }
}

impl From<PgError> for MigrationError {
    fn from(err: PgError) -> Self {
        match err {
            PgError::Postgres(e) => MigrationError::Store(describe(&e)),
            PgError::Config(msg) => {
                MigrationError::Store(format!("invalid configuration: {}", msg))
            }
            PgError::Connection(msg) => MigrationError::Store(msg),
            PgError::Deserialization(msg) => MigrationError::Store(msg),
        }
    }
}
