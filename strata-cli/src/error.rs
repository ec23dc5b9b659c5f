//! CLI error types and result alias.

use miette::Diagnostic;
use strata_migrate::MigrationError;
use strata_postgres::PgError;
use strata_postgres::error::describe;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(strata::config),
        help("see config.example.yaml for the expected layout")
    )]
    Config(String),

    /// Database connectivity error
    #[error("Database error: {0}")]
    #[diagnostic(code(strata::database))]
    Database(String),

    /// Migration error
    #[error("Migration error: {0}")]
    #[diagnostic(code(strata::migration))]
    Migration(#[from] MigrationError),
}

impl CliError {
    /// Character diff for a changed migration.
    pub fn diff(&self) -> Option<&str> {
        match self {
            Self::Migration(MigrationError::Changed { diff, .. }) => Some(diff),
            _ => None,
        }
    }
}

impl From<PgError> for CliError {
    fn from(err: PgError) -> Self {
        match err {
            PgError::Config(msg) => CliError::Config(msg),
            PgError::Postgres(e) => CliError::Database(describe(&e)),
            other => CliError::Database(other.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::Config(format!("can't decode config file: {}", err))
    }
}
