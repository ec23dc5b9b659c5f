//! Error types for the migration engine.

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur while reconciling migrations.
///
/// Every variant is fatal for a run. Drift variants (`Removed`, `Changed`,
/// `OutOfOrder`) are raised before anything is written.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The migration store could not be reached or read.
    #[error("Store error: {0}")]
    Store(String),

    /// The migration source could not be loaded.
    #[error("Source error: {0}")]
    Source(String),

    /// Invalid migration file or name.
    #[error("Invalid migration: {0}")]
    InvalidMigration(String),

    /// An applied migration no longer exists in the source.
    #[error("migration '{name}' was removed")]
    Removed {
        /// Name of the applied migration.
        name: String,
    },

    /// An applied migration was edited after it ran.
    #[error("migration '{name}' was changed")]
    Changed {
        /// Name of the applied migration.
        name: String,
        /// Character diff from the recorded body to the source body.
        diff: String,
    },

    /// A source migration sorts before an applied one.
    #[error("migration '{found}' sorts before applied migration '{applied}'")]
    OutOfOrder {
        /// Applied migration expected at this position.
        applied: String,
        /// Source migration found at this position instead.
        found: String,
    },

    /// The record for a pending migration could not be inserted.
    #[error("can't record migration '{name}': {message}")]
    Record {
        /// Migration name.
        name: String,
        /// Underlying error message.
        message: String,
    },

    /// The SQL body of a pending migration failed.
    #[error("can't execute migration '{name}': {message}")]
    Execution {
        /// Migration name.
        name: String,
        /// Underlying error message.
        message: String,
    },

    /// The transaction of a pending migration failed to commit.
    #[error("can't commit migration '{name}': {message}")]
    Commit {
        /// Migration name.
        name: String,
        /// Underlying error message.
        message: String,
    },
}

impl MigrationError {
    /// Create a store error.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a source error.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create an invalid migration error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidMigration(msg.into())
    }

    /// Create a record error.
    pub fn record(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Record {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create an execution error.
    pub fn execution(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Execution {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create a commit error.
    pub fn commit(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Commit {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Check if this error means the applied history no longer matches the source.
    pub fn is_drift(&self) -> bool {
        matches!(
            self,
            Self::Removed { .. } | Self::Changed { .. } | Self::OutOfOrder { .. }
        )
    }

    /// Name of the migration this error is about, if any.
    pub fn migration_name(&self) -> Option<&str> {
        match self {
            Self::Removed { name }
            | Self::Changed { name, .. }
            | Self::Record { name, .. }
            | Self::Execution { name, .. }
            | Self::Commit { name, .. } => Some(name),
            Self::OutOfOrder { applied, .. } => Some(applied),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrationError::Removed {
            name: "0001_init.sql".to_string(),
        };
        assert_eq!(err.to_string(), "migration '0001_init.sql' was removed");
    }

    #[test]
    fn test_changed_display_omits_diff() {
        let err = MigrationError::Changed {
            name: "0002_add.sql".to_string(),
            diff: "[-x-]{+y+}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0002_add.sql"));
        assert!(msg.contains("changed"));
        assert!(!msg.contains("[-x-]"));
    }

    #[test]
    fn test_is_drift() {
        assert!(MigrationError::Removed { name: "a".into() }.is_drift());
        assert!(
            MigrationError::OutOfOrder {
                applied: "b".into(),
                found: "a".into()
            }
            .is_drift()
        );
        assert!(!MigrationError::execution("a", "syntax error").is_drift());
        assert!(!MigrationError::store("connection refused").is_drift());
    }

    #[test]
    fn test_migration_name() {
        assert_eq!(
            MigrationError::commit("0003_x.sql", "lost").migration_name(),
            Some("0003_x.sql")
        );
        assert_eq!(MigrationError::source("bad").migration_name(), None);
    }
}
