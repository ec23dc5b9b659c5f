//! Applied migration history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MigrateResult;
use crate::source::SourceMigration;

/// A record of an applied migration.
///
/// The body is the exact SQL text that ran. It is never updated after the
/// record is written, so it doubles as the checksum of what was executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Sequence position assigned by the store.
    pub id: i64,
    /// When the migration was applied.
    pub created_at: DateTime<Utc>,
    /// Migration name (source filename).
    pub name: String,
    /// SQL body as it was executed.
    pub body: String,
}

impl MigrationRecord {
    /// Create a record for a migration applied now.
    pub fn new(id: i64, migration: &SourceMigration) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            name: migration.name.clone(),
            body: migration.body.clone(),
        }
    }
}

/// Sort records by the byte order of their names.
///
/// This is the order source migrations are sorted in. Stores must return
/// history in it regardless of how the database collates text.
pub fn sort_by_name(records: &mut [MigrationRecord]) {
    records.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
}

/// Storage for applied migration records.
///
/// Implementations own the connection to the target database. The same
/// transaction that inserts a record must also execute its body, so a
/// record exists if and only if its SQL was committed.
#[async_trait::async_trait]
pub trait MigrationStore: Send {
    /// Check whether the record table exists, without creating it.
    async fn exists(&mut self) -> MigrateResult<bool>;

    /// Create the record table if it does not exist.
    async fn initialize(&mut self) -> MigrateResult<()>;

    /// All applied records, ordered by [`sort_by_name`].
    async fn applied(&mut self) -> MigrateResult<Vec<MigrationRecord>>;

    /// Apply one migration atomically.
    ///
    /// Inserts the record, executes the body and commits. If any step fails
    /// the transaction is rolled back and nothing of this migration persists.
    async fn apply(&mut self, migration: &SourceMigration) -> MigrateResult<MigrationRecord>;
}
