//! In-process migration store.
//!
//! Keeps records in a `Vec` and simulates the transactional contract of a
//! real store, including injected failures. Useful for tests and dry
//! reasoning about a history without a database.

use std::collections::HashSet;

use crate::error::{MigrateResult, MigrationError};
use crate::history::{MigrationRecord, MigrationStore, sort_by_name};
use crate::source::SourceMigration;

/// A [`MigrationStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<MigrationRecord>,
    next_id: i64,
    initialized: bool,
    fail_execute: HashSet<String>,
    fail_commit: HashSet<String>,
    unreachable: bool,
    executed: Vec<String>,
    writes: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Create a store that already holds the given records.
    pub fn with_records(records: Vec<MigrationRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            records,
            next_id,
            initialized: true,
            ..Default::default()
        }
    }

    /// Make the body of `name` fail to execute.
    pub fn fail_execute(mut self, name: impl Into<String>) -> Self {
        self.fail_execute.insert(name.into());
        self
    }

    /// Make the transaction of `name` fail to commit.
    pub fn fail_commit(mut self, name: impl Into<String>) -> Self {
        self.fail_commit.insert(name.into());
        self
    }

    /// Make every operation fail as if the database were down.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Committed records, in insertion order.
    pub fn records(&self) -> &[MigrationRecord] {
        &self.records
    }

    /// Names of migrations whose body was executed, committed or not.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    /// Number of committed writes, table creation included.
    pub fn writes(&self) -> usize {
        self.writes
    }

    fn check_reachable(&self) -> MigrateResult<()> {
        if self.unreachable {
            return Err(MigrationError::store("connection refused"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MigrationStore for MemoryStore {
    async fn exists(&mut self) -> MigrateResult<bool> {
        self.check_reachable()?;
        Ok(self.initialized)
    }

    async fn initialize(&mut self) -> MigrateResult<()> {
        self.check_reachable()?;
        if !self.initialized {
            self.initialized = true;
            self.writes += 1;
        }
        Ok(())
    }

    async fn applied(&mut self) -> MigrateResult<Vec<MigrationRecord>> {
        self.check_reachable()?;
        let mut records = self.records.clone();
        sort_by_name(&mut records);
        Ok(records)
    }

    async fn apply(&mut self, migration: &SourceMigration) -> MigrateResult<MigrationRecord> {
        self.check_reachable()?;

        if self.records.iter().any(|r| r.name == migration.name) {
            return Err(MigrationError::record(
                &migration.name,
                "duplicate key value violates unique constraint",
            ));
        }
        let record = MigrationRecord::new(self.next_id, migration);

        self.executed.push(migration.name.clone());
        if self.fail_execute.contains(&migration.name) {
            return Err(MigrationError::execution(
                &migration.name,
                "syntax error at or near \"\"",
            ));
        }

        if self.fail_commit.contains(&migration.name) {
            return Err(MigrationError::commit(&migration.name, "connection lost"));
        }

        self.next_id += 1;
        self.records.push(record.clone());
        self.writes += 1;
        Ok(record)
    }
}
