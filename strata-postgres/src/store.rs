//! Migration history stored in a PostgreSQL table.

use async_trait::async_trait;
use strata_migrate::{
    MigrateResult, MigrationError, MigrationRecord, MigrationStore, SourceMigration, sort_by_name,
};
use tracing::{debug, warn};

use crate::config::PgConfig;
use crate::connection::{PgConnection, PgTransaction};
use crate::error::{PgError, PgResult, describe};
use crate::row::{FromPgRow, PgRow};

/// Default name of the record table.
pub const DEFAULT_TABLE: &str = "migrations";

/// [`MigrationStore`] backed by a single PostgreSQL connection.
///
/// Each applied migration runs in its own transaction: the record insert
/// and the body execute together and commit together.
pub struct PgMigrationStore {
    conn: PgConnection,
    table: String,
    sql: StoreSql,
}

impl PgMigrationStore {
    /// Connect using the default record table.
    pub async fn connect(config: &PgConfig) -> PgResult<Self> {
        Self::connect_with_table(config, DEFAULT_TABLE).await
    }

    /// Connect and keep records in `table`.
    pub async fn connect_with_table(config: &PgConfig, table: &str) -> PgResult<Self> {
        let sql = StoreSql::new(table)?;
        let conn = PgConnection::connect(config).await?;
        Ok(Self {
            conn,
            table: table.to_string(),
            sql,
        })
    }

    /// Wrap an already open connection.
    pub fn from_connection(conn: PgConnection, table: &str) -> PgResult<Self> {
        Ok(Self {
            conn,
            table: table.to_string(),
            sql: StoreSql::new(table)?,
        })
    }

    /// Name of the record table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Get the underlying connection.
    pub fn connection(&self) -> &PgConnection {
        &self.conn
    }
}

#[async_trait]
impl MigrationStore for PgMigrationStore {
    async fn exists(&mut self) -> MigrateResult<bool> {
        let rows = self.conn.query(&self.sql.exists, &[&self.table]).await?;
        let exists = match rows.first() {
            Some(row) => row.get_value("present")?,
            None => false,
        };
        debug!(table = %self.table, exists, "Checked migration table");
        Ok(exists)
    }

    async fn initialize(&mut self) -> MigrateResult<()> {
        debug!(table = %self.table, "Ensuring migration table exists");
        self.conn.batch_execute(&self.sql.create).await?;
        Ok(())
    }

    async fn applied(&mut self) -> MigrateResult<Vec<MigrationRecord>> {
        let rows = self.conn.query(&self.sql.select, &[]).await?;
        let mut records = rows
            .iter()
            .map(MigrationRecord::from_row)
            .collect::<PgResult<Vec<_>>>()?;
        sort_by_name(&mut records);
        debug!(count = records.len(), "Loaded applied migrations");
        Ok(records)
    }

    async fn apply(&mut self, migration: &SourceMigration) -> MigrateResult<MigrationRecord> {
        let name = migration.name.as_str();
        let txn = self.conn.transaction().await.map_err(|e| begin_error(&e))?;

        let row = match txn
            .query_one(&self.sql.insert, &[&migration.name, &migration.body])
            .await
        {
            Ok(row) => row,
            Err(e) => {
                rollback(txn, name).await;
                return Err(MigrationError::record(name, message(&e)));
            }
        };

        if let Err(e) = txn.batch_execute(&migration.body).await {
            rollback(txn, name).await;
            return Err(MigrationError::execution(name, message(&e)));
        }

        let record = MigrationRecord {
            id: row.get_value("id")?,
            created_at: row.get_value("created_at")?,
            name: migration.name.clone(),
            body: migration.body.clone(),
        };

        txn.commit()
            .await
            .map_err(|e| MigrationError::commit(name, message(&e)))?;

        Ok(record)
    }
}

async fn rollback(txn: PgTransaction<'_>, name: &str) {
    if let Err(e) = txn.rollback().await {
        warn!(migration = %name, error = %message(&e), "Rollback failed");
    }
}

fn begin_error(err: &PgError) -> MigrationError {
    MigrationError::store(format!("can't begin transaction: {}", message(err)))
}

fn message(err: &PgError) -> String {
    match err {
        PgError::Postgres(e) => describe(e),
        other => other.to_string(),
    }
}

/// SQL statements for one record table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StoreSql {
    exists: String,
    create: String,
    select: String,
    insert: String,
}

impl StoreSql {
    fn new(table: &str) -> PgResult<Self> {
        let quoted = quote_identifier(table)?;
        Ok(Self {
            exists: "SELECT EXISTS (SELECT 1 FROM pg_catalog.pg_tables \
                     WHERE schemaname = current_schema() AND tablename = $1) AS present"
                .to_string(),
            create: format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                 id BIGSERIAL PRIMARY KEY, \
                 created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
                 name TEXT NOT NULL UNIQUE, \
                 body TEXT NOT NULL)",
                quoted
            ),
            select: format!(
                "SELECT id, created_at, name, body FROM {} ORDER BY name COLLATE \"C\"",
                quoted
            ),
            insert: format!(
                "INSERT INTO {} (name, body) VALUES ($1, $2) RETURNING id, created_at",
                quoted
            ),
        })
    }
}

/// Quote a table name after checking it is a plain identifier.
fn quote_identifier(name: &str) -> PgResult<String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if !valid || name.len() > 63 {
        return Err(PgError::config(format!("invalid table name: '{}'", name)));
    }
    Ok(format!("\"{}\"", name))
}
