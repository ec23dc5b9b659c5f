//! PostgreSQL connection wrapper.

use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info};

use crate::config::PgConfig;
use crate::error::{PgError, PgResult, describe};

/// A single PostgreSQL connection.
///
/// The driver's connection task is spawned on the current runtime and
/// lives until the client is dropped.
pub struct PgConnection {
    client: Client,
}

impl PgConnection {
    /// Open a connection.
    pub async fn connect(config: &PgConfig) -> PgResult<Self> {
        debug!(url = %config.redacted_url(), "Connecting to PostgreSQL");

        let (client, connection) = config
            .to_pg_config()
            .connect(NoTls)
            .await
            .map_err(|e| {
                PgError::connection(format!(
                    "can't connect to {}: {}",
                    config.redacted_url(),
                    describe(&e)
                ))
            })?;

        tokio::spawn(
            async move {
                if let Err(e) = connection.await {
                    error!(error = %e, "PostgreSQL connection closed with error");
                }
            }
            .with_current_subscriber(),
        );

        info!(
            host = %config.host,
            port = %config.port,
            database = %config.database,
            "Connected to PostgreSQL"
        );

        Ok(Self { client })
    }

    /// Execute a query and return all rows.
    pub async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> PgResult<Vec<Row>> {
        debug!(sql = %sql, "Executing query");
        Ok(self.client.query(sql, params).await?)
    }

    /// Execute a batch of statements in a single round-trip.
    pub async fn batch_execute(&self, sql: &str) -> PgResult<()> {
        debug!(sql = %sql, "Executing batch");
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    /// Begin a transaction.
    pub async fn transaction(&mut self) -> PgResult<PgTransaction<'_>> {
        debug!("Beginning transaction");
        let txn = self.client.transaction().await?;
        Ok(PgTransaction { txn })
    }
}

/// A PostgreSQL transaction.
///
/// Dropping it without calling [`commit`](Self::commit) rolls it back.
pub struct PgTransaction<'a> {
    txn: tokio_postgres::Transaction<'a>,
}

impl PgTransaction<'_> {
    /// Execute a query and return exactly one row.
    pub async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> PgResult<Row> {
        debug!(sql = %sql, "Executing query_one in transaction");
        Ok(self.txn.query_one(sql, params).await?)
    }

    /// Execute a batch of statements, possibly several separated by `;`.
    pub async fn batch_execute(&self, sql: &str) -> PgResult<()> {
        debug!(bytes = sql.len(), "Executing batch in transaction");
        self.txn.batch_execute(sql).await?;
        Ok(())
    }

    /// Commit the transaction.
    pub async fn commit(self) -> PgResult<()> {
        debug!("Committing transaction");
        self.txn.commit().await?;
        Ok(())
    }

    /// Rollback the transaction.
    pub async fn rollback(self) -> PgResult<()> {
        debug!("Rolling back transaction");
        self.txn.rollback().await?;
        Ok(())
    }
}
