//! CLI command implementations.

pub mod status;
pub mod up;
pub mod version;

use std::path::PathBuf;

use strata_migrate::{DirSource, MigrationSource, Reconciler};
use strata_postgres::{PgConfig, PgMigrationStore};
use tracing::{error, info_span};

use crate::bundled;
use crate::cli::Command;
use crate::config::Config;
use crate::error::CliResult;

/// Reconciler over the PostgreSQL store and whichever source is selected.
pub type PgReconciler = Reconciler<PgMigrationStore, Box<dyn MigrationSource>>;

/// Everything a database command needs.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration.
    pub config: Config,
    /// Directory overriding the bundled migrations.
    pub migrations_dir: Option<PathBuf>,
}

impl Context {
    /// Create a new context.
    pub fn new(config: Config, migrations_dir: Option<PathBuf>) -> Self {
        Self {
            config,
            migrations_dir,
        }
    }

    /// Connection settings for the target database.
    pub fn pg_config(&self) -> CliResult<PgConfig> {
        self.config.to_pg_config()
    }

    /// Human-readable description of the migration source.
    pub fn source_label(&self) -> String {
        match self.migrations_dir {
            Some(ref dir) => dir.display().to_string(),
            None => "bundled".to_string(),
        }
    }

    /// The selected migration source.
    pub fn source(&self) -> Box<dyn MigrationSource> {
        match self.migrations_dir {
            Some(ref dir) => Box::new(DirSource::new(dir.clone())),
            None => Box::new(bundled::source()),
        }
    }

    /// Connect to the database and build a reconciler.
    pub async fn reconciler(&self) -> CliResult<PgReconciler> {
        let pg = self.pg_config()?;
        let store =
            PgMigrationStore::connect_with_table(&pg, &self.config.migrations.table).await?;

        let span = info_span!(
            "reconcile",
            database = %pg.database,
            table = %self.config.migrations.table
        );
        Ok(Reconciler::new(store, self.source()).with_span(span))
    }
}

/// Run a command, logging its failure.
pub async fn run(command: Command, ctx: &Context) -> CliResult<()> {
    let result = match command {
        Command::Up(args) => up::run(ctx, args).await,
        Command::Status => status::run(ctx).await,
        Command::Version => version::run().await,
    };

    if let Err(ref e) = result {
        error!(error = %e, "Command failed");
    }
    result
}
