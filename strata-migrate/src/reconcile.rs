//! The reconciler: brings a store in line with a migration source.

use std::time::Instant;

use tracing::{Instrument, Span, debug, error, info, info_span};

use crate::error::MigrateResult;
use crate::history::{MigrationRecord, MigrationStore};
use crate::plan::{MigrationPlan, verify};
use crate::source::MigrationSource;

/// Result of a reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Names of migrations applied by this run, in order.
    pub applied: Vec<String>,
    /// Total duration in milliseconds.
    pub duration_ms: i64,
}

impl ReconcileReport {
    /// Check if the run found nothing to apply.
    pub fn is_up_to_date(&self) -> bool {
        self.applied.is_empty()
    }

    /// Get a summary of the run.
    pub fn summary(&self) -> String {
        if self.is_up_to_date() {
            "No new migrations, database is up to date".to_string()
        } else {
            format!(
                "{} migrations applied in {}ms",
                self.applied.len(),
                self.duration_ms
            )
        }
    }
}

/// Applies pending source migrations to a store after checking for drift.
///
/// A run walks through loading, prefix verification and applying, one
/// transaction per pending migration. The first failure ends the run.
/// Migrations committed before the failure stay applied.
pub struct Reconciler<S, P> {
    store: S,
    source: P,
    span: Span,
}

impl<S: MigrationStore, P: MigrationSource> Reconciler<S, P> {
    /// Create a new reconciler.
    pub fn new(store: S, source: P) -> Self {
        Self {
            store,
            source,
            span: info_span!("reconcile"),
        }
    }

    /// Run under the given span instead of a fresh `reconcile` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Get the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the reconciler and return the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Load both sides and verify the applied prefix without applying anything.
    ///
    /// Read only: a missing record table is treated as an empty history and
    /// is not created.
    pub async fn plan(&mut self) -> MigrateResult<MigrationPlan> {
        let span = self.span.clone();
        self.plan_inner().instrument(span).await
    }

    /// Verify and apply every pending migration.
    pub async fn run(&mut self) -> MigrateResult<ReconcileReport> {
        let span = self.span.clone();
        self.run_inner().instrument(span).await
    }

    async fn plan_inner(&mut self) -> MigrateResult<MigrationPlan> {
        debug!("Loading migration state");
        let applied = if self.store.exists().await? {
            self.store.applied().await?
        } else {
            debug!("Migration table does not exist yet");
            Vec::new()
        };
        self.check_prefix(applied).await
    }

    async fn check_prefix(
        &mut self,
        applied: Vec<MigrationRecord>,
    ) -> MigrateResult<MigrationPlan> {
        let source = self.source.load().await?;

        debug!(
            applied = applied.len(),
            source = source.len(),
            "Verifying applied migrations"
        );
        let plan = verify(&applied, source).inspect_err(|e| {
            if e.is_drift() {
                error!(error = %e, "Migration history does not match source");
            }
        })?;

        info!(
            applied = plan.applied.len(),
            pending = plan.pending.len(),
            "Migration plan ready"
        );
        Ok(plan)
    }

    async fn run_inner(&mut self) -> MigrateResult<ReconcileReport> {
        let start = Instant::now();
        debug!("Loading migration state");
        self.store.initialize().await?;
        let applied = self.store.applied().await?;
        let plan = self.check_prefix(applied).await?;

        let mut report = ReconcileReport::default();
        let total = plan.pending.len();

        for (index, migration) in plan.pending.iter().enumerate() {
            info!(
                migration = %migration.name,
                step = index + 1,
                total,
                "Applying migration"
            );

            let migration_start = Instant::now();
            let record = self.store.apply(migration).await.inspect_err(|e| {
                error!(migration = %migration.name, error = %e, "Migration failed");
            })?;

            debug!(
                migration = %record.name,
                id = record.id,
                duration_ms = migration_start.elapsed().as_millis() as i64,
                "Migration committed"
            );
            report.applied.push(record.name);
        }

        report.duration_ms = start.elapsed().as_millis() as i64;
        info!(
            applied = report.applied.len(),
            duration_ms = report.duration_ms,
            "Reconciliation complete"
        );
        Ok(report)
    }
}
