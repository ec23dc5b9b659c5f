//! # strata-migrate
//!
//! Engine-agnostic core of the strata migration runner.
//!
//! Strata applies an ordered set of SQL files to a database exactly once.
//! Every applied migration is recorded together with the SQL text that ran.
//! Before anything new is applied, the recorded history must be an exact
//! prefix of the source: same names, same order, same bodies. A migration
//! that was edited or deleted after it ran stops the run before any write.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐
//! │ Source files │     │ Record table │
//! └──────┬───────┘     └──────┬───────┘
//!        │   sorted by name   │
//!        └─────────┬──────────┘
//!                  ▼
//!          ┌───────────────┐
//!          │ Prefix verify │──── drift ───▶ error, nothing written
//!          └───────┬───────┘
//!                  ▼
//!          ┌───────────────┐
//!          │ Apply pending │  one transaction per file:
//!          └───────────────┘  insert record + execute body
//! ```
//!
//! ## Example
//!
//! ```rust
//! use strata_migrate::{MemoryStore, Reconciler, StaticSource};
//!
//! # tokio_test_block(async {
//! let source = StaticSource::from_pairs([
//!     ("0001_init.sql", "CREATE TABLE t(x int);"),
//!     ("0002_add.sql", "ALTER TABLE t ADD y int;"),
//! ]);
//!
//! let mut reconciler = Reconciler::new(MemoryStore::new(), source);
//! let report = reconciler.run().await.unwrap();
//! assert_eq!(report.applied, vec!["0001_init.sql", "0002_add.sql"]);
//!
//! // Nothing left on a second run.
//! assert!(reconciler.run().await.unwrap().is_up_to_date());
//! # });
//! # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod error;
pub mod history;
pub mod memory;
pub mod plan;
pub mod reconcile;
pub mod source;
pub mod text;

// Re-exports
pub use error::{MigrateResult, MigrationError};
pub use history::{MigrationRecord, MigrationStore, sort_by_name};
pub use memory::MemoryStore;
pub use plan::{MigrationPlan, verify};
pub use reconcile::{ReconcileReport, Reconciler};
pub use source::{DirSource, EmbeddedSource, MigrationSource, SourceMigration, StaticSource};
pub use text::{bodies_match, character_diff, normalize_line_endings};
