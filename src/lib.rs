//! # Strata
//!
//! Ordered, drift-checked SQL migrations for PostgreSQL.
//!
//! Strata provides:
//! - A reconciler that verifies applied migrations against their source and
//!   applies the rest in name order, one transaction per file
//! - Migration sources for embedded files, directories and literal lists
//! - A PostgreSQL store that keeps applied migrations in the target database
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strata::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PgConfig::from_url("postgresql://localhost/mydb")?;
//!     let store = PgMigrationStore::connect(&config).await?;
//!
//!     let report = Reconciler::new(store, DirSource::new("migrations"))
//!         .run()
//!         .await?;
//!     println!("{}", report.summary());
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Engine-agnostic reconciliation core.
pub mod migrate {
    pub use strata_migrate::*;
}

/// PostgreSQL store.
#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub mod postgres {
    pub use strata_postgres::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use strata_migrate::{
        DirSource, EmbeddedSource, MigrateResult, MigrationError, MigrationRecord,
        MigrationSource, MigrationStore, ReconcileReport, Reconciler, SourceMigration,
        StaticSource,
    };

    #[cfg(feature = "postgres")]
    pub use strata_postgres::{PgConfig, PgMigrationStore};
}

// Re-export key types at the crate root
pub use strata_migrate::{MigrationError, Reconciler};
