//! Migrations compiled into the `strata` binary.

use rust_embed::RustEmbed;
use strata_migrate::EmbeddedSource;

/// The `migrations/` folder of this crate, embedded at build time.
#[derive(RustEmbed)]
#[folder = "migrations/"]
pub struct BundledMigrations;

/// Source over the bundled migrations.
pub fn source() -> EmbeddedSource<BundledMigrations> {
    EmbeddedSource::new()
}
