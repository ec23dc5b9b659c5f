//! Migration sources.
//!
//! A source supplies the full set of migration files, ordered by name. The
//! reconciler only sees [`SourceMigration`] values, so where the files come
//! from (compiled into the binary, a directory on disk, a literal list) is
//! decided by the caller.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MigrateResult, MigrationError};

/// File extension of migration files.
pub const MIGRATION_EXTENSION: &str = "sql";

/// A migration file as found in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMigration {
    /// Migration name (the filename, extension included).
    pub name: String,
    /// SQL body.
    pub body: String,
}

impl SourceMigration {
    /// Create a new source migration.
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

/// Supplier of migration files.
#[async_trait::async_trait]
pub trait MigrationSource: Send + Sync {
    /// Load every migration, sorted by name.
    async fn load(&self) -> MigrateResult<Vec<SourceMigration>>;
}

#[async_trait::async_trait]
impl<T: MigrationSource + ?Sized> MigrationSource for Box<T> {
    async fn load(&self) -> MigrateResult<Vec<SourceMigration>> {
        (**self).load().await
    }
}

/// Sort migrations by name and reject empty or duplicate names.
pub fn prepare(mut migrations: Vec<SourceMigration>) -> MigrateResult<Vec<SourceMigration>> {
    migrations.sort_by(|a, b| a.name.cmp(&b.name));

    if migrations.iter().any(|m| m.name.is_empty()) {
        return Err(MigrationError::invalid("migration with an empty name"));
    }

    if let Some(pair) = migrations.windows(2).find(|w| w[0].name == w[1].name) {
        return Err(MigrationError::invalid(format!(
            "duplicate migration name: {}",
            pair[0].name
        )));
    }

    Ok(migrations)
}

fn is_migration_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext == MIGRATION_EXTENSION)
}

/// A fixed, in-memory list of migrations.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    migrations: Vec<SourceMigration>,
}

impl StaticSource {
    /// Create a source from a list of migrations.
    pub fn new(migrations: Vec<SourceMigration>) -> Self {
        Self { migrations }
    }

    /// Create a source from `(name, body)` pairs.
    pub fn from_pairs<N, B>(pairs: impl IntoIterator<Item = (N, B)>) -> Self
    where
        N: Into<String>,
        B: Into<String>,
    {
        Self {
            migrations: pairs
                .into_iter()
                .map(|(name, body)| SourceMigration::new(name, body))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl MigrationSource for StaticSource {
    async fn load(&self) -> MigrateResult<Vec<SourceMigration>> {
        prepare(self.migrations.clone())
    }
}

/// Migrations read from `*.sql` files in a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    /// Create a source reading from the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the migrations directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait::async_trait]
impl MigrationSource for DirSource {
    async fn load(&self) -> MigrateResult<Vec<SourceMigration>> {
        if !self.dir.is_dir() {
            return Err(MigrationError::source(format!(
                "migrations directory does not exist: {}",
                self.dir.display()
            )));
        }

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut migrations = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                return Err(MigrationError::source(format!(
                    "migration filename is not valid UTF-8: {}",
                    entry.path().display()
                )));
            };

            if !is_migration_file(name) {
                continue;
            }

            let body = tokio::fs::read_to_string(entry.path()).await.map_err(|e| {
                MigrationError::source(format!("can't read migration file {}: {}", name, e))
            })?;

            migrations.push(SourceMigration::new(name, body));
        }

        debug!(
            dir = %self.dir.display(),
            count = migrations.len(),
            "Loaded migrations from directory"
        );
        prepare(migrations)
    }
}

/// Migrations compiled into the executable with `rust-embed`.
///
/// Only top-level `*.sql` files of the embedded folder are used.
pub struct EmbeddedSource<E> {
    _assets: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> EmbeddedSource<E> {
    /// Create a source over the embedded folder `E`.
    pub fn new() -> Self {
        Self {
            _assets: PhantomData,
        }
    }
}

impl<E: RustEmbed> Default for EmbeddedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<E: RustEmbed + 'static> MigrationSource for EmbeddedSource<E> {
    async fn load(&self) -> MigrateResult<Vec<SourceMigration>> {
        let mut migrations = Vec::new();

        for path in E::iter() {
            if path.contains('/') || !is_migration_file(&path) {
                continue;
            }

            let file = E::get(&path).ok_or_else(|| {
                MigrationError::source(format!("can't read migration file {}", path))
            })?;
            let body = String::from_utf8(file.data.into_owned()).map_err(|_| {
                MigrationError::source(format!("migration file {} is not valid UTF-8", path))
            })?;

            migrations.push(SourceMigration::new(path.into_owned(), body));
        }

        debug!(count = migrations.len(), "Loaded embedded migrations");
        prepare(migrations)
    }
}
