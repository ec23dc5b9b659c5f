//! PostgreSQL row deserialization.

use chrono::{DateTime, Utc};
use strata_migrate::MigrationRecord;
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

use crate::error::{PgError, PgResult};

/// Extension trait for PostgreSQL rows.
pub trait PgRow {
    /// Get a column value by name.
    fn get_value<T>(&self, column: &str) -> PgResult<T>
    where
        T: for<'a> FromSql<'a>;
}

impl PgRow for Row {
    fn get_value<T>(&self, column: &str) -> PgResult<T>
    where
        T: for<'a> FromSql<'a>,
    {
        self.try_get(column).map_err(|e| {
            PgError::deserialization(format!("failed to get column '{}': {}", column, e))
        })
    }
}

/// Trait for deserializing a PostgreSQL row into a type.
pub trait FromPgRow: Sized {
    /// Deserialize from a PostgreSQL row.
    fn from_row(row: &Row) -> PgResult<Self>;
}

// Implements `FromPgRow` for a struct whose columns match its field names.
macro_rules! impl_from_row {
    ($type:ident { $($field:ident : $field_type:ty),* $(,)? }) => {
        impl FromPgRow for $type {
            fn from_row(row: &Row) -> PgResult<Self> {
                Ok(Self {
                    $(
                        $field: row.get_value::<$field_type>(stringify!($field))?,
                    )*
                })
            }
        }
    };
}

impl_from_row!(MigrationRecord {
    id: i64,
    created_at: DateTime<Utc>,
    name: String,
    body: String,
});
