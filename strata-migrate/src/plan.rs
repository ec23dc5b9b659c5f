//! Prefix verification of applied records against the source.

use crate::error::{MigrateResult, MigrationError};
use crate::history::MigrationRecord;
use crate::source::SourceMigration;
use crate::text::{bodies_match, character_diff, normalize_line_endings};

/// Outcome of a successful verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Names of migrations already applied, in order.
    pub applied: Vec<String>,
    /// Source migrations still to apply, in order.
    pub pending: Vec<SourceMigration>,
}

impl MigrationPlan {
    /// Check if the database is up to date.
    pub fn is_up_to_date(&self) -> bool {
        self.pending.is_empty()
    }

    /// Names of the pending migrations.
    pub fn pending_names(&self) -> Vec<&str> {
        self.pending.iter().map(|m| m.name.as_str()).collect()
    }

    /// Get a summary of the plan.
    pub fn summary(&self) -> String {
        if self.is_up_to_date() {
            format!("{} applied, up to date", self.applied.len())
        } else {
            format!(
                "{} applied, {} pending",
                self.applied.len(),
                self.pending.len()
            )
        }
    }
}

/// Verify that `applied` is a prefix of `source` and split off the pending suffix.
///
/// Both slices must be sorted by name. At every shared position the names
/// must be equal and the bodies must match after line-ending normalization.
/// Any mismatch is a drift error and no plan is produced.
pub fn verify(
    applied: &[MigrationRecord],
    mut source: Vec<SourceMigration>,
) -> MigrateResult<MigrationPlan> {
    for (i, record) in applied.iter().enumerate() {
        let Some(file) = source.get(i) else {
            return Err(MigrationError::Removed {
                name: record.name.clone(),
            });
        };

        if file.name != record.name {
            if source.iter().any(|m| m.name == record.name) {
                return Err(MigrationError::OutOfOrder {
                    applied: record.name.clone(),
                    found: file.name.clone(),
                });
            }
            return Err(MigrationError::Removed {
                name: record.name.clone(),
            });
        }

        if !bodies_match(&record.body, &file.body) {
            let diff = character_diff(
                &normalize_line_endings(&record.body),
                &normalize_line_endings(&file.body),
            );
            return Err(MigrationError::Changed {
                name: record.name.clone(),
                diff,
            });
        }
    }

    let pending = source.split_off(applied.len());

    Ok(MigrationPlan {
        applied: applied.iter().map(|r| r.name.clone()).collect(),
        pending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(id: i64, name: &str, body: &str) -> MigrationRecord {
        MigrationRecord::new(id, &SourceMigration::new(name, body))
    }

    fn file(name: &str, body: &str) -> SourceMigration {
        SourceMigration::new(name, body)
    }

    #[test]
    fn test_verify_empty_history() {
        let plan = verify(&[], vec![file("001_init", "CREATE TABLE t(x int);")]).unwrap();

        assert!(plan.applied.is_empty());
        assert_eq!(plan.pending_names(), vec!["001_init"]);
    }

    #[test]
    fn test_verify_pending_suffix() {
        let applied = [record(1, "001_init", "CREATE TABLE t(x int);")];
        let source = vec![
            file("001_init", "CREATE TABLE t(x int);"),
            file("002_add", "ALTER TABLE t ADD y int;"),
        ];

        let plan = verify(&applied, source).unwrap();

        assert_eq!(plan.applied, vec!["001_init".to_string()]);
        assert_eq!(plan.pending_names(), vec!["002_add"]);
        assert_eq!(plan.summary(), "1 applied, 1 pending");
    }

    #[test]
    fn test_verify_up_to_date() {
        let applied = [record(1, "001_init", "SELECT 1;")];
        let plan = verify(&applied, vec![file("001_init", "SELECT 1;")]).unwrap();

        assert!(plan.is_up_to_date());
        assert_eq!(plan.summary(), "1 applied, up to date");
    }

    #[test]
    fn test_verify_changed() {
        let applied = [record(1, "001_init", "CREATE TABLE t(x int);")];
        let err = verify(&applied, vec![file("001_init", "CREATE TABLE t(y int);")]).unwrap_err();

        match err {
            MigrationError::Changed { name, diff } => {
                assert_eq!(name, "001_init");
                assert_eq!(diff, "CREATE TABLE t([-x-]{+y+} int);");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_verify_ignores_line_endings() {
        let applied = [record(1, "001_init", "SELECT 1;\r\nSELECT 2;\r\n")];
        let plan = verify(&applied, vec![file("001_init", "SELECT 1;\nSELECT 2;\n")]).unwrap();
        assert!(plan.is_up_to_date());
    }

    #[test]
    fn test_verify_removed_tail() {
        let applied = [record(1, "001_init", "a"), record(2, "002_add", "b")];
        let err = verify(&applied, vec![file("001_init", "a")]).unwrap_err();

        assert!(matches!(err, MigrationError::Removed { ref name } if name == "002_add"));
    }

    #[test]
    fn test_verify_removed_in_middle() {
        let applied = [record(1, "001_init", "a"), record(2, "002_add", "b")];
        let source = vec![file("001_init", "a"), file("003_more", "c")];

        let err = verify(&applied, source).unwrap_err();
        assert!(matches!(err, MigrationError::Removed { ref name } if name == "002_add"));
    }

    #[test]
    fn test_verify_out_of_order() {
        let applied = [record(1, "002_add", "b")];
        let source = vec![file("001_early", "a"), file("002_add", "b")];

        let err = verify(&applied, source).unwrap_err();
        match err {
            MigrationError::OutOfOrder { applied, found } => {
                assert_eq!(applied, "002_add");
                assert_eq!(found, "001_early");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
