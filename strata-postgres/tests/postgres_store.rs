//! Integration tests against a live PostgreSQL server.
//!
//! Skipped unless `STRATA_TEST_DATABASE_URL` points at a database the tests
//! may create and drop tables in.

use pretty_assertions::assert_eq;
use strata_migrate::{MigrationError, MigrationStore, Reconciler, SourceMigration, StaticSource};
use strata_postgres::{PgConfig, PgConnection, PgMigrationStore};

fn test_config() -> Option<PgConfig> {
    let url = std::env::var("STRATA_TEST_DATABASE_URL").ok()?;
    Some(PgConfig::from_url(url).expect("STRATA_TEST_DATABASE_URL must be a valid URL"))
}

fn unique_prefix(test: &str) -> String {
    format!("strata_{}_{}", test, std::process::id())
}

async fn drop_tables(config: &PgConfig, tables: &[String]) {
    let conn = PgConnection::connect(config).await.unwrap();
    for table in tables {
        conn.batch_execute(&format!("DROP TABLE IF EXISTS \"{}\"", table))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_applies_pending_and_records_bodies() {
    let Some(config) = test_config() else {
        return;
    };
    let prefix = unique_prefix("apply");
    let records_table = format!("{}_records", prefix);
    let data_table = format!("{}_accounts", prefix);

    let source = StaticSource::from_pairs([
        (
            "0001_create.sql",
            format!("CREATE TABLE {} (id INT PRIMARY KEY);", data_table),
        ),
        (
            "0002_insert.sql",
            format!(
                "INSERT INTO {} VALUES (1); INSERT INTO {} VALUES (2);",
                data_table, data_table
            ),
        ),
    ]);

    let store = PgMigrationStore::connect_with_table(&config, &records_table)
        .await
        .unwrap();
    let mut reconciler = Reconciler::new(store, source);

    let report = reconciler.run().await.unwrap();
    assert_eq!(report.applied, vec!["0001_create.sql", "0002_insert.sql"]);

    let second = reconciler.run().await.unwrap();
    assert!(second.is_up_to_date());

    let mut store = reconciler.into_store();
    let records = store.applied().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "0001_create.sql");
    assert!(records[0].id < records[1].id);

    let rows = store
        .connection()
        .query(&format!("SELECT id FROM {}", data_table), &[])
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    drop_tables(&config, &[data_table, records_table]).await;
}

#[tokio::test]
async fn test_failed_body_leaves_no_record() {
    let Some(config) = test_config() else {
        return;
    };
    let prefix = unique_prefix("rollback");
    let records_table = format!("{}_records", prefix);
    let data_table = format!("{}_items", prefix);

    let mut store = PgMigrationStore::connect_with_table(&config, &records_table)
        .await
        .unwrap();
    store.initialize().await.unwrap();

    let broken = SourceMigration::new(
        "0001_broken.sql",
        format!("CREATE TABLE {} (id INT); SELEC 1;", data_table),
    );
    let err = store.apply(&broken).await.unwrap_err();
    assert!(matches!(err, MigrationError::Execution { ref name, .. } if name == "0001_broken.sql"));

    assert!(store.applied().await.unwrap().is_empty());
    let rows = store
        .connection()
        .query("SELECT 1 FROM pg_tables WHERE tablename = $1", &[&data_table])
        .await
        .unwrap();
    assert!(rows.is_empty());

    drop_tables(&config, &[records_table]).await;
}

#[tokio::test]
async fn test_changed_migration_is_rejected() {
    let Some(config) = test_config() else {
        return;
    };
    let records_table = format!("{}_records", unique_prefix("changed"));

    let store = PgMigrationStore::connect_with_table(&config, &records_table)
        .await
        .unwrap();
    let source = StaticSource::from_pairs([("0001_a.sql", "SELECT 1;")]);
    let mut reconciler = Reconciler::new(store, source);
    reconciler.run().await.unwrap();

    let store = reconciler.into_store();
    let source = StaticSource::from_pairs([("0001_a.sql", "SELECT 2;")]);
    let mut reconciler = Reconciler::new(store, source);
    let err = reconciler.run().await.unwrap_err();
    match err {
        MigrationError::Changed { name, diff } => {
            assert_eq!(name, "0001_a.sql");
            assert_eq!(diff, "SELECT [-1-]{+2+};");
        }
        other => panic!("expected changed error, got {other}"),
    }

    drop_tables(&config, &[records_table]).await;
}

#[tokio::test]
async fn test_history_order_ignores_database_collation() {
    let Some(config) = test_config() else {
        return;
    };
    let records_table = format!("{}_records", unique_prefix("collation"));
    let names = ["a_x.sql", "0001_init.sql", "A_x.sql", "0001-extra.sql"];
    let source = || StaticSource::from_pairs(names.map(|name| (name, "SELECT 1;")));

    let store = PgMigrationStore::connect_with_table(&config, &records_table)
        .await
        .unwrap();
    let mut reconciler = Reconciler::new(store, source());
    let report = reconciler.run().await.unwrap();
    assert_eq!(
        report.applied,
        vec!["0001-extra.sql", "0001_init.sql", "A_x.sql", "a_x.sql"]
    );

    let store = reconciler.into_store();
    let mut reconciler = Reconciler::new(store, source());
    assert!(reconciler.run().await.unwrap().is_up_to_date());

    let mut store = reconciler.into_store();
    let applied: Vec<_> = store
        .applied()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(applied, report.applied);

    drop_tables(&config, &[records_table]).await;
}

#[tokio::test]
async fn test_plan_does_not_create_table() {
    let Some(config) = test_config() else {
        return;
    };
    let records_table = format!("{}_records", unique_prefix("plan"));

    let store = PgMigrationStore::connect_with_table(&config, &records_table)
        .await
        .unwrap();
    let source = StaticSource::from_pairs([("0001_a.sql", "SELECT 1;")]);
    let mut reconciler = Reconciler::new(store, source);

    let plan = reconciler.plan().await.unwrap();
    assert_eq!(plan.pending_names(), vec!["0001_a.sql"]);

    let mut store = reconciler.into_store();
    assert!(!store.exists().await.unwrap());
    store.initialize().await.unwrap();
    assert!(store.exists().await.unwrap());

    drop_tables(&config, &[records_table]).await;
}

#[tokio::test]
async fn test_unreachable_server_is_store_error() {
    let config = PgConfig::builder()
        .host("127.0.0.1")
        .port(1)
        .database("strata")
        .connect_timeout(std::time::Duration::from_secs(2))
        .build()
        .unwrap();

    let err = PgMigrationStore::connect(&config).await.err().unwrap();
    assert!(err.is_connection_error());
    let err: MigrationError = err.into();
    assert!(matches!(err, MigrationError::Store(_)));
}
