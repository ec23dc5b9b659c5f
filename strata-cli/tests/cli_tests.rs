//! Integration tests for the strata CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use strata_postgres::{PgConfig, PgConnection};
use tempfile::TempDir;

/// Get the strata binary
#[allow(deprecated)]
fn strata_cmd() -> Command {
    let mut cmd = Command::cargo_bin("strata").unwrap();
    cmd.env_remove("STRATA_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.yaml");
    fs::write(&path, content).unwrap();
    path
}

const UNREACHABLE_CONFIG: &str = r#"
logLevel: error
database:
  name: strata
  host: 127.0.0.1
  port: 1
  user: postgres
  password: postgres
  connectTimeout: 2
"#;

#[test]
fn test_help_command() {
    strata_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Strata"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("version"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--migrations-dir"));
}

#[test]
fn test_up_help() {
    strata_cmd()
        .args(["up", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_version_command() {
    strata_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_does_not_need_config() {
    strata_cmd()
        .args(["--config", "/nonexistent/config.yaml", "version"])
        .assert()
        .success();
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.yaml");

    strata_cmd()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("can't read config file"));
}

#[test]
fn test_config_path_from_env() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("from-env.yaml");

    strata_cmd()
        .env("STRATA_CONFIG", &path)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("from-env.yaml"));
}

#[test]
fn test_invalid_log_level() {
    let dir = TempDir::new().unwrap();
    let config = UNREACHABLE_CONFIG.replace("logLevel: error", "logLevel: loud");
    let path = write_config(&dir, &config);

    strata_cmd()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("logLevel"));
}

#[test]
fn test_port_out_of_range() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &UNREACHABLE_CONFIG.replace("port: 1", "port: 70000"));

    strata_cmd()
        .args(["up", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("database.port"));
}

#[test]
fn test_missing_required_key() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, &UNREACHABLE_CONFIG.replace("  user: postgres\n", ""));

    strata_cmd()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_unreachable_database() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, UNREACHABLE_CONFIG);

    strata_cmd()
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Database error"))
        .stdout(predicate::str::contains("Applied migrations").not());
}

/// Config for the server in `STRATA_TEST_DATABASE_URL`, if set.
fn live_config(table: &str) -> Option<(PgConfig, String)> {
    let url = std::env::var("STRATA_TEST_DATABASE_URL").ok()?;
    let pg = PgConfig::from_url(url).expect("STRATA_TEST_DATABASE_URL must be a valid URL");
    let yaml = format!(
        "logLevel: error\n\
         database:\n  name: {}\n  host: {}\n  port: {}\n  user: {}\n  password: {}\n\
         migrations:\n  table: {}\n",
        pg.database,
        pg.host,
        pg.port,
        pg.user,
        pg.password.as_deref().unwrap_or("postgres"),
        table
    );
    Some((pg, yaml))
}

fn live_query(pg: &PgConfig, sql: &str) -> usize {
    tokio::runtime::Runtime::new().unwrap().block_on(async {
        let conn = PgConnection::connect(pg).await.unwrap();
        conn.query(sql, &[]).await.unwrap().len()
    })
}

#[test]
fn test_up_and_status_against_live_database() {
    let prefix = format!("strata_cli_{}", std::process::id());
    let table = format!("{}_records", prefix);
    let Some((pg, yaml)) = live_config(&table) else {
        return;
    };

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &yaml);
    let migrations = dir.path().join("sql");
    fs::create_dir(&migrations).unwrap();
    fs::write(
        migrations.join("0001_accounts.sql"),
        format!("CREATE TABLE {}_accounts (id INT);", prefix),
    )
    .unwrap();
    fs::write(
        migrations.join("0002_seed.sql"),
        format!("INSERT INTO {}_accounts VALUES (1);", prefix),
    )
    .unwrap();

    let run = |command: &str| {
        let mut cmd = strata_cmd();
        cmd.arg("--config")
            .arg(&config)
            .arg("--migrations-dir")
            .arg(&migrations)
            .arg(command);
        cmd
    };

    run("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 applied, 2 pending"));
    let table_rows = format!("SELECT 1 FROM pg_tables WHERE tablename = '{}'", table);
    assert_eq!(live_query(&pg, &table_rows), 0);

    run("up")
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied migrations"))
        .stdout(predicate::str::contains("0001_accounts.sql"))
        .stdout(predicate::str::contains("0002_seed.sql"));

    run("up")
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"))
        .stdout(predicate::str::contains("Applied migrations").not());

    run("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 applied, up to date"));

    assert_eq!(live_query(&pg, &format!("SELECT id FROM {}_accounts", prefix)), 1);
    live_query(
        &pg,
        &format!("DROP TABLE IF EXISTS {}_accounts, \"{}\"", prefix, table),
    );
}

#[test]
fn test_changed_migration_against_live_database() {
    let prefix = format!("strata_cli_changed_{}", std::process::id());
    let table = format!("{}_records", prefix);
    let Some((pg, yaml)) = live_config(&table) else {
        return;
    };

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &yaml);
    let migrations = dir.path().join("sql");
    fs::create_dir(&migrations).unwrap();
    fs::write(migrations.join("0001_noop.sql"), "SELECT 1;").unwrap();

    let up = || {
        let mut cmd = strata_cmd();
        cmd.arg("--config")
            .arg(&config)
            .arg("--migrations-dir")
            .arg(&migrations)
            .arg("up");
        cmd
    };

    up().assert().success();
    fs::write(migrations.join("0001_noop.sql"), "SELECT 2;").unwrap();
    up().assert()
        .failure()
        .stderr(predicate::str::contains("0001_noop.sql"))
        .stderr(predicate::str::contains("[-1-]"))
        .stderr(predicate::str::contains("{+2+}"));

    live_query(&pg, &format!("DROP TABLE IF EXISTS \"{}\"", table));
}
