//! CLI configuration handling.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use strata_postgres::{DEFAULT_TABLE, PgConfig};

use crate::error::{CliError, CliResult};

/// Application name reported to the server.
pub const APPLICATION_NAME: &str = "strata";

/// Strata configuration file.
///
/// ```yaml
/// logLevel: info
/// database:
///   name: app
///   host: localhost
///   port: 5432
///   user: postgres
///   password: secret
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Log verbosity.
    pub log_level: LogLevel,

    /// Target database.
    pub database: DatabaseConfig,

    /// Migration settings.
    #[serde(default)]
    pub migrations: MigrationConfig,
}

impl Config {
    /// Load and validate configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("can't read config file {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> CliResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required values and ranges
    pub fn validate(&self) -> CliResult<()> {
        let db = &self.database;
        let required = [
            ("database.name", &db.name),
            ("database.host", &db.host),
            ("database.user", &db.user),
            ("database.password", &db.password),
        ];
        for (key, value) in required {
            if value.is_empty() {
                return Err(CliError::Config(format!("'{}' is required", key)));
            }
        }

        if !(1..=65535).contains(&db.port) {
            return Err(CliError::Config(format!(
                "'database.port' must be between 1 and 65535, got {}",
                db.port
            )));
        }

        if self.migrations.table.is_empty() {
            return Err(CliError::Config("'migrations.table' must not be empty".into()));
        }

        Ok(())
    }

    /// PostgreSQL connection settings for the target database
    pub fn to_pg_config(&self) -> CliResult<PgConfig> {
        let db = &self.database;
        let port = u16::try_from(db.port).map_err(|_| {
            CliError::Config(format!("'database.port' out of range: {}", db.port))
        })?;

        let mut builder = PgConfig::builder()
            .host(&db.host)
            .port(port)
            .database(&db.name)
            .user(&db.user)
            .password(&db.password)
            .application_name(APPLICATION_NAME);

        if let Some(secs) = db.connect_timeout {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(ms) = db.statement_timeout {
            builder = builder.statement_timeout(Duration::from_millis(ms));
        }

        Ok(builder.build()?)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    /// Database name
    pub name: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: i64,

    /// Username
    pub user: String,

    /// Password
    pub password: String,

    /// Connection timeout in seconds
    #[serde(default)]
    pub connect_timeout: Option<u64>,

    /// Statement timeout in milliseconds
    #[serde(default)]
    pub statement_timeout: Option<u64>,
}

/// Migration configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Table holding applied migration records
    pub table: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

/// Log verbosity, from least to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Panic,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// All levels, in order.
    pub const ALL: [LogLevel; 7] = [
        Self::Panic,
        Self::Fatal,
        Self::Error,
        Self::Warn,
        Self::Info,
        Self::Debug,
        Self::Trace,
    ];

    /// Name as written in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Panic => "panic",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Matching `tracing` filter directive.
    ///
    /// `tracing` has no levels above error, so panic and fatal map to error.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Self::Panic | Self::Fatal | Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| {
                let available: Vec<_> = Self::ALL.iter().map(|l| l.as_str()).collect();
                format!(
                    "invalid 'logLevel' value '{}', available values: {}",
                    s,
                    available.join(", ")
                )
            })
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}
