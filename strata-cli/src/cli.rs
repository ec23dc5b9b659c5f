//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Strata - ordered, drift-checked SQL migrations for PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version)]
#[command(
    about = "Strata - ordered, drift-checked SQL migrations for PostgreSQL",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "STRATA_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Read migrations from this directory instead of the bundled set
    #[arg(long, global = true, value_name = "DIR")]
    pub migrations_dir: Option<PathBuf>,

    /// Subcommand to execute (defaults to `up`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Verify applied migrations and apply pending ones
    Up(UpArgs),

    /// Verify applied migrations and list pending ones without applying
    Status,

    /// Display version information
    Version,
}

impl Default for Command {
    fn default() -> Self {
        Self::Up(UpArgs::default())
    }
}

/// Arguments for the `up` command
#[derive(Args, Debug, Clone, Default)]
pub struct UpArgs {
    /// List pending migrations without applying them
    #[arg(long)]
    pub dry_run: bool,
}
