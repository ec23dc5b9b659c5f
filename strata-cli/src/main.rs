//! Strata CLI - ordered, drift-checked SQL migrations for PostgreSQL.

use clap::Parser;
use miette::Diagnostic;
use tracing::instrument::WithSubscriber;

use strata_cli::cli::{Cli, Command};
use strata_cli::commands::{self, Context};
use strata_cli::config::Config;
use strata_cli::error::CliResult;
use strata_cli::{logging, output};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::newline();
        output::error(&e.to_string());
        if let Some(diff) = e.diff() {
            output::diff(diff);
        }
        if let Some(help) = e.help() {
            output::dim(&help.to_string());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let command = cli.command.unwrap_or_default();

    // Version needs neither config nor database
    if let Command::Version = command {
        return commands::version::run().await;
    }

    let config = Config::load(&cli.config)?;
    let dispatch = logging::dispatch(config.log_level);
    let ctx = Context::new(config, cli.migrations_dir);

    commands::run(command, &ctx).with_subscriber(dispatch).await
}
