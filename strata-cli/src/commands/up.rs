//! `strata up` command - Verify history and apply pending migrations.

use crate::cli::UpArgs;
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, success};

/// Run the up command
pub async fn run(ctx: &Context, args: UpArgs) -> CliResult<()> {
    output::header("Migrate Up");

    let pg = ctx.pg_config()?;
    output::kv("Database", &pg.redacted_url());
    output::kv("Migrations", &ctx.source_label());
    output::newline();

    let mut reconciler = ctx.reconciler().await?;

    if args.dry_run {
        let plan = reconciler.plan().await?;
        if plan.is_up_to_date() {
            success("No new migrations, database is up to date");
            return Ok(());
        }

        output::section(&format!("{} pending migrations:", plan.pending.len()));
        for name in plan.pending_names() {
            output::list_item(name);
        }
        output::newline();
        output::info("Dry run, nothing was applied");
        return Ok(());
    }

    let report = reconciler.run().await?;
    if report.is_up_to_date() {
        success(&report.summary());
        return Ok(());
    }

    output::section("Applied migrations:");
    let total = report.applied.len();
    for (index, name) in report.applied.iter().enumerate() {
        output::step(index + 1, total, name);
    }
    output::newline();
    success(&report.summary());

    Ok(())
}
