//! `strata status` command - Show applied and pending migrations.

use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, style_pending, style_success};

/// Run the status command
pub async fn run(ctx: &Context) -> CliResult<()> {
    output::header("Migration Status");

    let pg = ctx.pg_config()?;
    output::kv("Database", &pg.redacted_url());
    output::kv("Table", &ctx.config.migrations.table);
    output::kv("Migrations", &ctx.source_label());
    output::newline();

    let plan = ctx.reconciler().await?.plan().await?;

    if plan.applied.is_empty() && plan.pending.is_empty() {
        output::info("No migrations found.");
        return Ok(());
    }

    output::section("Migrations");
    for name in &plan.applied {
        output::list_item(&format!("{} {}", style_success("applied"), name));
    }
    for name in plan.pending_names() {
        output::list_item(&format!("{} {}", style_pending("pending"), name));
    }

    output::newline();
    output::dim(&plan.summary());

    Ok(())
}
