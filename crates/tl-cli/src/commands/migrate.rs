//! Migrate command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use tl_core::Steps;
use tl_migrate::{Migrate, StatusReport};
use tl_source::{timestamp_version, NewMigration, Squash};

use crate::cli::{
    ApplyArgs, CreateArgs, DropArgs, ForceArgs, GlobalArgs, MigrateArgs, MigrateCommands,
    SquashArgs, StatusArgs, StatusOutput,
};
use crate::commands::common::{close_after, print_steps};
use crate::context::RuntimeContext;

/// Execute a migrate subcommand
pub(crate) async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    // Authoring commands only touch the migrations directory
    match &args.command {
        MigrateCommands::Create(create) => return execute_create(&ctx, create),
        MigrateCommands::Squash(squash) => return execute_squash(&ctx, squash),
        _ => {}
    }

    // Validate drop confirmation before connecting
    if let MigrateCommands::Drop(DropArgs { yes: false }) = &args.command {
        anyhow::bail!("Refusing to drop every object on the target without --yes");
    }

    let migrate = ctx.open_migrate().await?;
    let result = match &args.command {
        MigrateCommands::Apply(apply) => execute_apply(&migrate, apply).await,
        MigrateCommands::Status(status) => execute_status(&migrate, status).await,
        MigrateCommands::Force(force) => execute_force(&migrate, force).await,
        MigrateCommands::Drop(_) => execute_drop(&migrate).await,
        // Handled before connecting
        MigrateCommands::Create(_) | MigrateCommands::Squash(_) => Ok(()),
    };
    close_after(migrate, result).await
}

async fn execute_apply(migrate: &Migrate, args: &ApplyArgs) -> Result<()> {
    let steps = if let Some(up) = &args.up {
        let steps = Steps::parse(Some(up))?;
        migrate.up(steps).await.context("Migrating up failed")?
    } else if let Some(down) = &args.down {
        let steps = Steps::parse(Some(down))?;
        migrate.down(steps).await.context("Migrating down failed")?
    } else if let Some(version) = args.goto {
        migrate
            .goto(version)
            .await
            .with_context(|| format!("Migrating to version {version} failed"))?
    } else {
        anyhow::bail!("One of --up, --down or --goto is required");
    };

    print_steps(&steps);
    println!("Version: {}", migrate.version().await?);
    Ok(())
}

async fn execute_force(migrate: &Migrate, args: &ForceArgs) -> Result<()> {
    migrate
        .force(args.version)
        .await
        .with_context(|| format!("Failed to force version {}", args.version))?;
    println!("Version forced to {}", migrate.version().await?);
    Ok(())
}

async fn execute_drop(migrate: &Migrate) -> Result<()> {
    let steps = migrate.drop_all().await.context("Drop failed")?;
    print_steps(&steps);
    println!("Target dropped.");
    Ok(())
}

fn execute_create(ctx: &RuntimeContext, args: &CreateArgs) -> Result<()> {
    let up = match &args.sql_from_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => args.up_sql.clone().unwrap_or_default(),
    };
    let down = if args.irreversible {
        None
    } else {
        Some(args.down_sql.clone().unwrap_or_default())
    };
    let version = args.timestamp.unwrap_or_else(timestamp_version);
    let migration = NewMigration::new(version, args.name.as_str())
        .with_up(up)
        .with_down(down);

    let dir = ctx.config.migrations_path(&ctx.root);
    let path = tl_source::create(&dir, &migration)
        .with_context(|| format!("Failed to create migration '{}'", args.name))?;
    println!("Created migration {} ({})", migration.version, path.display());
    Ok(())
}

fn execute_squash(ctx: &RuntimeContext, args: &SquashArgs) -> Result<()> {
    let options = Squash {
        from: args.from,
        version: args.timestamp.unwrap_or_else(timestamp_version),
        name: args.name.clone(),
        delete_source: args.delete_source,
    };
    let dir = ctx.config.migrations_path(&ctx.root);
    let squashed = tl_source::squash(&dir, &options)
        .with_context(|| format!("Failed to squash migrations from {}", args.from))?;

    println!(
        "Squashed {} migrations into {} ({})",
        squashed.versions.len(),
        options.version,
        squashed.path.display()
    );
    if !squashed.reversible {
        println!("At least one squashed migration had no down step; the result cannot be reverted.");
    }
    println!(
        "On targets that already applied these versions, run `tl migrate force {}`.",
        options.version
    );
    Ok(())
}

/// One row of `tl migrate status`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct StatusRow {
    pub version: u64,
    pub name: String,
    pub status: &'static str,
    pub present_in_source: bool,
}

/// Status of a single entry as shown to the user
fn row_status(applied: bool, dirty: bool, present_in_source: bool) -> &'static str {
    match (dirty, applied, present_in_source) {
        (true, _, _) => "dirty",
        (false, true, true) => "applied",
        (false, true, false) => "applied (missing file)",
        (false, false, _) => "pending",
    }
}

pub(crate) fn status_rows(report: &StatusReport) -> Vec<StatusRow> {
    report
        .entries
        .iter()
        .map(|entry| StatusRow {
            version: entry.version,
            name: entry.name.clone().unwrap_or_default(),
            status: row_status(entry.applied, entry.dirty, entry.present_in_source),
            present_in_source: entry.present_in_source,
        })
        .collect()
}

async fn execute_status(migrate: &Migrate, args: &StatusArgs) -> Result<()> {
    let report = migrate.status().await?;
    let rows = status_rows(&report);

    match args.output {
        StatusOutput::Json => {
            let doc = serde_json::json!({
                "version": report.ledger.version(),
                "dirty": report.is_dirty(),
                "migrations": rows,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        StatusOutput::Table => {
            if rows.is_empty() {
                println!("No migrations found.");
            } else {
                let width = rows
                    .iter()
                    .map(|r| r.version.to_string().len())
                    .max()
                    .unwrap_or(0)
                    .max("VERSION".len());
                let name_width = rows
                    .iter()
                    .map(|r| r.name.len())
                    .max()
                    .unwrap_or(0)
                    .max("NAME".len());
                println!("{:<width$}  {:<name_width$}  STATUS", "VERSION", "NAME");
                for row in &rows {
                    println!(
                        "{:<width$}  {:<name_width$}  {}",
                        row.version, row.name, row.status
                    );
                }
            }
            println!("\nDatabase version: {}", report.ledger);
            if report.is_dirty() {
                println!(
                    "The last migration failed part-way. Fix the target, then run `tl migrate force <version>`."
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
