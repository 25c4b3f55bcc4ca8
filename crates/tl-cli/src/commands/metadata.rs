//! Metadata command implementation

use anyhow::{Context, Result};
use tl_metadata::PluginRegistry;
use tl_migrate::Migrate;

use crate::cli::{GlobalArgs, MetadataArgs, MetadataCommands};
use crate::commands::common::close_after;
use crate::context::RuntimeContext;

/// Execute a metadata subcommand
pub(crate) async fn execute(args: &MetadataArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    // Scaffolding only touches local files
    if args.command == MetadataCommands::Init {
        return init_files(&ctx.plugins()?);
    }

    let migrate = ctx.open_migrate().await?;
    let result = run(&migrate, args.command).await;
    close_after(migrate, result).await
}

fn init_files(plugins: &PluginRegistry) -> Result<()> {
    plugins
        .create_files()
        .context("Failed to create metadata files")?;
    println!("Metadata files ready ({} plugins).", plugins.len());
    Ok(())
}

async fn run(migrate: &Migrate, command: MetadataCommands) -> Result<()> {
    match command {
        MetadataCommands::Apply => {
            migrate
                .apply_metadata()
                .await
                .context("Failed to apply metadata")?;
            println!("Metadata applied.");
        }
        MetadataCommands::Export => {
            let written = migrate
                .export_metadata()
                .await
                .context("Failed to export metadata")?;
            println!("Metadata exported ({written} files).");
        }
        MetadataCommands::Reset => {
            migrate
                .reset_metadata()
                .await
                .context("Failed to reset metadata")?;
            println!("Metadata cleared.");
        }
        MetadataCommands::Reload => {
            migrate
                .reload_metadata()
                .await
                .context("Failed to reload metadata")?;
            println!("Metadata reloaded.");
        }
        MetadataCommands::Init => init_files(migrate.plugins())?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod tests;
