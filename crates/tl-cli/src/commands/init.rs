//! Init command implementation - scaffolds a new Tideline project

use anyhow::{Context, Result};
use std::fs;
use tl_core::{Config, ConfigVersion};
use tl_metadata::PluginRegistry;

use crate::cli::{GlobalArgs, InitArgs};

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let root = &global.project_dir;
    let config_path = root.join("config.yaml");
    if config_path.exists() || root.join("config.yml").exists() {
        anyhow::bail!(
            "A Tideline project already exists in '{}'",
            root.display()
        );
    }

    let version = ConfigVersion::try_from(args.layout).map_err(anyhow::Error::msg)?;
    let mut config = Config {
        version,
        ..Config::default()
    };
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
        config.parsed_endpoint().context("Invalid --endpoint value")?;
    }

    println!("Creating new Tideline project in {}\n", root.display());

    let migrations = config.migrations_path(root);
    fs::create_dir_all(&migrations)
        .with_context(|| format!("Failed to create directory: {}", migrations.display()))?;

    let content = serde_yaml::to_string(&config).context("Failed to render config.yaml")?;
    fs::write(&config_path, content).context("Failed to write config.yaml")?;

    PluginRegistry::for_config(&config, root)
        .and_then(|plugins| plugins.create_files())
        .context("Failed to create metadata files")?;

    println!("  config.yaml");
    println!("  {}/", config.migrations_directory);
    if version == ConfigVersion::V2 {
        println!("  {}/", config.metadata_directory);
    }
    println!("\nNext steps:");
    println!(
        "  add {}/1_init.up.sql and run `tl migrate apply --up`",
        config.migrations_directory
    );
    Ok(())
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
