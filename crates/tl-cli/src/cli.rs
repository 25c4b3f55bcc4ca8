//! CLI argument definitions using clap derive API

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tideline - schema migrations and metadata for admin API targets
#[derive(Parser, Debug)]
#[command(name = "tl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Admin API endpoint (overrides config.yaml and TL_ENDPOINT)
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Admin secret sent with every request (overrides config.yaml and TL_ADMIN_SECRET)
    #[arg(long, global = true)]
    pub admin_secret: Option<String>,

    /// Database address used instead of the endpoint, e.g. duckdb:///tmp/dev.db
    #[arg(short, long, global = true)]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create config.yaml, the migrations directory and metadata fragments
    Init(InitArgs),

    /// Apply, inspect and repair schema migrations
    Migrate(MigrateArgs),

    /// Manage metadata on the target
    Metadata(MetadataArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Admin API endpoint written to config.yaml
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Project layout version (1 = single metadata file, 2 = one file per section)
    #[arg(long, default_value_t = 2)]
    pub layout: u8,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub command: MigrateCommands,
}

/// Migrate subcommands
#[derive(Subcommand, Debug)]
pub enum MigrateCommands {
    /// Apply migrations up, down, or to a specific version
    Apply(ApplyArgs),

    /// Show which migrations are applied and pending
    Status(StatusArgs),

    /// Mark a version as cleanly applied without running anything
    Force(ForceArgs),

    /// Revert every migration and remove all objects from the target
    Drop(DropArgs),

    /// Write a new migration into the migrations directory
    Create(CreateArgs),

    /// Fold a version and every later one into a single migration
    Squash(SquashArgs),
}

/// Arguments for migrate apply
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("direction").required(true).args(["up", "down", "goto"])))]
pub struct ApplyArgs {
    /// Apply N pending migrations, or all when no count is given
    #[arg(long, num_args = 0..=1, default_missing_value = "all", value_name = "N|all")]
    pub up: Option<String>,

    /// Revert N applied migrations, or all when no count is given
    #[arg(long, num_args = 0..=1, default_missing_value = "all", value_name = "N|all")]
    pub down: Option<String>,

    /// Move up or down to this version
    #[arg(long, value_name = "VERSION")]
    pub goto: Option<u64>,
}

/// Arguments for migrate status
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for migrate force
#[derive(Args, Debug)]
pub struct ForceArgs {
    /// Version to record (0 = nothing applied)
    pub version: u64,
}

/// Arguments for migrate drop
#[derive(Args, Debug)]
pub struct DropArgs {
    /// Confirm removing every object from the target
    #[arg(long)]
    pub yes: bool,
}

/// Arguments for migrate create
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Migration name, e.g. add_users
    pub name: String,

    /// Read the up SQL from this file
    #[arg(long, value_name = "PATH", conflicts_with = "up_sql")]
    pub sql_from_file: Option<PathBuf>,

    /// Up SQL
    #[arg(long, value_name = "SQL")]
    pub up_sql: Option<String>,

    /// Down SQL
    #[arg(long, value_name = "SQL")]
    pub down_sql: Option<String>,

    /// Write no down.sql; the migration cannot be reverted
    #[arg(long, conflicts_with = "down_sql")]
    pub irreversible: bool,

    /// Version to use instead of the current time in milliseconds
    #[arg(long, value_name = "VERSION")]
    pub timestamp: Option<u64>,
}

/// Arguments for migrate squash
#[derive(Args, Debug)]
pub struct SquashArgs {
    /// First version to squash; every later version is included
    #[arg(long, value_name = "VERSION")]
    pub from: u64,

    /// Name of the squashed migration
    #[arg(long, default_value = "squashed")]
    pub name: String,

    /// Remove the squashed migration files
    #[arg(long)]
    pub delete_source: bool,

    /// Version to use instead of the current time in milliseconds
    #[arg(long, value_name = "VERSION")]
    pub timestamp: Option<u64>,
}

/// Arguments for the metadata command
#[derive(Args, Debug)]
pub struct MetadataArgs {
    #[command(subcommand)]
    pub command: MetadataCommands,
}

/// Metadata subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataCommands {
    /// Build metadata from local files and replace it on the target
    Apply,
    /// Write the target's metadata into local files
    Export,
    /// Clear the target's metadata
    Reset,
    /// Ask the target to reload its metadata
    Reload,
    /// Create missing metadata files with defaults
    Init,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
