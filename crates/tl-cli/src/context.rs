//! Runtime context for CLI commands

use anyhow::{Context, Result};
use reqwest::Url;
use std::path::PathBuf;
use tl_core::{data_address, file_address, Config};
use tl_metadata::PluginRegistry;
use tl_migrate::Migrate;

use crate::cli::GlobalArgs;

/// Loaded project configuration plus the flags that override it
pub(crate) struct RuntimeContext {
    /// Project root directory
    pub root: PathBuf,

    /// Effective configuration: file, then environment, then flags
    pub config: Config,

    /// Explicit database address from `--database`
    database: Option<String>,

    /// Verbose output enabled
    pub verbose: bool,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let root = args.project_dir.clone();
        let mut config = Config::load_from_dir(&root)
            .context("Failed to load project configuration (run `tl init` to create one)")?;
        config
            .apply_env_overrides()
            .context("Invalid configuration after environment overrides")?;

        if let Some(endpoint) = &args.endpoint {
            config.endpoint = endpoint.clone();
            config
                .parsed_endpoint()
                .context("Invalid --endpoint value")?;
        }
        if let Some(secret) = &args.admin_secret {
            config.admin_secret = Some(secret.clone());
        }

        Ok(Self {
            root,
            config,
            database: args.database.clone(),
            verbose: args.verbose,
        })
    }

    /// File source address for the project's migrations directory
    pub fn source_address(&self) -> Result<Url> {
        let dir = self.config.migrations_path(&self.root);
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Migrations directory not found: {}", dir.display()))?;
        file_address(&dir).context("Failed to build source address")
    }

    /// Database address with the configured lock settings attached
    pub fn database_address(&self) -> Result<Url> {
        let base = match &self.database {
            Some(address) => Url::parse(address)
                .with_context(|| format!("Invalid --database address: {address}"))?,
            None => {
                let endpoint = self.config.parsed_endpoint()?;
                data_address(
                    &endpoint,
                    &self.config.admin_secret_header,
                    self.config.admin_secret.as_deref(),
                )
                .context("Failed to build database address")?
            }
        };
        Ok(tl_db::with_lock_settings(base, &self.config.lock))
    }

    /// Metadata plugins for the project's layout version
    pub fn plugins(&self) -> Result<PluginRegistry> {
        PluginRegistry::for_config(&self.config, &self.root)
            .context("Failed to register metadata plugins")
    }

    /// Open the orchestrator against the configured source and target
    pub async fn open_migrate(&self) -> Result<Migrate> {
        let source = self.source_address()?;
        let database = self.database_address()?;
        self.verbose(&format!("Source: {source}"));
        self.verbose(&format!("Target: {}", redact(&database)));

        Migrate::open(source.as_str(), database.as_str(), self.plugins()?)
            .await
            .context("Failed to connect")
    }

    /// Print verbose output if enabled
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", msg);
        }
    }
}

/// Address with header values masked, safe to print
fn redact(address: &Url) -> String {
    let mut url = address.clone();
    let pairs: Vec<(String, String)> = address
        .query_pairs()
        .map(|(k, v)| {
            if k == tl_core::address::HEADERS_KEY {
                (k.into_owned(), "***".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    if pairs.is_empty() {
        return url.to_string();
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
