//! Configuration types and parsing for config.yaml

use crate::error::{CoreError, CoreResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `endpoint`
pub const ENDPOINT_ENV: &str = "TL_ENDPOINT";

/// Environment variable overriding `admin_secret`
pub const ADMIN_SECRET_ENV: &str = "TL_ADMIN_SECRET";

/// Header used to forward the admin secret when none is configured
pub const DEFAULT_ADMIN_SECRET_HEADER: &str = "X-Admin-Secret";

/// Main project configuration from config.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project layout version
    #[serde(default)]
    pub version: ConfigVersion,

    /// HTTP(S) endpoint of the target's admin API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Secret forwarded with every admin API request
    #[serde(default)]
    pub admin_secret: Option<String>,

    /// Header name carrying `admin_secret`
    #[serde(default = "default_admin_secret_header")]
    pub admin_secret_header: String,

    /// Directory holding migration files, relative to the project root
    #[serde(default = "default_migrations_directory")]
    pub migrations_directory: String,

    /// Directory holding metadata fragments, relative to the project root
    #[serde(default = "default_metadata_directory")]
    pub metadata_directory: String,

    /// Lock acquisition settings
    #[serde(default)]
    pub lock: LockSettings,
}

/// Project layout version.
///
/// Version 1 keeps all metadata in a single `metadata.yaml` next to the
/// migrations; version 2 splits it into one fragment per section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ConfigVersion {
    V1,
    #[default]
    V2,
}

impl TryFrom<u8> for ConfigVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ConfigVersion::V1),
            2 => Ok(ConfigVersion::V2),
            other => Err(format!("unsupported config version {other}, expected 1 or 2")),
        }
    }
}

impl From<ConfigVersion> for u8 {
    fn from(value: ConfigVersion) -> Self {
        match value {
            ConfigVersion::V1 => 1,
            ConfigVersion::V2 => 2,
        }
    }
}

/// Bounded wait used when acquiring the migration lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockSettings {
    /// Give up acquiring the lock after this many seconds
    #[serde(default = "default_lock_timeout_secs")]
    pub timeout_secs: u64,

    /// Delay between acquisition attempts
    #[serde(default = "default_lock_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_lock_timeout_secs(),
            poll_interval_ms: default_lock_poll_interval_ms(),
        }
    }
}

impl LockSettings {
    /// Total time to wait for the lock
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay between two acquisition attempts
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_admin_secret_header() -> String {
    DEFAULT_ADMIN_SECRET_HEADER.to_string()
}

fn default_migrations_directory() -> String {
    "migrations".to_string()
}

fn default_metadata_directory() -> String {
    "metadata".to_string()
}

fn default_lock_timeout_secs() -> u64 {
    15
}

fn default_lock_poll_interval_ms() -> u64 {
    250
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: ConfigVersion::default(),
            endpoint: default_endpoint(),
            admin_secret: None,
            admin_secret_header: default_admin_secret_header(),
            migrations_directory: default_migrations_directory(),
            metadata_directory: default_metadata_directory(),
            lock: LockSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for config.yaml or config.yml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yaml_path = dir.join("config.yaml");
        let yml_path = dir.join("config.yml");

        if yaml_path.exists() {
            Self::load(&yaml_path)
        } else if yml_path.exists() {
            Self::load(&yml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yaml_path.display().to_string(),
            })
        }
    }

    /// Apply `TL_ENDPOINT` / `TL_ADMIN_SECRET` on top of the file values
    pub fn apply_env_overrides(&mut self) -> CoreResult<()> {
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.is_empty() {
                log::debug!("Endpoint overridden by {ENDPOINT_ENV}");
                self.endpoint = endpoint;
            }
        }
        if let Ok(secret) = std::env::var(ADMIN_SECRET_ENV) {
            if !secret.is_empty() {
                self.admin_secret = Some(secret);
            }
        }
        self.validate()
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        self.parsed_endpoint()?;

        if self.admin_secret_header.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "admin_secret_header cannot be empty".to_string(),
            });
        }
        if self.migrations_directory.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_directory cannot be empty".to_string(),
            });
        }
        if self.version == ConfigVersion::V2 && self.metadata_directory.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "metadata_directory is required for config version 2".to_string(),
            });
        }
        if self.lock.poll_interval_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "lock.poll_interval_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Parse `endpoint`, accepting only http and https
    pub fn parsed_endpoint(&self) -> CoreResult<Url> {
        let url = Url::parse(&self.endpoint).map_err(|e| CoreError::InvalidAddress {
            address: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CoreError::InvalidAddress {
                address: self.endpoint.clone(),
                reason: format!("endpoint scheme must be http or https, found '{other}'"),
            }),
        }
    }

    /// Absolute migrations directory for a project rooted at `root`
    pub fn migrations_path(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_directory)
    }

    /// Absolute metadata directory for a project rooted at `root`
    pub fn metadata_path(&self, root: &Path) -> PathBuf {
        root.join(&self.metadata_directory)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
