//! `version.yaml`: the metadata format version

use crate::error::{MetadataError, MetadataResult};
use crate::fragment;
use crate::metadata::Metadata;
use crate::plugin::{ExportedFiles, MetadataPlugin};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub const FILE_NAME: &str = "version.yaml";
pub const SECTION: &str = "version";

/// Owns the `version` key of the document
pub struct VersionPlugin {
    path: PathBuf,
    version: u64,
}

impl VersionPlugin {
    pub fn new(metadata_dir: &Path, version: u64) -> Self {
        Self {
            path: metadata_dir.join(FILE_NAME),
            version,
        }
    }

    fn read_version(&self) -> MetadataResult<u64> {
        let value = fragment::read(&self.path)?;
        value[SECTION].as_u64().ok_or_else(|| MetadataError::Validation {
            plugin: SECTION.to_string(),
            message: format!("{} must contain `version: <number>`", self.path.display()),
        })
    }
}

impl MetadataPlugin for VersionPlugin {
    fn name(&self) -> &str {
        SECTION
    }

    fn validate(&self) -> MetadataResult<()> {
        self.read_version().map(|_| ())
    }

    fn create_files(&self) -> MetadataResult<()> {
        // Always rewritten so scaffolding pins the current format
        let bytes = fragment::render(&self.path, &json!({ SECTION: self.version }))?;
        fragment::write(&self.path, &bytes)
    }

    fn build(&self, metadata: &mut Metadata) -> MetadataResult<()> {
        let version = self.read_version()?;
        metadata.set_section(SECTION, Value::from(version));
        Ok(())
    }

    fn export(&self, metadata: &Metadata) -> MetadataResult<ExportedFiles> {
        let version = metadata
            .section(SECTION)
            .and_then(Value::as_u64)
            .unwrap_or(self.version);
        let bytes = fragment::render(&self.path, &json!({ SECTION: version }))?;
        Ok(ExportedFiles::from([(self.path.clone(), bytes)]))
    }
}
