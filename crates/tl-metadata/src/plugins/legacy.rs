//! Single-file metadata used by version 1 projects

use crate::error::{MetadataError, MetadataResult};
use crate::fragment;
use crate::metadata::Metadata;
use crate::plugin::{ExportedFiles, MetadataPlugin};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const FILE_NAME: &str = "metadata.yaml";
pub const NAME: &str = "metadata";

/// Owns the whole document as `<migrations>/metadata.yaml`
pub struct LegacyPlugin {
    path: PathBuf,
}

impl LegacyPlugin {
    pub fn new(migrations_dir: &Path) -> Self {
        Self {
            path: migrations_dir.join(FILE_NAME),
        }
    }

    fn read_document(&self) -> MetadataResult<Map<String, Value>> {
        match fragment::read(&self.path)? {
            Value::Null => Ok(Map::new()),
            Value::Object(map) => Ok(map),
            _ => Err(MetadataError::Validation {
                plugin: NAME.to_string(),
                message: format!("{} must contain a mapping", self.path.display()),
            }),
        }
    }
}

impl MetadataPlugin for LegacyPlugin {
    fn name(&self) -> &str {
        NAME
    }

    fn validate(&self) -> MetadataResult<()> {
        self.read_document().map(|_| ())
    }

    fn create_files(&self) -> MetadataResult<()> {
        fragment::write_if_absent(&self.path, &Value::Object(Map::new())).map(|_| ())
    }

    fn build(&self, metadata: &mut Metadata) -> MetadataResult<()> {
        for (section, value) in self.read_document()? {
            metadata.set_section(section, value);
        }
        Ok(())
    }

    fn export(&self, metadata: &Metadata) -> MetadataResult<ExportedFiles> {
        let bytes = fragment::render(&self.path, &metadata.clone().into_value())?;
        Ok(ExportedFiles::from([(self.path.clone(), bytes)]))
    }
}
