//! A list section stored as `<section>.yaml`

use crate::error::{MetadataError, MetadataResult};
use crate::fragment;
use crate::metadata::Metadata;
use crate::plugin::{ExportedFiles, MetadataPlugin};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Owns one list-valued section of the document
pub struct SectionPlugin {
    section: String,
    path: PathBuf,
}

impl SectionPlugin {
    pub fn new(metadata_dir: &Path, section: &str) -> Self {
        Self {
            section: section.to_string(),
            path: metadata_dir.join(format!("{section}.yaml")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_list(&self) -> MetadataResult<Value> {
        match fragment::read(&self.path)? {
            Value::Null => Ok(Value::Array(Vec::new())),
            list @ Value::Array(_) => Ok(list),
            _ => Err(MetadataError::Validation {
                plugin: self.section.clone(),
                message: format!("{} must contain a list", self.path.display()),
            }),
        }
    }
}

impl MetadataPlugin for SectionPlugin {
    fn name(&self) -> &str {
        &self.section
    }

    fn validate(&self) -> MetadataResult<()> {
        self.read_list().map(|_| ())
    }

    fn create_files(&self) -> MetadataResult<()> {
        fragment::write_if_absent(&self.path, &Value::Array(Vec::new())).map(|_| ())
    }

    fn build(&self, metadata: &mut Metadata) -> MetadataResult<()> {
        let list = self.read_list()?;
        metadata.set_section(self.section.clone(), list);
        Ok(())
    }

    fn export(&self, metadata: &Metadata) -> MetadataResult<ExportedFiles> {
        let list = match metadata.section(&self.section) {
            Some(Value::Null) | None => Value::Array(Vec::new()),
            Some(value) => value.clone(),
        };
        let bytes = fragment::render(&self.path, &list)?;
        Ok(ExportedFiles::from([(self.path.clone(), bytes)]))
    }
}
