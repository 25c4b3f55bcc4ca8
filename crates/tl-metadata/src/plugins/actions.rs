//! `actions.yaml`: actions together with the custom types they use

use crate::error::{MetadataError, MetadataResult};
use crate::fragment;
use crate::metadata::Metadata;
use crate::plugin::{ExportedFiles, MetadataPlugin};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

pub const FILE_NAME: &str = "actions.yaml";
pub const ACTIONS: &str = "actions";
pub const CUSTOM_TYPES: &str = "custom_types";

/// Owns the `actions` and `custom_types` sections
pub struct ActionsPlugin {
    path: PathBuf,
}

fn default_custom_types() -> Value {
    json!({
        "enums": [],
        "input_objects": [],
        "objects": [],
        "scalars": [],
    })
}

impl ActionsPlugin {
    pub fn new(metadata_dir: &Path) -> Self {
        Self {
            path: metadata_dir.join(FILE_NAME),
        }
    }

    fn invalid(&self, message: String) -> MetadataError {
        MetadataError::Validation {
            plugin: ACTIONS.to_string(),
            message,
        }
    }

    /// Read the file as `(actions, custom_types)`, filling defaults
    fn read_parts(&self) -> MetadataResult<(Value, Value)> {
        let mut doc = match fragment::read(&self.path)? {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            _ => {
                return Err(self.invalid(format!("{} must contain a mapping", self.path.display())))
            }
        };
        let actions = match doc.remove(ACTIONS) {
            None | Some(Value::Null) => Value::Array(Vec::new()),
            Some(list @ Value::Array(_)) => list,
            Some(_) => return Err(self.invalid(format!("`{ACTIONS}` must be a list"))),
        };
        let custom_types = match doc.remove(CUSTOM_TYPES) {
            None | Some(Value::Null) => default_custom_types(),
            Some(types @ Value::Object(_)) => types,
            Some(_) => return Err(self.invalid(format!("`{CUSTOM_TYPES}` must be a mapping"))),
        };
        if let Some(key) = doc.keys().next() {
            return Err(self.invalid(format!("unknown key `{key}` in {}", self.path.display())));
        }
        Ok((actions, custom_types))
    }
}

impl MetadataPlugin for ActionsPlugin {
    fn name(&self) -> &str {
        ACTIONS
    }

    fn validate(&self) -> MetadataResult<()> {
        self.read_parts().map(|_| ())
    }

    fn create_files(&self) -> MetadataResult<()> {
        let doc = json!({ ACTIONS: [], CUSTOM_TYPES: default_custom_types() });
        fragment::write_if_absent(&self.path, &doc).map(|_| ())
    }

    fn build(&self, metadata: &mut Metadata) -> MetadataResult<()> {
        let (actions, custom_types) = self.read_parts()?;
        metadata.set_section(ACTIONS, actions);
        metadata.set_section(CUSTOM_TYPES, custom_types);
        Ok(())
    }

    fn export(&self, metadata: &Metadata) -> MetadataResult<ExportedFiles> {
        let actions = metadata
            .section(ACTIONS)
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let custom_types = metadata
            .section(CUSTOM_TYPES)
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(default_custom_types);
        let doc = json!({ ACTIONS: actions, CUSTOM_TYPES: custom_types });
        let bytes = fragment::render(&self.path, &doc)?;
        Ok(ExportedFiles::from([(self.path.clone(), bytes)]))
    }
}
