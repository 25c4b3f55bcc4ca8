//! In-memory metadata aggregate

use crate::error::{MetadataError, MetadataResult};
use serde_json::{Map, Value};

/// Metadata document keyed by section name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    sections: Map<String, Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a document received from the target. `null` is treated as empty.
    pub fn from_value(value: Value) -> MetadataResult<Self> {
        match value {
            Value::Object(sections) => Ok(Self { sections }),
            Value::Null => Ok(Self::default()),
            other => Err(MetadataError::InvalidDocument(format!(
                "expected a mapping, found {other}"
            ))),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.sections)
    }

    pub fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }

    pub fn set_section(&mut self, name: impl Into<String>, value: Value) {
        self.sections.insert(name.into(), value);
    }

    pub fn remove_section(&mut self, name: &str) -> Option<Value> {
        self.sections.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
