//! Reading and writing YAML fragments

use crate::error::{MetadataError, MetadataResult};
use serde_json::Value;
use std::path::Path;

/// Read a fragment into a JSON value. An empty file reads as `null`.
pub fn read(path: &Path) -> MetadataResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| MetadataError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(&content).map_err(|e| MetadataError::YamlWithPath {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Render a value as fragment bytes
pub fn render(path: &Path, value: &Value) -> MetadataResult<Vec<u8>> {
    serde_yaml::to_string(value)
        .map(String::into_bytes)
        .map_err(|e| MetadataError::YamlWithPath {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Write `bytes` to `path`, creating parent directories
pub fn write(path: &Path, bytes: &[u8]) -> MetadataResult<()> {
    let io_err = |e| MetadataError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, bytes).map_err(io_err)
}

/// Write `value` to `path` unless the file already exists.
///
/// Returns whether the file was written.
pub fn write_if_absent(path: &Path, value: &Value) -> MetadataResult<bool> {
    if path.exists() {
        log::debug!("Keeping existing fragment {}", path.display());
        return Ok(false);
    }
    write(path, &render(path, value)?)?;
    Ok(true)
}

#[cfg(test)]
#[path = "fragment_test.rs"]
mod tests;
