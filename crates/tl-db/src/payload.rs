//! Helpers shared by drivers for consuming migration payloads

use crate::error::{DbError, DbResult};
use serde_json::Value;
use tl_core::Payload;
use tokio::io::AsyncReadExt;

/// Drain the payload stream into a string.
///
/// The stream may deliver its bytes in arbitrarily small chunks.
pub async fn read_body(payload: &mut Payload) -> DbResult<String> {
    let mut body = String::new();
    payload
        .reader
        .read_to_string(&mut body)
        .await
        .map_err(DbError::PayloadRead)?;
    Ok(body)
}

/// Parse a YAML payload as a list of admin API queries
pub fn yaml_queries(version: u64, body: &str) -> DbResult<Vec<Value>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: Value = serde_yaml::from_str(body)
        .map_err(|e| DbError::Apply(format!("migration {version}: invalid YAML payload: {e}")))?;
    match parsed {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        other => Err(DbError::Apply(format!(
            "migration {version}: YAML payload must be a list of queries, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
#[path = "payload_test.rs"]
mod tests;
