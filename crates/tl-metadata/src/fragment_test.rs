use super::*;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_read_empty_file_is_null() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tables.yaml");
    std::fs::write(&path, "\n").unwrap();
    assert_eq!(read(&path).unwrap(), Value::Null);
}

#[test]
fn test_read_missing_file_has_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.yaml");
    let err = read(&path).unwrap_err();
    assert!(matches!(err, MetadataError::IoWithPath { .. }));
    assert!(err.to_string().contains("missing.yaml"));
}

#[test]
fn test_read_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "key: [unclosed").unwrap();
    assert!(matches!(
        read(&path).unwrap_err(),
        MetadataError::YamlWithPath { .. }
    ));
}

#[test]
fn test_write_if_absent_keeps_existing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("functions.yaml");

    assert!(write_if_absent(&path, &json!([])).unwrap());
    std::fs::write(&path, "- name: f\n").unwrap();
    assert!(!write_if_absent(&path, &json!([])).unwrap());

    assert_eq!(read(&path).unwrap(), json!([{"name": "f"}]));
}
