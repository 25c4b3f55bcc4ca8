//! Integration tests for the `tl` binary
//!
//! Drives a fresh project end to end against a DuckDB target file.

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Path to the compiled tl binary
fn tl_bin() -> String {
    env!("CARGO_BIN_EXE_tl").to_string()
}

/// Run a `tl` command in `project` and return (stdout, stderr, success).
fn run_tl(project: &Path, args: &[&str]) -> (String, String, bool) {
    let database = format!("duckdb://{}", project.join("target.db").display());
    let output = Command::new(tl_bin())
        .args(args)
        .arg("--project-dir")
        .arg(project)
        .arg("--database")
        .arg(&database)
        .env_remove("TL_ENDPOINT")
        .env_remove("TL_ADMIN_SECRET")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute tl with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn init_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let (_, stderr, ok) = run_tl(dir.path(), &["init"]);
    assert!(ok, "tl init failed: {stderr}");

    let migrations = dir.path().join("migrations");
    std::fs::write(
        migrations.join("1_users.up.sql"),
        "CREATE TABLE users (id INTEGER);",
    )
    .unwrap();
    std::fs::write(migrations.join("1_users.down.sql"), "DROP TABLE users;").unwrap();
    std::fs::write(
        migrations.join("2_teams.up.sql"),
        "CREATE TABLE teams (id INTEGER);",
    )
    .unwrap();
    std::fs::write(migrations.join("2_teams.down.sql"), "DROP TABLE teams;").unwrap();
    dir
}

// ── Tests ──────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_commands() {
    let output = Command::new(tl_bin()).arg("--help").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("migrate"));
    assert!(stdout.contains("metadata"));
}

#[test]
fn test_up_status_down() {
    let project = init_project();

    let (stdout, stderr, ok) = run_tl(project.path(), &["migrate", "apply", "--up"]);
    assert!(ok, "apply --up failed: {stderr}");
    assert!(stdout.contains("2 migrations applied"));
    assert!(stdout.contains("Version: 2"));

    let (stdout, _, ok) = run_tl(project.path(), &["migrate", "status", "-o", "json"]);
    assert!(ok);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["version"], 2);
    assert_eq!(status["dirty"], false);
    assert_eq!(status["migrations"].as_array().unwrap().len(), 2);

    let (stdout, stderr, ok) = run_tl(project.path(), &["migrate", "apply", "--down", "all"]);
    assert!(ok, "apply --down failed: {stderr}");
    assert!(stdout.contains("Version: unversioned"));
}

#[test]
fn test_failed_migration_reports_dirty() {
    let project = init_project();
    std::fs::write(
        project.path().join("migrations/3_broken.up.sql"),
        "CREATE TABLE (",
    )
    .unwrap();

    let (_, stderr, ok) = run_tl(project.path(), &["migrate", "apply", "--up"]);
    assert!(!ok);
    assert!(stderr.contains("Migrating up failed"));

    let (stdout, _, ok) = run_tl(project.path(), &["migrate", "status"]);
    assert!(ok);
    assert!(stdout.contains("3 (dirty)"));

    let (_, stderr, ok) = run_tl(project.path(), &["migrate", "apply", "--up"]);
    assert!(!ok);
    assert!(stderr.contains("dirty"));

    let (_, _, ok) = run_tl(project.path(), &["migrate", "force", "2"]);
    assert!(ok);
    let (stdout, _, _) = run_tl(project.path(), &["migrate", "status"]);
    assert!(stdout.contains("Database version: 2"));
}

#[test]
fn test_metadata_round_trip() {
    let project = init_project();

    let (_, stderr, ok) = run_tl(project.path(), &["metadata", "apply"]);
    assert!(ok, "metadata apply failed: {stderr}");

    let (stdout, stderr, ok) = run_tl(project.path(), &["metadata", "export"]);
    assert!(ok, "metadata export failed: {stderr}");
    assert!(stdout.contains("Metadata exported"));
}

#[test]
fn test_commands_require_project() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, ok) = run_tl(dir.path(), &["migrate", "status"]);
    assert!(!ok);
    assert!(stderr.contains("tl init"));
}
