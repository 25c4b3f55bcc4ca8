use super::*;
use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;
use tl_core::Payload;
use tl_db::{DatabaseDriver, DbError, DbResult, LedgerState};
use tl_metadata::PluginRegistry;
use tl_source::FileSource;

#[test]
fn test_format_steps_marks_direction() {
    let steps = vec![
        AppliedStep {
            version: 2,
            direction: Direction::Down,
        },
        AppliedStep {
            version: 1,
            direction: Direction::Down,
        },
    ];
    assert_eq!(
        format_steps(&steps),
        vec!["  ↓ 2 (down)".to_string(), "  ↓ 1 (down)".to_string()]
    );
}

#[test]
fn test_format_steps_empty() {
    assert!(format_steps(&[]).is_empty());
}

/// Target whose connection cannot be closed cleanly
struct BrokenCloseDriver;

#[async_trait]
impl DatabaseDriver for BrokenCloseDriver {
    async fn close(&self) -> DbResult<()> {
        Err(DbError::ConnectionError("socket reset on close".to_string()))
    }

    async fn lock(&self) -> DbResult<()> {
        Ok(())
    }

    async fn unlock(&self) -> DbResult<()> {
        Ok(())
    }

    async fn run(&self, _payload: Payload) -> DbResult<()> {
        Ok(())
    }

    async fn set_version(&self, _ledger: LedgerState) -> DbResult<()> {
        Ok(())
    }

    async fn version(&self) -> DbResult<LedgerState> {
        Ok(LedgerState::UNVERSIONED)
    }

    async fn drop_all(&self) -> DbResult<()> {
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "broken-close"
    }
}

fn migrate(dir: &TempDir) -> Migrate {
    let source = FileSource::from_path(dir.path()).unwrap();
    Migrate::new(
        Arc::new(source),
        Arc::new(BrokenCloseDriver),
        PluginRegistry::new(),
    )
}

#[tokio::test]
async fn test_command_and_close_failures_are_merged() {
    let dir = TempDir::new().unwrap();
    let err = close_after::<()>(migrate(&dir), Err(anyhow::anyhow!("status query failed")))
        .await
        .unwrap_err();

    let rendered = format!("{err:#}");
    assert!(rendered.contains("status query failed"), "{rendered}");
    assert!(rendered.contains("socket reset on close"), "{rendered}");
    assert!(err.downcast_ref::<MultiError>().is_some());
    assert_eq!(err.downcast_ref::<MultiError>().unwrap().len(), 2);
}

#[tokio::test]
async fn test_close_failure_alone_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = close_after(migrate(&dir), Ok(7)).await.unwrap_err();
    let rendered = format!("{err:#}");
    assert!(rendered.contains("Failed to close connections"));
    assert!(rendered.contains("socket reset on close"));
}
