//! Database driver trait definition

use crate::error::{DbError, DbResult};
use crate::ledger::LedgerState;
use async_trait::async_trait;
use serde_json::Value;
use tl_core::Payload;

/// Driver for a migration target.
///
/// A driver owns the version ledger and the advisory lock at the target.
/// The orchestrator calls `set_version(Dirty(v))` before `run` and
/// `set_version(Clean(v))` after it succeeds, so a failed step leaves the
/// ledger dirty.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Release the connection
    async fn close(&self) -> DbResult<()>;

    /// Acquire the exclusive migration lock, waiting up to the configured timeout
    async fn lock(&self) -> DbResult<()>;

    /// Release the migration lock held by this driver
    async fn unlock(&self) -> DbResult<()>;

    /// Apply one migration payload, reading it to completion
    async fn run(&self, payload: Payload) -> DbResult<()>;

    /// Persist the ledger state
    async fn set_version(&self, state: LedgerState) -> DbResult<()>;

    /// Read the ledger state; `LedgerState::UNVERSIONED` if nothing was recorded
    async fn version(&self) -> DbResult<LedgerState>;

    /// Remove all managed objects from the target
    async fn drop_all(&self) -> DbResult<()>;

    /// Get the driver name for logging
    fn db_type(&self) -> &'static str;

    /// Fetch the metadata document held by the target
    async fn export_metadata(&self) -> DbResult<Value> {
        Err(self.not_implemented("export_metadata"))
    }

    /// Replace the target's metadata with `metadata`
    async fn apply_metadata(&self, metadata: &Value) -> DbResult<()> {
        let _ = metadata;
        Err(self.not_implemented("apply_metadata"))
    }

    /// Clear the target's metadata
    async fn reset_metadata(&self) -> DbResult<()> {
        Err(self.not_implemented("reset_metadata"))
    }

    /// Ask the target to reload its metadata
    async fn reload_metadata(&self) -> DbResult<()> {
        Err(self.not_implemented("reload_metadata"))
    }

    #[doc(hidden)]
    fn not_implemented(&self, feature: &str) -> DbError {
        DbError::NotImplemented {
            backend: self.db_type().to_string(),
            feature: feature.to_string(),
        }
    }
}
