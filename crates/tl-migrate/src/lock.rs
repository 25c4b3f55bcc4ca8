//! Scoped migration lock

use std::sync::Arc;
use tl_db::{DatabaseDriver, DbResult};

/// Holds the target's migration lock until released.
///
/// Callers await [`LockGuard::release`] on every normal exit. A guard dropped
/// while still holding the lock (cancelled future, panic) schedules the
/// unlock on the current Tokio runtime.
pub struct LockGuard {
    db: Option<Arc<dyn DatabaseDriver>>,
}

impl LockGuard {
    pub async fn acquire(db: Arc<dyn DatabaseDriver>) -> DbResult<Self> {
        db.lock().await?;
        log::debug!("Acquired migration lock on {}", db.db_type());
        Ok(Self { db: Some(db) })
    }

    pub async fn release(mut self) -> DbResult<()> {
        let Some(db) = self.db.clone() else {
            return Ok(());
        };
        // Cleared only once unlock answers; a cancelled release falls back to Drop
        let result = db.unlock().await;
        self.db = None;
        result?;
        log::debug!("Released migration lock on {}", db.db_type());
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let Some(db) = self.db.take() else {
            return;
        };
        log::warn!("Migration lock dropped before release; unlocking in the background");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = db.unlock().await {
                        log::warn!("Failed to release migration lock: {}", e);
                    }
                });
            }
            Err(_) => log::warn!(
                "No async runtime to release the migration lock on {}; it stays held",
                db.db_type()
            ),
        }
    }
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod tests;
