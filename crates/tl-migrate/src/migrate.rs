//! Migration orchestrator

use crate::error::{MigrateError, MigrateResult};
use crate::lock::LockGuard;
use crate::status::StatusReport;
use std::future::Future;
use std::sync::Arc;
use tl_core::{Direction, Steps};
use tl_db::{DatabaseDriver, LedgerState};
use tl_metadata::{Metadata, PluginRegistry};
use tl_source::{SourceDriver, SourceError, SourceResult};

/// One migration applied by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedStep {
    pub version: u64,
    pub direction: Direction,
}

/// Drives one source against one database target
pub struct Migrate {
    source: Arc<dyn SourceDriver>,
    db: Arc<dyn DatabaseDriver>,
    plugins: PluginRegistry,
}

/// Map range-boundary errors to `None`
fn in_range(result: SourceResult<u64>) -> SourceResult<Option<u64>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_boundary() => Ok(None),
        Err(e) => Err(e),
    }
}

impl Migrate {
    pub fn new(
        source: Arc<dyn SourceDriver>,
        db: Arc<dyn DatabaseDriver>,
        plugins: PluginRegistry,
    ) -> Self {
        Self {
            source,
            db,
            plugins,
        }
    }

    /// Open both drivers from their addresses.
    ///
    /// If the database cannot be opened the source is closed again and both
    /// failures are reported.
    pub async fn open(
        source_address: &str,
        db_address: &str,
        plugins: PluginRegistry,
    ) -> MigrateResult<Self> {
        let source = tl_source::open(source_address)?;
        match tl_db::open(db_address).await {
            Ok(db) => Ok(Self::new(source, db, plugins)),
            Err(e) => {
                let closed = source.close().await.map_err(MigrateError::from);
                MigrateError::merge(Err(e.into()), closed)
            }
        }
    }

    pub fn source(&self) -> &Arc<dyn SourceDriver> {
        &self.source
    }

    pub fn db(&self) -> &Arc<dyn DatabaseDriver> {
        &self.db
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Apply up to `steps` pending migrations
    pub async fn up(&self, steps: Steps) -> MigrateResult<Vec<AppliedStep>> {
        log::debug!("Migrating up ({} steps)", steps);
        self.with_lock(async {
            let mut current = self.clean_version().await?;
            let mut applied = Vec::new();
            while !steps.is_exhausted(applied.len() as u64) {
                let Some(target) = self.next_up(current).await? else {
                    log::debug!("No migrations after version {}", current);
                    break;
                };
                applied.push(self.apply(target, Direction::Up, target).await?);
                current = target;
            }
            Ok(applied)
        })
        .await
    }

    /// Revert up to `steps` applied migrations
    pub async fn down(&self, steps: Steps) -> MigrateResult<Vec<AppliedStep>> {
        log::debug!("Migrating down ({} steps)", steps);
        self.with_lock(async {
            let mut current = self.clean_version().await?;
            let mut applied = Vec::new();
            while current != 0 && !steps.is_exhausted(applied.len() as u64) {
                let target = self.prev_down(current).await?;
                applied.push(self.apply(current, Direction::Down, target).await?);
                current = target;
            }
            Ok(applied)
        })
        .await
    }

    /// Step up or down until the ledger is at `version`
    pub async fn goto(&self, version: u64) -> MigrateResult<Vec<AppliedStep>> {
        if !self.contains(version).await? {
            return Err(MigrateError::VersionNotFound(version));
        }
        log::debug!("Migrating to version {}", version);
        self.with_lock(async {
            let mut current = self.clean_version().await?;
            let mut applied = Vec::new();
            while current != version {
                if current < version {
                    let target = self
                        .next_up(current)
                        .await?
                        .ok_or(MigrateError::VersionNotFound(version))?;
                    applied.push(self.apply(target, Direction::Up, target).await?);
                    current = target;
                } else {
                    let target = self.prev_down(current).await?;
                    applied.push(self.apply(current, Direction::Down, target).await?);
                    current = target;
                }
            }
            Ok(applied)
        })
        .await
    }

    /// Snapshot of the source against the ledger, taken without the lock
    pub async fn status(&self) -> MigrateResult<StatusReport> {
        let ledger = self.db.version().await?;
        let mut versions = Vec::new();
        let mut next = in_range(self.source.first().await)?;
        while let Some(version) = next {
            let info = self.source.describe(version).await?;
            versions.push((version, info.name));
            next = in_range(self.source.next(version).await)?;
        }
        Ok(StatusReport::new(ledger, versions))
    }

    /// Revert everything reversible, wipe the target and reset the ledger.
    ///
    /// Units without a down payload are skipped.
    pub async fn drop_all(&self) -> MigrateResult<Vec<AppliedStep>> {
        log::debug!("Dropping everything on {}", self.db.db_type());
        self.with_lock(async {
            let mut current = self.clean_version().await?;
            let mut applied = Vec::new();
            while current != 0 {
                let target = self.prev_down(current).await?;
                if self.has_down(current).await? {
                    applied.push(self.apply(current, Direction::Down, target).await?);
                } else {
                    log::warn!("Skipping irreversible migration {}", current);
                }
                current = target;
            }
            self.db.drop_all().await?;
            self.db.set_version(LedgerState::UNVERSIONED).await?;
            log::info!("Dropped all objects on {}", self.db.db_type());
            Ok(applied)
        })
        .await
    }

    /// Record `version` as cleanly applied without running anything
    pub async fn force(&self, version: u64) -> MigrateResult<()> {
        if version != 0 && !self.contains(version).await? {
            log::warn!("Forcing version {} which is not in the source", version);
        }
        self.with_lock(async {
            self.db.set_version(LedgerState::Clean(version)).await?;
            log::info!("Forced ledger to version {}", version);
            Ok(())
        })
        .await
    }

    pub async fn version(&self) -> MigrateResult<LedgerState> {
        Ok(self.db.version().await?)
    }

    /// Build the document from local fragments and replace the target's metadata
    pub async fn apply_metadata(&self) -> MigrateResult<()> {
        self.plugins.validate()?;
        let metadata = self.plugins.build()?;
        self.db.apply_metadata(&metadata.into_value()).await?;
        log::info!("Applied metadata to {}", self.db.db_type());
        Ok(())
    }

    /// Fetch the target's metadata and write it as local fragments.
    ///
    /// Returns the number of files written.
    pub async fn export_metadata(&self) -> MigrateResult<usize> {
        let metadata = Metadata::from_value(self.db.export_metadata().await?)?;
        let written = self.plugins.write_export(&metadata)?;
        log::info!("Exported metadata into {} files", written);
        Ok(written)
    }

    pub async fn reset_metadata(&self) -> MigrateResult<()> {
        Ok(self.db.reset_metadata().await?)
    }

    pub async fn reload_metadata(&self) -> MigrateResult<()> {
        Ok(self.db.reload_metadata().await?)
    }

    /// Close both drivers, reporting every failure
    pub async fn close(&self) -> MigrateResult<()> {
        let source = self.source.close().await.map_err(MigrateError::from);
        let db = self.db.close().await.map_err(MigrateError::from);
        MigrateError::merge(source, db)
    }

    /// Run `op` under the migration lock, releasing it on every exit
    async fn with_lock<T, F>(&self, op: F) -> MigrateResult<T>
    where
        F: Future<Output = MigrateResult<T>>,
    {
        let guard = LockGuard::acquire(self.db.clone()).await?;
        let result = op.await;
        let released = guard.release().await.map_err(MigrateError::from);
        MigrateError::merge(result, released)
    }

    /// Current ledger version, failing if the ledger is dirty
    async fn clean_version(&self) -> MigrateResult<u64> {
        match self.db.version().await? {
            LedgerState::Dirty(version) => Err(MigrateError::Dirty { version }),
            LedgerState::Clean(version) => Ok(version),
        }
    }

    async fn next_up(&self, current: u64) -> MigrateResult<Option<u64>> {
        let next = if current == 0 {
            self.source.first().await
        } else {
            self.source.next(current).await
        };
        Ok(in_range(next)?)
    }

    /// Ledger version after reverting `current`
    async fn prev_down(&self, current: u64) -> MigrateResult<u64> {
        Ok(in_range(self.source.prev(current).await)?.unwrap_or(0))
    }

    async fn contains(&self, version: u64) -> MigrateResult<bool> {
        match self.source.describe(version).await {
            Ok(_) => Ok(true),
            Err(SourceError::UnknownVersion(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn has_down(&self, version: u64) -> MigrateResult<bool> {
        match self.source.describe(version).await {
            Ok(info) => Ok(info.has_down),
            Err(SourceError::UnknownVersion(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply one payload under the dirty-state protocol.
    ///
    /// The payload is opened before the ledger is touched, so a missing file
    /// leaves the ledger clean.
    async fn apply(
        &self,
        version: u64,
        direction: Direction,
        target: u64,
    ) -> MigrateResult<AppliedStep> {
        let payload = match direction {
            Direction::Up => self.source.read_up(version).await?,
            Direction::Down => self.source.read_down(version).await?,
        };
        log::debug!(
            "Applying {} migration {} (ledger -> {})",
            direction,
            version,
            target
        );

        self.db
            .set_version(LedgerState::Dirty(target))
            .await
            .map_err(|e| MigrateError::step(version, direction, e))?;
        self.db
            .run(payload)
            .await
            .map_err(|e| MigrateError::step(version, direction, e))?;
        self.db
            .set_version(LedgerState::Clean(target))
            .await
            .map_err(|e| MigrateError::step(version, direction, e))?;

        log::info!("Applied {} migration {}", direction, version);
        Ok(AppliedStep { version, direction })
    }
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
