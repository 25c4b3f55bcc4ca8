//! Source driver trait definition

use crate::error::SourceResult;
use crate::migration::MigrationInfo;
use async_trait::async_trait;
use tl_core::Payload;

/// Read-only, version-ordered view of the available migrations.
///
/// `first`, `next`, `prev` and `describe` only walk the index built when the
/// driver was opened. Payload bodies are opened lazily by `read_up` and
/// `read_down`.
#[async_trait]
pub trait SourceDriver: Send + Sync {
    /// Lowest available version
    async fn first(&self) -> SourceResult<u64>;

    /// Smallest version greater than `version`
    async fn next(&self, version: u64) -> SourceResult<u64>;

    /// Largest version smaller than `version`
    async fn prev(&self, version: u64) -> SourceResult<u64>;

    /// Open the up payload of `version`
    async fn read_up(&self, version: u64) -> SourceResult<Payload>;

    /// Open the down payload of `version`
    async fn read_down(&self, version: u64) -> SourceResult<Payload>;

    /// Name and available directions of `version`
    async fn describe(&self, version: u64) -> SourceResult<MigrationInfo>;

    /// Release any resources held by the driver
    async fn close(&self) -> SourceResult<()>;

    /// Source type identifier for logging
    fn source_type(&self) -> &'static str;
}
