//! Error types for tl-migrate

use thiserror::Error;
use tl_core::{CoreError, Direction, MultiError};
use tl_db::DbError;
use tl_metadata::MetadataError;
use tl_source::SourceError;

/// Orchestrator errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// The ledger is dirty; nothing runs until an operator intervenes (MG001)
    #[error("[MG001] Database is dirty at version {version}. Fix the target by hand, then run `tl migrate force <version>`")]
    Dirty { version: u64 },

    /// Requested version is not part of the source (MG002)
    #[error("[MG002] Version {0} not found in the migration source")]
    VersionNotFound(u64),

    /// A step failed after the ledger was marked dirty (MG003)
    #[error("[MG003] Migration {version} ({direction}) failed: {source}")]
    Step {
        version: u64,
        direction: Direction,
        #[source]
        source: Box<MigrateError>,
    },

    /// Several independent failures (MG004)
    #[error("[MG004] {0}")]
    Multi(#[from] MultiError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

impl MigrateError {
    pub(crate) fn step(version: u64, direction: Direction, source: impl Into<MigrateError>) -> Self {
        MigrateError::Step {
            version,
            direction,
            source: Box::new(source.into()),
        }
    }

    /// Combine an operation result with a cleanup result, keeping both failures
    pub(crate) fn merge<T>(
        result: MigrateResult<T>,
        cleanup: MigrateResult<()>,
    ) -> MigrateResult<T> {
        match (result, cleanup) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup)) => Err(MultiError::new([Some(e), Some(cleanup)]).into()),
        }
    }
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
