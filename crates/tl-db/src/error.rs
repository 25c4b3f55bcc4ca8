//! Error types for tl-db

use std::time::Duration;
use thiserror::Error;

/// Database driver errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// The target rejected or failed to execute a payload (D002)
    #[error("[D002] Migration payload failed: {0}")]
    Apply(String),

    /// The version ledger could not be read or written (D003)
    #[error("[D003] Version ledger read/write failed: {0}. The outcome of the last step is unknown; treat the target as dirty")]
    Persist(String),

    /// Lock could not be acquired in time (D004)
    #[error("[D004] Timed out after {waited:?} waiting for the migration lock. Another migration may be running against this target; retry later")]
    LockTimeout { waited: Duration },

    /// Lock bookkeeping request failed (D005)
    #[error("[D005] Migration lock request failed: {0}")]
    Lock(String),

    /// Not implemented (D006)
    #[error("[D006] Feature not implemented for {backend}: {feature}")]
    NotImplemented { backend: String, feature: String },

    /// Mutex poisoned (D007)
    #[error("[D007] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Database address could not be parsed (D008)
    #[error("[D008] Invalid database address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// No database driver is registered for the scheme (D009)
    #[error("[D009] Unsupported database scheme: {0}")]
    UnsupportedScheme(String),

    /// The payload stream failed while being read (D010)
    #[error("[D010] Failed to read migration payload: {0}")]
    PayloadRead(#[source] std::io::Error),

    /// Metadata request failed (D011)
    #[error("[D011] Metadata request failed: {0}")]
    Metadata(String),

    /// Internal error (D012)
    #[error("[D012] Internal database error: {0}")]
    Internal(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
