//! Error types for tl-source

use thiserror::Error;

/// Source driver errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source holds no migrations (S001)
    #[error("[S001] No migrations found")]
    NoMigrations,

    /// Upper end of the available versions reached (S002)
    #[error("[S002] No migration after version {0}")]
    NoNextVersion(u64),

    /// Lower end of the available versions reached (S003)
    #[error("[S003] No migration before version {0}")]
    NoPreviousVersion(u64),

    /// Version exists but has no up payload (S004)
    #[error("[S004] No up migration for version {0}")]
    NoUpMigration(u64),

    /// Version exists but has no down payload; the unit is irreversible (S005)
    #[error("[S005] No down migration for version {0}")]
    NoDownMigration(u64),

    /// Two migration files claim the same version (S006)
    #[error("[S006] Duplicate migration version {version}: {first} and {second}")]
    DuplicateVersion {
        version: u64,
        first: String,
        second: String,
    },

    /// Version 0 is reserved for "nothing applied" (S007)
    #[error("[S007] Invalid migration version in {path}: version 0 is reserved")]
    InvalidVersion { path: String },

    /// Source address could not be parsed (S008)
    #[error("[S008] Invalid source address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// No source driver is registered for the scheme (S009)
    #[error("[S009] Unsupported source scheme: {0}")]
    UnsupportedScheme(String),

    /// Version is not part of the source (S010)
    #[error("[S010] Migration version {0} not found in source")]
    UnknownVersion(u64),

    /// IO error with path context (S011)
    #[error("[S011] IO error on '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// Migration name cannot be used in a file name (S012)
    #[error("[S012] Invalid migration name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Migrations cannot be combined (S013)
    #[error("[S013] Cannot squash migrations: {0}")]
    Squash(String),
}

impl SourceError {
    /// Whether this error only signals the end of the available range
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            SourceError::NoMigrations
                | SourceError::NoNextVersion(_)
                | SourceError::NoPreviousVersion(_)
        )
    }
}

/// Result type alias for SourceError
pub type SourceResult<T> = Result<T, SourceError>;
