//! Error types for tl-metadata

use thiserror::Error;

/// Metadata errors
#[derive(Error, Debug)]
pub enum MetadataError {
    /// IO error with file path context (MD001)
    #[error("[MD001] IO error at {path}: {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Fragment could not be parsed or rendered (MD002)
    #[error("[MD002] YAML error in {path}: {message}")]
    YamlWithPath { path: String, message: String },

    /// Two plugins registered under one name (MD003)
    #[error("[MD003] Duplicate metadata plugin: {0}")]
    DuplicatePlugin(String),

    /// A fragment has the wrong shape (MD004)
    #[error("[MD004] Invalid metadata for plugin '{plugin}': {message}")]
    Validation { plugin: String, message: String },

    /// The target returned a document that is not a mapping (MD005)
    #[error("[MD005] Invalid metadata document: {0}")]
    InvalidDocument(String),
}

/// Result type alias for MetadataError
pub type MetadataResult<T> = Result<T, MetadataError>;
