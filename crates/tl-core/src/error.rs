//! Error types for tl-core

use thiserror::Error;

/// Core error type for Tideline
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config {path}: {message}")]
    ConfigParseError { path: String, message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Address could not be parsed or is missing required parts
    #[error("[C004] Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// C005: Step count rejected by the step policy
    #[error("[C005] Invalid step count '{input}': {reason}")]
    InvalidSteps { input: String, reason: String },

    /// C006: IO error with file path context
    #[error("[C006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
