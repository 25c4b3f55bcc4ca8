//! tl-source - Migration sources for Tideline
//!
//! This crate provides the `SourceDriver` trait and the file-backed
//! implementation that enumerates migration units from a directory, plus
//! the authoring helpers that write new units and squash existing ones.

pub mod create;
pub mod error;
pub mod file;
pub mod migration;
pub mod traits;

pub use create::{create, squash, timestamp_version, NewMigration, Squash, Squashed};
pub use error::{SourceError, SourceResult};
pub use file::FileSource;
pub use migration::{MigrationFile, MigrationInfo, Migrations};
pub use traits::SourceDriver;

use std::sync::Arc;
use tl_core::scheme_from_url;

/// Open the source driver registered for the scheme of `address`
pub fn open(address: &str) -> SourceResult<Arc<dyn SourceDriver>> {
    let scheme = scheme_from_url(address).map_err(|e| SourceError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })?;
    match scheme.as_str() {
        "file" => Ok(Arc::new(FileSource::open(address)?)),
        other => Err(SourceError::UnsupportedScheme(other.to_string())),
    }
}
