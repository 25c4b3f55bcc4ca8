//! Metadata plugin trait definition

use crate::error::MetadataResult;
use crate::metadata::Metadata;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Files produced by an export, keyed by destination path
pub type ExportedFiles = BTreeMap<PathBuf, Vec<u8>>;

/// Translates one part of the metadata document to and from disk
pub trait MetadataPlugin: Send + Sync {
    /// Unique name within a registry
    fn name(&self) -> &str;

    /// Check the on-disk fragments without loading them into a document
    fn validate(&self) -> MetadataResult<()>;

    /// Scaffold default fragments, leaving existing ones alone
    fn create_files(&self) -> MetadataResult<()>;

    /// Load fragments into `metadata`
    fn build(&self, metadata: &mut Metadata) -> MetadataResult<()>;

    /// Render the plugin's sections of `metadata` as fragment files
    fn export(&self, metadata: &Metadata) -> MetadataResult<ExportedFiles>;
}
