//! tl-metadata - Metadata plugin registry for Tideline
//!
//! Metadata lives on disk as YAML fragments, one per section, and at the
//! target as a single document. Plugins translate between the two; the
//! registry runs them in registration order.

pub mod error;
pub mod fragment;
pub mod metadata;
pub mod plugin;
pub mod plugins;
pub mod registry;

pub use error::{MetadataError, MetadataResult};
pub use metadata::Metadata;
pub use plugin::{ExportedFiles, MetadataPlugin};
pub use registry::PluginRegistry;
