//! Ordered plugin registry

use crate::error::{MetadataError, MetadataResult};
use crate::fragment;
use crate::metadata::Metadata;
use crate::plugin::{ExportedFiles, MetadataPlugin};
use crate::plugins::{ActionsPlugin, LegacyPlugin, SectionPlugin, VersionPlugin, LIST_SECTIONS};
use std::path::Path;
use tl_core::{Config, ConfigVersion};

/// Metadata format written by the standard plugin set
pub const METADATA_FORMAT_VERSION: u64 = 2;

/// Plugins in registration order.
///
/// Every operation visits the plugins in that order and stops at the first
/// failure.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn MetadataPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard plugin set over a metadata directory
    pub fn standard(metadata_dir: &Path) -> MetadataResult<Self> {
        let mut registry = Self::new();
        registry.register(VersionPlugin::new(metadata_dir, METADATA_FORMAT_VERSION))?;
        for section in LIST_SECTIONS {
            registry.register(SectionPlugin::new(metadata_dir, section))?;
        }
        registry.register(ActionsPlugin::new(metadata_dir))?;
        Ok(registry)
    }

    /// Single-file layout of version 1 projects
    pub fn legacy(migrations_dir: &Path) -> MetadataResult<Self> {
        let mut registry = Self::new();
        registry.register(LegacyPlugin::new(migrations_dir))?;
        Ok(registry)
    }

    /// Registry matching the project's config version
    pub fn for_config(config: &Config, project_root: &Path) -> MetadataResult<Self> {
        match config.version {
            ConfigVersion::V1 => Self::legacy(&config.migrations_path(project_root)),
            ConfigVersion::V2 => Self::standard(&config.metadata_path(project_root)),
        }
    }

    /// Append a plugin, rejecting a name that is already registered
    pub fn register(&mut self, plugin: impl MetadataPlugin + 'static) -> MetadataResult<()> {
        if self.plugins.iter().any(|p| p.name() == plugin.name()) {
            return Err(MetadataError::DuplicatePlugin(plugin.name().to_string()));
        }
        self.plugins.push(Box::new(plugin));
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn validate(&self) -> MetadataResult<()> {
        for plugin in &self.plugins {
            log::debug!("Validating metadata plugin '{}'", plugin.name());
            plugin.validate()?;
        }
        Ok(())
    }

    pub fn create_files(&self) -> MetadataResult<()> {
        for plugin in &self.plugins {
            log::debug!("Scaffolding metadata plugin '{}'", plugin.name());
            plugin.create_files()?;
        }
        Ok(())
    }

    /// Assemble the document from every plugin's fragments
    pub fn build(&self) -> MetadataResult<Metadata> {
        let mut metadata = Metadata::new();
        for plugin in &self.plugins {
            log::debug!("Building metadata plugin '{}'", plugin.name());
            plugin.build(&mut metadata)?;
        }
        Ok(metadata)
    }

    /// Render every plugin's files. A later plugin wins on a shared path.
    pub fn export(&self, metadata: &Metadata) -> MetadataResult<ExportedFiles> {
        let mut files = ExportedFiles::new();
        for plugin in &self.plugins {
            log::debug!("Exporting metadata plugin '{}'", plugin.name());
            files.extend(plugin.export(metadata)?);
        }
        Ok(files)
    }

    /// Export and write the files to disk, returning how many were written
    pub fn write_export(&self, metadata: &Metadata) -> MetadataResult<usize> {
        let files = self.export(metadata)?;
        for (path, bytes) in &files {
            fragment::write(path, bytes)?;
        }
        Ok(files.len())
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
