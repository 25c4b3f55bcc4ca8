//! File-backed source driver

use crate::error::{SourceError, SourceResult};
use crate::migration::{MigrationFile, MigrationInfo, Migrations};
use crate::traits::SourceDriver;
use async_trait::async_trait;
use reqwest::Url;
use std::path::{Path, PathBuf};
use tl_core::Payload;

/// Source reading migrations from a local directory.
///
/// The directory is scanned once when the driver is opened; files added
/// afterwards are not seen until it is reopened.
#[derive(Debug)]
pub struct FileSource {
    root: PathBuf,
    migrations: Migrations,
}

impl FileSource {
    /// Open from a `file://` address
    pub fn open(address: &str) -> SourceResult<Self> {
        let url = Url::parse(address).map_err(|e| SourceError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "file" {
            return Err(SourceError::UnsupportedScheme(url.scheme().to_string()));
        }
        let path = url
            .to_file_path()
            .map_err(|_| SourceError::InvalidAddress {
                address: address.to_string(),
                reason: "address does not name a local path".to_string(),
            })?;
        Self::from_path(&path)
    }

    /// Open from a directory path
    pub fn from_path(root: &Path) -> SourceResult<Self> {
        let migrations = discover(root)?;
        log::debug!(
            "Discovered {} migrations in {}",
            migrations.len(),
            root.display()
        );
        Ok(Self {
            root: root.to_path_buf(),
            migrations,
        })
    }

    /// Directory the migrations were read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The discovered index
    pub fn migrations(&self) -> &Migrations {
        &self.migrations
    }

    async fn open_payload(file: &MigrationFile) -> SourceResult<Payload> {
        let handle = tokio::fs::File::open(&file.path)
            .await
            .map_err(|e| SourceError::IoWithPath {
                path: file.path.display().to_string(),
                source: e,
            })?;
        Ok(Payload::new(
            file.version,
            file.identifier.clone(),
            file.format,
            handle,
        ))
    }
}

/// Scan `root` for flat migration files and unit directories
pub(crate) fn discover(root: &Path) -> SourceResult<Migrations> {
    let entries = std::fs::read_dir(root).map_err(|e| SourceError::IoWithPath {
        path: root.display().to_string(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry_path(root, entry)?;
        if path.is_dir() {
            collect_unit_dir(&path, &mut files)?;
        } else if let Some(file) = MigrationFile::parse_flat(&path) {
            files.push(file);
        } else {
            log::debug!("Ignoring non-migration file {}", path.display());
        }
    }

    // read_dir order is platform dependent; sort so duplicate reports are stable
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut migrations = Migrations::new();
    for file in files {
        migrations.append(file)?;
    }
    Ok(migrations)
}

/// Path of one `read_dir` entry; an unreadable entry fails the scan
fn entry_path(dir: &Path, entry: std::io::Result<std::fs::DirEntry>) -> SourceResult<PathBuf> {
    entry
        .map(|e| e.path())
        .map_err(|e| SourceError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })
}

fn collect_unit_dir(dir: &Path, files: &mut Vec<MigrationFile>) -> SourceResult<()> {
    let Some(dir_name) = dir.file_name().and_then(|n| n.to_str()) else {
        return Ok(());
    };
    let entries = std::fs::read_dir(dir).map_err(|e| SourceError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;
    for entry in entries {
        let path = entry_path(dir, entry)?;
        match MigrationFile::parse_in_unit_dir(dir_name, &path) {
            Some(file) => files.push(file),
            None => log::debug!("Ignoring non-migration file {}", path.display()),
        }
    }
    Ok(())
}

#[async_trait]
impl SourceDriver for FileSource {
    async fn first(&self) -> SourceResult<u64> {
        self.migrations.first()
    }

    async fn next(&self, version: u64) -> SourceResult<u64> {
        self.migrations.next(version)
    }

    async fn prev(&self, version: u64) -> SourceResult<u64> {
        self.migrations.prev(version)
    }

    async fn read_up(&self, version: u64) -> SourceResult<Payload> {
        let file = self.migrations.up(version)?;
        Self::open_payload(file).await
    }

    async fn read_down(&self, version: u64) -> SourceResult<Payload> {
        let file = self.migrations.down(version)?;
        Self::open_payload(file).await
    }

    async fn describe(&self, version: u64) -> SourceResult<MigrationInfo> {
        self.migrations.describe(version)
    }

    async fn close(&self) -> SourceResult<()> {
        Ok(())
    }

    fn source_type(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
