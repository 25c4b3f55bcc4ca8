//! Writing migrations: new units and squashed tails.
//!
//! New units always use the directory layout
//! (`<version>_<name>/up.sql`, `<version>_<name>/down.sql`), which
//! [`FileSource`](crate::FileSource) reads back unchanged.

use crate::error::{SourceError, SourceResult};
use crate::file::discover;
use crate::migration::{MigrationFile, Migrations};
use std::path::{Path, PathBuf};
use tl_core::PayloadFormat;

const UP_FILE: &str = "up.sql";
const DOWN_FILE: &str = "down.sql";

/// Version derived from the current time, in milliseconds since the epoch
pub fn timestamp_version() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(1)
}

/// A unit about to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMigration {
    pub version: u64,
    pub name: String,
    pub up: String,
    /// `None` writes no `down.sql`, leaving the unit irreversible
    pub down: Option<String>,
}

impl NewMigration {
    /// Empty up and down bodies
    pub fn new(version: u64, name: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            up: String::new(),
            down: Some(String::new()),
        }
    }

    pub fn with_up(mut self, sql: impl Into<String>) -> Self {
        self.up = sql.into();
        self
    }

    pub fn with_down(mut self, sql: Option<String>) -> Self {
        self.down = sql;
        self
    }

    fn dir_name(&self) -> String {
        format!("{}_{}", self.version, self.name)
    }
}

fn validate_name(name: &str) -> SourceResult<()> {
    let invalid = |reason: &str| {
        Err(SourceError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };
    if name.is_empty() {
        return invalid("name cannot be empty");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return invalid("use only letters, digits, '_' and '-'");
    }
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SourceError + '_ {
    move |e| SourceError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    }
}

/// Any file already registered for `version`
fn existing_path(migrations: &Migrations, version: u64) -> String {
    migrations
        .up(version)
        .or_else(|_| migrations.down(version))
        .map(|f| f.path.display().to_string())
        .unwrap_or_default()
}

/// Write `migration` as a unit directory under `root`.
///
/// `root` is created when missing. Returns the unit directory.
pub fn create(root: &Path, migration: &NewMigration) -> SourceResult<PathBuf> {
    validate_name(&migration.name)?;
    let unit = root.join(migration.dir_name());
    if migration.version == 0 {
        return Err(SourceError::InvalidVersion {
            path: unit.display().to_string(),
        });
    }

    std::fs::create_dir_all(root).map_err(io_error(root))?;
    let existing = discover(root)?;
    if existing.contains(migration.version) || unit.exists() {
        return Err(SourceError::DuplicateVersion {
            version: migration.version,
            first: existing_path(&existing, migration.version),
            second: unit.display().to_string(),
        });
    }

    std::fs::create_dir(&unit).map_err(io_error(&unit))?;
    let up = unit.join(UP_FILE);
    std::fs::write(&up, &migration.up).map_err(io_error(&up))?;
    if let Some(body) = &migration.down {
        let down = unit.join(DOWN_FILE);
        std::fs::write(&down, body).map_err(io_error(&down))?;
    }

    log::info!("Created migration {}", unit.display());
    Ok(unit)
}

/// Options for [`squash`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Squash {
    /// First version folded in; every later version follows
    pub from: u64,
    /// Version of the combined unit, above every squashed version
    pub version: u64,
    pub name: String,
    /// Remove the squashed files once the combined unit is written
    pub delete_source: bool,
}

/// Outcome of [`squash`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Squashed {
    pub path: PathBuf,
    pub versions: Vec<u64>,
    /// Whether every squashed unit had a down payload
    pub reversible: bool,
}

fn read_sql(file: &MigrationFile) -> SourceResult<String> {
    if file.format != PayloadFormat::Sql {
        return Err(SourceError::Squash(format!(
            "{} is not SQL",
            file.path.display()
        )));
    }
    std::fs::read_to_string(&file.path).map_err(io_error(&file.path))
}

fn section(migrations: &Migrations, version: u64, body: &str) -> SourceResult<String> {
    let label = match migrations.describe(version)?.name {
        Some(name) => format!("{version}_{name}"),
        None => version.to_string(),
    };
    Ok(format!("-- {label}\n{}\n", body.trim_end()))
}

/// Fold `from` and every later version into one new unit.
///
/// Up bodies are concatenated in ascending order and down bodies in
/// descending order. If any squashed unit lacks a down payload the combined
/// unit gets none. Only SQL payloads can be squashed.
pub fn squash(root: &Path, options: &Squash) -> SourceResult<Squashed> {
    let migrations = discover(root)?;
    if !migrations.contains(options.from) {
        return Err(SourceError::UnknownVersion(options.from));
    }
    let versions: Vec<u64> = migrations.versions().filter(|v| *v >= options.from).collect();
    let last = versions.last().copied().unwrap_or(options.from);
    if options.version <= last {
        return Err(SourceError::Squash(format!(
            "new version {} must be greater than {last}",
            options.version
        )));
    }

    let mut up = String::new();
    let mut files = Vec::new();
    for &version in &versions {
        let file = migrations.up(version)?;
        up.push_str(&section(&migrations, version, &read_sql(file)?)?);
        files.push(file.path.clone());
    }

    let mut down = Some(String::new());
    for &version in versions.iter().rev() {
        match migrations.down(version) {
            Ok(file) => {
                let body = section(&migrations, version, &read_sql(file)?)?;
                if let Some(down) = down.as_mut() {
                    down.push_str(&body);
                }
                files.push(file.path.clone());
            }
            Err(SourceError::NoDownMigration(_)) => {
                log::warn!("Migration {version} has no down payload; squashed unit is irreversible");
                down = None;
            }
            Err(e) => return Err(e),
        }
    }

    let reversible = down.is_some();
    let migration = NewMigration::new(options.version, options.name.clone())
        .with_up(up)
        .with_down(down);
    let path = create(root, &migration)?;

    if options.delete_source {
        for file in &files {
            std::fs::remove_file(file).map_err(io_error(file))?;
            remove_empty_unit_dir(root, file)?;
        }
        log::info!("Removed {} squashed migrations", versions.len());
    }

    Ok(Squashed {
        path,
        versions,
        reversible,
    })
}

fn remove_empty_unit_dir(root: &Path, file: &Path) -> SourceResult<()> {
    let Some(dir) = file.parent() else {
        return Ok(());
    };
    if dir == root {
        return Ok(());
    }
    let mut entries = std::fs::read_dir(dir).map_err(io_error(dir))?;
    if entries.next().is_none() {
        std::fs::remove_dir(dir).map_err(io_error(dir))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
