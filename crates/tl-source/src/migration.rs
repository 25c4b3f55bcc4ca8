//! Migration file naming and the ordered version index.
//!
//! Two layouts are recognised inside a migrations directory:
//!
//! - flat files: `1700000000000_create_users.up.sql`
//! - one directory per unit: `1700000000000_create_users/down.yaml`
//!
//! The numeric prefix is the version, the remainder of the name (optional)
//! is the identifier shown to operators.

use crate::error::{SourceError, SourceResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tl_core::{Direction, PayloadFormat};

static FLAT_FILE_RE: OnceLock<Regex> = OnceLock::new();
static UNIT_DIR_RE: OnceLock<Regex> = OnceLock::new();
static UNIT_FILE_RE: OnceLock<Regex> = OnceLock::new();

fn flat_file_re() -> &'static Regex {
    FLAT_FILE_RE.get_or_init(|| {
        Regex::new(r"^([0-9]+)(?:_(.*))?\.(up|down)\.(sql|yaml|yml)$").expect("valid regex")
    })
}

fn unit_dir_re() -> &'static Regex {
    UNIT_DIR_RE.get_or_init(|| Regex::new(r"^([0-9]+)(?:_(.*))?$").expect("valid regex"))
}

fn unit_file_re() -> &'static Regex {
    UNIT_FILE_RE.get_or_init(|| Regex::new(r"^(up|down)\.(sql|yaml|yml)$").expect("valid regex"))
}

/// One payload file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub version: u64,
    pub identifier: Option<String>,
    pub direction: Direction,
    pub format: PayloadFormat,
    pub path: PathBuf,
}

impl MigrationFile {
    /// Parse a flat `<version>_<name>.<direction>.<ext>` file name.
    ///
    /// Returns `None` for names that do not follow the convention.
    pub fn parse_flat(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let caps = flat_file_re().captures(file_name)?;
        Some(Self {
            version: caps.get(1)?.as_str().parse().ok()?,
            identifier: non_empty(caps.get(2).map(|m| m.as_str())),
            direction: parse_direction(caps.get(3)?.as_str())?,
            format: PayloadFormat::from_extension(caps.get(4)?.as_str())?,
            path: path.to_path_buf(),
        })
    }

    /// Parse `<version>_<name>/<direction>.<ext>` given the unit directory
    /// name and the file path inside it.
    pub fn parse_in_unit_dir(dir_name: &str, path: &Path) -> Option<Self> {
        let dir_caps = unit_dir_re().captures(dir_name)?;
        let file_name = path.file_name()?.to_str()?;
        let file_caps = unit_file_re().captures(file_name)?;
        Some(Self {
            version: dir_caps.get(1)?.as_str().parse().ok()?,
            identifier: non_empty(dir_caps.get(2).map(|m| m.as_str())),
            direction: parse_direction(file_caps.get(1)?.as_str())?,
            format: PayloadFormat::from_extension(file_caps.get(2)?.as_str())?,
            path: path.to_path_buf(),
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.filter(|s| !s.is_empty()).map(String::from)
}

fn parse_direction(s: &str) -> Option<Direction> {
    match s {
        "up" => Some(Direction::Up),
        "down" => Some(Direction::Down),
        _ => None,
    }
}

/// Name and available directions of one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationInfo {
    pub version: u64,
    pub name: Option<String>,
    pub has_up: bool,
    pub has_down: bool,
}

#[derive(Debug, Default)]
struct Unit {
    identifier: Option<String>,
    up: Option<MigrationFile>,
    down: Option<MigrationFile>,
}

/// Ordered index of every migration in a source
#[derive(Debug, Default)]
pub struct Migrations {
    units: BTreeMap<u64, Unit>,
}

impl Migrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the index.
    ///
    /// Fails when the version is 0, when the direction is already taken, or
    /// when the version is already claimed under a different name.
    pub fn append(&mut self, file: MigrationFile) -> SourceResult<()> {
        if file.version == 0 {
            return Err(SourceError::InvalidVersion {
                path: file.path.display().to_string(),
            });
        }

        let is_new = !self.units.contains_key(&file.version);
        let unit = self.units.entry(file.version).or_default();

        if !is_new && unit.identifier != file.identifier {
            let existing = unit
                .up
                .as_ref()
                .or(unit.down.as_ref())
                .map(|f| f.path.display().to_string())
                .unwrap_or_default();
            return Err(SourceError::DuplicateVersion {
                version: file.version,
                first: existing,
                second: file.path.display().to_string(),
            });
        }
        unit.identifier = file.identifier.clone();

        let slot = match file.direction {
            Direction::Up => &mut unit.up,
            Direction::Down => &mut unit.down,
        };
        if let Some(existing) = slot {
            return Err(SourceError::DuplicateVersion {
                version: file.version,
                first: existing.path.display().to_string(),
                second: file.path.display().to_string(),
            });
        }
        *slot = Some(file);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// All versions in ascending order
    pub fn versions(&self) -> impl Iterator<Item = u64> + '_ {
        self.units.keys().copied()
    }

    pub fn contains(&self, version: u64) -> bool {
        self.units.contains_key(&version)
    }

    pub fn first(&self) -> SourceResult<u64> {
        self.units
            .keys()
            .next()
            .copied()
            .ok_or(SourceError::NoMigrations)
    }

    pub fn next(&self, version: u64) -> SourceResult<u64> {
        self.units
            .range((Bound::Excluded(version), Bound::Unbounded))
            .next()
            .map(|(v, _)| *v)
            .ok_or(SourceError::NoNextVersion(version))
    }

    pub fn prev(&self, version: u64) -> SourceResult<u64> {
        self.units
            .range(..version)
            .next_back()
            .map(|(v, _)| *v)
            .ok_or(SourceError::NoPreviousVersion(version))
    }

    pub fn up(&self, version: u64) -> SourceResult<&MigrationFile> {
        self.units
            .get(&version)
            .and_then(|u| u.up.as_ref())
            .ok_or(SourceError::NoUpMigration(version))
    }

    pub fn down(&self, version: u64) -> SourceResult<&MigrationFile> {
        self.units
            .get(&version)
            .and_then(|u| u.down.as_ref())
            .ok_or(SourceError::NoDownMigration(version))
    }

    pub fn describe(&self, version: u64) -> SourceResult<MigrationInfo> {
        let unit = self
            .units
            .get(&version)
            .ok_or(SourceError::UnknownVersion(version))?;
        Ok(MigrationInfo {
            version,
            name: unit.identifier.clone(),
            has_up: unit.up.is_some(),
            has_down: unit.down.is_some(),
        })
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
