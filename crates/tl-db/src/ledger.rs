//! Applied-version ledger state.
//!
//! The ledger is a single `(version, dirty)` row at the target. It is modeled
//! as a tagged state so a dirty flag can never be read without its version.
//! Version 0 means nothing has been applied.

use crate::error::{DbError, DbResult};
use std::fmt;

/// Persisted state of the version ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerState {
    /// The last transition to this version completed
    Clean(u64),
    /// A transition to this version started but was never confirmed
    Dirty(u64),
}

impl LedgerState {
    /// No migrations applied
    pub const UNVERSIONED: LedgerState = LedgerState::Clean(0);

    pub fn version(&self) -> u64 {
        match self {
            LedgerState::Clean(v) | LedgerState::Dirty(v) => *v,
        }
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, LedgerState::Dirty(_))
    }

    pub fn is_unversioned(&self) -> bool {
        *self == Self::UNVERSIONED
    }

    /// Decode a stored `(version, dirty)` row
    pub fn from_row(version: i64, dirty: bool) -> DbResult<Self> {
        let version = u64::try_from(version).map_err(|_| {
            DbError::Persist(format!("ledger holds negative version {version}"))
        })?;
        Ok(if dirty {
            LedgerState::Dirty(version)
        } else {
            LedgerState::Clean(version)
        })
    }

    /// Encode as a `(version, dirty)` row
    pub fn to_row(&self) -> DbResult<(i64, bool)> {
        let version = i64::try_from(self.version()).map_err(|_| {
            DbError::Persist(format!("version {} does not fit the ledger", self.version()))
        })?;
        Ok((version, self.is_dirty()))
    }
}

impl fmt::Display for LedgerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            s if s.is_unversioned() => f.write_str("unversioned"),
            LedgerState::Clean(v) => write!(f, "{v}"),
            LedgerState::Dirty(v) => write!(f, "{v} (dirty)"),
        }
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
