//! Step-count policy for `up` / `down`.
//!
//! A count is either "all remaining" or a strictly positive number. Zero,
//! negative numbers and anything else are rejected; direction is chosen by
//! the verb, never by the sign of the count.

use crate::error::{CoreError, CoreResult};
use std::fmt;

/// Keyword selecting every remaining migration
pub const ALL: &str = "all";

/// How many migrations a bounded run may apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steps {
    /// Walk until the source is exhausted
    All,
    /// Apply at most this many migrations (always > 0)
    Count(u64),
}

impl Steps {
    /// Parse a user-supplied step count; `None` means [`Steps::All`].
    pub fn parse(input: Option<&str>) -> CoreResult<Self> {
        let raw = match input.map(str::trim) {
            None => return Ok(Steps::All),
            Some(s) if s.is_empty() || s.eq_ignore_ascii_case(ALL) => return Ok(Steps::All),
            Some(s) => s,
        };

        let n: i64 = raw.parse().map_err(|_| CoreError::InvalidSteps {
            input: raw.to_string(),
            reason: format!("expected a positive integer or '{ALL}'"),
        })?;
        Self::from_signed(n).map_err(|reason| CoreError::InvalidSteps {
            input: raw.to_string(),
            reason,
        })
    }

    /// Convert a signed count, rejecting zero and negative values.
    pub fn from_signed(n: i64) -> Result<Self, String> {
        match n {
            n if n < 0 => Err(
                "negative step counts are not supported; use the down direction instead"
                    .to_string(),
            ),
            0 => Err("step count must be at least 1".to_string()),
            n => Ok(Steps::Count(n as u64)),
        }
    }

    /// Whether `applied` steps exhaust this budget
    pub fn is_exhausted(&self, applied: u64) -> bool {
        match self {
            Steps::All => false,
            Steps::Count(n) => applied >= *n,
        }
    }
}

impl fmt::Display for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Steps::All => f.write_str(ALL),
            Steps::Count(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
#[path = "steps_test.rs"]
mod tests;
