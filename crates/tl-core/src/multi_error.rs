//! Composite error holding several independent failures.
//!
//! Used wherever a cleanup step (unlocking, closing drivers) fails after the
//! operation itself already failed: both causes are kept, in order, instead
//! of one overwriting the other.

use std::error::Error;
use std::fmt;

/// Separator placed between cause messages when rendering.
///
/// Operator tooling parses this text, so it must not change.
pub const SEPARATOR: &str = " and ";

type Cause = Box<dyn Error + Send + Sync + 'static>;

/// Ordered, immutable collection of failures rendered as one error.
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<Cause>,
}

impl MultiError {
    /// Build from optional errors, keeping only the `Some` entries.
    pub fn new<I, E>(errors: I) -> Self
    where
        I: IntoIterator<Item = Option<E>>,
        E: Into<Cause>,
    {
        Self {
            errors: errors.into_iter().flatten().map(Into::into).collect(),
        }
    }

    /// Build from results, keeping only the failures.
    pub fn from_results<I, T, E>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<T, E>>,
        E: Into<Cause>,
    {
        Self::new(results.into_iter().map(Result::err))
    }

    /// The retained causes, in original order
    pub fn errors(&self) -> &[Cause] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing failed, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), MultiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .errors
            .iter()
            .map(|e| e.to_string())
            .filter(|m| !m.is_empty())
            .collect();
        f.write_str(&messages.join(SEPARATOR))
    }
}

impl Error for MultiError {}

#[cfg(test)]
#[path = "multi_error_test.rs"]
mod tests;
