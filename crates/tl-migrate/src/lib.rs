//! tl-migrate - Migration orchestrator for Tideline
//!
//! `Migrate` composes one source driver, one database driver and a metadata
//! plugin registry. Every mutating operation runs under the target's lock and
//! follows the dirty-state protocol, so an interrupted step is never retried
//! automatically.

pub mod error;
pub mod lock;
pub mod migrate;
pub mod status;

#[cfg(test)]
mod testing;

pub use error::{MigrateError, MigrateResult};
pub use lock::LockGuard;
pub use migrate::{AppliedStep, Migrate};
pub use status::{StatusEntry, StatusReport};
