//! tl-db - Database drivers for Tideline
//!
//! This crate provides the `DatabaseDriver` trait, the tagged ledger state
//! it persists, and two implementations: the remote admin API driver and a
//! local DuckDB driver.

pub mod admin_api;
pub mod duckdb;
pub mod error;
pub mod ledger;
pub mod payload;
pub mod traits;

pub use admin_api::AdminApiDriver;
pub use duckdb::DuckDbDriver;
pub use error::{DbError, DbResult};
pub use ledger::LedgerState;
pub use traits::DatabaseDriver;

use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tl_core::LockSettings;

/// Query key overriding the lock timeout, in seconds
pub const LOCK_TIMEOUT_KEY: &str = "x-lock-timeout";

/// Query key overriding the lock poll interval, in milliseconds
pub const LOCK_POLL_KEY: &str = "x-lock-poll";

/// Open the database driver registered for the scheme of `address`
pub async fn open(address: &str) -> DbResult<Arc<dyn DatabaseDriver>> {
    let url = parse_address(address)?;
    match url.scheme() {
        tl_core::address::DATA_SCHEME => Ok(Arc::new(AdminApiDriver::open(address).await?)),
        "duckdb" => Ok(Arc::new(DuckDbDriver::open(address)?)),
        other => Err(DbError::UnsupportedScheme(other.to_string())),
    }
}

pub(crate) fn parse_address(address: &str) -> DbResult<Url> {
    Url::parse(address).map_err(|e| DbError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Read `x-lock-timeout` / `x-lock-poll` from an address, falling back to
/// the defaults.
pub fn lock_settings_from_query(url: &Url) -> DbResult<LockSettings> {
    let mut settings = LockSettings::default();
    for (key, value) in url.query_pairs() {
        let parse = |v: &str| {
            v.parse::<u64>().map_err(|_| DbError::InvalidAddress {
                address: url.to_string(),
                reason: format!("{key} must be a non-negative integer, found '{v}'"),
            })
        };
        match key.as_ref() {
            LOCK_TIMEOUT_KEY => settings.timeout_secs = parse(&value)?,
            LOCK_POLL_KEY => settings.poll_interval_ms = parse(&value)?.max(1),
            _ => {}
        }
    }
    Ok(settings)
}

/// Append lock settings to an address as driver-private query values
pub fn with_lock_settings(mut url: Url, settings: &LockSettings) -> Url {
    url.query_pairs_mut()
        .append_pair(LOCK_TIMEOUT_KEY, &settings.timeout_secs.to_string())
        .append_pair(LOCK_POLL_KEY, &settings.poll_interval_ms.to_string());
    url
}

/// Poll `attempt` until it reports success or `settings.timeout()` elapses.
///
/// `attempt` returns `Ok(true)` once the lock is held.
pub(crate) async fn acquire_with_timeout<F, Fut>(
    settings: &LockSettings,
    mut attempt: F,
) -> DbResult<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = DbResult<bool>>,
{
    let timeout = settings.timeout();
    let start = tokio::time::Instant::now();
    loop {
        if attempt().await? {
            return Ok(());
        }
        let waited = start.elapsed();
        if waited >= timeout {
            return Err(DbError::LockTimeout { waited });
        }
        let remaining = timeout - waited;
        tokio::time::sleep(settings.poll_interval().min(remaining).max(Duration::from_millis(1)))
            .await;
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
