//! Address builders for source and database drivers.
//!
//! Drivers are selected by the scheme of their address: `file://` for the
//! migration directory, `admindb://` for the remote admin API. The database
//! address carries the transport mode and authentication headers as query
//! values so a driver can be opened from a single string.

use crate::error::{CoreError, CoreResult};
use reqwest::Url;
use std::path::Path;

/// Scheme of addresses served by the admin API driver
pub const DATA_SCHEME: &str = "admindb";

/// Query key selecting https (`enable`) or http (`disable`)
pub const SSLMODE_KEY: &str = "sslmode";

/// Query key carrying one `Name:Value` header
pub const HEADERS_KEY: &str = "headers";

/// Return the scheme of `address`, failing when it has none.
pub fn scheme_from_url(address: &str) -> CoreResult<String> {
    let url = Url::parse(address).map_err(|e| CoreError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })?;
    if url.scheme().is_empty() {
        return Err(CoreError::InvalidAddress {
            address: address.to_string(),
            reason: "no scheme".to_string(),
        });
    }
    Ok(url.scheme().to_string())
}

/// Drop every query value whose key starts with `x-`.
///
/// Those keys configure the driver itself and must not leak to the target.
pub fn filter_custom_query(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !k.starts_with("x-"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut filtered = url.clone();
    if kept.is_empty() {
        filtered.set_query(None);
    } else {
        filtered.query_pairs_mut().clear().extend_pairs(kept);
    }
    filtered
}

/// Build the database address for an admin API `endpoint`.
///
/// `sslmode` is `enable` when the endpoint uses https. When `secret` is set
/// a `headers=<header_name>:<secret>` value is appended.
pub fn data_address(endpoint: &Url, header_name: &str, secret: Option<&str>) -> CoreResult<Url> {
    let host = endpoint.host_str().ok_or_else(|| CoreError::InvalidAddress {
        address: endpoint.to_string(),
        reason: "endpoint has no host".to_string(),
    })?;
    let authority = match endpoint.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let raw = format!("{DATA_SCHEME}://{authority}{}", endpoint.path());
    let mut url = Url::parse(&raw).map_err(|e| CoreError::InvalidAddress {
        address: raw.clone(),
        reason: e.to_string(),
    })?;

    let sslmode = if endpoint.scheme() == "https" {
        "enable"
    } else {
        "disable"
    };
    let mut pairs: Vec<(String, String)> = endpoint
        .query_pairs()
        .filter(|(k, _)| k != SSLMODE_KEY)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.push((SSLMODE_KEY.to_string(), sslmode.to_string()));
    if let Some(secret) = secret.filter(|s| !s.is_empty()) {
        pairs.push((HEADERS_KEY.to_string(), format!("{header_name}:{secret}")));
    }
    url.query_pairs_mut().extend_pairs(pairs);
    Ok(url)
}

/// Build the `file://` source address for a migrations directory.
///
/// Relative paths are resolved against the current directory.
pub fn file_address(dir: &Path) -> CoreResult<Url> {
    let absolute = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| CoreError::IoWithPath {
                path: dir.display().to_string(),
                source: e,
            })?
            .join(dir)
    };
    Url::from_file_path(&absolute).map_err(|_| CoreError::InvalidAddress {
        address: absolute.display().to_string(),
        reason: "not a valid file path".to_string(),
    })
}

#[cfg(test)]
#[path = "address_test.rs"]
mod tests;
