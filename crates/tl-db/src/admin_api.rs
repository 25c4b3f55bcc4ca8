//! Admin API database driver.
//!
//! Talks to a remote admin API over HTTP. Every operation is a JSON query
//! posted to `<base>/v1/query`: SQL goes through `run_sql`, multi-step work
//! through `bulk`, which the server applies atomically.

use crate::error::{DbError, DbResult};
use crate::ledger::LedgerState;
use crate::payload::{read_body, yaml_queries};
use crate::traits::DatabaseDriver;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tl_core::address::{DATA_SCHEME, HEADERS_KEY, SSLMODE_KEY};
use tl_core::{filter_custom_query, LockSettings, Payload, PayloadFormat};

/// Path of the query endpoint, relative to the base address
pub const QUERY_PATH: &str = "v1/query";

const CATALOG_DDL: &str = "CREATE SCHEMA IF NOT EXISTS tl_catalog; \
CREATE TABLE IF NOT EXISTS tl_catalog.schema_migrations (version BIGINT NOT NULL, dirty BOOLEAN NOT NULL); \
CREATE TABLE IF NOT EXISTS tl_catalog.migration_lock (id INTEGER PRIMARY KEY, owner TEXT NOT NULL, acquired_at TIMESTAMPTZ NOT NULL DEFAULT now());";

const SELECT_VERSION: &str = "SELECT version, dirty FROM tl_catalog.schema_migrations LIMIT 1";

/// Result of a `run_sql` query
#[derive(Debug, Deserialize)]
struct SqlResult {
    result_type: String,
    #[serde(default)]
    result: Option<Vec<Vec<Option<String>>>>,
}

impl SqlResult {
    /// Data rows, without the header row
    fn rows(&self) -> &[Vec<Option<String>>] {
        match &self.result {
            Some(rows) if self.result_type == "TuplesOk" && !rows.is_empty() => &rows[1..],
            _ => &[],
        }
    }
}

/// Error body returned with non-success statuses
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    error: String,
    #[serde(default)]
    path: String,
}

/// Remote migration target reached through the admin API
pub struct AdminApiDriver {
    client: Client,
    query_url: Url,
    owner: String,
    lock_settings: LockSettings,
}

impl AdminApiDriver {
    /// Open from an `admindb://host[:port][/path]?sslmode=..&headers=Name:Value` address.
    ///
    /// Creates the catalog tables on first use.
    pub async fn open(address: &str) -> DbResult<Self> {
        let driver = Self::from_address(address)?;
        driver
            .run_sql(CATALOG_DDL)
            .await
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", driver.query_url, e)))?;
        log::debug!("Connected to admin API at {}", driver.query_url);
        Ok(driver)
    }

    /// Build the driver without contacting the server
    pub fn from_address(address: &str) -> DbResult<Self> {
        let url = crate::parse_address(address)?;
        if url.scheme() != DATA_SCHEME {
            return Err(DbError::UnsupportedScheme(url.scheme().to_string()));
        }
        let invalid = |reason: String| DbError::InvalidAddress {
            address: address.to_string(),
            reason,
        };

        let lock_settings = crate::lock_settings_from_query(&url)?;
        let url = filter_custom_query(&url);

        let mut transport = "http";
        let mut headers = HeaderMap::new();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                SSLMODE_KEY => {
                    transport = match value.as_ref() {
                        "enable" => "https",
                        "disable" => "http",
                        other => return Err(invalid(format!("unknown sslmode '{other}'"))),
                    }
                }
                HEADERS_KEY => {
                    let (name, val) = value
                        .split_once(':')
                        .ok_or_else(|| invalid(format!("header '{value}' is not Name:Value")))?;
                    let name = HeaderName::from_bytes(name.trim().as_bytes())
                        .map_err(|e| invalid(format!("bad header name '{name}': {e}")))?;
                    let val = HeaderValue::from_str(val.trim())
                        .map_err(|e| invalid(format!("bad header value: {e}")))?;
                    headers.append(name, val);
                }
                other => log::debug!("Ignoring address query key '{}'", other),
            }
        }

        let host = url
            .host_str()
            .ok_or_else(|| invalid("address has no host".to_string()))?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let mut path = url.path().to_string();
        if !path.ends_with('/') {
            path.push('/');
        }
        let base = Url::parse(&format!("{transport}://{authority}{path}"))
            .map_err(|e| invalid(e.to_string()))?;
        let query_url = base
            .join(QUERY_PATH)
            .map_err(|e| invalid(e.to_string()))?;

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            query_url,
            owner: uuid::Uuid::new_v4().to_string(),
            lock_settings,
        })
    }

    /// Endpoint every query is posted to
    pub fn query_url(&self) -> &Url {
        &self.query_url
    }

    /// Identity recorded in the lock row while this driver holds it
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Post one query, returning the decoded response body or an error message
    async fn post(&self, query: &Value) -> Result<Value, String> {
        let response = self
            .client
            .post(self.query_url.clone())
            .json(query)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| format!("malformed response: {e}"));
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiError>(&text) {
            Ok(err) if err.path.is_empty() => Err(format!("{} ({})", err.error, err.code)),
            Ok(err) => Err(format!("{} ({} at {})", err.error, err.code, err.path)),
            Err(_) => Err(format!("server returned {status}: {text}")),
        }
    }

    async fn run_sql(&self, sql: &str) -> Result<SqlResult, String> {
        let body = self.post(&run_sql_query(sql)).await?;
        serde_json::from_value(body).map_err(|e| format!("malformed run_sql result: {e}"))
    }

    async fn bulk(&self, queries: Vec<Value>) -> Result<Value, String> {
        self.post(&json!({"type": "bulk", "args": queries})).await
    }

    async fn metadata_call(&self, kind: &str, args: Value) -> DbResult<Value> {
        self.post(&json!({"type": kind, "args": args}))
            .await
            .map_err(|e| DbError::Metadata(format!("{kind}: {e}")))
    }
}

fn run_sql_query(sql: &str) -> Value {
    json!({"type": "run_sql", "args": {"sql": sql}})
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "t" | "true" => Some(true),
        "f" | "false" => Some(false),
        _ => None,
    }
}

#[async_trait]
impl DatabaseDriver for AdminApiDriver {
    async fn close(&self) -> DbResult<()> {
        log::debug!("Closing admin API driver for {}", self.query_url);
        Ok(())
    }

    async fn lock(&self) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO tl_catalog.migration_lock (id, owner) VALUES (1, '{}') \
             ON CONFLICT (id) DO NOTHING RETURNING owner",
            self.owner
        );
        let sql = sql.as_str();
        crate::acquire_with_timeout(&self.lock_settings, || async move {
            let result = self.run_sql(sql).await.map_err(DbError::Lock)?;
            Ok(!result.rows().is_empty())
        })
        .await
    }

    async fn unlock(&self) -> DbResult<()> {
        let sql = format!(
            "DELETE FROM tl_catalog.migration_lock WHERE id = 1 AND owner = '{}'",
            self.owner
        );
        self.run_sql(&sql).await.map_err(DbError::Lock)?;
        Ok(())
    }

    async fn run(&self, mut payload: Payload) -> DbResult<()> {
        let body = read_body(&mut payload).await?;
        let version = payload.version;
        let apply_err = |e: String| DbError::Apply(format!("migration {version}: {e}"));
        match payload.format {
            PayloadFormat::Sql => {
                if body.trim().is_empty() {
                    log::debug!("Migration {} has an empty body", version);
                    return Ok(());
                }
                self.run_sql(&body).await.map_err(apply_err)?;
            }
            PayloadFormat::Yaml => {
                let queries = yaml_queries(version, &body)?;
                if queries.is_empty() {
                    log::debug!("Migration {} has no queries", version);
                    return Ok(());
                }
                self.bulk(queries).await.map_err(apply_err)?;
            }
        }
        Ok(())
    }

    async fn set_version(&self, state: LedgerState) -> DbResult<()> {
        let (version, dirty) = state.to_row()?;
        self.bulk(vec![
            run_sql_query("TRUNCATE tl_catalog.schema_migrations"),
            run_sql_query(&format!(
                "INSERT INTO tl_catalog.schema_migrations (version, dirty) VALUES ({version}, {dirty})"
            )),
        ])
        .await
        .map_err(DbError::Persist)?;
        Ok(())
    }

    async fn version(&self) -> DbResult<LedgerState> {
        let result = self.run_sql(SELECT_VERSION).await.map_err(DbError::Persist)?;
        let Some(row) = result.rows().first() else {
            return Ok(LedgerState::UNVERSIONED);
        };
        let field = |idx: usize| row.get(idx).and_then(|v| v.as_deref());
        let version = field(0)
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| DbError::Persist(format!("unreadable ledger row {row:?}")))?;
        let dirty = field(1)
            .and_then(parse_bool)
            .ok_or_else(|| DbError::Persist(format!("unreadable ledger row {row:?}")))?;
        LedgerState::from_row(version, dirty)
    }

    async fn drop_all(&self) -> DbResult<()> {
        self.bulk(vec![
            run_sql_query("DROP SCHEMA IF EXISTS public CASCADE; CREATE SCHEMA public;"),
            json!({"type": "clear_metadata", "args": {}}),
        ])
        .await
        .map_err(DbError::Apply)?;
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "admin_api"
    }

    async fn export_metadata(&self) -> DbResult<Value> {
        self.metadata_call("export_metadata", json!({})).await
    }

    async fn apply_metadata(&self, metadata: &Value) -> DbResult<()> {
        self.metadata_call("replace_metadata", metadata.clone())
            .await
            .map(|_| ())
    }

    async fn reset_metadata(&self) -> DbResult<()> {
        self.metadata_call("clear_metadata", json!({})).await.map(|_| ())
    }

    async fn reload_metadata(&self) -> DbResult<()> {
        self.metadata_call("reload_metadata", json!({})).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "admin_api_test.rs"]
mod tests;
