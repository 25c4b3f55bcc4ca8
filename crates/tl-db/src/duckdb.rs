//! DuckDB database driver implementation

use crate::error::{DbError, DbResult};
use crate::ledger::LedgerState;
use crate::payload::read_body;
use crate::traits::DatabaseDriver;
use async_trait::async_trait;
use duckdb::{params, Connection, OptionalExt};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tl_core::{LockSettings, Payload, PayloadFormat};

/// Scheme served by this driver
pub const SCHEME: &str = "duckdb";

const CATALOG_DDL: &str = "
CREATE SCHEMA IF NOT EXISTS tl_catalog;
CREATE TABLE IF NOT EXISTS tl_catalog.schema_migrations (
    version BIGINT NOT NULL,
    dirty BOOLEAN NOT NULL
);
CREATE TABLE IF NOT EXISTS tl_catalog.migration_lock (
    id INTEGER PRIMARY KEY,
    owner VARCHAR NOT NULL,
    acquired_at TIMESTAMP NOT NULL DEFAULT current_timestamp
);
CREATE TABLE IF NOT EXISTS tl_catalog.metadata (
    id INTEGER PRIMARY KEY,
    document VARCHAR NOT NULL
);
";

/// DuckDB migration target
pub struct DuckDbDriver {
    conn: Mutex<Connection>,
    owner: String,
    lock_settings: LockSettings,
}

impl DuckDbDriver {
    /// Create a new in-memory DuckDB target
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Create a DuckDB target backed by a file
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Open from a `duckdb:///path/to/file.db` or `duckdb::memory:` address
    pub fn open(address: &str) -> DbResult<Self> {
        let url = crate::parse_address(address)?;
        if url.scheme() != SCHEME {
            return Err(DbError::UnsupportedScheme(url.scheme().to_string()));
        }
        let settings = crate::lock_settings_from_query(&url)?;
        let driver = if url.path() == ":memory:" {
            Self::in_memory()?
        } else {
            let path = url.to_file_path().map_err(|_| DbError::InvalidAddress {
                address: address.to_string(),
                reason: "expected duckdb:///absolute/path or duckdb::memory:".to_string(),
            })?;
            Self::from_path(&path)?
        };
        Ok(driver.with_lock_settings(settings))
    }

    /// Override the lock wait settings
    pub fn with_lock_settings(mut self, settings: LockSettings) -> Self {
        self.lock_settings = settings;
        self
    }

    /// Open a second driver on the same database with its own lock identity
    pub fn connect_shared(&self) -> DbResult<Self> {
        let conn = self
            .conn()?
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn)?.with_lock_settings(self.lock_settings))
    }

    /// Identity recorded in the lock row while this driver holds it
    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn from_connection(conn: Connection) -> DbResult<Self> {
        conn.execute_batch(CATALOG_DDL)
            .map_err(|e| DbError::ConnectionError(format!("failed to create catalog: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
            owner: uuid::Uuid::new_v4().to_string(),
            lock_settings: LockSettings::default(),
        })
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn try_lock_sync(&self) -> DbResult<bool> {
        let conn = self.conn()?;
        let inserted = conn
            .execute(
                "INSERT INTO tl_catalog.migration_lock (id, owner) VALUES (1, ?) ON CONFLICT DO NOTHING",
                params![self.owner],
            )
            .map_err(|e| DbError::Lock(e.to_string()))?;
        Ok(inserted == 1)
    }

    fn unlock_sync(&self) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM tl_catalog.migration_lock WHERE id = 1 AND owner = ?",
            params![self.owner],
        )
        .map_err(|e| DbError::Lock(e.to_string()))?;
        Ok(())
    }

    fn set_version_sync(&self, state: LedgerState) -> DbResult<()> {
        let (version, dirty) = state.to_row()?;
        let mut conn = self.conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| DbError::Persist(e.to_string()))?;
        tx.execute("DELETE FROM tl_catalog.schema_migrations", [])
            .map_err(|e| DbError::Persist(e.to_string()))?;
        tx.execute(
            "INSERT INTO tl_catalog.schema_migrations (version, dirty) VALUES (?, ?)",
            params![version, dirty],
        )
        .map_err(|e| DbError::Persist(e.to_string()))?;
        tx.commit().map_err(|e| DbError::Persist(e.to_string()))
    }

    fn version_sync(&self) -> DbResult<LedgerState> {
        let conn = self.conn()?;
        let row: Option<(i64, bool)> = conn
            .query_row(
                "SELECT version, dirty FROM tl_catalog.schema_migrations LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| DbError::Persist(e.to_string()))?;
        match row {
            Some((version, dirty)) => LedgerState::from_row(version, dirty),
            None => Ok(LedgerState::UNVERSIONED),
        }
    }

    /// Drop every table and view in the main schema and clear stored metadata
    fn drop_all_sync(&self) -> DbResult<()> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT table_name, table_type FROM information_schema.tables \
                 WHERE table_schema = 'main' ORDER BY table_type DESC, table_name",
            )
            .map_err(|e| DbError::Apply(e.to_string()))?;
        let relations: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| DbError::Apply(e.to_string()))?
            .collect::<Result<_, _>>()
            .map_err(|e| DbError::Apply(e.to_string()))?;

        // Views sort first ('VIEW' > 'BASE TABLE')
        for (name, kind) in relations {
            let keyword = if kind == "VIEW" { "VIEW" } else { "TABLE" };
            log::debug!("Dropping {} main.{}", keyword.to_lowercase(), name);
            conn.execute_batch(&format!(
                "DROP {} IF EXISTS main.\"{}\"",
                keyword,
                name.replace('"', "\"\"")
            ))
            .map_err(|e| DbError::Apply(format!("failed to drop {name}: {e}")))?;
        }

        conn.execute_batch("DELETE FROM tl_catalog.metadata")
            .map_err(|e| DbError::Apply(e.to_string()))
    }

    fn export_metadata_sync(&self) -> DbResult<Value> {
        let conn = self.conn()?;
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM tl_catalog.metadata WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DbError::Metadata(e.to_string()))?;
        match document {
            Some(doc) => serde_json::from_str(&doc)
                .map_err(|e| DbError::Metadata(format!("stored metadata is not JSON: {e}"))),
            None => Ok(Value::Object(Default::default())),
        }
    }

    fn apply_metadata_sync(&self, metadata: &Value) -> DbResult<()> {
        let document =
            serde_json::to_string(metadata).map_err(|e| DbError::Metadata(e.to_string()))?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO tl_catalog.metadata (id, document) VALUES (1, ?)",
            params![document],
        )
        .map_err(|e| DbError::Metadata(e.to_string()))?;
        Ok(())
    }

    fn reset_metadata_sync(&self) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute_batch("DELETE FROM tl_catalog.metadata")
            .map_err(|e| DbError::Metadata(e.to_string()))
    }
}

#[async_trait]
impl DatabaseDriver for DuckDbDriver {
    async fn close(&self) -> DbResult<()> {
        log::debug!("Closing duckdb target");
        Ok(())
    }

    async fn lock(&self) -> DbResult<()> {
        crate::acquire_with_timeout(&self.lock_settings, || async move { self.try_lock_sync() })
            .await
    }

    async fn unlock(&self) -> DbResult<()> {
        self.unlock_sync()
    }

    async fn run(&self, mut payload: Payload) -> DbResult<()> {
        let body = read_body(&mut payload).await?;
        match payload.format {
            PayloadFormat::Yaml => Err(self.not_implemented("YAML migration payloads")),
            PayloadFormat::Sql if body.trim().is_empty() => {
                log::debug!("Migration {} has an empty body", payload.version);
                Ok(())
            }
            PayloadFormat::Sql => {
                let conn = self.conn()?;
                conn.execute_batch(&body)
                    .map_err(|e| DbError::Apply(format!("migration {}: {}", payload.version, e)))
            }
        }
    }

    async fn set_version(&self, state: LedgerState) -> DbResult<()> {
        self.set_version_sync(state)
    }

    async fn version(&self) -> DbResult<LedgerState> {
        self.version_sync()
    }

    async fn drop_all(&self) -> DbResult<()> {
        self.drop_all_sync()
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    async fn export_metadata(&self) -> DbResult<Value> {
        self.export_metadata_sync()
    }

    async fn apply_metadata(&self, metadata: &Value) -> DbResult<()> {
        self.apply_metadata_sync(metadata)
    }

    async fn reset_metadata(&self) -> DbResult<()> {
        self.reset_metadata_sync()
    }

    async fn reload_metadata(&self) -> DbResult<()> {
        // Stored metadata is read on every export; nothing is cached
        Ok(())
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
