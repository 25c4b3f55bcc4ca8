//! Test doubles: a recording database driver and a throttling source wrapper

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tl_core::{Payload, ThrottledReader};
use tl_db::{DatabaseDriver, DbError, DbResult, LedgerState};
use tl_source::{MigrationInfo, SourceDriver, SourceResult};

/// One `run` call as observed by the target
#[derive(Debug, Clone)]
pub(crate) struct RunRecord {
    pub driver: usize,
    pub version: u64,
    pub body: String,
    pub started: Instant,
    pub finished: Instant,
}

/// State of one simulated target, shared by every driver connected to it
#[derive(Debug)]
pub(crate) struct TargetState {
    pub ledger: LedgerState,
    pub ledger_writes: Vec<LedgerState>,
    pub lock_owner: Option<usize>,
    pub lock_calls: usize,
    pub runs: Vec<RunRecord>,
    pub drops: usize,
    pub metadata: Value,
    pub fail_run: Option<u64>,
    pub fail_clean_write: Option<u64>,
    pub fail_unlock: bool,
    pub unlock_delay: Option<Duration>,
    pub fail_close: bool,
}

impl Default for TargetState {
    fn default() -> Self {
        Self {
            ledger: LedgerState::UNVERSIONED,
            ledger_writes: Vec::new(),
            lock_owner: None,
            lock_calls: 0,
            runs: Vec::new(),
            drops: 0,
            metadata: Value::Object(Default::default()),
            fail_run: None,
            fail_clean_write: None,
            fail_unlock: false,
            unlock_delay: None,
            fail_close: false,
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct Target(Arc<Mutex<TargetState>>);

impl Target {
    pub fn state(&self) -> MutexGuard<'_, TargetState> {
        self.0.lock().unwrap()
    }

    /// A new driver connected to this target
    pub fn connect(&self, id: usize) -> Arc<RecordingDriver> {
        Arc::new(RecordingDriver {
            id,
            target: self.clone(),
        })
    }

    pub fn run_versions(&self) -> Vec<u64> {
        self.state().runs.iter().map(|r| r.version).collect()
    }
}

pub(crate) struct RecordingDriver {
    id: usize,
    target: Target,
}

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
impl DatabaseDriver for RecordingDriver {
    async fn close(&self) -> DbResult<()> {
        if self.target.state().fail_close {
            return Err(DbError::ConnectionError("close failed".to_string()));
        }
        Ok(())
    }

    async fn lock(&self) -> DbResult<()> {
        let start = Instant::now();
        loop {
            {
                let mut state = self.target.state();
                state.lock_calls += 1;
                if state.lock_owner.is_none() {
                    state.lock_owner = Some(self.id);
                    return Ok(());
                }
            }
            if start.elapsed() > LOCK_TIMEOUT {
                return Err(DbError::LockTimeout {
                    waited: start.elapsed(),
                });
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    async fn unlock(&self) -> DbResult<()> {
        let delay = self.target.state().unlock_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.target.state();
        if state.fail_unlock {
            return Err(DbError::Lock("unlock refused".to_string()));
        }
        if state.lock_owner == Some(self.id) {
            state.lock_owner = None;
        }
        Ok(())
    }

    async fn run(&self, mut payload: Payload) -> DbResult<()> {
        let started = Instant::now();
        let body = tl_db::payload::read_body(&mut payload).await?;
        let finished = Instant::now();
        let mut state = self.target.state();
        state.runs.push(RunRecord {
            driver: self.id,
            version: payload.version,
            body,
            started,
            finished,
        });
        if state.fail_run == Some(payload.version) {
            return Err(DbError::Apply(format!(
                "migration {}: injected failure",
                payload.version
            )));
        }
        Ok(())
    }

    async fn set_version(&self, ledger: LedgerState) -> DbResult<()> {
        let mut state = self.target.state();
        if let LedgerState::Clean(v) = ledger {
            if state.fail_clean_write == Some(v) {
                return Err(DbError::Persist("injected write failure".to_string()));
            }
        }
        state.ledger = ledger;
        state.ledger_writes.push(ledger);
        Ok(())
    }

    async fn version(&self) -> DbResult<LedgerState> {
        Ok(self.target.state().ledger)
    }

    async fn drop_all(&self) -> DbResult<()> {
        self.target.state().drops += 1;
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "recording"
    }

    async fn export_metadata(&self) -> DbResult<Value> {
        Ok(self.target.state().metadata.clone())
    }

    async fn apply_metadata(&self, metadata: &Value) -> DbResult<()> {
        self.target.state().metadata = metadata.clone();
        Ok(())
    }
}

/// Delivers every payload one byte at a time
pub(crate) struct ThrottledSource {
    inner: Arc<dyn SourceDriver>,
    delay: Duration,
}

impl ThrottledSource {
    pub fn new(inner: Arc<dyn SourceDriver>, delay: Duration) -> Self {
        Self { inner, delay }
    }

    fn throttle(&self, payload: Payload) -> Payload {
        let delay = self.delay;
        payload.map_reader(|reader| ThrottledReader::with_delay(reader, delay))
    }
}

#[async_trait]
impl SourceDriver for ThrottledSource {
    async fn first(&self) -> SourceResult<u64> {
        self.inner.first().await
    }

    async fn next(&self, version: u64) -> SourceResult<u64> {
        self.inner.next(version).await
    }

    async fn prev(&self, version: u64) -> SourceResult<u64> {
        self.inner.prev(version).await
    }

    async fn read_up(&self, version: u64) -> SourceResult<Payload> {
        Ok(self.throttle(self.inner.read_up(version).await?))
    }

    async fn read_down(&self, version: u64) -> SourceResult<Payload> {
        Ok(self.throttle(self.inner.read_down(version).await?))
    }

    async fn describe(&self, version: u64) -> SourceResult<MigrationInfo> {
        self.inner.describe(version).await
    }

    async fn close(&self) -> SourceResult<()> {
        self.inner.close().await
    }

    fn source_type(&self) -> &'static str {
        "throttled"
    }
}

/// Write flat migration files: `(version, name, up, down)`
pub(crate) fn write_migrations(dir: &Path, units: &[(u64, &str, &str, Option<&str>)]) {
    for (version, name, up, down) in units {
        std::fs::write(dir.join(format!("{version}_{name}.up.sql")), up).unwrap();
        if let Some(down) = down {
            std::fs::write(dir.join(format!("{version}_{name}.down.sql")), down).unwrap();
        }
    }
}

/// Standard three-unit project used across orchestrator tests
pub(crate) fn write_three(dir: &Path) {
    write_migrations(
        dir,
        &[
            (1, "users", "CREATE TABLE users;", Some("DROP TABLE users;")),
            (2, "posts", "CREATE TABLE posts;", Some("DROP TABLE posts;")),
            (3, "tags", "CREATE TABLE tags;", Some("DROP TABLE tags;")),
        ],
    );
}
