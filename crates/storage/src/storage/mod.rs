//! `SQLite` storage implementation, one file per component.
//!
//! All methods are synchronous. Writes that span several rows run in a
//! single transaction; everything else is a single statement and relies on
//! `SQLite`'s own locking (busy timeout set per connection).

// SQLite uses i64 for counts/limits, Rust uses usize - safe conversions within DB context
#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "SQLite i64 <-> Rust usize conversions are safe within DB row counts"
)]

mod export;
mod graph;
mod observations;
mod passive;
mod prompts;
mod relations;
mod search;
mod sessions;
mod stats;

pub use export::ImportResult;
pub use passive::{PassiveCaptureParams, PassiveCaptureResult};
pub use stats::Stats;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use agentmem_core::{MemoryConfig, Observation, Scope};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use rusqlite::types::{Type, Value};

use crate::error::Result;
use crate::migrations;

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Injectable time source. Production uses [`Utc::now`]; tests pin it.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Main storage handle wrapping the `SQLite` connection pool.
///
/// Cheap to clone; clones share the pool, config and clock.
#[derive(Clone)]
pub struct Storage {
    pub(crate) pool: Pool<SqliteConnectionManager>,
    pub(crate) config: MemoryConfig,
    clock: Clock,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Get a connection from the pool
pub(crate) fn get_conn(pool: &Pool<SqliteConnectionManager>) -> Result<PooledConn> {
    Ok(pool.get()?)
}

/// Log row read errors and filter them out
pub(crate) fn log_row_error<T>(result: rusqlite::Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("Row read error: {}", e);
            None
        },
    }
}

/// Fixed-width RFC 3339 so stored timestamps order lexicographically.
pub(crate) fn to_db_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp. Accepts RFC 3339 and the bare
/// `YYYY-MM-DD HH:MM:SS` form legacy rows were written with.
pub(crate) fn parse_db_time(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_opt_db_time(
    idx: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_db_time(idx, &s)).transpose()
}

/// Sanitizes free text into an FTS5 query: every whitespace-separated token
/// is stripped of quotes and wrapped in quotes, so operators and column
/// filters in user input are matched literally. Tokens are implicitly ANDed.
///
/// Returns `None` when no token survives, which callers treat as "list by
/// recency instead".
pub(crate) fn build_fts_query(query: &str) -> Option<String> {
    let tokens: Vec<String> = query
        .split_whitespace()
        .map(|word| word.replace('"', ""))
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{word}\""))
        .collect();
    (!tokens.is_empty()).then(|| tokens.join(" "))
}

/// Accumulates optional `AND` predicates with their bound values.
#[derive(Default)]
pub(crate) struct FilterClause {
    sql: String,
    values: Vec<Value>,
}

impl FilterClause {
    /// Appends `AND <column> = ?` when `value` is present and not blank.
    pub(crate) fn eq(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.values.push(Value::Text(v.to_owned()));
            self.sql.push_str(&format!(" AND {column} = ?{}", self.values.len()));
        }
        self
    }

    /// Binds a trailing value (e.g. a limit) and returns its placeholder.
    pub(crate) fn bind(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("?{}", self.values.len())
    }

    pub(crate) fn sql(&self) -> &str {
        &self.sql
    }

    pub(crate) fn params(&self) -> rusqlite::ParamsFromIter<std::slice::Iter<'_, Value>> {
        rusqlite::params_from_iter(self.values.iter())
    }
}

/// Column list matching [`Storage::row_to_observation`].
pub(crate) const OBSERVATION_COLUMNS: &str = "id, session_id, type, title, content, tool_name, project, scope, topic_key, \
     revision_count, duplicate_count, last_seen_at, created_at, updated_at, deleted_at";

/// [`OBSERVATION_COLUMNS`] qualified with the `o.` alias, for joins.
pub(crate) const OBSERVATION_COLUMNS_O: &str = "o.id, o.session_id, o.type, o.title, o.content, o.tool_name, o.project, \
     o.scope, o.topic_key, o.revision_count, o.duplicate_count, o.last_seen_at, o.created_at, \
     o.updated_at, o.deleted_at";

/// Custom connection initializer for integrity and concurrency settings
fn init_connection(conn: &mut Connection, busy_timeout_ms: u32) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {busy_timeout_ms};
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;"
    ))
}

impl Storage {
    /// Open (or create) the store at `db_path`, configured from the environment.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or bootstrap fails.
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::with_config(db_path, MemoryConfig::from_env())
    }

    /// Open (or create) the store at `db_path` with an explicit config.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or bootstrap fails.
    pub fn with_config(db_path: &Path, config: MemoryConfig) -> Result<Self> {
        let busy_timeout_ms = config.busy_timeout_ms;
        let manager = SqliteConnectionManager::file(db_path)
            .with_init(move |conn| init_connection(conn, busy_timeout_ms));
        let pool = Pool::builder().max_size(config.pool_size).build(manager)?;

        // Run migrations on first connection
        let conn = pool.get()?;
        migrations::run_migrations(&conn)?;
        drop(conn);

        tracing::info!(pool_size = config.pool_size, "Storage initialized with connection pool");

        Ok(Self { pool, config, clock: Arc::new(Utc::now) })
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub(crate) fn row_to_observation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Observation> {
        let scope: Option<String> = row.get(7)?;
        let created_at = parse_db_time(12, &row.get::<_, String>(12)?)?;
        let updated_at = parse_opt_db_time(13, row.get(13)?)?.unwrap_or(created_at);
        Ok(Observation {
            id: row.get(0)?,
            session_id: row.get(1)?,
            observation_type: row.get(2)?,
            title: row.get(3)?,
            content: row.get(4)?,
            tool_name: row.get(5)?,
            project: row.get(6)?,
            scope: scope.as_deref().map_or(Scope::Project, Scope::normalize),
            topic_key: row.get(8)?,
            revision_count: row.get::<_, Option<i64>>(9)?.unwrap_or(1).max(1),
            duplicate_count: row.get::<_, Option<i64>>(10)?.unwrap_or(1).max(1),
            last_seen_at: parse_opt_db_time(11, row.get(11)?)?,
            created_at,
            updated_at,
            deleted_at: parse_opt_db_time(14, row.get(14)?)?,
        })
    }
}
