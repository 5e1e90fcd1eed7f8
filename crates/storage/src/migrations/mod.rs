#![allow(
    clippy::redundant_pub_crate,
    reason = "migrations module is private, pub(crate) is intentional"
)]

//! Idempotent schema bootstrap.
//!
//! Every statement uses "if not exists" semantics, so running the whole
//! sequence against a populated database is a no-op. Order matters:
//! additive columns land before the indexes that reference them.

mod column_helpers;
mod repair;
mod v1;
mod v2;
mod v3;

use column_helpers::{add_column_if_not_exists, schema_object_exists};
use rusqlite::Connection;

pub const SCHEMA_VERSION: i32 = 3;

pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    tracing::info!("Database schema version: {} (target: {})", current_version, SCHEMA_VERSION);

    conn.execute_batch(v1::TABLES_SQL)?;
    for (table, column, definition) in v1::ADDITIVE_COLUMNS {
        add_column_if_not_exists(conn, table, column, definition)?;
    }
    conn.execute_batch(v1::INDEX_SQL)?;

    conn.execute_batch(v3::SQL)?;

    if !schema_object_exists(conn, "trigger", v2::OBSERVATIONS_FTS_MARKER)? {
        tracing::info!("Installing FTS5 index for observations");
        conn.execute_batch(v2::OBSERVATIONS_FTS_SQL)?;
    }
    if !schema_object_exists(conn, "trigger", v2::PROMPTS_FTS_MARKER)? {
        tracing::info!("Installing FTS5 index for prompts");
        conn.execute_batch(v2::PROMPTS_FTS_SQL)?;
    }

    repair::normalize_legacy_rows(conn);

    if current_version != SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    tracing::info!("Database schema up to date (version {})", SCHEMA_VERSION);

    Ok(())
}
