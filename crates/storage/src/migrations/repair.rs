//! One-time normalization of rows written by older versions.
//!
//! Every statement is a no-op on a clean database, so running it at each
//! startup is cheap. Failures are logged, never fatal.

use agentmem_core::content_hash;
use rusqlite::{Connection, params};

const NORMALIZE_SQL: &str = "
UPDATE observations SET scope = 'project' WHERE scope IS NULL OR TRIM(scope) = '';
UPDATE observations SET scope = LOWER(TRIM(scope)) WHERE scope <> LOWER(TRIM(scope));
UPDATE observations SET scope = 'project' WHERE scope NOT IN ('project', 'personal');
UPDATE observations SET topic_key = NULL WHERE topic_key IS NOT NULL AND TRIM(topic_key) = '';
UPDATE observations SET revision_count = 1 WHERE revision_count IS NULL OR revision_count < 1;
UPDATE observations SET duplicate_count = 1 WHERE duplicate_count IS NULL OR duplicate_count < 1;
UPDATE observations SET updated_at = created_at WHERE updated_at IS NULL;
UPDATE sessions SET summary = NULL WHERE summary IS NOT NULL AND TRIM(summary) = '';
";

/// Recomputes `content_hash` for rows that predate the column.
fn backfill_content_hashes(conn: &Connection) -> Result<usize, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT id, content FROM observations WHERE content_hash IS NULL OR content_hash = ''",
    )?;
    let pending: Vec<(i64, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .filter_map(crate::storage::log_row_error)
        .collect();

    let mut update = conn.prepare("UPDATE observations SET content_hash = ?1 WHERE id = ?2")?;
    for (id, content) in &pending {
        update.execute(params![content_hash(content), id])?;
    }
    Ok(pending.len())
}

pub(super) fn normalize_legacy_rows(conn: &Connection) {
    if let Err(e) = conn.execute_batch(NORMALIZE_SQL) {
        tracing::warn!(error = %e, "Legacy row normalization failed");
    }
    match backfill_content_hashes(conn) {
        Ok(0) => {},
        Ok(count) => tracing::info!(count, "Back-filled content hashes for legacy observations"),
        Err(e) => tracing::warn!(error = %e, "Content hash back-fill failed"),
    }
}
