//! Timeline query functions

use agentmem_core::{Timeline, timeline_window};
use rusqlite::params;

use crate::error::{Result, StorageError};
use crate::storage::observations::query_live_observation;
use crate::storage::sessions::query_session;
use crate::storage::{OBSERVATION_COLUMNS, Storage, get_conn, log_row_error};

impl Storage {
    /// Chronological window around one observation within its session.
    ///
    /// `before` / `after` default to 5 when non-positive. A missing session
    /// row leaves `session` empty instead of failing.
    ///
    /// # Errors
    /// `NotFound` if the focus is missing or soft-deleted.
    pub fn timeline(&self, focus_id: i64, before: i64, after: i64) -> Result<Timeline> {
        let conn = get_conn(&self.pool)?;
        let focus = query_live_observation(&conn, focus_id)?
            .ok_or_else(|| StorageError::not_found("observation", focus_id))?;

        let session = match query_session(&conn, &focus.session_id) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(session_id = %focus.session_id, "timeline session lookup failed: {}", e);
                None
            },
        };

        let mut before_stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations
             WHERE session_id = ?1 AND id < ?2 AND deleted_at IS NULL
             ORDER BY id DESC LIMIT ?3"
        ))?;
        let mut earlier: Vec<_> = before_stmt
            .query_map(
                params![focus.session_id, focus_id, timeline_window(before) as i64],
                Self::row_to_observation,
            )?
            .filter_map(log_row_error)
            .collect();
        earlier.reverse();

        let mut after_stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations
             WHERE session_id = ?1 AND id > ?2 AND deleted_at IS NULL
             ORDER BY id ASC LIMIT ?3"
        ))?;
        let later = after_stmt
            .query_map(
                params![focus.session_id, focus_id, timeline_window(after) as i64],
                Self::row_to_observation,
            )?
            .filter_map(log_row_error)
            .collect();

        let total_in_session: i64 = conn.query_row(
            "SELECT COUNT(*) FROM observations WHERE session_id = ?1 AND deleted_at IS NULL",
            params![focus.session_id],
            |row| row.get(0),
        )?;

        Ok(Timeline {
            focus,
            session,
            before: earlier,
            after: later,
            total_in_session: total_in_session as u64,
        })
    }
}
