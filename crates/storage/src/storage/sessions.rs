use agentmem_core::{Session, SessionOverview, non_blank};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension as _, params};

use super::{
    FilterClause, Storage, get_conn, log_row_error, parse_db_time, parse_opt_db_time, to_db_time,
};
use crate::error::{Result, StorageError};

pub(crate) const SESSION_COLUMNS: &str = "id, project, directory, started_at, ended_at, summary";

pub(crate) fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        project: row.get(1)?,
        directory: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        started_at: parse_db_time(3, &row.get::<_, String>(3)?)?,
        ended_at: parse_opt_db_time(4, row.get(4)?)?,
        summary: row.get(5)?,
    })
}

pub(crate) fn query_session(conn: &Connection, id: &str) -> Result<Option<Session>> {
    let session = conn
        .query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
            params![id],
            row_to_session,
        )
        .optional()?;
    Ok(session)
}

impl Storage {
    /// Start a session. Starting an id that already exists is a no-op and
    /// returns the original row.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank id; database errors otherwise.
    pub fn start_session(&self, id: &str, project: &str, directory: &str) -> Result<Session> {
        let id = id.trim();
        if id.is_empty() {
            return Err(StorageError::InvalidArgument("session id must not be empty".to_owned()));
        }
        let conn = get_conn(&self.pool)?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO sessions (id, project, directory, started_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![id, project.trim(), directory.trim(), to_db_time(self.now())],
        )?;
        if inserted == 0 {
            tracing::debug!(session_id = id, "session already started");
        }
        query_session(&conn, id)?.ok_or_else(|| StorageError::not_found("session", id))
    }

    /// Close a session.
    ///
    /// A `Some` summary replaces the stored one; a blank summary clears it.
    ///
    /// # Errors
    /// `NotFound` for an unknown session id.
    pub fn end_session(&self, id: &str, summary: Option<&str>) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let now_str = to_db_time(self.now());
        let affected = match summary {
            Some(raw) => conn.execute(
                "UPDATE sessions SET ended_at = ?1, summary = ?2 WHERE id = ?3",
                params![now_str, non_blank(Some(raw)), id],
            )?,
            None => conn.execute(
                "UPDATE sessions SET ended_at = ?1 WHERE id = ?2",
                params![now_str, id],
            )?,
        };
        if affected == 0 {
            return Err(StorageError::not_found("session", id));
        }
        Ok(())
    }

    /// Get session by ID.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let conn = get_conn(&self.pool)?;
        query_session(&conn, id)
    }

    /// Sessions newest first, each with its count of live observations.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn recent_sessions(
        &self,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SessionOverview>> {
        let mut clause = FilterClause::default();
        clause.eq("s.project", project);
        let limit_param = clause.bind(Value::Integer(self.config.context_limit(limit) as i64));

        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT s.id, s.project, s.directory, s.started_at, s.ended_at, s.summary,
                    (SELECT COUNT(*) FROM observations o
                     WHERE o.session_id = s.id AND o.deleted_at IS NULL)
             FROM sessions s
             WHERE 1 = 1{}
             ORDER BY s.started_at DESC, s.id DESC
             LIMIT {limit_param}",
            clause.sql()
        ))?;
        let results = stmt
            .query_map(clause.params(), |row| {
                Ok(SessionOverview {
                    session: row_to_session(row)?,
                    observation_count: row.get::<_, i64>(6)? as u64,
                })
            })?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }
}
