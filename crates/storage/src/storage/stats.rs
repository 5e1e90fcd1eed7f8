use agentmem_core::{DetailLevel, Scope, format_context};
use serde::{Deserialize, Serialize};

use super::{Storage, get_conn, log_row_error};
use crate::error::Result;

/// Sessions shown in the context block.
const CONTEXT_SESSIONS: usize = 5;

/// Prompts shown in the context block.
const CONTEXT_PROMPTS: usize = 10;

/// Store-wide counts. Soft-deleted observations are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub sessions: u64,
    pub observations: u64,
    pub prompts: u64,
    /// Distinct non-empty project names, sorted.
    pub projects: Vec<String>,
}

impl Storage {
    /// Get storage statistics.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn stats(&self) -> Result<Stats> {
        let conn = get_conn(&self.pool)?;
        let sessions: i64 = conn.query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))?;
        let observations: i64 = conn.query_row(
            "SELECT COUNT(*) FROM observations WHERE deleted_at IS NULL",
            [],
            |row| row.get(0),
        )?;
        let prompts: i64 =
            conn.query_row("SELECT COUNT(*) FROM user_prompts", [], |row| row.get(0))?;

        let mut stmt = conn.prepare(
            "SELECT project FROM sessions WHERE TRIM(project) <> ''
             UNION
             SELECT project FROM observations
             WHERE deleted_at IS NULL AND project IS NOT NULL AND TRIM(project) <> ''
             ORDER BY project",
        )?;
        let projects = stmt.query_map([], |row| row.get(0))?.filter_map(log_row_error).collect();

        Ok(Stats {
            sessions: sessions as u64,
            observations: observations as u64,
            prompts: prompts as u64,
            projects,
        })
    }

    /// Markdown summary of recent sessions, prompts and observations,
    /// ready to inject at the start of a new session. Empty when there is
    /// nothing to show.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn format_context(
        &self,
        project: Option<&str>,
        scope: Option<Scope>,
        detail: DetailLevel,
    ) -> Result<String> {
        let sessions = self.recent_sessions(project, CONTEXT_SESSIONS)?;
        let prompts = self.recent_prompts(project, CONTEXT_PROMPTS)?;
        let observations = self.recent_observations(project, scope, 0)?;
        Ok(format_context(&sessions, &prompts, &observations, detail))
    }
}
