use agentmem_core::{NewPrompt, Prompt, non_blank, redact_private, truncate_content};
use rusqlite::params;
use rusqlite::types::Value;

use super::{
    FilterClause, Storage, build_fts_query, get_conn, log_row_error, parse_db_time, to_db_time,
};
use crate::error::{Result, StorageError};

pub(crate) const PROMPT_COLUMNS: &str = "id, session_id, content, project, created_at";

pub(crate) fn row_to_prompt(row: &rusqlite::Row<'_>) -> rusqlite::Result<Prompt> {
    Ok(Prompt {
        id: row.get(0)?,
        session_id: row.get(1)?,
        content: row.get(2)?,
        project: row.get(3)?,
        created_at: parse_db_time(4, &row.get::<_, String>(4)?)?,
    })
}

impl Storage {
    /// Save user prompt. Private spans are redacted and content is
    /// length-capped like observation content.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank session id or content.
    pub fn add_prompt(&self, input: &NewPrompt) -> Result<i64> {
        if input.session_id.trim().is_empty() {
            return Err(StorageError::InvalidArgument("session_id must not be empty".to_owned()));
        }
        let content =
            truncate_content(&redact_private(&input.content), self.config.max_observation_length);
        if content.is_empty() {
            return Err(StorageError::InvalidArgument("content must not be empty".to_owned()));
        }

        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO user_prompts (session_id, content, project, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                input.session_id.trim(),
                content,
                non_blank(input.project.as_deref()),
                to_db_time(self.now()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Prompts newest first, optionally for one project.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn recent_prompts(&self, project: Option<&str>, limit: usize) -> Result<Vec<Prompt>> {
        self.query_recent_prompts(project, self.config.context_limit(limit))
    }

    /// Ranked full-text search over prompts, with the same token quoting
    /// and empty-query recency fallback as [`Storage::search`].
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn search_prompts(
        &self,
        query: &str,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Prompt>> {
        let limit = self.config.search_limit(limit);
        let Some(fts_query) = build_fts_query(query) else {
            return self.query_recent_prompts(project, limit);
        };

        let mut clause = FilterClause::default();
        let match_param = clause.bind(Value::Text(fts_query));
        clause.eq("p.project", project);
        let limit_param = clause.bind(Value::Integer(limit as i64));

        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT p.id, p.session_id, p.content, p.project, p.created_at
             FROM prompts_fts
             JOIN user_prompts p ON p.id = prompts_fts.rowid
             WHERE prompts_fts MATCH {match_param}{}
             ORDER BY prompts_fts.rank
             LIMIT {limit_param}",
            clause.sql()
        ))?;
        let results = stmt
            .query_map(clause.params(), row_to_prompt)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    /// Recency listing with an already clamped limit.
    fn query_recent_prompts(&self, project: Option<&str>, limit: usize) -> Result<Vec<Prompt>> {
        let mut clause = FilterClause::default();
        clause.eq("project", project);
        let limit_param = clause.bind(Value::Integer(limit as i64));

        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROMPT_COLUMNS} FROM user_prompts
             WHERE 1 = 1{}
             ORDER BY created_at DESC, id DESC
             LIMIT {limit_param}",
            clause.sql()
        ))?;
        let results = stmt
            .query_map(clause.params(), row_to_prompt)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }
}
