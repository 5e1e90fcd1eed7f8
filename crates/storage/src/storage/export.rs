//! Full logical backup and restore.

use agentmem_core::{ExportData, content_hash, non_blank, normalize_topic_key};
use rusqlite::{TransactionBehavior, params};
use serde::{Deserialize, Serialize};

use super::observations::observation_type_or_default;
use super::prompts::{PROMPT_COLUMNS, row_to_prompt};
use super::sessions::{SESSION_COLUMNS, row_to_session};
use super::{OBSERVATION_COLUMNS, Storage, get_conn, log_row_error, to_db_time};
use crate::error::{Result, StorageError};

/// Rows written by one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Sessions inserted; ids already present are not counted.
    pub sessions: usize,
    pub observations: usize,
    pub prompts: usize,
}

impl Storage {
    /// Dump every session, every observation (soft-deleted included) and
    /// every prompt, in ascending start-time / id order.
    ///
    /// Rows that fail to decode are logged and left out.
    ///
    /// # Errors
    /// Returns error if a query cannot be prepared or run.
    pub fn export(&self) -> Result<ExportData> {
        let conn = get_conn(&self.pool)?;
        let mut data = ExportData::new(self.now());

        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY started_at ASC, id ASC"
        ))?;
        data.sessions = stmt.query_map([], row_to_session)?.filter_map(log_row_error).collect();

        let mut stmt = conn
            .prepare(&format!("SELECT {OBSERVATION_COLUMNS} FROM observations ORDER BY id ASC"))?;
        data.observations =
            stmt.query_map([], Self::row_to_observation)?.filter_map(log_row_error).collect();

        let mut stmt =
            conn.prepare(&format!("SELECT {PROMPT_COLUMNS} FROM user_prompts ORDER BY id ASC"))?;
        data.prompts = stmt.query_map([], row_to_prompt)?.filter_map(log_row_error).collect();

        tracing::info!(
            sessions = data.sessions.len(),
            observations = data.observations.len(),
            prompts = data.prompts.len(),
            "export complete"
        );
        Ok(data)
    }

    /// Load an export document in one transaction.
    ///
    /// Sessions are insert-or-ignore. Observations and prompts are inserted
    /// as new rows with fresh ids, bypassing topic-key upsert and dedup;
    /// observations are re-normalized (topic key, content hash, counters)
    /// and keep their timestamps and tombstones. Meant for seeding an empty
    /// store.
    ///
    /// # Errors
    /// Any failed insert rolls back the whole import.
    pub fn import(&self, data: &ExportData) -> Result<ImportResult> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut result = ImportResult::default();

        for session in &data.sessions {
            result.sessions += tx.execute(
                "INSERT OR IGNORE INTO sessions (id, project, directory, started_at, ended_at, summary)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    session.id,
                    session.project,
                    session.directory,
                    to_db_time(session.started_at),
                    session.ended_at.map(to_db_time),
                    non_blank(session.summary.as_deref()),
                ],
            )?;
        }

        for obs in &data.observations {
            tx.execute(
                "INSERT INTO observations
                   (session_id, type, title, content, tool_name, project, scope, topic_key,
                    content_hash, revision_count, duplicate_count, last_seen_at, created_at,
                    updated_at, deleted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                params![
                    obs.session_id,
                    observation_type_or_default(&obs.observation_type),
                    obs.title,
                    obs.content,
                    non_blank(obs.tool_name.as_deref()),
                    non_blank(obs.project.as_deref()),
                    obs.scope.as_str(),
                    obs.topic_key.as_deref().and_then(normalize_topic_key),
                    content_hash(&obs.content),
                    obs.revision_count.max(1),
                    obs.duplicate_count.max(1),
                    obs.last_seen_at.map(to_db_time),
                    to_db_time(obs.created_at),
                    to_db_time(obs.updated_at),
                    obs.deleted_at.map(to_db_time),
                ],
            )?;
            result.observations += 1;
        }

        for prompt in &data.prompts {
            tx.execute(
                "INSERT INTO user_prompts (session_id, content, project, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    prompt.session_id,
                    prompt.content,
                    non_blank(prompt.project.as_deref()),
                    to_db_time(prompt.created_at),
                ],
            )?;
            result.prompts += 1;
        }

        tx.commit()?;
        tracing::info!(
            sessions = result.sessions,
            observations = result.observations,
            prompts = result.prompts,
            "import complete"
        );
        Ok(result)
    }

    /// Parse a JSON export document and [`import`](Self::import) it.
    ///
    /// # Errors
    /// `InvalidArgument` if the document does not parse.
    pub fn import_json(&self, json: &str) -> Result<ImportResult> {
        let data: ExportData = serde_json::from_str(json)
            .map_err(|e| StorageError::InvalidArgument(format!("malformed export document: {e}")))?;
        self.import(&data)
    }
}
