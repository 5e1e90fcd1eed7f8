//! Passive capture: save "key learnings" sections from free text.

use agentmem_core::{
    PASSIVE_OBSERVATION_TYPE, PASSIVE_TITLE_LENGTH, Scope, content_hash, extract_learnings,
    non_blank, redact_private, truncate_chars, truncate_content,
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use serde::{Deserialize, Serialize};

use super::observations::require_non_blank;
use super::{Storage, get_conn, to_db_time};
use crate::error::Result;

/// Input for [`Storage::passive_capture`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassiveCaptureParams {
    pub session_id: String,
    /// Text to scan, typically an assistant's final message.
    pub text: String,
    #[serde(default)]
    pub project: Option<String>,
    /// Stored as the observation's `tool_name`.
    #[serde(default)]
    pub source: Option<String>,
}

/// Outcome counts of one passive capture call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveCaptureResult {
    pub extracted: usize,
    pub saved: usize,
    pub duplicates: usize,
}

impl Storage {
    /// Extract learnings from `params.text` and save each one not already
    /// stored for the project.
    ///
    /// A learning is a duplicate when a live observation in the same project
    /// has the same normalized content, whatever its type, title or scope.
    /// Content is redacted and length-capped before hashing, exactly as
    /// [`Storage::add_observation`] stores it. Lookups and inserts share one
    /// transaction.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank session id; database errors otherwise.
    pub fn passive_capture(&self, params: &PassiveCaptureParams) -> Result<PassiveCaptureResult> {
        let learnings = extract_learnings(&params.text);
        let mut result = PassiveCaptureResult { extracted: learnings.len(), ..Default::default() };
        if learnings.is_empty() {
            return Ok(result);
        }
        require_non_blank("session_id", &params.session_id)?;

        let project = non_blank(params.project.as_deref());
        let source = non_blank(params.source.as_deref());

        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        for learning in learnings {
            let content =
                truncate_content(&redact_private(&learning), self.config.max_observation_length);
            let hash = content_hash(&content);
            if has_live_content(&tx, &hash, project.as_deref())? {
                result.duplicates += 1;
                continue;
            }
            let now_str = to_db_time(self.now());
            tx.execute(
                "INSERT INTO observations
                   (session_id, type, title, content, tool_name, project, scope, topic_key,
                    content_hash, revision_count, duplicate_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, 1, 1, ?9, ?9)",
                params![
                    params.session_id.trim(),
                    PASSIVE_OBSERVATION_TYPE,
                    truncate_chars(&content, PASSIVE_TITLE_LENGTH),
                    content,
                    source,
                    project,
                    Scope::Project.as_str(),
                    hash,
                    now_str,
                ],
            )?;
            result.saved += 1;
        }
        tx.commit()?;

        tracing::debug!(
            extracted = result.extracted,
            saved = result.saved,
            duplicates = result.duplicates,
            "passive capture complete"
        );
        Ok(result)
    }
}

fn has_live_content(conn: &Connection, hash: &str, project: Option<&str>) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM observations
             WHERE content_hash = ?1 AND project IS ?2 AND deleted_at IS NULL
             LIMIT 1",
            params![hash, project],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}
