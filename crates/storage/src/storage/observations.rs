use agentmem_core::{
    DEFAULT_OBSERVATION_TYPE, NewObservation, Observation, ObservationMeta, ObservationUpdate,
    Scope, content_hash, non_blank, normalize_topic_key, redact_private, truncate_content,
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use rusqlite::types::Value;

use super::{
    FilterClause, OBSERVATION_COLUMNS, Storage, get_conn, log_row_error, parse_db_time, to_db_time,
};
use crate::error::{Result, StorageError};

/// Fetch a single observation that is not soft-deleted.
pub(crate) fn query_live_observation(conn: &Connection, id: i64) -> Result<Option<Observation>> {
    let obs = conn
        .query_row(
            &format!(
                "SELECT {OBSERVATION_COLUMNS} FROM observations WHERE id = ?1 AND deleted_at IS NULL"
            ),
            params![id],
            Storage::row_to_observation,
        )
        .optional()?;
    Ok(obs)
}

/// Fetch the lightweight projection of a live observation.
pub(crate) fn query_observation_meta(
    conn: &Connection,
    id: i64,
) -> Result<Option<ObservationMeta>> {
    let meta = conn
        .query_row(
            "SELECT id, title, type, project, created_at FROM observations
             WHERE id = ?1 AND deleted_at IS NULL",
            params![id],
            |row| {
                Ok(ObservationMeta {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    observation_type: row.get(2)?,
                    project: row.get(3)?,
                    created_at: parse_db_time(4, &row.get::<_, String>(4)?)?,
                })
            },
        )
        .optional()?;
    Ok(meta)
}

pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StorageError::InvalidArgument(format!("{field} must not be empty")));
    }
    Ok(())
}

pub(crate) fn observation_type_or_default(raw: &str) -> String {
    non_blank(Some(raw)).unwrap_or_else(|| DEFAULT_OBSERVATION_TYPE.to_owned())
}

/// Which write path `add_observation` took.
#[derive(Debug, Clone, Copy)]
enum WritePath {
    TopicUpsert,
    Duplicate,
    Insert,
}

impl Storage {
    /// Save an observation.
    ///
    /// Title and content are redacted, content is length-capped, then the
    /// row is written through the first path that applies:
    /// 1. topic-key upsert into the latest live row with the same
    ///    `(topic_key, project, scope)`;
    /// 2. duplicate hit on a live row with identical normalized content,
    ///    project, scope, type and title created inside the dedup window;
    /// 3. plain insert.
    ///
    /// Returns the id of the written row.
    ///
    /// # Errors
    /// `InvalidArgument` for a blank session id, title or content; database
    /// errors otherwise.
    pub fn add_observation(&self, input: &NewObservation) -> Result<i64> {
        require_non_blank("session_id", &input.session_id)?;
        require_non_blank("title", &input.title)?;
        require_non_blank("content", &input.content)?;

        let title = redact_private(&input.title);
        let content =
            truncate_content(&redact_private(&input.content), self.config.max_observation_length);
        let observation_type = observation_type_or_default(&input.observation_type);
        let tool_name = non_blank(input.tool_name.as_deref());
        let project = non_blank(input.project.as_deref());
        let scope = input.scope.as_str();
        let hash = content_hash(&content);
        let topic_key = input.topic_key.as_deref().and_then(normalize_topic_key);

        let now = self.now();
        let now_str = to_db_time(now);

        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut written: Option<(i64, WritePath)> = None;

        if let Some(key) = topic_key.as_deref() {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM observations
                     WHERE topic_key = ?1 AND project IS ?2 AND scope = ?3 AND deleted_at IS NULL
                     ORDER BY updated_at DESC, id DESC LIMIT 1",
                    params![key, project, scope],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(id) = existing {
                tx.execute(
                    "UPDATE observations
                     SET type = ?1, title = ?2, content = ?3, tool_name = ?4, topic_key = ?5,
                         content_hash = ?6, revision_count = revision_count + 1,
                         last_seen_at = ?7, updated_at = ?7
                     WHERE id = ?8",
                    params![observation_type, title, content, tool_name, key, hash, now_str, id],
                )?;
                written = Some((id, WritePath::TopicUpsert));
            }
        }

        if written.is_none() {
            let cutoff = to_db_time(now - self.config.dedup_window);
            let duplicate: Option<i64> = tx
                .query_row(
                    "SELECT id FROM observations
                     WHERE content_hash = ?1 AND project IS ?2 AND scope = ?3 AND type = ?4
                       AND title = ?5 AND deleted_at IS NULL AND created_at >= ?6
                     ORDER BY created_at DESC, id DESC LIMIT 1",
                    params![hash, project, scope, observation_type, title, cutoff],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(id) = duplicate {
                tx.execute(
                    "UPDATE observations
                     SET duplicate_count = duplicate_count + 1, last_seen_at = ?1, updated_at = ?1
                     WHERE id = ?2",
                    params![now_str, id],
                )?;
                written = Some((id, WritePath::Duplicate));
            }
        }

        let (id, path) = match written {
            Some(hit) => hit,
            None => {
                tx.execute(
                    "INSERT INTO observations
                       (session_id, type, title, content, tool_name, project, scope, topic_key,
                        content_hash, revision_count, duplicate_count, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, 1, ?10, ?10)",
                    params![
                        input.session_id.trim(),
                        observation_type,
                        title,
                        content,
                        tool_name,
                        project,
                        scope,
                        topic_key,
                        hash,
                        now_str,
                    ],
                )?;
                (tx.last_insert_rowid(), WritePath::Insert)
            },
        };
        tx.commit()?;

        tracing::debug!(id, ?path, "observation saved");
        Ok(id)
    }

    /// Get a live observation by id.
    ///
    /// # Errors
    /// `NotFound` if the row is missing or soft-deleted.
    pub fn get_observation(&self, id: i64) -> Result<Observation> {
        let conn = get_conn(&self.pool)?;
        query_live_observation(&conn, id)?.ok_or_else(|| StorageError::not_found("observation", id))
    }

    /// Apply a partial update and return the updated row.
    ///
    /// Supplied fields go through the same normalization as
    /// [`Storage::add_observation`]. Empty `tool_name`, `project` or
    /// `topic_key` clear the field. The content hash is recomputed and
    /// `revision_count` incremented.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty update or a blank title/content,
    /// `NotFound` if the row is missing or soft-deleted.
    pub fn update_observation(&self, id: i64, update: &ObservationUpdate) -> Result<Observation> {
        if update.is_empty() {
            return Err(StorageError::InvalidArgument("update has no fields".to_owned()));
        }
        if let Some(title) = update.title.as_deref() {
            require_non_blank("title", title)?;
        }
        if let Some(content) = update.content.as_deref() {
            require_non_blank("content", content)?;
        }

        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current =
            query_live_observation(&tx, id)?.ok_or_else(|| StorageError::not_found("observation", id))?;

        let observation_type = update
            .observation_type
            .as_deref()
            .map_or(current.observation_type, observation_type_or_default);
        let title = update.title.as_deref().map_or(current.title, redact_private);
        let content = update.content.as_deref().map_or(current.content, |c| {
            truncate_content(&redact_private(c), self.config.max_observation_length)
        });
        let tool_name = match update.tool_name.as_deref() {
            Some(raw) => non_blank(Some(raw)),
            None => current.tool_name,
        };
        let project = match update.project.as_deref() {
            Some(raw) => non_blank(Some(raw)),
            None => current.project,
        };
        let scope = update.scope.unwrap_or(current.scope);
        let topic_key = match update.topic_key.as_deref() {
            Some(raw) => normalize_topic_key(raw),
            None => current.topic_key,
        };
        let hash = content_hash(&content);
        let now_str = to_db_time(self.now());

        tx.execute(
            "UPDATE observations
             SET type = ?1, title = ?2, content = ?3, tool_name = ?4, project = ?5, scope = ?6,
                 topic_key = ?7, content_hash = ?8, revision_count = revision_count + 1,
                 updated_at = ?9
             WHERE id = ?10",
            params![
                observation_type,
                title,
                content,
                tool_name,
                project,
                scope.as_str(),
                topic_key,
                hash,
                now_str,
                id,
            ],
        )?;
        let updated =
            query_live_observation(&tx, id)?.ok_or_else(|| StorageError::not_found("observation", id))?;
        tx.commit()?;
        Ok(updated)
    }

    /// Delete an observation.
    ///
    /// Soft mode stamps `deleted_at`; relations are left in place. Hard mode
    /// removes the row and, through the foreign key, every relation that
    /// touches it.
    ///
    /// # Errors
    /// `NotFound` if there is nothing to delete (soft mode also treats an
    /// already soft-deleted row as missing).
    pub fn delete_observation(&self, id: i64, hard: bool) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let affected = if hard {
            conn.execute("DELETE FROM observations WHERE id = ?1", params![id])?
        } else {
            let now_str = to_db_time(self.now());
            conn.execute(
                "UPDATE observations SET deleted_at = ?1, updated_at = ?1
                 WHERE id = ?2 AND deleted_at IS NULL",
                params![now_str, id],
            )?
        };
        if affected == 0 {
            return Err(StorageError::not_found("observation", id));
        }
        tracing::debug!(id, hard, "observation deleted");
        Ok(())
    }

    /// Find the live observation currently holding a topic key.
    ///
    /// A key that normalizes to nothing never matches.
    ///
    /// # Errors
    /// Returns error if the database query fails.
    pub fn find_by_topic_key(
        &self,
        topic_key: &str,
        project: Option<&str>,
        scope: Scope,
    ) -> Result<Option<Observation>> {
        let Some(key) = normalize_topic_key(topic_key) else {
            return Ok(None);
        };
        let project = non_blank(project);
        let conn = get_conn(&self.pool)?;
        let obs = conn
            .query_row(
                &format!(
                    "SELECT {OBSERVATION_COLUMNS} FROM observations
                     WHERE topic_key = ?1 AND project IS ?2 AND scope = ?3 AND deleted_at IS NULL
                     ORDER BY updated_at DESC, id DESC LIMIT 1"
                ),
                params![key, project, scope.as_str()],
                Self::row_to_observation,
            )
            .optional()?;
        Ok(obs)
    }

    /// Live observations, newest first, optionally filtered by project and
    /// scope. A zero limit means the configured ceiling.
    ///
    /// # Errors
    /// Returns error if the database query fails.
    pub fn recent_observations(
        &self,
        project: Option<&str>,
        scope: Option<Scope>,
        limit: usize,
    ) -> Result<Vec<Observation>> {
        let mut filters = FilterClause::default();
        filters.eq("project", project).eq("scope", scope.as_ref().map(Scope::as_str));
        let limit_param = filters.bind(Value::Integer(self.config.context_limit(limit) as i64));

        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations
             WHERE deleted_at IS NULL{}
             ORDER BY created_at DESC, id DESC LIMIT {limit_param}",
            filters.sql()
        ))?;
        let results = stmt
            .query_map(filters.params(), Self::row_to_observation)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    /// Live observations of one session, oldest first.
    ///
    /// # Errors
    /// Returns error if the database query fails.
    pub fn session_observations(&self, session_id: &str, limit: usize) -> Result<Vec<Observation>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations
             WHERE session_id = ?1 AND deleted_at IS NULL
             ORDER BY created_at ASC, id ASC LIMIT ?2"
        ))?;
        let results = stmt
            .query_map(
                params![session_id, self.config.context_limit(limit) as i64],
                Self::row_to_observation,
            )?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }
}
