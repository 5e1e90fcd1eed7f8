//! Observation types for coding session capture.

mod content_filter;
mod learnings;
mod scope;
mod topic_key;

pub use content_filter::*;
pub use learnings::*;
pub use scope::*;
pub use topic_key::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discrete fact captured during a work session.
///
/// `deleted_at` is a tombstone: rows carrying it are hidden from every
/// active read path but still exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Auto-assigned, monotonic row id.
    pub id: i64,
    /// Session this observation belongs to.
    pub session_id: String,
    /// Free-form tag (decision, bugfix, pattern, ...).
    #[serde(rename = "type")]
    pub observation_type: String,
    pub title: String,
    /// Redacted and length-capped body.
    pub content: String,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub scope: Scope,
    /// Normalized slug for living documents, see [`normalize_topic_key`].
    #[serde(default)]
    pub topic_key: Option<String>,
    /// Bumped on every topic-key upsert and explicit update.
    #[serde(default = "one")]
    pub revision_count: i64,
    /// Bumped every time identical content is re-reported inside the dedup window.
    #[serde(default = "one")]
    pub duplicate_count: i64,
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

const fn one() -> i64 {
    1
}

impl Observation {
    /// Whether the row carries a soft-delete tombstone.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Lightweight projection used by graph traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationMeta {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub observation_type: String,
    pub project: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewObservation {
    pub session_id: String,
    #[serde(rename = "type", default)]
    pub observation_type: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub topic_key: Option<String>,
}

impl NewObservation {
    /// Returns a new input with the required fields set.
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        observation_type: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            observation_type: observation_type.into(),
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    #[must_use]
    pub const fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn topic_key(mut self, topic_key: impl Into<String>) -> Self {
        self.topic_key = Some(topic_key.into());
        self
    }

    #[must_use]
    pub fn tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }
}

/// Partial update: only `Some` fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationUpdate {
    #[serde(rename = "type", default)]
    pub observation_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub scope: Option<Scope>,
    /// An empty string clears the topic key.
    #[serde(default)]
    pub topic_key: Option<String>,
}

impl ObservationUpdate {
    /// `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.observation_type.is_none()
            && self.title.is_none()
            && self.content.is_none()
            && self.tool_name.is_none()
            && self.project.is_none()
            && self.scope.is_none()
            && self.topic_key.is_none()
    }
}

/// Optional filters shared by search and its recency fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(rename = "type", default)]
    pub observation_type: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub scope: Option<Scope>,
}

/// Search hit with relevance score.
///
/// `rank` is the FTS5 bm25 rank (lower is better); recency fallback
/// results carry `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub observation: Observation,
    pub rank: f64,
}
