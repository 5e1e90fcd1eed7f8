use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of work. Created by an explicit start call, closed by an end call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub project: String,
    #[serde(default)]
    pub directory: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Session listing row with its count of live observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOverview {
    #[serde(flatten)]
    pub session: Session,
    pub observation_count: u64,
}

/// A saved free-text user input. Write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: i64,
    pub session_id: String,
    pub content: String,
    #[serde(default)]
    pub project: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for saving a prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPrompt {
    pub session_id: String,
    pub content: String,
    #[serde(default)]
    pub project: Option<String>,
}

impl NewPrompt {
    #[must_use]
    pub fn new(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), content: content.into(), project: None }
    }

    #[must_use]
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }
}
