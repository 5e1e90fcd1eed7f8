//! Logical dump format shared by export and import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::EXPORT_FORMAT_VERSION;
use crate::observation::Observation;
use crate::session::{Prompt, Session};

/// Full logical backup: every session, every observation (tombstoned ones
/// included) and every prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub prompts: Vec<Prompt>,
}

impl ExportData {
    /// An empty document stamped with the current format version.
    #[must_use]
    pub fn new(exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION.to_owned(),
            exported_at,
            sessions: Vec::new(),
            observations: Vec::new(),
            prompts: Vec::new(),
        }
    }
}
