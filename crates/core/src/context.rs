//! Markdown rendering of recent memory for injection into a new session.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::observation::{Observation, truncate_chars};
use crate::session::{Prompt, SessionOverview};

/// Content preview length for [`DetailLevel::Summary`].
const SUMMARY_PREVIEW_CHARS: usize = 300;

/// Prompt preview length, independent of detail level.
const PROMPT_PREVIEW_CHARS: usize = 200;

/// How much observation content the context block shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DetailLevel {
    /// Titles only.
    Compact,
    /// Titles plus a content preview.
    #[default]
    Summary,
    /// Titles plus full content.
    Full,
}

impl DetailLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Compact => "compact",
            Self::Summary => "summary",
            Self::Full => "full",
        }
    }

    /// Unknown or empty input maps to [`DetailLevel::Summary`].
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "compact" => Self::Compact,
            "full" => Self::Full,
            _ => Self::Summary,
        }
    }
}

impl FromStr for DetailLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl From<String> for DetailLevel {
    fn from(value: String) -> Self {
        Self::normalize(&value)
    }
}

impl From<DetailLevel> for String {
    fn from(value: DetailLevel) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders sessions, prompts and observations as a markdown block.
///
/// Returns an empty string when all three inputs are empty.
#[must_use]
pub fn format_context(
    sessions: &[SessionOverview],
    prompts: &[Prompt],
    observations: &[Observation],
    detail: DetailLevel,
) -> String {
    if sessions.is_empty() && prompts.is_empty() && observations.is_empty() {
        return String::new();
    }

    let mut out = String::from("## Memory from Previous Sessions\n");

    if !sessions.is_empty() {
        out.push_str("\n### Recent Sessions\n");
        for overview in sessions {
            let session = &overview.session;
            let _ = write!(
                out,
                "- **{}** ({})",
                session.project,
                session.started_at.format("%Y-%m-%d %H:%M")
            );
            if let Some(summary) = session.summary.as_deref() {
                let _ = write!(out, ": {}", truncate_chars(summary, SUMMARY_PREVIEW_CHARS));
            }
            let _ = writeln!(out, " [{} observations]", overview.observation_count);
        }
    }

    if !prompts.is_empty() {
        out.push_str("\n### Recent User Prompts\n");
        for prompt in prompts {
            let _ = writeln!(
                out,
                "- {}: {}",
                prompt.created_at.format("%Y-%m-%d %H:%M"),
                truncate_chars(&prompt.content, PROMPT_PREVIEW_CHARS)
            );
        }
    }

    if !observations.is_empty() {
        out.push_str("\n### Recent Observations\n");
        for obs in observations {
            let _ = write!(out, "- [{}] **{}**", obs.observation_type, obs.title);
            match detail {
                DetailLevel::Compact => out.push('\n'),
                DetailLevel::Summary => {
                    let _ = writeln!(out, ": {}", truncate_chars(&obs.content, SUMMARY_PREVIEW_CHARS));
                },
                DetailLevel::Full => {
                    let _ = writeln!(out, ": {}", obs.content);
                },
            }
        }
    }

    out
}
