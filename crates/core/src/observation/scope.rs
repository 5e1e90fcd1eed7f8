//! Observation visibility scope.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Who an observation is relevant to.
///
/// Parsing never fails: empty or unknown input normalizes to
/// [`Scope::Project`], so legacy rows and sloppy callers land somewhere sane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Scope {
    /// Shared with everyone working on the project.
    #[default]
    Project,
    /// Private to the user.
    Personal,
}

impl Scope {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Project => "project",
            Self::Personal => "personal",
        }
    }

    /// Map free-form input onto a scope.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "personal" => Self::Personal,
            _ => Self::Project,
        }
    }
}

impl FromStr for Scope {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl From<String> for Scope {
    fn from(value: String) -> Self {
        Self::normalize(&value)
    }
}

impl From<Scope> for String {
    fn from(value: Scope) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
