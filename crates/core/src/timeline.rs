//! Windowed chronological view around one observation.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TIMELINE_WINDOW;
use crate::observation::Observation;
use crate::session::Session;

/// A focal observation plus bounded neighbours from the same session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub focus: Observation,
    /// Absent when the session row is missing.
    pub session: Option<Session>,
    /// Earlier observations, oldest first.
    pub before: Vec<Observation>,
    /// Later observations, oldest first.
    pub after: Vec<Observation>,
    /// Live observations in the whole session, for "is this a subset" checks.
    pub total_in_session: u64,
}

/// Clamps a requested window size: non-positive means the default.
#[must_use]
pub fn timeline_window(requested: i64) -> usize {
    usize::try_from(requested).ok().filter(|n| *n > 0).unwrap_or(DEFAULT_TIMELINE_WINDOW)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_defaults_for_non_positive() {
        assert_eq!(timeline_window(0), DEFAULT_TIMELINE_WINDOW);
        assert_eq!(timeline_window(-3), DEFAULT_TIMELINE_WINDOW);
        assert_eq!(timeline_window(2), 2);
    }
}
