//! Engine configuration, read from the environment with warn-level logging
//! for invalid values.

use chrono::TimeDelta;

use crate::constants::{
    DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_DEDUP_WINDOW_SECS, DEFAULT_MAX_CONTEXT_RESULTS,
    DEFAULT_MAX_OBSERVATION_LENGTH, DEFAULT_MAX_SEARCH_RESULTS, DEFAULT_POOL_SIZE,
    DEFAULT_SEARCH_LIMIT,
};

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Tunables for the memory engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Content longer than this (in chars) is truncated on write.
    pub max_observation_length: usize,
    /// Search limit ceiling.
    pub max_search_results: usize,
    /// Search limit when the caller passes 0.
    pub default_search_limit: usize,
    /// Default and ceiling for recent/list queries.
    pub max_context_results: usize,
    /// Identical content created within this window is a duplicate.
    pub dedup_window: TimeDelta,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout_ms: u32,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_observation_length: DEFAULT_MAX_OBSERVATION_LENGTH,
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            default_search_limit: DEFAULT_SEARCH_LIMIT,
            max_context_results: DEFAULT_MAX_CONTEXT_RESULTS,
            dedup_window: TimeDelta::seconds(DEFAULT_DEDUP_WINDOW_SECS),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl MemoryConfig {
    /// Build a config from `AGENTMEM_*` variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let dedup_secs =
            env_parse_with_default("AGENTMEM_DEDUP_WINDOW_SECS", DEFAULT_DEDUP_WINDOW_SECS);
        Self {
            max_observation_length: env_parse_with_default(
                "AGENTMEM_MAX_OBSERVATION_LENGTH",
                defaults.max_observation_length,
            ),
            max_search_results: env_parse_with_default(
                "AGENTMEM_MAX_SEARCH_RESULTS",
                defaults.max_search_results,
            ),
            default_search_limit: defaults.default_search_limit,
            max_context_results: env_parse_with_default(
                "AGENTMEM_MAX_CONTEXT_RESULTS",
                defaults.max_context_results,
            ),
            dedup_window: TimeDelta::seconds(dedup_secs.max(0)),
            busy_timeout_ms: env_parse_with_default(
                "AGENTMEM_BUSY_TIMEOUT_MS",
                defaults.busy_timeout_ms,
            ),
            pool_size: env_parse_with_default("AGENTMEM_DB_POOL_SIZE", defaults.pool_size).max(1),
        }
    }

    /// Clamp a requested search limit: 0 means the default, anything above
    /// the ceiling is capped.
    #[must_use]
    pub fn search_limit(&self, requested: usize) -> usize {
        if requested == 0 {
            self.default_search_limit.min(self.max_search_results)
        } else {
            requested.min(self.max_search_results)
        }
    }

    /// Clamp a requested list limit: 0 means the ceiling.
    #[must_use]
    pub fn context_limit(&self, requested: usize) -> usize {
        if requested == 0 {
            self.max_context_results
        } else {
            requested.min(self.max_context_results)
        }
    }
}
