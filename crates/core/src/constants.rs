//! Shared constants for agentmem.
//!
//! Defaults for [`crate::MemoryConfig`] plus fixed markers used by the
//! normalization helpers.

/// Maximum stored length (in chars) of observation and prompt content.
pub const DEFAULT_MAX_OBSERVATION_LENGTH: usize = 2000;

/// Hard cap on search results, whatever the caller asks for.
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 20;

/// Number of search results when limit is not specified by the caller.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Default and maximum size of recent/list queries.
pub const DEFAULT_MAX_CONTEXT_RESULTS: usize = 20;

/// Window in which identical content is counted as a repeat.
pub const DEFAULT_DEDUP_WINDOW_SECS: i64 = 15 * 60;

/// `SQLite` busy timeout applied to every pooled connection.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// r2d2 pool: maximum connections.
pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Replacement for `<private>...</private>` spans.
pub const REDACTION_TOKEN: &str = "[REDACTED]";

/// Appended to content cut at the length limit.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Maximum length (in chars) of a normalized topic key.
pub const MAX_TOPIC_KEY_LENGTH: usize = 120;

/// Relation type used when the caller leaves it empty.
pub const DEFAULT_RELATION_TYPE: &str = "related";

/// Observation type used when the caller leaves it empty.
pub const DEFAULT_OBSERVATION_TYPE: &str = "manual";

/// Observation type for learnings saved by passive capture.
pub const PASSIVE_OBSERVATION_TYPE: &str = "passive";

/// Title length (in chars) for passively captured learnings.
pub const PASSIVE_TITLE_LENGTH: usize = 60;

/// Minimum cleaned length (in chars) for an extracted learning.
pub const MIN_LEARNING_LENGTH: usize = 20;

/// Context traversal depth used when the caller passes a non-positive value.
pub const DEFAULT_CONTEXT_DEPTH: u32 = 2;

/// Context traversal depth ceiling.
pub const MAX_CONTEXT_DEPTH: u32 = 5;

/// Timeline window size used when the caller passes a non-positive value.
pub const DEFAULT_TIMELINE_WINDOW: usize = 5;

/// Version tag written into export documents.
pub const EXPORT_FORMAT_VERSION: &str = "1";
