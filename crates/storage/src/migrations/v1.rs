//! Migration v1: sessions, observations and prompts

pub(super) const TABLES_SQL: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    project TEXT NOT NULL,
    directory TEXT NOT NULL DEFAULT '',
    started_at TEXT NOT NULL,
    ended_at TEXT,
    summary TEXT
);

CREATE TABLE IF NOT EXISTS observations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    type TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    tool_name TEXT,
    project TEXT,
    scope TEXT NOT NULL DEFAULT 'project',
    topic_key TEXT,
    content_hash TEXT,
    revision_count INTEGER NOT NULL DEFAULT 1,
    duplicate_count INTEGER NOT NULL DEFAULT 1,
    last_seen_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS user_prompts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    content TEXT NOT NULL,
    project TEXT,
    created_at TEXT NOT NULL
);
";

/// Columns added after the first release, as `(table, column, definition)`.
/// Applied to databases whose tables predate them, before any index that
/// references them is created.
pub(super) const ADDITIVE_COLUMNS: &[(&str, &str, &str)] = &[
    ("sessions", "directory", "TEXT NOT NULL DEFAULT ''"),
    ("sessions", "ended_at", "TEXT"),
    ("sessions", "summary", "TEXT"),
    ("observations", "tool_name", "TEXT"),
    ("observations", "project", "TEXT"),
    ("observations", "scope", "TEXT NOT NULL DEFAULT 'project'"),
    ("observations", "topic_key", "TEXT"),
    ("observations", "content_hash", "TEXT"),
    ("observations", "revision_count", "INTEGER NOT NULL DEFAULT 1"),
    ("observations", "duplicate_count", "INTEGER NOT NULL DEFAULT 1"),
    ("observations", "last_seen_at", "TEXT"),
    ("observations", "updated_at", "TEXT"),
    ("observations", "deleted_at", "TEXT"),
    ("user_prompts", "project", "TEXT"),
];

pub(super) const INDEX_SQL: &str = "
CREATE INDEX IF NOT EXISTS idx_sessions_project ON sessions(project);
CREATE INDEX IF NOT EXISTS idx_sessions_started ON sessions(started_at);
CREATE INDEX IF NOT EXISTS idx_obs_session ON observations(session_id);
CREATE INDEX IF NOT EXISTS idx_obs_type ON observations(type);
CREATE INDEX IF NOT EXISTS idx_obs_project ON observations(project);
CREATE INDEX IF NOT EXISTS idx_obs_scope ON observations(scope);
CREATE INDEX IF NOT EXISTS idx_obs_created ON observations(created_at);
CREATE INDEX IF NOT EXISTS idx_obs_deleted ON observations(deleted_at);
CREATE INDEX IF NOT EXISTS idx_obs_topic ON observations(topic_key, project, scope, updated_at DESC);
CREATE INDEX IF NOT EXISTS idx_obs_dedupe ON observations(content_hash, project, scope, type, title, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_prompts_session ON user_prompts(session_id);
CREATE INDEX IF NOT EXISTS idx_prompts_project ON user_prompts(project);
";
