//! Migration v2: FTS5 shadow indexes and their sync triggers
//!
//! Both tables are external-content indexes; the triggers are the only
//! writers. Each batch drops any stale index, recreates it, and rebuilds
//! from the base table, so it is only run when its insert trigger is missing.

/// Trigger whose presence marks the observation index as installed.
pub(super) const OBSERVATIONS_FTS_MARKER: &str = "obs_fts_insert";

pub(super) const OBSERVATIONS_FTS_SQL: &str = "
DROP TABLE IF EXISTS observations_fts;

CREATE VIRTUAL TABLE observations_fts USING fts5(
    title, content, tool_name, type, project,
    content='observations',
    content_rowid='id'
);

CREATE TRIGGER IF NOT EXISTS obs_fts_insert AFTER INSERT ON observations BEGIN
    INSERT INTO observations_fts(rowid, title, content, tool_name, type, project)
    VALUES (new.id, new.title, new.content, new.tool_name, new.type, new.project);
END;

CREATE TRIGGER IF NOT EXISTS obs_fts_delete AFTER DELETE ON observations BEGIN
    INSERT INTO observations_fts(observations_fts, rowid, title, content, tool_name, type, project)
    VALUES ('delete', old.id, old.title, old.content, old.tool_name, old.type, old.project);
END;

CREATE TRIGGER IF NOT EXISTS obs_fts_update
AFTER UPDATE OF title, content, tool_name, type, project ON observations BEGIN
    INSERT INTO observations_fts(observations_fts, rowid, title, content, tool_name, type, project)
    VALUES ('delete', old.id, old.title, old.content, old.tool_name, old.type, old.project);
    INSERT INTO observations_fts(rowid, title, content, tool_name, type, project)
    VALUES (new.id, new.title, new.content, new.tool_name, new.type, new.project);
END;

INSERT INTO observations_fts(observations_fts) VALUES ('rebuild');
";

/// Trigger whose presence marks the prompt index as installed.
pub(super) const PROMPTS_FTS_MARKER: &str = "prompt_fts_insert";

pub(super) const PROMPTS_FTS_SQL: &str = "
DROP TABLE IF EXISTS prompts_fts;

CREATE VIRTUAL TABLE prompts_fts USING fts5(
    content, project,
    content='user_prompts',
    content_rowid='id'
);

CREATE TRIGGER IF NOT EXISTS prompt_fts_insert AFTER INSERT ON user_prompts BEGIN
    INSERT INTO prompts_fts(rowid, content, project)
    VALUES (new.id, new.content, new.project);
END;

CREATE TRIGGER IF NOT EXISTS prompt_fts_delete AFTER DELETE ON user_prompts BEGIN
    INSERT INTO prompts_fts(prompts_fts, rowid, content, project)
    VALUES ('delete', old.id, old.content, old.project);
END;

CREATE TRIGGER IF NOT EXISTS prompt_fts_update
AFTER UPDATE OF content, project ON user_prompts BEGIN
    INSERT INTO prompts_fts(prompts_fts, rowid, content, project)
    VALUES ('delete', old.id, old.content, old.project);
    INSERT INTO prompts_fts(rowid, content, project)
    VALUES (new.id, new.content, new.project);
END;

INSERT INTO prompts_fts(prompts_fts) VALUES ('rebuild');
";
