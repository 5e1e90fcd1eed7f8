//! Migration v3: observation relation graph
//!
//! Cascade on hard delete relies on `PRAGMA foreign_keys = ON`, set for
//! every pooled connection.

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS observation_relations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_id INTEGER NOT NULL REFERENCES observations(id) ON DELETE CASCADE,
    to_id INTEGER NOT NULL REFERENCES observations(id) ON DELETE CASCADE,
    type TEXT NOT NULL DEFAULT 'related',
    note TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (from_id, to_id, type),
    CHECK (from_id <> to_id)
);

CREATE INDEX IF NOT EXISTS idx_relations_from ON observation_relations(from_id);
CREATE INDEX IF NOT EXISTS idx_relations_to ON observation_relations(to_id);
";
