//! Schema introspection helpers. `SQLite` has no `ADD COLUMN IF NOT EXISTS`
//! and no `CREATE TRIGGER` presence query, so both go through the catalog.

use rusqlite::{Connection, OptionalExtension as _, params};

pub fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let sql = format!("PRAGMA table_info({table})");
    let Ok(mut stmt) = conn.prepare(&sql) else {
        return false;
    };
    let Ok(rows) = stmt.query_map([], |row| row.get::<_, String>(1)) else {
        return false;
    };
    rows.flatten().any(|name| name == column)
}

pub fn add_column_if_not_exists(
    conn: &Connection,
    table: &str,
    column: &str,
    col_type: &str,
) -> Result<bool, rusqlite::Error> {
    if column_exists(conn, table, column) {
        return Ok(false);
    }
    conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {col_type}"), [])?;
    tracing::info!(table, column, "Added missing column");
    Ok(true)
}

/// Whether a schema object of `kind` (`table`, `trigger`, `index`) named `name` exists.
pub fn schema_object_exists(
    conn: &Connection,
    kind: &str,
    name: &str,
) -> Result<bool, rusqlite::Error> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2",
            params![kind, name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}
