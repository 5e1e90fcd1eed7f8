//! Text-based search functions (FTS5)

use agentmem_core::{Scope, SearchFilters, SearchResult};
use rusqlite::types::Value;

use crate::error::Result;
use crate::storage::{
    FilterClause, OBSERVATION_COLUMNS, OBSERVATION_COLUMNS_O, Storage, build_fts_query, get_conn,
    log_row_error,
};

fn apply_filters(clause: &mut FilterClause, filters: &SearchFilters, prefix: &str) {
    clause
        .eq(&format!("{prefix}type"), filters.observation_type.as_deref())
        .eq(&format!("{prefix}project"), filters.project.as_deref())
        .eq(&format!("{prefix}scope"), filters.scope.as_ref().map(Scope::as_str));
}

impl Storage {
    /// Ranked full-text search over live observations.
    ///
    /// Each whitespace-separated token of `query` is matched literally.
    /// A query with no tokens lists by recency instead (rank `0.0`).
    /// A zero limit means the configured default; larger limits are capped.
    ///
    /// # Errors
    /// Returns error if the database query fails.
    pub fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let limit = self.config.search_limit(limit);
        let Some(fts_query) = build_fts_query(query) else {
            return self.recent_search_results(filters, limit);
        };

        let mut clause = FilterClause::default();
        let match_param = clause.bind(Value::Text(fts_query));
        apply_filters(&mut clause, filters, "o.");
        let limit_param = clause.bind(Value::Integer(limit as i64));

        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS_O}, observations_fts.rank
             FROM observations_fts
             JOIN observations o ON o.id = observations_fts.rowid
             WHERE observations_fts MATCH {match_param} AND o.deleted_at IS NULL{}
             ORDER BY observations_fts.rank
             LIMIT {limit_param}",
            clause.sql()
        ))?;
        let results = stmt
            .query_map(clause.params(), |row| {
                Ok(SearchResult { observation: Self::row_to_observation(row)?, rank: row.get(15)? })
            })?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    /// Recency listing with the same filters as [`Storage::search`].
    fn recent_search_results(
        &self,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let mut clause = FilterClause::default();
        apply_filters(&mut clause, filters, "");
        let limit_param = clause.bind(Value::Integer(limit as i64));

        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations
             WHERE deleted_at IS NULL{}
             ORDER BY created_at DESC, id DESC
             LIMIT {limit_param}",
            clause.sql()
        ))?;
        let results = stmt
            .query_map(clause.params(), |row| {
                Ok(SearchResult { observation: Self::row_to_observation(row)?, rank: 0.0 })
            })?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }
}
