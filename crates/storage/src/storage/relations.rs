use agentmem_core::{DEFAULT_RELATION_TYPE, NewRelation, Relation, non_blank};
use rusqlite::{Connection, TransactionBehavior, params};

use super::observations::query_observation_meta;
use super::{Storage, get_conn, log_row_error, parse_db_time, to_db_time};
use crate::error::{Result, StorageError};

fn row_to_relation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Relation> {
    Ok(Relation {
        id: row.get(0)?,
        from_id: row.get(1)?,
        to_id: row.get(2)?,
        relation_type: row.get(3)?,
        note: row.get(4)?,
        created_at: parse_db_time(5, &row.get::<_, String>(5)?)?,
    })
}

/// Every edge touching `observation_id`, oldest first.
pub(crate) fn query_relations(conn: &Connection, observation_id: i64) -> Result<Vec<Relation>> {
    let mut stmt = conn.prepare(
        "SELECT id, from_id, to_id, type, note, created_at FROM observation_relations
         WHERE from_id = ?1 OR to_id = ?1
         ORDER BY created_at ASC, id ASC",
    )?;
    let relations = stmt
        .query_map(params![observation_id], row_to_relation)?
        .filter_map(log_row_error)
        .collect();
    Ok(relations)
}

impl Storage {
    /// Create a typed edge between two live observations.
    ///
    /// With `bidirectional` set, the reverse edge is written in the same
    /// transaction; if either leg fails nothing is written. Returns the new
    /// edge ids in insertion order.
    ///
    /// # Errors
    /// `InvalidArgument` for a self-relation, `NotFound` if an endpoint is
    /// missing or soft-deleted, `AlreadyExists` if an identical edge exists.
    pub fn add_relation(&self, input: &NewRelation) -> Result<Vec<i64>> {
        if input.from_id == input.to_id {
            return Err(StorageError::InvalidArgument(format!(
                "observation {} cannot relate to itself",
                input.from_id
            )));
        }
        let relation_type = non_blank(Some(input.relation_type.as_str()))
            .unwrap_or_else(|| DEFAULT_RELATION_TYPE.to_owned());
        let note = non_blank(input.note.as_deref());
        let now_str = to_db_time(self.now());

        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        for endpoint in [input.from_id, input.to_id] {
            if query_observation_meta(&tx, endpoint)?.is_none() {
                return Err(StorageError::not_found("observation", endpoint));
            }
        }

        let mut legs = vec![(input.from_id, input.to_id)];
        if input.bidirectional {
            legs.push((input.to_id, input.from_id));
        }

        let mut ids = Vec::with_capacity(legs.len());
        for (from_id, to_id) in legs {
            tx.execute(
                "INSERT INTO observation_relations (from_id, to_id, type, note, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![from_id, to_id, relation_type, note, now_str],
            )?;
            ids.push(tx.last_insert_rowid());
        }
        tx.commit()?;

        tracing::debug!(
            from_id = input.from_id,
            to_id = input.to_id,
            relation_type = %relation_type,
            edges = ids.len(),
            "relation added"
        );
        Ok(ids)
    }

    /// Remove an edge.
    ///
    /// # Errors
    /// `NotFound` if no edge has this id.
    pub fn remove_relation(&self, id: i64) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute("DELETE FROM observation_relations WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StorageError::not_found("relation", id));
        }
        Ok(())
    }

    /// Every edge where the observation is source or target, oldest first.
    ///
    /// Edges to soft-deleted observations are included.
    ///
    /// # Errors
    /// Returns error if the database query fails.
    pub fn get_relations(&self, observation_id: i64) -> Result<Vec<Relation>> {
        let conn = get_conn(&self.pool)?;
        query_relations(&conn, observation_id)
    }
}
