//! Breadth-first context traversal over the relation graph.

use std::collections::{HashSet, VecDeque};

use agentmem_core::{ContextGraph, ContextNode, Direction, clamp_depth};

use super::observations::{query_live_observation, query_observation_meta};
use super::relations::query_relations;
use super::{Storage, get_conn};
use crate::error::{Result, StorageError};

impl Storage {
    /// Walk the relation graph outward from `root_id`.
    ///
    /// `depth` is clamped (non-positive means 2, anything above 5 is 5).
    /// Nodes are returned in discovery order; each node appears at most
    /// once, so cycles terminate. Neighbours that are soft-deleted, have
    /// vanished since their edge was read, or cannot be decoded are skipped.
    ///
    /// # Errors
    /// `NotFound` if the root is missing or soft-deleted.
    pub fn build_context(&self, root_id: i64, depth: i64) -> Result<ContextGraph> {
        let max_depth = clamp_depth(depth);
        let conn = get_conn(&self.pool)?;
        let root = query_live_observation(&conn, root_id)?
            .ok_or_else(|| StorageError::not_found("observation", root_id))?;

        let mut visited = HashSet::from([root_id]);
        let mut queue = VecDeque::from([(root_id, 0_u32)]);
        let mut nodes = Vec::new();
        let mut max_depth_reached = 0_u32;

        while let Some((current, current_depth)) = queue.pop_front() {
            if current_depth >= max_depth {
                continue;
            }
            for edge in query_relations(&conn, current)? {
                let (neighbor, direction) = if edge.from_id == current {
                    (edge.to_id, Direction::Outgoing)
                } else {
                    (edge.from_id, Direction::Incoming)
                };
                if !visited.insert(neighbor) {
                    continue;
                }
                let meta = match query_observation_meta(&conn, neighbor) {
                    Ok(Some(meta)) => meta,
                    Ok(None) => {
                        tracing::debug!(neighbor, "skipping unavailable neighbour");
                        continue;
                    },
                    Err(e) => {
                        tracing::warn!(neighbor, error = %e, "skipping unreadable neighbour");
                        continue;
                    },
                };
                let next_depth = current_depth + 1;
                max_depth_reached = max_depth_reached.max(next_depth);
                nodes.push(ContextNode {
                    observation: meta,
                    relation_type: edge.relation_type,
                    note: edge.note,
                    direction,
                    depth: next_depth,
                });
                queue.push_back((neighbor, next_depth));
            }
        }

        Ok(ContextGraph { root, total: nodes.len(), nodes, max_depth_reached })
    }
}
