//! Typed edges between observations and the context graph built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CONTEXT_DEPTH, MAX_CONTEXT_DEPTH};
use crate::observation::{Observation, ObservationMeta};

/// A directed, typed edge between two observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: i64,
    pub from_id: i64,
    pub to_id: i64,
    #[serde(rename = "type")]
    pub relation_type: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an edge. An empty `relation_type` becomes
/// [`crate::DEFAULT_RELATION_TYPE`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRelation {
    pub from_id: i64,
    pub to_id: i64,
    #[serde(rename = "type", default)]
    pub relation_type: String,
    #[serde(default)]
    pub note: Option<String>,
    /// Also insert the reverse edge, atomically.
    #[serde(default)]
    pub bidirectional: bool,
}

impl NewRelation {
    #[must_use]
    pub fn new(from_id: i64, to_id: i64, relation_type: impl Into<String>) -> Self {
        Self { from_id, to_id, relation_type: relation_type.into(), note: None, bidirectional: false }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub const fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }
}

/// Which way an edge was followed during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The expanded node is the edge's source.
    Outgoing,
    /// The expanded node is the edge's target.
    Incoming,
}

/// One neighbour discovered by context traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextNode {
    #[serde(flatten)]
    pub observation: ObservationMeta,
    pub relation_type: String,
    pub note: Option<String>,
    pub direction: Direction,
    /// Hops from the root (1 = direct neighbour).
    pub depth: u32,
}

/// Result of a breadth-first walk from a root observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextGraph {
    pub root: Observation,
    /// Neighbours in discovery order.
    pub nodes: Vec<ContextNode>,
    pub total: usize,
    /// Deepest level actually reached; may be below the requested depth.
    pub max_depth_reached: u32,
}

/// Clamps a requested traversal depth: non-positive means the default,
/// anything above the ceiling is capped.
#[must_use]
pub fn clamp_depth(requested: i64) -> u32 {
    if requested <= 0 {
        DEFAULT_CONTEXT_DEPTH
    } else {
        u32::try_from(requested).map_or(MAX_CONTEXT_DEPTH, |d| d.min(MAX_CONTEXT_DEPTH))
    }
}
