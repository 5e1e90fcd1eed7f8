#![expect(clippy::unwrap_used, reason = "test code")]

use std::collections::HashSet;

use agentmem_core::{Direction, NewRelation};

use super::{add, create_test_storage};
use crate::Storage;

fn relate(storage: &Storage, from: i64, to: i64, relation_type: &str) {
    storage.add_relation(&NewRelation::new(from, to, relation_type)).unwrap();
}

fn depth_by_id(storage: &Storage, root: i64, depth: i64) -> Vec<(i64, u32)> {
    storage
        .build_context(root, depth)
        .unwrap()
        .nodes
        .iter()
        .map(|n| (n.observation.id, n.depth))
        .collect()
}

#[test]
fn chain_respects_depth() {
    let (storage, _temp_dir) = create_test_storage();
    let a = add(&storage, "A", "alpha");
    let b = add(&storage, "B", "beta");
    let c = add(&storage, "C", "gamma");
    relate(&storage, a, b, "depends_on");
    relate(&storage, b, c, "implements");

    let graph = storage.build_context(a, 2).unwrap();
    assert_eq!(graph.root.id, a);
    assert_eq!(graph.total, 2);
    assert_eq!(graph.max_depth_reached, 2);
    assert_eq!(graph.nodes[0].observation.id, b);
    assert_eq!(graph.nodes[0].relation_type, "depends_on");
    assert_eq!(graph.nodes[0].direction, Direction::Outgoing);
    assert_eq!(graph.nodes[1].observation.id, c);
    assert_eq!(graph.nodes[1].relation_type, "implements");

    assert_eq!(depth_by_id(&storage, a, 1), vec![(b, 1)]);
}

#[test]
fn incoming_edges_are_followed() {
    let (storage, _temp_dir) = create_test_storage();
    let a = add(&storage, "A", "alpha");
    let b = add(&storage, "B", "beta");
    relate(&storage, a, b, "depends_on");

    let graph = storage.build_context(b, 1).unwrap();
    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].observation.id, a);
    assert_eq!(graph.nodes[0].direction, Direction::Incoming);
}

#[test]
fn depth_is_clamped() {
    let (storage, _temp_dir) = create_test_storage();
    let ids: Vec<i64> = (0..8).map(|i| add(&storage, &format!("n{i}"), &format!("node {i}"))).collect();
    for pair in ids.windows(2) {
        relate(&storage, pair[0], pair[1], "next");
    }

    assert_eq!(depth_by_id(&storage, ids[0], 0), depth_by_id(&storage, ids[0], 2));
    assert_eq!(depth_by_id(&storage, ids[0], -4), depth_by_id(&storage, ids[0], 2));
    assert_eq!(depth_by_id(&storage, ids[0], 9), depth_by_id(&storage, ids[0], 5));

    let deep = storage.build_context(ids[0], 100).unwrap();
    assert_eq!(deep.total, 5);
    assert_eq!(deep.max_depth_reached, 5);
}

#[test]
fn cycle_terminates_without_repeats() {
    let (storage, _temp_dir) = create_test_storage();
    let ids: Vec<i64> = (0..4).map(|i| add(&storage, &format!("c{i}"), &format!("cycle {i}"))).collect();
    for i in 0..ids.len() {
        relate(&storage, ids[i], ids[(i + 1) % ids.len()], "next");
    }

    let graph = storage.build_context(ids[0], 5).unwrap();
    let seen: HashSet<i64> = graph.nodes.iter().map(|n| n.observation.id).collect();

    assert_eq!(graph.nodes.len(), seen.len());
    assert_eq!(graph.nodes.len(), ids.len() - 1);
    assert!(!seen.contains(&ids[0]));
    // both neighbours of the root are found at depth 1
    assert_eq!(graph.max_depth_reached, 2);
}

#[test]
fn shallow_graph_reports_actual_depth() {
    let (storage, _temp_dir) = create_test_storage();
    let a = add(&storage, "A", "alpha");

    let graph = storage.build_context(a, 5).unwrap();
    assert!(graph.nodes.is_empty());
    assert_eq!(graph.total, 0);
    assert_eq!(graph.max_depth_reached, 0);
}

#[test]
fn soft_deleted_neighbour_is_skipped() {
    let (storage, _temp_dir) = create_test_storage();
    let a = add(&storage, "A", "alpha");
    let b = add(&storage, "B", "beta");
    let c = add(&storage, "C", "gamma");
    relate(&storage, a, b, "x");
    relate(&storage, a, c, "y");

    storage.delete_observation(b, false).unwrap();

    assert_eq!(depth_by_id(&storage, a, 2), vec![(c, 1)]);
}

#[test]
fn missing_or_deleted_root_is_not_found() {
    let (storage, _temp_dir) = create_test_storage();
    assert!(storage.build_context(42, 2).unwrap_err().is_not_found());

    let a = add(&storage, "A", "alpha");
    storage.delete_observation(a, false).unwrap();
    assert!(storage.build_context(a, 2).unwrap_err().is_not_found());
}

#[test]
fn undecodable_neighbour_is_skipped() {
    let (storage, _temp_dir) = create_test_storage();
    let a = add(&storage, "A", "alpha");
    let b = add(&storage, "B", "beta");
    let c = add(&storage, "C", "gamma");
    relate(&storage, a, b, "x");
    relate(&storage, a, c, "y");

    // given: B's timestamp no longer parses
    storage
        .pool
        .get()
        .unwrap()
        .execute("UPDATE observations SET created_at = 'garbage' WHERE id = ?1", [b])
        .unwrap();

    let graph = storage.build_context(a, 1).unwrap();
    assert_eq!(graph.nodes.iter().map(|n| n.observation.id).collect::<Vec<_>>(), vec![c]);
    assert_eq!(graph.total, 1);
}
