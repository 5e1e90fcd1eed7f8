#![expect(clippy::unwrap_used, reason = "test code")]

use agentmem_core::{DEFAULT_SEARCH_LIMIT, NewObservation, NewPrompt, Scope, SearchFilters};

use super::{add, create_test_storage, note};

fn ids(results: &[agentmem_core::SearchResult]) -> Vec<i64> {
    results.iter().map(|r| r.observation.id).collect()
}

#[test]
fn search_finds_matching_observations() {
    let (storage, _temp_dir) = create_test_storage();
    let hit = add(&storage, "Connection pooling", "r2d2 keeps eight sqlite connections warm");
    add(&storage, "Logging", "tracing spans around every request");

    let results = storage.search("sqlite", &SearchFilters::default(), 0).unwrap();
    assert_eq!(ids(&results), vec![hit]);
    assert!(results[0].rank < 0.0);
}

#[test]
fn search_tokens_are_anded() {
    let (storage, _temp_dir) = create_test_storage();
    let both = add(&storage, "pool", "sqlite pool sizing");
    add(&storage, "only sqlite", "sqlite pragmas");

    let results = storage.search("sqlite sizing", &SearchFilters::default(), 0).unwrap();
    assert_eq!(ids(&results), vec![both]);
}

#[test]
fn query_syntax_is_matched_literally() {
    let (storage, _temp_dir) = create_test_storage();
    add(&storage, "Operators", "AND OR NOT are words here");

    for query in ["OR", "\"unbalanced", "title:foo", "NEAR(a b)", "a* -b ^c"] {
        assert!(storage.search(query, &SearchFilters::default(), 0).is_ok(), "query {query}");
    }
    let results = storage.search("NOT", &SearchFilters::default(), 0).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn empty_query_falls_back_to_recency() {
    let (storage, _temp_dir) = create_test_storage();
    let a = add(&storage, "a", "alpha");
    let b = add(&storage, "b", "beta");

    let empty = storage.search("", &SearchFilters::default(), 0).unwrap();
    let blank = storage.search("   \t", &SearchFilters::default(), 0).unwrap();
    let recent: Vec<i64> = storage.recent_observations(None, None, 0).unwrap().iter().map(|o| o.id).collect();

    assert_eq!(ids(&empty), vec![b, a]);
    assert_eq!(ids(&blank), recent);
    assert!(empty.iter().all(|r| r.rank == 0.0));
}

#[test]
fn recency_fallback_applies_filters() {
    let (storage, _temp_dir) = create_test_storage();
    add(&storage, "a", "alpha");
    let personal = storage.add_observation(&note("b", "beta").scope(Scope::Personal)).unwrap();

    let filters = SearchFilters { scope: Some(Scope::Personal), ..Default::default() };
    assert_eq!(ids(&storage.search("", &filters, 0).unwrap()), vec![personal]);
}

#[test]
fn filters_restrict_results() {
    let (storage, _temp_dir) = create_test_storage();
    let engine = add(&storage, "schema", "migration adds columns");
    let web = storage
        .add_observation(&NewObservation::new("s2", "bugfix", "schema", "migration broke the page").project("website"))
        .unwrap();

    let by_project = SearchFilters { project: Some("website".to_owned()), ..Default::default() };
    assert_eq!(ids(&storage.search("migration", &by_project, 0).unwrap()), vec![web]);

    let by_type = SearchFilters { observation_type: Some("decision".to_owned()), ..Default::default() };
    assert_eq!(ids(&storage.search("migration", &by_type, 0).unwrap()), vec![engine]);

    let by_scope = SearchFilters { scope: Some(Scope::Personal), ..Default::default() };
    assert!(storage.search("migration", &by_scope, 0).unwrap().is_empty());
}

#[test]
fn soft_deleted_rows_are_not_searchable() {
    let (storage, _temp_dir) = create_test_storage();
    let id = add(&storage, "secret plan", "launch codes");
    storage.delete_observation(id, false).unwrap();

    assert!(storage.search("launch", &SearchFilters::default(), 0).unwrap().is_empty());
    assert!(storage.search("", &SearchFilters::default(), 0).unwrap().is_empty());
}

#[test]
fn index_follows_updates_and_hard_deletes() {
    let (storage, _temp_dir) = create_test_storage();
    let id = add(&storage, "title", "original wording");

    let update = agentmem_core::ObservationUpdate {
        content: Some("rewritten wording".to_owned()),
        ..Default::default()
    };
    storage.update_observation(id, &update).unwrap();
    assert!(storage.search("original", &SearchFilters::default(), 0).unwrap().is_empty());
    assert_eq!(ids(&storage.search("rewritten", &SearchFilters::default(), 0).unwrap()), vec![id]);

    storage.delete_observation(id, true).unwrap();
    assert!(storage.search("rewritten", &SearchFilters::default(), 0).unwrap().is_empty());
}

#[test]
fn limit_defaults_and_caps() {
    let (storage, _temp_dir) = create_test_storage();
    for i in 0..30 {
        add(&storage, &format!("note {i}"), &format!("shared keyword body {i}"));
    }

    assert_eq!(storage.search("keyword", &SearchFilters::default(), 0).unwrap().len(), DEFAULT_SEARCH_LIMIT);
    assert_eq!(storage.search("keyword", &SearchFilters::default(), 3).unwrap().len(), 3);
    assert_eq!(
        storage.search("keyword", &SearchFilters::default(), 500).unwrap().len(),
        storage.config().max_search_results
    );
}

#[test]
fn prompt_search_ranks_and_falls_back() {
    let (storage, _temp_dir) = create_test_storage();
    let first = storage.add_prompt(&NewPrompt::new("s1", "how do I tune the sqlite pool").project("engine")).unwrap();
    let second = storage.add_prompt(&NewPrompt::new("s1", "fix the navbar").project("website")).unwrap();

    let hits = storage.search_prompts("sqlite", None, 0).unwrap();
    assert_eq!(hits.iter().map(|p| p.id).collect::<Vec<_>>(), vec![first]);

    assert!(storage.search_prompts("sqlite", Some("website"), 0).unwrap().is_empty());

    let recent = storage.search_prompts("  ", None, 0).unwrap();
    assert_eq!(recent.iter().map(|p| p.id).collect::<Vec<_>>(), vec![second, first]);
}

#[test]
fn prompt_fallback_uses_search_limit_not_list_limit() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config = agentmem_core::MemoryConfig {
        max_search_results: 10,
        max_context_results: 3,
        ..Default::default()
    };
    let storage = crate::Storage::with_config(&temp_dir.path().join("test.db"), config).unwrap();
    for i in 0..6 {
        storage.add_prompt(&NewPrompt::new("s1", format!("prompt number {i}"))).unwrap();
    }

    assert_eq!(storage.search_prompts("", None, 8).unwrap().len(), 6);
    assert_eq!(storage.search_prompts("prompt", None, 8).unwrap().len(), 6);
    assert_eq!(storage.recent_prompts(None, 8).unwrap().len(), 3);
}
