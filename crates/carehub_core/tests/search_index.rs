use carehub_core::db::open_index_in_memory;
use carehub_core::{
    Condition, Profile, SearchError, SearchQuery, SearchRepository, SqliteSearchRepository, Task,
};
use rusqlite::Connection;

#[test]
fn search_returns_indexed_entity() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Condition>::try_new(&conn).unwrap();
    let condition = condition("c-1", "Type 2 diabetes", "E11");
    index.index(&condition).unwrap();

    let hits = index.search(&SearchQuery::new("diabetes")).unwrap();
    assert_eq!(hits, vec![condition]);
}

#[test]
fn search_reflects_reindexed_content() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Condition>::try_new(&conn).unwrap();
    let mut condition = condition("c-1", "Seasonal asthma", "J45");
    index.index(&condition).unwrap();

    condition.name = Some("Chronic bronchitis".to_string());
    index.index(&condition).unwrap();

    assert!(index.search(&SearchQuery::new("asthma")).unwrap().is_empty());
    let hits = index.search(&SearchQuery::new("bronchitis")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.as_deref(), Some("c-1"));
}

#[test]
fn removed_entities_are_no_longer_found() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Condition>::try_new(&conn).unwrap();
    index.index(&condition("c-1", "Migraine", "G43")).unwrap();

    assert!(index.remove("c-1").unwrap());
    assert!(!index.remove("c-1").unwrap());
    assert!(index.search(&SearchQuery::new("migraine")).unwrap().is_empty());
}

#[test]
fn search_is_scoped_to_collection() {
    let conn = open_index_in_memory().unwrap();
    let conditions = SqliteSearchRepository::<Condition>::try_new(&conn).unwrap();
    let tasks = SqliteSearchRepository::<Task>::try_new(&conn).unwrap();

    conditions.index(&condition("c-1", "Hypertension", "I10")).unwrap();
    tasks
        .index(&Task {
            id: Some("t-1".to_string()),
            title: Some("Review hypertension labs".to_string()),
            ..Task::default()
        })
        .unwrap();

    let task_hits = tasks.search(&SearchQuery::new("hypertension")).unwrap();
    assert_eq!(task_hits.len(), 1);
    assert_eq!(task_hits[0].id.as_deref(), Some("t-1"));
}

#[test]
fn all_terms_must_match() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Profile>::try_new(&conn).unwrap();
    index.index(&profile("p-1", "Ada", "Lovelace")).unwrap();
    index.index(&profile("p-2", "Ada", "Byron")).unwrap();

    let hits = index.search(&SearchQuery::new("ada lovelace")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.as_deref(), Some("p-1"));
}

#[test]
fn id_field_query_finds_exact_entity() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Profile>::try_new(&conn).unwrap();
    index.index(&profile("3f2a-77", "Grace", "Hopper")).unwrap();
    index.index(&profile("9c1d-04", "Alan", "Turing")).unwrap();

    let hits = index.search(&SearchQuery::new("id:3f2a-77")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].last_name.as_deref(), Some("Hopper"));
}

#[test]
fn field_query_restricts_to_that_field() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Profile>::try_new(&conn).unwrap();
    index.index(&profile("p-1", "Morgan", "Smith")).unwrap();
    index.index(&profile("p-2", "Jamie", "Morgan")).unwrap();

    let hits = index.search(&SearchQuery::new("lastName:morgan")).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.as_deref(), Some("p-2"));
}

#[test]
fn wildcard_returns_whole_collection_in_insertion_order() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Profile>::try_new(&conn).unwrap();
    for (id, first) in [("p-2", "Bea"), ("p-1", "Abe"), ("p-3", "Cy")] {
        index.index(&profile(id, first, "Doe")).unwrap();
    }

    let hits = index.search(&SearchQuery::new("*")).unwrap();
    let ids: Vec<_> = hits.iter().map(|hit| hit.id.as_deref().unwrap()).collect();
    assert_eq!(ids, ["p-2", "p-1", "p-3"]);
}

#[test]
fn limit_and_offset_are_applied() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Profile>::try_new(&conn).unwrap();
    for id in ["p-1", "p-2", "p-3"] {
        index.index(&profile(id, "Common", "Name")).unwrap();
    }

    let mut query = SearchQuery::new("common");
    query.limit = Some(2);
    assert_eq!(index.search(&query).unwrap().len(), 2);

    query.offset = 2;
    assert_eq!(index.search(&query).unwrap().len(), 1);

    query.limit = Some(0);
    query.offset = 0;
    assert!(index.search(&query).unwrap().is_empty());
}

#[test]
fn blank_query_returns_empty_results() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Profile>::try_new(&conn).unwrap();
    index.index(&profile("p-1", "Any", "One")).unwrap();

    assert!(index.search(&SearchQuery::new("   ")).unwrap().is_empty());
}

#[test]
fn escaped_query_text_does_not_fail_on_common_symbols() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Condition>::try_new(&conn).unwrap();
    index.index(&condition("c-1", "alpha beta", "X1")).unwrap();

    assert_eq!(index.search(&SearchQuery::new("(alpha")).unwrap().len(), 1);
    assert!(index.search(&SearchQuery::new("\"quoted")).unwrap().is_empty());
}

#[test]
fn punctuation_only_words_are_ignored() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Condition>::try_new(&conn).unwrap();
    index.index(&condition("c-1", "Type 2 diabetes", "E11")).unwrap();

    assert_eq!(index.search(&SearchQuery::new("type 2 - diabetes")).unwrap().len(), 1);
    assert_eq!(index.search(&SearchQuery::new("diabetes --")).unwrap().len(), 1);
    assert!(index.search(&SearchQuery::new("-")).unwrap().is_empty());
}

#[test]
fn colon_words_on_unknown_fields_are_free_text() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Condition>::try_new(&conn).unwrap();
    let mut linked = condition("c-1", "Type 2 diabetes", "E11");
    linked.notes = Some("see https://example.org/t2d".to_string());
    index.index(&linked).unwrap();
    index.index(&condition("c-2", "Asthma", "J45")).unwrap();

    let hits = index
        .search(&SearchQuery::new("https://example.org/t2d"))
        .unwrap();
    assert_eq!(hits, vec![linked]);
}

#[test]
fn field_filter_matches_partial_values() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Condition>::try_new(&conn).unwrap();
    index.index(&condition("c-1", "Type 2 diabetes", "E11")).unwrap();
    index.index(&condition("c-2", "Diabetic neuropathy", "E11.4")).unwrap();
    index.index(&condition("c-3", "Asthma", "J45")).unwrap();

    let hits = index.search(&SearchQuery::new("name:diab")).unwrap();
    let ids: Vec<_> = hits.iter().map(|hit| hit.id.as_deref().unwrap()).collect();
    assert_eq!(ids, vec!["c-1", "c-2"]);

    let narrowed = index.search(&SearchQuery::new("name:diab type")).unwrap();
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].id.as_deref(), Some("c-1"));

    let mut paged = SearchQuery::new("name:diab");
    paged.offset = 1;
    let second = index.search(&paged).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id.as_deref(), Some("c-2"));
}

#[test]
fn raw_fts_syntax_reports_invalid_query() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Condition>::try_new(&conn).unwrap();

    let mut query = SearchQuery::new("\"unterminated");
    query.raw_fts_syntax = true;

    let err = index.search(&query).unwrap_err();
    assert!(matches!(err, SearchError::InvalidQuery { .. }));
}

#[test]
fn index_without_id_is_rejected() {
    let conn = open_index_in_memory().unwrap();
    let index = SqliteSearchRepository::<Condition>::try_new(&conn).unwrap();

    let err = index.index(&Condition::default()).unwrap_err();
    assert!(matches!(err, SearchError::MissingId("condition")));
}

#[test]
fn search_repository_rejects_store_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let result = SqliteSearchRepository::<Condition>::try_new(&conn);
    assert!(matches!(result, Err(SearchError::Db(_))));
}

fn condition(id: &str, name: &str, code: &str) -> Condition {
    Condition {
        id: Some(id.to_string()),
        patient_id: Some("patient-7".to_string()),
        name: Some(name.to_string()),
        code: Some(code.to_string()),
        ..Condition::default()
    }
}

fn profile(id: &str, first: &str, last: &str) -> Profile {
    Profile {
        id: Some(id.to_string()),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        ..Profile::default()
    }
}
