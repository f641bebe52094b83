//! Search-index repository over the FTS5 index database.
//!
//! # Responsibility
//! - Mirror entity documents into `index_documents` (FTS kept in sync by
//!   triggers).
//! - Answer free-text queries with fully decoded entities.
//!
//! # Invariants
//! - Hits are scoped to `E::COLLECTION`.
//! - Ordering is deterministic: bm25 rank, then insertion order. Queries made
//!   only of field filters come back in insertion order.
//! - The index never reads the document store.

use super::fts::{
    field_matches, map_query_error, plan_query, searchable_text, MatchPlan, SearchError,
    SearchQuery, SearchResult,
};
use crate::db::{ensure_schema, Schema};
use crate::model::Entity;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::Value as JsonValue;
use std::marker::PhantomData;

const INDEX_COLUMNS: &[&str] = &["seq", "collection", "doc_id", "body", "search_text"];

/// Repository interface for the search index of one entity type.
pub trait SearchRepository<E: Entity> {
    /// Adds or replaces the indexed copy of `entity`.
    fn index(&self, entity: &E) -> SearchResult<()>;
    /// Drops the indexed copy; returns whether one existed.
    fn remove(&self, id: &str) -> SearchResult<bool>;
    fn search(&self, query: &SearchQuery) -> SearchResult<Vec<E>>;
}

/// SQLite FTS5-backed search repository.
pub struct SqliteSearchRepository<'conn, E> {
    conn: &'conn Connection,
    _entity: PhantomData<fn() -> E>,
}

impl<'conn, E: Entity> SqliteSearchRepository<'conn, E> {
    /// Wraps a migrated index connection.
    pub fn try_new(conn: &'conn Connection) -> SearchResult<Self> {
        ensure_schema(conn, Schema::Index, "index_documents", INDEX_COLUMNS)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    fn search_all_in_collection(
        &self,
        query: &SearchQuery,
        field_filters: &[(String, String)],
    ) -> SearchResult<Vec<E>> {
        let mut sql = String::from(
            "SELECT doc_id, body FROM index_documents
             WHERE collection = ?
             ORDER BY seq ASC",
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(E::COLLECTION.to_string())];
        if field_filters.is_empty() {
            push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut hits = Vec::new();
        while let Some(row) = rows.next()? {
            let (body, entity) = parse_hit_row::<E>(row)?;
            if passes_filters(&body, field_filters) {
                hits.push(entity);
            }
        }

        Ok(paginate_filtered(hits, query, field_filters))
    }

    fn search_matching(
        &self,
        query: &SearchQuery,
        expression: &str,
        field_filters: &[(String, String)],
    ) -> SearchResult<Vec<E>> {
        let mut sql = String::from(
            "SELECT
                index_documents.doc_id AS doc_id,
                index_documents.body AS body
             FROM index_fts
             JOIN index_documents ON index_documents.seq = index_fts.rowid
             WHERE index_fts MATCH ?
               AND index_documents.collection = ?
             ORDER BY bm25(index_fts), index_documents.seq ASC",
        );
        let mut bind_values: Vec<Value> = vec![
            Value::Text(expression.to_string()),
            Value::Text(E::COLLECTION.to_string()),
        ];

        // Field filters run on decoded bodies, so paginate after filtering.
        if field_filters.is_empty() {
            push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt
            .query(params_from_iter(bind_values))
            .map_err(|err| map_query_error(err, expression))?;
        let mut hits = Vec::new();

        while let Some(row) = rows
            .next()
            .map_err(|err| map_query_error(err, expression))?
        {
            let (body, entity) = parse_hit_row::<E>(row)?;
            if passes_filters(&body, field_filters) {
                hits.push(entity);
            }
        }

        Ok(paginate_filtered(hits, query, field_filters))
    }
}

impl<E: Entity> SearchRepository<E> for SqliteSearchRepository<'_, E> {
    fn index(&self, entity: &E) -> SearchResult<()> {
        let id = entity.id().ok_or(SearchError::MissingId(E::ENTITY_NAME))?;
        let body = serde_json::to_value(entity).map_err(SearchError::Serialization)?;
        let search_text = searchable_text(&body);

        self.conn.execute(
            "INSERT INTO index_documents (collection, doc_id, body, search_text)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (collection, doc_id) DO UPDATE SET
                body = excluded.body,
                search_text = excluded.search_text;",
            params![E::COLLECTION, id, body.to_string(), search_text],
        )?;

        Ok(())
    }

    fn remove(&self, id: &str) -> SearchResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM index_documents WHERE collection = ?1 AND doc_id = ?2;",
            params![E::COLLECTION, id],
        )?;
        Ok(changed > 0)
    }

    fn search(&self, query: &SearchQuery) -> SearchResult<Vec<E>> {
        if query.limit == Some(0) {
            return Ok(Vec::new());
        }

        let fields = entity_fields::<E>()?;
        match plan_query(query, |field| fields.iter().any(|known| known == field)) {
            MatchPlan::Empty => Ok(Vec::new()),
            MatchPlan::All => self.search_all_in_collection(query, &[]),
            MatchPlan::Scan { field_filters } => {
                self.search_all_in_collection(query, &field_filters)
            }
            MatchPlan::Fts {
                expression,
                field_filters,
            } => self.search_matching(query, &expression, &field_filters),
        }
    }
}

/// JSON keys of `E`, taken from its serialized default.
fn entity_fields<E: Entity>() -> SearchResult<Vec<String>> {
    let template = serde_json::to_value(E::default()).map_err(SearchError::Serialization)?;
    Ok(template
        .as_object()
        .map(|object| object.keys().cloned().collect())
        .unwrap_or_default())
}

fn passes_filters(body: &JsonValue, field_filters: &[(String, String)]) -> bool {
    field_filters
        .iter()
        .all(|(field, needle)| field_matches(body, field, needle))
}

fn paginate_filtered<E>(
    hits: Vec<E>,
    query: &SearchQuery,
    field_filters: &[(String, String)],
) -> Vec<E> {
    if field_filters.is_empty() {
        return hits;
    }

    let skip = usize::try_from(query.offset).unwrap_or(usize::MAX);
    let take = query
        .limit
        .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
    hits.into_iter().skip(skip).take(take).collect()
}

fn push_pagination(sql: &mut String, bind_values: &mut Vec<Value>, limit: Option<u32>, offset: u32) {
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));
        if offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(offset)));
        }
    } else if offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        bind_values.push(Value::Integer(i64::from(offset)));
    }
}

fn parse_hit_row<E: Entity>(row: &Row<'_>) -> SearchResult<(JsonValue, E)> {
    let doc_id: String = row.get("doc_id")?;
    let body_text: String = row.get("body")?;

    let body: JsonValue = serde_json::from_str(&body_text)
        .map_err(|err| SearchError::InvalidData(format!("undecodable body for `{doc_id}`: {err}")))?;
    let mut entity: E = serde_json::from_value(body.clone()).map_err(|err| {
        SearchError::InvalidData(format!(
            "indexed {} `{doc_id}` does not decode: {err}",
            E::ENTITY_NAME
        ))
    })?;
    if entity.id() != Some(doc_id.as_str()) {
        entity.set_id(doc_id);
    }

    Ok((body, entity))
}
