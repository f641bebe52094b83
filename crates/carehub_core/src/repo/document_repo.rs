//! Document repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs for any `Entity` over the shared `documents` table.
//! - Keep SQL and JSON encoding details inside the persistence boundary.
//!
//! # Invariants
//! - Rows are scoped by `E::COLLECTION`; one collection never sees another.
//! - Writes require an assigned id.
//! - Read paths reject undecodable bodies instead of masking them.

use crate::db::{ensure_schema, DbError, Schema};
use crate::model::Entity;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

const DOCUMENT_COLUMNS: &[&str] = &["collection", "id", "body", "created_at", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for document persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Write attempted on an entity without id.
    MissingId(&'static str),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingId(entity) => write!(f, "{entity} has no id"),
            Self::Serialization(err) => write!(f, "failed to encode document: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::MissingId(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination for listing documents. Default lists everything.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for document CRUD on one entity type.
pub trait DocumentRepository<E: Entity> {
    /// Inserts or fully replaces the document with `entity.id()`.
    fn save(&self, entity: &E) -> RepoResult<()>;
    fn find_by_id(&self, id: &str) -> RepoResult<Option<E>>;
    fn exists_by_id(&self, id: &str) -> RepoResult<bool>;
    /// Lists documents in insertion order.
    fn find_all(&self, query: &ListQuery) -> RepoResult<Vec<E>>;
    fn count(&self) -> RepoResult<u64>;
    /// Removes the document; returns whether a row existed.
    fn delete_by_id(&self, id: &str) -> RepoResult<bool>;
}

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository<'conn, E> {
    conn: &'conn Connection,
    _entity: PhantomData<fn() -> E>,
}

impl<'conn, E: Entity> SqliteDocumentRepository<'conn, E> {
    /// Wraps a migrated store connection.
    ///
    /// # Errors
    /// - `DbError::UninitializedConnection` when store migrations are missing.
    /// - `DbError::MissingRequiredTable` / `MissingRequiredColumn` when the
    ///   `documents` table does not have the expected shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, Schema::Store, "documents", DOCUMENT_COLUMNS)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }
}

impl<E: Entity> DocumentRepository<E> for SqliteDocumentRepository<'_, E> {
    fn save(&self, entity: &E) -> RepoResult<()> {
        let id = entity.id().ok_or(RepoError::MissingId(E::ENTITY_NAME))?;
        let body = serde_json::to_string(entity).map_err(RepoError::Serialization)?;

        self.conn.execute(
            "INSERT INTO documents (collection, id, body)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, id) DO UPDATE SET
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![E::COLLECTION, id, body],
        )?;

        Ok(())
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Option<E>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, body FROM documents
             WHERE collection = ?1 AND id = ?2;",
        )?;

        let mut rows = stmt.query(params![E::COLLECTION, id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_document_row(row)?));
        }

        Ok(None)
    }

    fn exists_by_id(&self, id: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM documents WHERE collection = ?1 AND id = ?2
            );",
            params![E::COLLECTION, id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_all(&self, query: &ListQuery) -> RepoResult<Vec<E>> {
        let mut sql = String::from(
            "SELECT id, body FROM documents
             WHERE collection = ?
             ORDER BY rowid ASC",
        );
        let mut bind_values: Vec<Value> = vec![Value::Text(E::COLLECTION.to_string())];

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }

        Ok(documents)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1;",
            [E::COLLECTION],
            |row| row.get(0),
        )?;
        u64::try_from(count).map_err(|_| RepoError::InvalidData(format!("negative count {count}")))
    }

    fn delete_by_id(&self, id: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![E::COLLECTION, id],
        )?;
        Ok(changed > 0)
    }
}

fn parse_document_row<E: Entity>(row: &Row<'_>) -> RepoResult<E> {
    let id: String = row.get("id")?;
    let body: String = row.get("body")?;

    let mut entity: E = serde_json::from_str(&body).map_err(|err| {
        RepoError::InvalidData(format!(
            "undecodable {} body for id `{id}`: {err}",
            E::ENTITY_NAME
        ))
    })?;

    // The key column is authoritative over whatever id the body carries.
    if entity.id() != Some(id.as_str()) {
        entity.set_id(id);
    }

    Ok(entity)
}
