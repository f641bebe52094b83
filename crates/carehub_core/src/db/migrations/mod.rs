//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order, per schema.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic within one schema.
//! - Applied migration version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const STORE_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("store/0001_documents.sql"),
}];

const INDEX_MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("index/0001_index_documents.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("index/0002_index_fts.sql"),
    },
];

/// The two databases managed by core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Primary document store holding the source of truth.
    Store,
    /// Full-text search index mirrored from the store.
    Index,
}

impl Schema {
    fn migrations(self) -> &'static [Migration] {
        match self {
            Self::Store => STORE_MIGRATIONS,
            Self::Index => INDEX_MIGRATIONS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Index => "index",
        }
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns the latest migration version known by this binary for `schema`.
pub fn latest_version(schema: Schema) -> u32 {
    schema
        .migrations()
        .last()
        .map_or(0, |migration| migration.version)
}

/// Applies all pending `schema` migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection, schema: Schema) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version(schema);

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            schema,
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in schema.migrations() {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

pub(crate) fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
