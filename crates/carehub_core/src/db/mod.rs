//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the document store and the
//!   search index.
//! - Apply schema migrations in deterministic order, per schema.
//! - Verify that a caller-provided connection carries the expected schema.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - The document store and the search index never share a database file.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use migrations::Schema;
pub use open::{open_index, open_index_in_memory, open_store, open_store_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        schema: Schema,
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection was opened without running migrations for this schema.
    UninitializedConnection {
        schema: Schema,
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                schema,
                db_version,
                latest_supported,
            } => write!(
                f,
                "{schema} schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::UninitializedConnection {
                schema,
                expected_version,
                actual_version,
            } => write!(
                f,
                "{schema} connection is at schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Runs a trivial query to prove the connection is usable.
pub fn check_connection(conn: &Connection) -> DbResult<()> {
    conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

/// Verifies that `conn` is migrated to the latest `schema` version and that
/// `table` exposes every column in `columns`.
///
/// Repositories call this from `try_new` so that a raw, unmigrated connection
/// is rejected up front instead of failing on the first query.
pub fn ensure_schema(
    conn: &Connection,
    schema: Schema,
    table: &'static str,
    columns: &[&'static str],
) -> DbResult<()> {
    let expected_version = migrations::latest_version(schema);
    let actual_version = migrations::current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(DbError::UninitializedConnection {
            schema,
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if present.is_empty() {
        return Err(DbError::MissingRequiredTable(table));
    }

    for column in columns {
        if !present.iter().any(|name| name == column) {
            return Err(DbError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}
