//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections for each schema.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::{apply_migrations, Schema};
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the document store file and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with(Schema::Store, "file", || Connection::open(path))
}

/// Opens an in-memory document store. Used by tests and ephemeral runs.
pub fn open_store_in_memory() -> DbResult<Connection> {
    open_with(Schema::Store, "memory", Connection::open_in_memory)
}

/// Opens the search index file and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_index(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with(Schema::Index, "file", || Connection::open(path))
}

/// Opens an in-memory search index.
pub fn open_index_in_memory() -> DbResult<Connection> {
    open_with(Schema::Index, "memory", Connection::open_in_memory)
}

fn open_with(
    schema: Schema,
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start schema={schema} mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error schema={} mode={} duration_ms={} error_code=db_open_failed error={}",
                schema,
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, schema) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok schema={} mode={} duration_ms={}",
                schema,
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error schema={} mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                schema,
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection, schema: Schema) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn, schema)?;
    Ok(())
}
