//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection settings and ensure the schema.
//!
//! # Invariants
//! - Returned connections always have the `Users` table present.
//! - Failure is returned to the caller; a half-initialized store is never
//!   handed out.

use super::schema::ensure_schema;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (or creates) the store file and ensures the `Users` table.
///
/// # Side effects
/// - Creates the file when it does not exist. Parent directories must exist.
/// - Emits `store_open` logging events with duration and status.
///
/// # Errors
/// - [`DbError::StoreUnavailable`] when the file cannot be opened.
/// - [`DbError::SchemaSetupFailed`] when the table cannot be created.
pub fn open_store(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=store_open module=db status=start mode=file path={}",
        path.display()
    );

    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(source) => {
            error!(
                "event=store_open module=db status=error mode=file duration_ms={} error_code=store_unavailable error={}",
                started_at.elapsed().as_millis(),
                source
            );
            return Err(DbError::StoreUnavailable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    finish_open(conn, "file", started_at)
}

/// Opens a private in-memory store with the `Users` table ensured.
pub fn open_store_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode=memory");

    let conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(source) => {
            error!(
                "event=store_open module=db status=error mode=memory duration_ms={} error_code=store_unavailable error={}",
                started_at.elapsed().as_millis(),
                source
            );
            return Err(DbError::StoreUnavailable {
                path: ":memory:".into(),
                source,
            });
        }
    };

    finish_open(conn, "memory", started_at)
}

/// Closes a store connection, surfacing errors that `Drop` would swallow.
pub fn close_store(conn: Connection) -> DbResult<()> {
    match conn.close() {
        Ok(()) => {
            info!("event=store_close module=db status=ok");
            Ok(())
        }
        Err((_conn, err)) => {
            error!(
                "event=store_close module=db status=error error_code=db_error error={}",
                err
            );
            Err(err.into())
        }
    }
}

fn finish_open(conn: Connection, mode: &str, started_at: Instant) -> DbResult<Connection> {
    match bootstrap_connection(&conn) {
        Ok(()) => {
            info!(
                "event=store_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode={} duration_ms={} error_code={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                err.error_code(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &Connection) -> DbResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    ensure_schema(conn)
}
