//! `Users` table definition and idempotent ensure.

use super::{DbError, DbResult};
use rusqlite::Connection;

/// Canonical table name.
pub const USERS_TABLE: &str = "Users";

const CREATE_USERS_SQL: &str = "CREATE TABLE IF NOT EXISTS Users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    age INTEGER
);";

/// Creates the `Users` table when absent; no-op when it already exists.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_USERS_SQL)
        .map_err(DbError::SchemaSetupFailed)
}
