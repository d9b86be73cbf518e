//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide synchronous, one-shot CRUD over the `Users` table.
//! - Report every failure as a typed [`RepoError`] instead of logging it away.
//!
//! # Invariants
//! - Statements are prepared, bound one parameter at a time, then stepped, so
//!   each failure can be attributed to its stage.
//! - Read paths reject rows that cannot be decoded instead of masking them.
//! - Log events carry metadata only; user-entered names are never logged.

use crate::db::DbError;
use crate::model::user::{User, UserId};
use log::{debug, error, info};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, Row, Statement};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const INSERT_USER_SQL: &str = "INSERT INTO Users (name, age) VALUES (?1, ?2);";
const SELECT_USERS_SQL: &str = "SELECT id, name, age FROM Users ORDER BY id ASC;";
const UPDATE_USER_SQL: &str = "UPDATE Users SET name = ?1, age = ?2 WHERE id = ?3;";
const DELETE_USER_SQL: &str = "DELETE FROM Users WHERE id = ?1;";

pub type RepoResult<T> = Result<T, RepoError>;

/// Record Store operation, used to label errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOp {
    Insert,
    FetchAll,
    Update,
    Delete,
}

impl UserOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "user_insert",
            Self::FetchAll => "user_fetch_all",
            Self::Update => "user_update",
            Self::Delete => "user_delete",
        }
    }
}

impl Display for UserOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an update or delete that ran without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// At least one row matched and was changed.
    Applied { rows_affected: usize },
    /// No row matched the given id; the store is unchanged.
    NoMatch,
}

impl WriteOutcome {
    fn from_rows(rows_affected: usize) -> Self {
        if rows_affected == 0 {
            Self::NoMatch
        } else {
            Self::Applied { rows_affected }
        }
    }

    pub fn rows_affected(self) -> usize {
        match self {
            Self::Applied { rows_affected } => rows_affected,
            Self::NoMatch => 0,
        }
    }

    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Repository error for user persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Store bootstrap failure (unavailable file or schema setup).
    Db(DbError),
    /// Malformed query or store-side error during prepare.
    StatementPrepareFailed {
        op: UserOp,
        source: rusqlite::Error,
    },
    /// Parameter binding was rejected. `index` is 1-based.
    BindFailed {
        op: UserOp,
        index: usize,
        source: rusqlite::Error,
    },
    /// Statement ran but failed (constraint violation, I/O, busy, ...).
    ExecutionFailed {
        op: UserOp,
        source: rusqlite::Error,
    },
    /// A persisted row could not be decoded into a `User`.
    InvalidData(String),
}

impl RepoError {
    /// Stable snake_case code for logs and UI envelopes.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Db(err) => err.error_code(),
            Self::StatementPrepareFailed { .. } => "statement_prepare_failed",
            Self::BindFailed { .. } => "bind_failed",
            Self::ExecutionFailed { .. } => "execution_failed",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::StatementPrepareFailed { op, source } => {
                write!(f, "{op}: failed to prepare statement: {source}")
            }
            Self::BindFailed { op, index, source } => {
                write!(f, "{op}: failed to bind parameter {index}: {source}")
            }
            Self::ExecutionFailed { op, source } => {
                write!(f, "{op}: failed to execute statement: {source}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::StatementPrepareFailed { source, .. } => Some(source),
            Self::BindFailed { source, .. } => Some(source),
            Self::ExecutionFailed { source, .. } => Some(source),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Repository interface for the Record Store.
pub trait UserRepository {
    /// Appends one record and returns its store-assigned id.
    fn insert_user(&self, name: &str, age: i64) -> RepoResult<UserId>;
    /// Returns every record in insertion order as an owned snapshot.
    fn fetch_users(&self) -> RepoResult<Vec<User>>;
    /// Replaces name and age of the record with `id`.
    fn update_user(&self, id: UserId, name: &str, age: i64) -> RepoResult<WriteOutcome>;
    /// Removes the record with `id`.
    fn delete_user(&self, id: UserId) -> RepoResult<WriteOutcome>;
}

/// SQLite-backed user repository.
///
/// Borrows the connection, so a repository can never outlive the store it
/// was built from and one connection serves one request at a time.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn prepare(&self, op: UserOp, sql: &str) -> RepoResult<Statement<'conn>> {
        self.conn
            .prepare(sql)
            .map_err(|source| RepoError::StatementPrepareFailed { op, source })
    }

    fn execute_bound(&self, op: UserOp, sql: &str, params: &[&dyn ToSql]) -> RepoResult<usize> {
        let mut stmt = self.prepare(op, sql)?;
        bind_all(&mut stmt, op, params)?;
        stmt.raw_execute()
            .map_err(|source| RepoError::ExecutionFailed { op, source })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&self, name: &str, age: i64) -> RepoResult<UserId> {
        let started_at = Instant::now();
        let result = self
            .execute_bound(UserOp::Insert, INSERT_USER_SQL, params![name, age])
            .map(|_| self.conn.last_insert_rowid());

        match &result {
            Ok(id) => info!(
                "event={} module=repo status=ok id={} duration_ms={}",
                UserOp::Insert,
                id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure(UserOp::Insert, started_at, err),
        }
        result
    }

    fn fetch_users(&self) -> RepoResult<Vec<User>> {
        let started_at = Instant::now();
        let result = self.query_all_users();

        match &result {
            Ok(users) => debug!(
                "event={} module=repo status=ok rows={} duration_ms={}",
                UserOp::FetchAll,
                users.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure(UserOp::FetchAll, started_at, err),
        }
        result
    }

    fn update_user(&self, id: UserId, name: &str, age: i64) -> RepoResult<WriteOutcome> {
        let started_at = Instant::now();
        let result = self
            .execute_bound(UserOp::Update, UPDATE_USER_SQL, params![name, age, id])
            .map(WriteOutcome::from_rows);
        log_write(UserOp::Update, id, started_at, &result);
        result
    }

    fn delete_user(&self, id: UserId) -> RepoResult<WriteOutcome> {
        let started_at = Instant::now();
        let result = self
            .execute_bound(UserOp::Delete, DELETE_USER_SQL, params![id])
            .map(WriteOutcome::from_rows);
        log_write(UserOp::Delete, id, started_at, &result);
        result
    }
}

impl SqliteUserRepository<'_> {
    fn query_all_users(&self) -> RepoResult<Vec<User>> {
        let op = UserOp::FetchAll;
        let mut stmt = self.prepare(op, SELECT_USERS_SQL)?;
        let mut rows = stmt.raw_query();
        let mut users = Vec::new();

        while let Some(row) = rows
            .next()
            .map_err(|source| RepoError::ExecutionFailed { op, source })?
        {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }
}

fn bind_all(stmt: &mut Statement<'_>, op: UserOp, params: &[&dyn ToSql]) -> RepoResult<()> {
    let expected = stmt.parameter_count();
    if expected != params.len() {
        return Err(RepoError::BindFailed {
            op,
            index: params.len().min(expected) + 1,
            source: rusqlite::Error::InvalidParameterCount(params.len(), expected),
        });
    }

    for (offset, value) in params.iter().enumerate() {
        let index = offset + 1;
        stmt.raw_bind_parameter(index, *value)
            .map_err(|source| RepoError::BindFailed { op, index, source })?;
    }
    Ok(())
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id: UserId = row.get(0).map_err(|err| invalid_column("id", &err))?;
    // Nullable columns read the same way the native column readers do:
    // NULL text is empty, NULL integer is zero.
    let name: Option<String> = row.get(1).map_err(|err| invalid_column("name", &err))?;
    let age: Option<i64> = row.get(2).map_err(|err| invalid_column("age", &err))?;

    Ok(User {
        id,
        name: name.unwrap_or_default(),
        age: age.unwrap_or(0),
    })
}

fn invalid_column(column: &str, err: &rusqlite::Error) -> RepoError {
    let detail = match err {
        rusqlite::Error::InvalidColumnType(_, _, kind) => format!("unexpected {kind} value"),
        rusqlite::Error::FromSqlConversionFailure(_, _, cause) => cause.to_string(),
        other => other.to_string(),
    };
    RepoError::InvalidData(format!("Users.{column}: {detail}"))
}

fn log_write(op: UserOp, id: UserId, started_at: Instant, result: &RepoResult<WriteOutcome>) {
    match result {
        Ok(WriteOutcome::Applied { rows_affected }) => info!(
            "event={} module=repo status=ok id={} rows={} duration_ms={}",
            op,
            id,
            rows_affected,
            started_at.elapsed().as_millis()
        ),
        Ok(WriteOutcome::NoMatch) => info!(
            "event={} module=repo status=noop id={} rows=0 duration_ms={}",
            op,
            id,
            started_at.elapsed().as_millis()
        ),
        Err(err) => log_failure(op, started_at, err),
    }
}

fn log_failure(op: UserOp, started_at: Instant, err: &RepoError) {
    error!(
        "event={} module=repo status=error duration_ms={} error_code={} error={}",
        op,
        started_at.elapsed().as_millis(),
        err.error_code(),
        err
    );
}
