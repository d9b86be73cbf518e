//! SQLite storage bootstrap for the Record Store.
//!
//! # Responsibility
//! - Open and configure SQLite connections for userdb core.
//! - Ensure the `Users` table exists before any record operation runs.
//!
//! # Invariants
//! - Schema setup is an idempotent ensure, not a versioned migration.
//! - Core code must not read/write records before the schema ensure succeeds.
//! - Connection lifetime is owned by the caller; nothing here is global.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;

pub use open::{close_store, open_store, open_store_in_memory};

/// File name used for the on-disk store inside an application-private dir.
pub const DEFAULT_DB_FILE_NAME: &str = "UsersDB.sqlite";

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// Store file could not be opened or created.
    StoreUnavailable {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// `Users` table could not be ensured.
    SchemaSetupFailed(rusqlite::Error),
    /// Connection configuration or teardown failed.
    Sqlite(rusqlite::Error),
}

impl DbError {
    /// Stable snake_case code for logs and UI envelopes.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::SchemaSetupFailed(_) => "schema_setup_failed",
            Self::Sqlite(_) => "db_error",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreUnavailable { path, source } => {
                write!(f, "cannot open store `{}`: {source}", path.display())
            }
            Self::SchemaSetupFailed(err) => write!(f, "failed to ensure Users table: {err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable { source, .. } => Some(source),
            Self::SchemaSetupFailed(err) => Some(err),
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
