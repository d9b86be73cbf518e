//! Core domain logic for userdb.
//! This crate is the single source of truth for User Record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{close_store, open_store, open_store_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::form::{NewUser, UserForm, UserFormError, UserUpdate};
pub use model::user::{User, UserId};
pub use repo::user_repo::{
    RepoError, RepoResult, SqliteUserRepository, UserOp, UserRepository, WriteOutcome,
};
pub use service::user_service::{
    ActionOutcome, FormAction, ServiceError, ServiceResult, Submission, UserService,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
