//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the user form actions (add, fetch, update, delete) to Dart via FRB.
//! - Turn typed core results into flat envelopes the UI can render inline.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each call opens its own store connection and drops it before returning.
//! - Mutating calls return the list re-fetched after the mutation.

use log::error;
use std::path::PathBuf;
use std::sync::OnceLock;
use userdb_core::db::DEFAULT_DB_FILE_NAME;
use userdb_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_store,
    ping as ping_inner, ActionOutcome, FormAction, ServiceError, SqliteUserRepository,
    Submission, User, UserForm, UserService, WriteOutcome,
};

const DB_PATH_ENV: &str = "USERDB_DB_PATH";
const EMPTY_LIST_MESSAGE: &str = "No users found";
static USER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Absolute path of the store file used by every user call.
#[flutter_rust_bridge::frb(sync)]
pub fn user_store_path() -> String {
    resolve_user_db_path().display().to_string()
}

/// One row of the rendered user list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserItem {
    pub id: i64,
    pub name: String,
    pub age: i64,
}

/// Response envelope for the fetch-all call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListResponse {
    pub ok: bool,
    /// Stable error code on failure (`store_unavailable`, `execution_failed`, ...).
    pub error_code: Option<String>,
    /// Human-readable message for inline display.
    pub message: String,
    pub items: Vec<UserItem>,
}

/// Response envelope for add/update/delete form actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserActionResponse {
    /// Whether the store change was committed. A no-match update/delete is ok
    /// with `rows_affected == 0`.
    pub ok: bool,
    /// Set on failure, or with `ok == true` when only the list re-fetch failed.
    pub error_code: Option<String>,
    pub message: String,
    /// Store-assigned id for a successful add.
    pub user_id: Option<i64>,
    pub rows_affected: u32,
    /// List re-fetched after the action; empty when the action or the
    /// re-fetch failed.
    pub items: Vec<UserItem>,
}

impl UserActionResponse {
    fn from_submission(action: FormAction, submission: Submission) -> Self {
        let user_id = match submission.outcome {
            ActionOutcome::Inserted(id) => Some(id),
            ActionOutcome::Written(_) => None,
        };
        let mut message = action_message(action, submission.outcome);
        let error_code = submission.refresh_error.as_ref().map(|err| {
            message.push_str(&format!(" Refreshing the list failed: {err}"));
            err.error_code().to_string()
        });
        Self {
            ok: true,
            error_code,
            message,
            user_id,
            rows_affected: u32::try_from(submission.outcome.rows_affected()).unwrap_or(u32::MAX),
            items: submission.users.into_iter().map(to_user_item).collect(),
        }
    }

    fn failure(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_code: Some(error_code.to_string()),
            message: message.into(),
            user_id: None,
            rows_affected: 0,
            items: Vec::new(),
        }
    }
}

/// Adds a user from raw form text.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Rejects empty `name` and non-integer `age` without touching the store.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn user_add(name: String, age: String) -> UserActionResponse {
    submit_form(FormAction::Add, UserForm::new(name, age, ""))
}

/// Replaces name and age of the user with `id`, all given as raw form text.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Unknown `id` is `ok` with `rows_affected == 0`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn user_update(id: String, name: String, age: String) -> UserActionResponse {
    submit_form(FormAction::Update, UserForm::new(name, age, id))
}

/// Deletes the user with `id` given as raw form text.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Unknown `id` is `ok` with `rows_affected == 0`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn user_delete(id: String) -> UserActionResponse {
    submit_form(FormAction::Delete, UserForm::new("", "", id))
}

/// Fetches all users in insertion order.
///
/// # FFI contract
/// - Sync call, DB-backed execution, no side effects.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn user_fetch_all() -> UserListResponse {
    let result = with_user_service(|service| service.list_users().map_err(ServiceError::from));
    match result {
        Ok(users) => {
            let message = if users.is_empty() {
                EMPTY_LIST_MESSAGE.to_string()
            } else {
                format!("Found {} user(s).", users.len())
            };
            UserListResponse {
                ok: true,
                error_code: None,
                message,
                items: users.into_iter().map(to_user_item).collect(),
            }
        }
        Err(err) => UserListResponse {
            ok: false,
            error_code: Some(err.error_code().to_string()),
            message: format!("user_fetch_all failed: {err}"),
            items: Vec::new(),
        },
    }
}

fn submit_form(action: FormAction, form: UserForm) -> UserActionResponse {
    match with_user_service(|service| service.submit(action, &form)) {
        Ok(submission) => UserActionResponse::from_submission(action, submission),
        Err(err) => UserActionResponse::failure(
            err.error_code(),
            format!("{} failed: {err}", action_label(action)),
        ),
    }
}

fn with_user_service<T>(
    f: impl FnOnce(&UserService<SqliteUserRepository<'_>>) -> Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    let db_path = resolve_user_db_path();
    let conn = open_store(&db_path).map_err(|err| {
        error!(
            "event=ffi_store_open module=ffi status=error error_code={}",
            err.error_code()
        );
        ServiceError::Repo(err.into())
    })?;
    let service = UserService::new(SqliteUserRepository::new(&conn));
    f(&service)
}

fn resolve_user_db_path() -> PathBuf {
    USER_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
        })
        .clone()
}

fn action_label(action: FormAction) -> &'static str {
    match action {
        FormAction::Add => "user_add",
        FormAction::Update => "user_update",
        FormAction::Delete => "user_delete",
    }
}

fn action_message(action: FormAction, outcome: ActionOutcome) -> String {
    match (action, outcome) {
        (_, ActionOutcome::Inserted(id)) => format!("User {id} added."),
        (_, ActionOutcome::Written(WriteOutcome::NoMatch)) => "No matching user.".to_string(),
        (FormAction::Delete, ActionOutcome::Written(_)) => "User deleted.".to_string(),
        (_, ActionOutcome::Written(_)) => "User updated.".to_string(),
    }
}

fn to_user_item(user: User) -> UserItem {
    UserItem {
        id: user.id,
        name: user.name,
        age: user.age,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, user_add, user_delete, user_fetch_all, user_store_path,
        user_update, UserActionResponse,
    };
    use std::time::{SystemTime, UNIX_EPOCH};
    use userdb_core::{ActionOutcome, FormAction, RepoError, Submission};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn store_path_points_at_users_db_file() {
        assert!(user_store_path().ends_with("UsersDB.sqlite"));
    }

    #[test]
    fn user_add_returns_id_and_refreshed_list() {
        let name = unique_token("add");
        let response = user_add(name.clone(), "30".to_string());
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.rows_affected, 1);
        let id = response.user_id.expect("add should return user_id");

        let row = response
            .items
            .iter()
            .find(|item| item.id == id)
            .expect("refreshed list should contain new user");
        assert_eq!(row.name, name);
        assert_eq!(row.age, 30);

        let listed = user_fetch_all();
        assert!(listed.ok, "{}", listed.message);
        assert!(listed.items.iter().any(|item| item.id == id));
    }

    #[test]
    fn user_add_rejects_invalid_form_input() {
        let empty_name = user_add("  ".to_string(), "30".to_string());
        assert!(!empty_name.ok);
        assert_eq!(empty_name.error_code.as_deref(), Some("empty_name"));

        let bad_age = user_add("Alice".to_string(), "abc".to_string());
        assert!(!bad_age.ok);
        assert_eq!(bad_age.error_code.as_deref(), Some("invalid_age"));
        assert!(bad_age.message.starts_with("user_add failed"));
    }

    #[test]
    fn user_update_then_delete_round_trip() {
        let created = user_add(unique_token("update"), "40".to_string());
        assert!(created.ok, "{}", created.message);
        let id = created.user_id.expect("add should return user_id");

        let renamed = unique_token("renamed");
        let updated = user_update(id.to_string(), renamed.clone(), "41".to_string());
        assert!(updated.ok, "{}", updated.message);
        assert_eq!(updated.rows_affected, 1);
        assert_eq!(updated.message, "User updated.");
        let row = updated
            .items
            .iter()
            .find(|item| item.id == id)
            .expect("updated user should be listed");
        assert_eq!((row.name.as_str(), row.age), (renamed.as_str(), 41));

        let deleted = user_delete(id.to_string());
        assert!(deleted.ok, "{}", deleted.message);
        assert_eq!(deleted.rows_affected, 1);
        assert!(deleted.items.iter().all(|item| item.id != id));

        let again = user_delete(id.to_string());
        assert!(again.ok, "{}", again.message);
        assert_eq!(again.rows_affected, 0);
        assert_eq!(again.message, "No matching user.");
    }

    #[test]
    fn user_update_rejects_non_numeric_id() {
        let response = user_update("one".to_string(), "Alice".to_string(), "30".to_string());
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some("invalid_id"));
    }

    #[test]
    fn committed_add_with_failed_refresh_is_ok_with_error_code() {
        let submission = Submission {
            outcome: ActionOutcome::Inserted(7),
            users: Vec::new(),
            refresh_error: Some(RepoError::InvalidData("Users.age: bad".to_string())),
        };

        let response = UserActionResponse::from_submission(FormAction::Add, submission);
        assert!(response.ok);
        assert_eq!(response.user_id, Some(7));
        assert_eq!(response.rows_affected, 1);
        assert_eq!(response.error_code.as_deref(), Some("invalid_data"));
        assert!(response.message.starts_with("User 7 added."));
        assert!(response.message.contains("Refreshing the list failed"));
        assert!(response.items.is_empty());
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
