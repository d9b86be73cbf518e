//! User use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for presentation callers.
//! - Validate raw form input before it reaches the repository.
//! - Return a fresh snapshot after every form-driven mutation.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::form::{UserForm, UserFormError};
use crate::model::user::{User, UserId};
use crate::repo::user_repo::{RepoError, RepoResult, UserRepository, WriteOutcome};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// Form input was rejected before any store access.
    Form(UserFormError),
    /// The store reported a failure.
    Repo(RepoError),
}

impl ServiceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Form(err) => err.error_code(),
            Self::Repo(err) => err.error_code(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Form(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<UserFormError> for ServiceError {
    fn from(value: UserFormError) -> Self {
        Self::Form(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Form button a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Add,
    Update,
    Delete,
}

impl FormAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// What a successful form submission did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Inserted(UserId),
    Written(WriteOutcome),
}

impl ActionOutcome {
    pub fn rows_affected(self) -> usize {
        match self {
            Self::Inserted(_) => 1,
            Self::Written(outcome) => outcome.rows_affected(),
        }
    }
}

/// Mutation result plus the list re-fetched right after it.
///
/// `outcome` is always the committed store change. A failed re-fetch does
/// not undo it; it leaves `users` empty and sets `refresh_error`.
#[derive(Debug)]
pub struct Submission {
    pub outcome: ActionOutcome,
    pub users: Vec<User>,
    pub refresh_error: Option<RepoError>,
}

impl Submission {
    /// Whether `users` reflects the store after the mutation.
    pub fn is_refreshed(&self) -> bool {
        self.refresh_error.is_none()
    }
}

/// Use-case service wrapper for user CRUD operations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Inserts a user and returns the store-assigned id.
    pub fn add_user(&self, name: &str, age: i64) -> RepoResult<UserId> {
        self.repo.insert_user(name, age)
    }

    /// Lists all users in insertion order.
    pub fn list_users(&self) -> RepoResult<Vec<User>> {
        self.repo.fetch_users()
    }

    /// Replaces name and age of an existing user.
    ///
    /// Returns `WriteOutcome::NoMatch` when `id` does not exist.
    pub fn update_user(&self, id: UserId, name: &str, age: i64) -> RepoResult<WriteOutcome> {
        self.repo.update_user(id, name, age)
    }

    /// Deletes a user by id.
    pub fn delete_user(&self, id: UserId) -> RepoResult<WriteOutcome> {
        self.repo.delete_user(id)
    }

    /// Validates form input, applies the action, then re-fetches the list.
    ///
    /// # Contract
    /// - `Add` needs `name` + `age`; `Update` needs all three fields;
    ///   `Delete` needs `id` only.
    /// - Rejected input returns `ServiceError::Form` with the store untouched.
    /// - A failed mutation returns `ServiceError::Repo`.
    /// - Once the mutation succeeds the result is `Ok`, even when the
    ///   re-fetch fails; see [`Submission::refresh_error`].
    pub fn submit(&self, action: FormAction, form: &UserForm) -> ServiceResult<Submission> {
        let outcome = match action {
            FormAction::Add => {
                let request = form.to_new_user().inspect_err(|err| log_rejected(action, err))?;
                ActionOutcome::Inserted(self.add_user(&request.name, request.age)?)
            }
            FormAction::Update => {
                let request = form.to_update().inspect_err(|err| log_rejected(action, err))?;
                ActionOutcome::Written(self.update_user(
                    request.id,
                    &request.name,
                    request.age,
                )?)
            }
            FormAction::Delete => {
                let id = form
                    .to_delete_id()
                    .inspect_err(|err| log_rejected(action, err))?;
                ActionOutcome::Written(self.delete_user(id)?)
            }
        };

        let (users, refresh_error) = match self.list_users() {
            Ok(users) => (users, None),
            Err(err) => {
                warn!(
                    "event=form_submit module=service status=refresh_failed action={} error_code={}",
                    action.as_str(),
                    err.error_code()
                );
                (Vec::new(), Some(err))
            }
        };
        Ok(Submission {
            outcome,
            users,
            refresh_error,
        })
    }
}

fn log_rejected(action: FormAction, err: &UserFormError) {
    warn!(
        "event=form_submit module=service status=rejected action={} error_code={}",
        action.as_str(),
        err.error_code()
    );
}
