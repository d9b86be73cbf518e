//! Text-field input validation for the user form.
//!
//! # Responsibility
//! - Hold the three raw text fields a form collects (name, age, id).
//! - Produce typed requests for add/update/delete, or a validation error.
//!
//! # Invariants
//! - Invalid input never reaches the store.
//! - `name` is stored exactly as typed; it is rejected only when it is empty
//!   or whitespace-only.
//! - `age` and `id` must be base-10 integers with no surrounding whitespace.

use super::user::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw text input as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub age: String,
    pub id: String,
}

/// Validated payload for inserting a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub age: i64,
}

/// Validated payload for replacing a user's name and age.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub id: UserId,
    pub name: String,
    pub age: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFormError {
    EmptyName,
    InvalidAge(String),
    InvalidId(String),
}

impl UserFormError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
            Self::InvalidAge(_) => "invalid_age",
            Self::InvalidId(_) => "invalid_id",
        }
    }
}

impl Display for UserFormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::InvalidAge(raw) => write!(f, "age must be an integer, got `{raw}`"),
            Self::InvalidId(raw) => write!(f, "user id must be an integer, got `{raw}`"),
        }
    }
}

impl Error for UserFormError {}

impl UserForm {
    pub fn new(name: impl Into<String>, age: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            id: id.into(),
        }
    }

    /// Validates `name` and `age` for an insert. `id` is ignored.
    pub fn to_new_user(&self) -> Result<NewUser, UserFormError> {
        let age = parse_age(&self.age)?;
        let name = parse_name(&self.name)?;
        Ok(NewUser { name, age })
    }

    /// Validates all three fields for an update.
    pub fn to_update(&self) -> Result<UserUpdate, UserFormError> {
        let id = parse_id(&self.id)?;
        let age = parse_age(&self.age)?;
        let name = parse_name(&self.name)?;
        Ok(UserUpdate { id, name, age })
    }

    /// Validates `id` for a delete. `name` and `age` are ignored.
    pub fn to_delete_id(&self) -> Result<UserId, UserFormError> {
        parse_id(&self.id)
    }
}

fn parse_name(raw: &str) -> Result<String, UserFormError> {
    if raw.trim().is_empty() {
        return Err(UserFormError::EmptyName);
    }
    Ok(raw.to_string())
}

fn parse_age(raw: &str) -> Result<i64, UserFormError> {
    raw.parse::<i64>()
        .map_err(|_| UserFormError::InvalidAge(raw.to_string()))
}

fn parse_id(raw: &str) -> Result<UserId, UserFormError> {
    raw.parse::<UserId>()
        .map_err(|_| UserFormError::InvalidId(raw.to_string()))
}
