//! User record model.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned row identifier (`Users.id`).
pub type UserId = i64;

/// One persisted row of the `Users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Free text; the store does not enforce non-emptiness.
    pub name: String,
    /// No range validation is applied.
    pub age: i64,
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ID: {}  Name: {}  Age: {}", self.id, self.name, self.age)
    }
}
