//! Domain model for persisted users and the input form that produces them.
//!
//! # Responsibility
//! - Define the single persisted entity (`User`).
//! - Turn raw text-field input into typed, validated requests.
//!
//! # Invariants
//! - `User::id` is assigned by the store and never reused.
//! - A `User` value is a detached snapshot; mutating it does not write back.

pub mod form;
pub mod user;
