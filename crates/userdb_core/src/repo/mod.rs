//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the Record Store contract (insert, fetch-all, update, delete).
//! - Isolate SQLite statement details from service/presentation callers.
//!
//! # Invariants
//! - Every substituted value is bound as a statement parameter.
//! - Failures carry the stage they happened in (prepare, bind, execute).
//! - Zero-row updates/deletes are reported, never conflated with success.

pub mod user_repo;
