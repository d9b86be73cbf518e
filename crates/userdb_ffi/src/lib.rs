//! Flutter-facing bridge for userdb core.

pub mod api;
