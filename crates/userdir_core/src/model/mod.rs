//! Domain model for the user directory.
//!
//! # Responsibility
//! - Define the persisted `User` record and its insert shape.
//! - Define the inbound create/update request field sets.
//!
//! # Invariants
//! - Every persisted user is identified by a stable `UserId`.
//! - `id` and `created_at` are never taken from inbound requests.

pub mod request;
pub mod user;
