//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define record-local data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Every repository call runs in exactly one transaction.
//! - Storage failures are tagged with the operation that failed.

pub mod user_repo;
