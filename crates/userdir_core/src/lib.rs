//! Core domain logic for the user directory.
//! This crate is the single source of truth for business invariants:
//! field validation, email/phone uniqueness and transactional persistence.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use config::DirectoryConfig;
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::request::{CreateUserRequest, UpdateUserRequest};
pub use model::user::{NewUser, User, UserId};
pub use repo::user_repo::{RepoError, RepoOp, RepoResult, SqliteUserRepository, UserRepository};
pub use service::user_service::{ConflictField, ServiceError, UserService};
pub use validation::{FieldViolation, ValidationErrors};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
