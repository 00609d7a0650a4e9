//! User directory use-case service.
//!
//! # Responsibility
//! - Orchestrate validation, uniqueness checks and repository writes for
//!   create/update/delete/read workflows.
//! - Convert repository outcomes into typed domain errors that carry an
//!   HTTP-style status code.
//!
//! # Invariants
//! - Only this layer applies cross-record policy (email/phone uniqueness).
//! - Update uniqueness checks ignore the record being updated.
//! - An empty collection read is `NotFound`, never an empty success.
//! - Uniqueness check and write are separate repository transactions, so
//!   concurrent creates with the same email/phone can both succeed. Closing
//!   that window needs a store-level unique constraint.

use crate::model::request::{CreateUserRequest, UpdateUserRequest};
use crate::model::user::{now_epoch_ms, NewUser, User, UserId};
use crate::repo::user_repo::{RepoError, UserRepository};
use crate::validation::{validate_create, validate_update, ValidationErrors};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MSG_VALIDATION_FAILED: &str = "Validation failed";
const MSG_EMAIL_TAKEN: &str = "User with this email already exists";
const MSG_PHONE_TAKEN: &str = "User with this phone nubmer already exists";
const MSG_NO_FIELDS: &str = "No fields to update";
const MSG_NO_USERS: &str = "No users found";

/// Unique field a conflicting request collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Email,
    PhoneNumber,
}

impl ConflictField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::PhoneNumber => "phone",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::Email => MSG_EMAIL_TAKEN,
            Self::PhoneNumber => MSG_PHONE_TAKEN,
        }
    }
}

/// Domain error returned by directory use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// One or more field rules failed (400).
    ValidationFailed(ValidationErrors),
    /// Email or phone already belongs to another user (409).
    Conflict(ConflictField),
    /// Missing user or empty collection (404).
    NotFound(String),
    /// Semantically empty request (400).
    BadRequest(&'static str),
    /// Unexpected storage failure (500).
    Internal {
        message: &'static str,
        source: RepoError,
    },
}

impl ServiceError {
    /// HTTP-style status code for boundary rendering.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationFailed(_) | Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal { .. } => 500,
        }
    }

    /// Client-facing message. Never includes storage error text.
    pub fn message(&self) -> &str {
        match self {
            Self::ValidationFailed(_) => MSG_VALIDATION_FAILED,
            Self::Conflict(field) => field.message(),
            Self::NotFound(message) => message.as_str(),
            Self::BadRequest(message) => message,
            Self::Internal { message, .. } => message,
        }
    }

    fn user_not_found(id: UserId) -> Self {
        Self::NotFound(format!("User with id {id} not found"))
    }

    fn internal(message: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| {
            error!(
                "event=service_call module=service status=error error_code=storage_failed op={} error={}",
                source.op().map_or("decode", |op| op.as_str()),
                source
            );
            Self::Internal { message, source }
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationFailed(err) => write!(f, "{err}"),
            Self::Internal { message, source } => write!(f, "{message}: {source}"),
            other => f.write_str(other.message()),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ValidationFailed(err) => Some(err),
            Self::Internal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::ValidationFailed(value)
    }
}

/// Directory service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and persists a new user, returning its assigned id.
    ///
    /// # Errors
    /// - `ValidationFailed` when any field rule fails.
    /// - `Conflict` when the email or phone number is already taken.
    /// - `Internal` on storage failure.
    pub fn create(&self, request: &CreateUserRequest) -> Result<UserId, ServiceError> {
        validate_create(request)?;
        self.ensure_email_free(&request.email, None)?;
        self.ensure_phone_number_free(&request.phone_number, None)?;

        let new_user = NewUser {
            name: request.name.clone(),
            surname: request.surname.clone(),
            email: request.email.clone(),
            phone_number: request.phone_number.clone(),
            created_at: now_epoch_ms(),
        };
        let id = self
            .repo
            .save(&new_user)
            .map_err(ServiceError::internal("Failed to save user"))?;

        info!("event=user_create module=service status=ok user_id={id}");
        Ok(id)
    }

    /// Applies the non-empty fields of `request` to user `id`.
    ///
    /// Returns the merged record as written.
    ///
    /// # Errors
    /// - `ValidationFailed` when a supplied field breaks a rule.
    /// - `NotFound` when `id` does not exist.
    /// - `BadRequest` when no field would change.
    /// - `Conflict` when a supplied email/phone belongs to another user.
    /// - `Internal` on storage failure.
    pub fn update(&self, id: UserId, request: &UpdateUserRequest) -> Result<User, ServiceError> {
        validate_update(request)?;

        let mut user = self.require_user(id)?;
        if request.is_empty() {
            return Err(ServiceError::BadRequest(MSG_NO_FIELDS));
        }

        if let Some(email) = request.email() {
            self.ensure_email_free(email, Some(id))?;
        }
        if let Some(phone_number) = request.phone_number() {
            self.ensure_phone_number_free(phone_number, Some(id))?;
        }

        if let Some(name) = request.name() {
            user.name = name.to_string();
        }
        if let Some(surname) = request.surname() {
            user.surname = surname.to_string();
        }
        if let Some(email) = request.email() {
            user.email = email.to_string();
        }
        if let Some(phone_number) = request.phone_number() {
            user.phone_number = phone_number.to_string();
        }

        self.repo
            .update(id, &user)
            .map_err(ServiceError::internal("Failed to update user"))?;

        info!("event=user_update module=service status=ok user_id={id}");
        Ok(user)
    }

    /// Deletes user `id`.
    ///
    /// # Errors
    /// - `NotFound` when `id` does not exist.
    /// - `Internal` on storage failure.
    pub fn delete(&self, id: UserId) -> Result<(), ServiceError> {
        self.require_user(id)?;
        self.repo
            .delete(id)
            .map_err(ServiceError::internal("Failed to delete user"))?;

        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(())
    }

    /// Gets one user by id.
    pub fn find_by_id(&self, id: UserId) -> Result<User, ServiceError> {
        self.require_user(id)
    }

    /// Lists all users; an empty store is `NotFound`.
    pub fn find_all(&self) -> Result<Vec<User>, ServiceError> {
        let users = self
            .repo
            .find_all()
            .map_err(ServiceError::internal("Failed to retrieve users"))?;
        if users.is_empty() {
            return Err(ServiceError::NotFound(MSG_NO_USERS.to_string()));
        }
        Ok(users)
    }

    fn require_user(&self, id: UserId) -> Result<User, ServiceError> {
        self.repo
            .find_by_id(id)
            .map_err(ServiceError::internal("Failed to look up user"))?
            .ok_or_else(|| ServiceError::user_not_found(id))
    }

    fn ensure_email_free(&self, email: &str, owner: Option<UserId>) -> Result<(), ServiceError> {
        let existing = self
            .repo
            .find_by_email(email)
            .map_err(ServiceError::internal("Failed to look up user"))?;
        reject_if_taken(existing, owner, ConflictField::Email)
    }

    fn ensure_phone_number_free(
        &self,
        phone_number: &str,
        owner: Option<UserId>,
    ) -> Result<(), ServiceError> {
        let existing = self
            .repo
            .find_by_phone_number(phone_number)
            .map_err(ServiceError::internal("Failed to look up user"))?;
        reject_if_taken(existing, owner, ConflictField::PhoneNumber)
    }
}

fn reject_if_taken(
    existing: Option<User>,
    owner: Option<UserId>,
    field: ConflictField,
) -> Result<(), ServiceError> {
    match existing {
        Some(user) if Some(user.id) != owner => {
            warn!(
                "event=user_conflict module=service status=rejected field={}",
                field.as_str()
            );
            Err(ServiceError::Conflict(field))
        }
        _ => Ok(()),
    }
}
