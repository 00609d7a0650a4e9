//! Wire envelopes.

use crate::model::user::{User, UserId};
use crate::service::user_service::ServiceError;
use crate::validation::FieldViolation;
use serde::{Deserialize, Serialize};

/// Outbound user projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone_number: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
            surname: value.surname,
            email: value.email,
            phone_number: value.phone_number,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> SuccessResponse<T> {
    pub fn new(code: u16, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    /// Present only for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
}

impl ErrorResponse {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            errors: None,
        }
    }
}

impl From<ServiceError> for ErrorResponse {
    fn from(value: ServiceError) -> Self {
        let code = value.status_code();
        let message = value.message().to_string();
        let errors = match value {
            ServiceError::ValidationFailed(errors) => Some(errors.into_violations()),
            _ => None,
        };
        Self {
            code,
            message,
            errors,
        }
    }
}
