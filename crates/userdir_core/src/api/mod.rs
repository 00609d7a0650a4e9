//! Boundary envelopes and use-case handlers for transport adapters.
//!
//! # Responsibility
//! - Render service results as `{code, message, data?}` success envelopes
//!   and `{code, message, errors?}` failure envelopes.
//! - Map each directory use-case to a status code + JSON body, so any
//!   transport (CLI, HTTP) can reply without inspecting error text.
//!
//! # Invariants
//! - `errors` is present only for validation failures.
//! - Internal failures never leak storage error text to the client.

mod response;

pub use response::{ErrorResponse, SuccessResponse, UserResponse};

use crate::model::request::{CreateUserRequest, UpdateUserRequest};
use crate::model::user::UserId;
use crate::repo::user_repo::UserRepository;
use crate::service::user_service::{ServiceError, UserService};
use log::error;
use serde::Serialize;
use serde_json::{json, Value};

/// Status code and JSON body produced by one handler call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

impl ApiReply {
    fn ok<T: Serialize>(status: u16, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self { status, body },
            Err(err) => {
                error!(
                    "event=api_reply module=api status=error error_code=serialize_failed error={}",
                    err
                );
                Self::from(ErrorResponse::new(500, "Internal server error"))
            }
        }
    }

    /// Returns whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<ErrorResponse> for ApiReply {
    fn from(value: ErrorResponse) -> Self {
        let status = value.code;
        // ErrorResponse only holds strings and integers.
        let body = serde_json::to_value(&value).unwrap_or(Value::Null);
        Self { status, body }
    }
}

impl From<ServiceError> for ApiReply {
    fn from(value: ServiceError) -> Self {
        Self::from(ErrorResponse::from(value))
    }
}

/// Parses a path-style user id, rejecting malformed values with 400.
pub fn parse_user_id(raw: &str) -> Result<UserId, ErrorResponse> {
    UserId::parse_str(raw.trim()).map_err(|_| ErrorResponse::new(400, "Invalid user ID"))
}

/// Parses a JSON request body, rejecting malformed or unknown fields with 400.
pub fn parse_body<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, ErrorResponse> {
    serde_json::from_str(raw).map_err(|_| ErrorResponse::new(400, "Invalid Request Body"))
}

/// `POST /user`
pub fn create_user<R: UserRepository>(
    service: &UserService<R>,
    request: &CreateUserRequest,
) -> ApiReply {
    match service.create(request) {
        Ok(id) => ApiReply::ok(
            201,
            &SuccessResponse::new(201, "User created successfully", Some(json!({ "id": id }))),
        ),
        Err(err) => err.into(),
    }
}

/// `GET /user/{id}`
pub fn find_user<R: UserRepository>(service: &UserService<R>, id: UserId) -> ApiReply {
    match service.find_by_id(id) {
        Ok(user) => ApiReply::ok(200, &UserResponse::from(user)),
        Err(err) => err.into(),
    }
}

/// `GET /user`
pub fn list_users<R: UserRepository>(service: &UserService<R>) -> ApiReply {
    match service.find_all() {
        Ok(users) => {
            let items = users.into_iter().map(UserResponse::from).collect::<Vec<_>>();
            ApiReply::ok(200, &items)
        }
        Err(err) => err.into(),
    }
}

/// `PATCH /user/{id}`
pub fn update_user<R: UserRepository>(
    service: &UserService<R>,
    id: UserId,
    request: &UpdateUserRequest,
) -> ApiReply {
    match service.update(id, request) {
        Ok(user) => ApiReply::ok(
            200,
            &SuccessResponse::new(
                200,
                "User updated successfully",
                Some(UserResponse::from(user)),
            ),
        ),
        Err(err) => err.into(),
    }
}

/// `DELETE /user/{id}`
pub fn delete_user<R: UserRepository>(service: &UserService<R>, id: UserId) -> ApiReply {
    match service.delete(id) {
        Ok(()) => ApiReply::ok(
            200,
            &SuccessResponse::<()>::new(200, "User deleted successfully", None),
        ),
        Err(err) => err.into(),
    }
}
