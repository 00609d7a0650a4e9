//! Inbound request field sets.
//!
//! Field names follow the external JSON wire format (`phone_number`).

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// Field set for creating a user. Every field is required.
///
/// Bodies may carry a client `created_at`; it is accepted and discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CreateUserBody")]
pub struct CreateUserRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateUserBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    surname: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone_number: String,
    #[serde(default, rename = "created_at")]
    _created_at: IgnoredAny,
}

impl From<CreateUserBody> for CreateUserRequest {
    fn from(body: CreateUserBody) -> Self {
        Self {
            name: body.name,
            surname: body.surname,
            email: body.email,
            phone_number: body.phone_number,
        }
    }
}

/// Field set for a selective update.
///
/// `None` and `Some("")` both mean "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl UpdateUserRequest {
    /// Name to apply, or `None` when the field is a no-op.
    pub fn name(&self) -> Option<&str> {
        supplied(self.name.as_deref())
    }

    pub fn surname(&self) -> Option<&str> {
        supplied(self.surname.as_deref())
    }

    pub fn email(&self) -> Option<&str> {
        supplied(self.email.as_deref())
    }

    pub fn phone_number(&self) -> Option<&str> {
        supplied(self.phone_number.as_deref())
    }

    /// Returns whether every mutable field is a no-op.
    pub fn is_empty(&self) -> bool {
        self.name().is_none()
            && self.surname().is_none()
            && self.email().is_none()
            && self.phone_number().is_none()
    }
}

fn supplied(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
