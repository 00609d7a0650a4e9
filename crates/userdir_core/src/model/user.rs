//! User domain model.
//!
//! # Responsibility
//! - Define the canonical user record read from and written to storage.
//! - Separate the insert shape (`NewUser`) from the persisted shape (`User`)
//!   so callers cannot choose an id.
//!
//! # Invariants
//! - `id` is assigned by the repository on insert and never reused.
//! - `created_at` is set once at creation and never rewritten.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a user record.
pub type UserId = Uuid;

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone_number: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Insert shape for a user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone_number: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl NewUser {
    /// Binds the insert shape to its repository-assigned id.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            surname: self.surname,
            email: self.email,
            phone_number: self.phone_number,
            created_at: self.created_at,
        }
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clamps to `0` when the system clock is before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
