//! Structural validation of inbound user field sets.
//!
//! # Responsibility
//! - Apply per-field rules (required, length bounds, email syntax).
//! - Report every failing field at once instead of stopping at the first.
//!
//! # Invariants
//! - Pure: never touches storage, same input always yields same verdict.
//! - At most one violation is reported per field, checked in the order
//!   required, min, max, email.
//! - Update validation skips absent/empty fields entirely.

use crate::model::request::{CreateUserRequest, UpdateUserRequest};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .expect("valid email regex")
});

const NAME_RULE: FieldRule = FieldRule {
    field: "Name",
    min: 2,
    max: 100,
    email: false,
};
const SURNAME_RULE: FieldRule = FieldRule {
    field: "Surname",
    min: 2,
    max: 100,
    email: false,
};
const EMAIL_RULE: FieldRule = FieldRule {
    field: "Email",
    min: 1,
    max: 254,
    email: true,
};
const PHONE_NUMBER_RULE: FieldRule = FieldRule {
    field: "PhoneNumber",
    min: 10,
    max: 15,
    email: false,
};

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field name as exposed to API clients (`Name`, `PhoneNumber`, ...).
    pub field: String,
    /// Rule identifier: `required`, `min`, `max` or `email`.
    pub tag: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, tag: &str) -> Self {
        Self {
            field: field.to_string(),
            tag: tag.to_string(),
            message: format!("Field '{field}' failed validation on the '{tag}' tag"),
        }
    }
}

/// Non-empty collection of field violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    /// Returns whether a violation with this field and tag was reported.
    pub fn has(&self, field: &str, tag: &str) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.field == field && violation.tag == tag)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let fields = self
            .violations
            .iter()
            .map(|violation| format!("{}:{}", violation.field, violation.tag))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "validation failed: {fields}")
    }
}

impl Error for ValidationErrors {}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    field: &'static str,
    min: usize,
    max: usize,
    email: bool,
}

impl FieldRule {
    fn check(&self, value: &str) -> Option<FieldViolation> {
        if value.is_empty() {
            return Some(FieldViolation::new(self.field, "required"));
        }
        let length = value.chars().count();
        if length < self.min {
            return Some(FieldViolation::new(self.field, "min"));
        }
        if length > self.max {
            return Some(FieldViolation::new(self.field, "max"));
        }
        if self.email && !EMAIL_RE.is_match(value) {
            return Some(FieldViolation::new(self.field, "email"));
        }
        None
    }
}

/// Validates a create request; every field is required.
pub fn validate_create(request: &CreateUserRequest) -> Result<(), ValidationErrors> {
    collect([
        NAME_RULE.check(&request.name),
        SURNAME_RULE.check(&request.surname),
        EMAIL_RULE.check(&request.email),
        PHONE_NUMBER_RULE.check(&request.phone_number),
    ])
}

/// Validates an update request; only supplied non-empty fields are checked.
pub fn validate_update(request: &UpdateUserRequest) -> Result<(), ValidationErrors> {
    collect([
        request.name().and_then(|value| NAME_RULE.check(value)),
        request.surname().and_then(|value| SURNAME_RULE.check(value)),
        request.email().and_then(|value| EMAIL_RULE.check(value)),
        request
            .phone_number()
            .and_then(|value| PHONE_NUMBER_RULE.check(value)),
    ])
}

fn collect(checks: [Option<FieldViolation>; 4]) -> Result<(), ValidationErrors> {
    let violations = checks.into_iter().flatten().collect::<Vec<_>>();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { violations })
    }
}
