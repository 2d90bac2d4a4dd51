//! Normalization and validation of user-supplied fields.
//!
//! Every check appends to a [`ValidationErrors`] collector so callers can
//! report all violations of a payload at once.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const NAME_MAX_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", format_violations(.0))]
pub struct ValidationErrors(Vec<FieldViolation>);

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Lowercased, trimmed form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn email(raw: &str, errors: &mut ValidationErrors) -> String {
    let email = normalize_email(raw);
    if email.is_empty() {
        errors.push("email", "email is required");
    } else if !is_valid_email(&email) {
        errors.push("email", "email must be a valid email address");
    }
    email
}

pub fn password(field: &'static str, raw: &str, errors: &mut ValidationErrors) {
    if raw.chars().count() < PASSWORD_MIN_LEN {
        errors.push(
            field,
            format!("password must be at least {PASSWORD_MIN_LEN} characters"),
        );
    }
}

/// Trims the display name. A supplied name must not be blank after trimming.
pub fn name(raw: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        errors.push("name", "name must not be empty");
    } else if trimmed.chars().count() > NAME_MAX_LEN {
        errors.push(
            "name",
            format!("name must be at most {NAME_MAX_LEN} characters"),
        );
    }
    Some(trimmed.to_string())
}
