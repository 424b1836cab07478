//! Input validation for product payloads.
//!
//! Payloads are checked before they reach the store. Every failed rule is collected
//! into a [`ValidationErrors`] list so callers can report all problems at once.

use serde::Serialize;
use std::fmt;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the offending field
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

/// Structured list of validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Records a failure for `field`.
    pub fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// True when no rule failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// All recorded failures, in the order they were found.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// True if any failure concerns `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

pub(crate) fn check_name(errors: &mut ValidationErrors, name: &str) {
    if name.trim().is_empty() {
        errors.push("name", "must not be empty");
    }
}

pub(crate) fn check_price(errors: &mut ValidationErrors, price: f64) {
    if !price.is_finite() {
        errors.push("price", "must be a finite number");
    } else if price < 0.0 {
        errors.push("price", "must not be negative");
    }
}

pub(crate) fn check_id(errors: &mut ValidationErrors, field: &str, id: i64) {
    if id <= 0 {
        errors.push(field, "must be a positive identifier");
    }
}
