//! Validation failure taxonomy shared by every validator.

use serde::Serialize;
use thiserror::Error;

/// Broad failure category. Callers re-prompt on every kind; none is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Value collides with another live record.
    DuplicateValue,
    /// Value does not match the expected shape.
    InvalidFormat,
    /// Value is outside an accepted bound (age, date, size).
    OutOfRange,
    /// A required input was empty or absent.
    MissingRequiredInput,
}

/// One rejected field value with a stable machine code and a human message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} ({code})")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub code: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn duplicate(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::DuplicateValue, code, message)
    }

    pub fn invalid_format(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::InvalidFormat, code, message)
    }

    pub fn out_of_range(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationErrorKind::OutOfRange, code, message)
    }

    /// Missing input for `field`; code is `required_<field>`.
    pub fn missing(field: &str) -> Self {
        Self::new(
            ValidationErrorKind::MissingRequiredInput,
            format!("required_{field}"),
            format!("The {} field is required.", field.replace('_', " ")),
        )
    }

    pub fn is_duplicate(&self) -> bool {
        self.kind == ValidationErrorKind::DuplicateValue
    }
}

pub type ValidationResult = Result<(), ValidationError>;
