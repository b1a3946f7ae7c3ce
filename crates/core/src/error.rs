//! Error types shared across the workspace

use thiserror::Error;

use crate::field::ApplicationField;

/// Errors raised while normalizing or validating a single field value
///
/// During extraction these are swallowed per-field: one field failing to
/// parse never blocks the others.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("{field:?}: could not parse '{raw}'")]
    Parse {
        field: ApplicationField,
        raw: String,
    },

    #[error("{field:?}: value out of range: {message}")]
    OutOfRange {
        field: ApplicationField,
        message: String,
    },

    #[error("{field:?}: '{raw}' is not a recognized value")]
    UnknownValue {
        field: ApplicationField,
        raw: String,
    },
}

impl FieldError {
    /// The field this error relates to
    pub fn field(&self) -> ApplicationField {
        match self {
            FieldError::Parse { field, .. }
            | FieldError::OutOfRange { field, .. }
            | FieldError::UnknownValue { field, .. } => *field,
        }
    }
}

/// Errors returned by external service adapters
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("service returned an unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("service timed out after {0} seconds")]
    Timeout(u64),
}
