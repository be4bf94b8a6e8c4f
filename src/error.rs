use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::domain::types::FixtureId;

/// A single violated field with a human-readable reason.
///
/// Validation never fails fast: every violation in a fixture or event is
/// collected so callers see the complete picture in one error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// SSE Replay error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {}", join_errors(errors))]
    Validation { errors: Vec<FieldError> },

    #[error("Fixture already registered: {id}")]
    DuplicateId { id: FixtureId },

    #[error("Fixture not found: {id}")]
    NotFound { id: FixtureId },

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    #[error("Cursor position {position} out of bounds (length {length})")]
    OutOfBounds { position: usize, length: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation { errors }
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition(message.into())
    }

    /// All field errors carried by a `Validation` error, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { errors } => errors,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_joins_all_field_reasons() {
        let error = Error::validation(vec![
            FieldError::new("metadata.eventCount", "expected 5 events, found 2"),
            FieldError::new("events[1].timestamp", "must be a positive number"),
        ]);

        let message = error.to_string();
        assert!(message.contains("metadata.eventCount: expected 5 events, found 2"));
        assert!(message.contains("events[1].timestamp: must be a positive number"));
    }

    #[test]
    fn field_errors_accessor_is_empty_for_other_variants() {
        let error = Error::invalid_transition("cannot pause while idle");
        assert!(error.field_errors().is_empty());
    }
}
