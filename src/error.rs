//! Error types for horarium.
//!
//! Setup-time problems (duplicate names, invalid lengths, broken references)
//! are reported as errors. Solve-time non-success — infeasibility or an
//! exhausted time budget — is reported as `Ok(false)` by the backends so
//! that callers can retry with another backend cheaply.

use thiserror::Error;

use crate::solvers::Capability;
use crate::validation::ValidationError;

/// Main error type for horarium operations.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A task with the same name already exists in the scenario.
    #[error("duplicate task name: {name}")]
    DuplicateTask { name: String },

    /// A resource with the same name already exists in the scenario.
    #[error("duplicate resource name: {name}")]
    DuplicateResource { name: String },

    /// A task was created with a negative length.
    #[error("task '{task}' has invalid length {length}")]
    InvalidLength { task: String, length: i64 },

    /// A resource was created with a non-positive size.
    #[error("resource '{resource}' has invalid size {size}")]
    InvalidSize { resource: String, size: i64 },

    /// The scenario failed structural validation.
    #[error("invalid scenario: {}", format_validation(.errors))]
    Invalid { errors: Vec<ValidationError> },

    /// The scenario requires a capability the chosen backend does not have.
    #[error("backend '{backend}' does not support {capability}")]
    Unsupported {
        backend: &'static str,
        capability: Capability,
    },

    /// The underlying solver engine failed for a reason other than
    /// infeasibility (missing collaborator, numeric trouble, internal error).
    #[error("solver failure in backend '{backend}': {message}")]
    Solver {
        backend: &'static str,
        message: String,
    },
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for horarium operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ValidationError, ValidationErrorKind};

    #[test]
    fn test_error_display() {
        let err = ScheduleError::DuplicateTask { name: "T1".into() };
        assert_eq!(err.to_string(), "duplicate task name: T1");

        let err = ScheduleError::InvalidLength {
            task: "T2".into(),
            length: -3,
        };
        assert!(err.to_string().contains("-3"));
    }

    #[test]
    fn test_validation_errors_joined() {
        let err = ScheduleError::Invalid {
            errors: vec![
                ValidationError::new(ValidationErrorKind::UnknownResource, "first"),
                ValidationError::new(ValidationErrorKind::BadMultiplicity, "second"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("first"));
        assert!(text.contains("second"));
    }
}
