//! Error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Configuration could not be loaded or is out of range.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config field '{field}' = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Scheduling could not start.
///
/// Partial coverage is never an error; these only fire before the first
/// iteration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "insufficient input: {coaches} coaches, {requirements} requirements, \
         {candidates} candidate assignments"
    )]
    InsufficientInput {
        coaches: usize,
        requirements: usize,
        candidates: usize,
    },

    #[error("invalid input: {} problem(s), first: {}", .0.len(), first_message(.0))]
    InvalidInput(Vec<ValidationError>),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn first_message(errors: &[ValidationError]) -> &str {
    errors.first().map_or("none", |e| e.message.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_insufficient_input_message() {
        let e = EngineError::InsufficientInput {
            coaches: 0,
            requirements: 3,
            candidates: 0,
        };
        assert_eq!(
            e.to_string(),
            "insufficient input: 0 coaches, 3 requirements, 0 candidate assignments"
        );
    }

    #[test]
    fn test_invalid_input_message() {
        let e = EngineError::InvalidInput(vec![ValidationError::new(
            ValidationErrorKind::DuplicateId,
            "Duplicate coach ID: 7",
        )]);
        assert!(e.to_string().contains("Duplicate coach ID: 7"));
    }

    #[test]
    fn test_config_error_converts() {
        let e: EngineError = ConfigError::OutOfRange {
            field: "max_iterations",
            value: 0,
            min: 1,
            max: 10_000,
        }
        .into();
        assert!(e.to_string().contains("max_iterations"));
    }
}
