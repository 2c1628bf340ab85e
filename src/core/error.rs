//! # Validation errors
//!
//! Everything that can be wrong with input before the alignment runs.
//! Reported to the caller as a client error and never retried.

/// Malformed or out-of-contract input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing query parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("Parameter '{name}' is not an integer: '{value}'")]
    NotANumber { name: &'static str, value: String },

    #[error("Segment count must be positive, got {0}")]
    NonPositiveSegments(i64),

    #[error("Segment count {got} exceeds the maximum of {max}")]
    TooManySegments { got: i64, max: usize },

    #[error("Invalid ISO-8601 timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Window end {now} is not after window start {until}")]
    InvertedWindow { until: String, now: String },

    #[error("Device id must not be empty")]
    EmptyDeviceId,

    #[error("Reading field '{field}' is not finite: {value}")]
    NonFiniteReading { field: &'static str, value: f64 },
}

/// Result type for validation steps
pub type ValidationResult<T> = Result<T, ValidationError>;
