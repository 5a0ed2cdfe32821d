//! Sequence generation error types
//!
//! Every failure during identifier composition is reported through
//! [`SequenceError`]; the generator never hands back an empty or partial
//! identifier.

use thiserror::Error;

/// Result type for sequence operations
pub type Result<T> = std::result::Result<T, SequenceError>;

/// Sequence generation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Clock format error: {0}")]
    ClockFormat(String),

    #[error("Random source error: {0}")]
    RandomSource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SequenceError {
    /// A failed generation leaves no state behind, so these are safe to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SequenceError::ClockFormat(_) | SequenceError::RandomSource(_)
        )
    }
}

impl From<rand::Error> for SequenceError {
    fn from(err: rand::Error) -> Self {
        SequenceError::RandomSource(err.to_string())
    }
}
