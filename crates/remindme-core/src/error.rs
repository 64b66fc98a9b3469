//! Validation errors for core types.

use thiserror::Error;

/// Errors raised while building or parsing core values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A reminder or todo title was empty or whitespace only.
    #[error("title must not be empty")]
    EmptyTitle,

    /// A reminder time could not be parsed.
    #[error("invalid reminder time {input:?}: {reason}")]
    InvalidTime {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A todo has no reminder time and cannot be pushed to a calendar.
    #[error("todo {0} has no reminder time")]
    MissingReminderTime(String),
}

impl CoreError {
    pub(crate) fn invalid_time(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
