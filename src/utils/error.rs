//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use journal_coach_core::CoreError;
use journal_coach_llm::LlmError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Journal model errors
    #[error(transparent)]
    Journal(#[from] CoreError),

    /// Chat-completion provider errors (auto-converted from LlmError)
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Model output that could not be turned into the requested shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Text to show the user instead of a coaching result.
    ///
    /// Provider failures use the short provider-facing wording; everything
    /// else falls back to the error's display form.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Llm(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
