//! Core Error Types
//!
//! Failures raised by the journal model. The application crate wraps these
//! in its own `AppError` alongside LLM and configuration failures.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for journal loading and editing.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Reading a journal file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The journal file is not a valid journal document
    #[error("Invalid journal document: {0}")]
    Document(#[from] serde_json::Error),

    /// Rejected journal or entry input
    #[error("Validation error: {0}")]
    Validation(String),

    /// No journal file at the given path
    #[error("Journal not found: {}", .0.display())]
    JournalNotFound(PathBuf),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
