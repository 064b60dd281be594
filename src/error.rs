//! Error types for storage, persistence and configuration.
//!
//! None of these ever escape a frame update: the recorder and the replay
//! loader log them and degrade instead.

use thiserror::Error;

/// Main error type for hulu_arena I/O paths.
#[derive(Error, Debug)]
pub enum ArenaError {
    /// File system errors
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A named recording session does not exist
    #[error("Recording not found: {0}")]
    NotFound(String),

    /// The recorder gave up after an earlier write failure
    #[error("Recording disabled: {0}")]
    RecordingDisabled(String),
}

/// Result type alias for hulu_arena operations.
pub type Result<T> = std::result::Result<T, ArenaError>;

impl ArenaError {
    /// Creates a new not found error.
    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound(resource.into())
    }
}
