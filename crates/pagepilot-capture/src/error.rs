//! Capture errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Invalid HTML: {0}")]
    InvalidHtml(String),

    #[error("HTML too large: {size} bytes exceeds limit of {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("Capture timed out after {0} ms")]
    Timeout(u64),

    /// A single element could not be processed. Never escapes a capture.
    #[error("Element <{tag}> skipped: {reason}")]
    Element { tag: String, reason: String },

    #[error("Capture task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for CaptureError {
    fn from(err: tokio::task::JoinError) -> Self {
        CaptureError::Join(err.to_string())
    }
}
