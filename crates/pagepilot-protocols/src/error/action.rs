//! Page-action error taxonomy.
//!
//! Every failed action surfaces one of these codes. The `recoverable` flag
//! drives the retry loop: a retryable code with `recoverable == false` is
//! still returned immediately.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Closed set of action failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionErrorCode {
    ElementNotFound,
    ElementNotInteractable,
    ElementStale,
    ElementObscured,
    Timeout,
    NavigationBlocked,
    CrossOriginDenied,
    ValidationFailed,
    UnknownError,
}

impl ActionErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ElementNotFound => "ELEMENT_NOT_FOUND",
            Self::ElementNotInteractable => "ELEMENT_NOT_INTERACTABLE",
            Self::ElementStale => "ELEMENT_STALE",
            Self::ElementObscured => "ELEMENT_OBSCURED",
            Self::Timeout => "TIMEOUT",
            Self::NavigationBlocked => "NAVIGATION_BLOCKED",
            Self::CrossOriginDenied => "CROSS_ORIGIN_DENIED",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ActionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured action failure.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ActionError {
    pub code: ActionErrorCode,
    pub message: String,
    pub recoverable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ActionError {
    pub fn new(code: ActionErrorCode, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            code,
            message: message.into(),
            recoverable,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ActionErrorCode::ElementNotFound, message, true).with_suggestion(
            "Refresh the page model and verify the selector still matches an element",
        )
    }

    /// Element present but not usable. Hidden elements may become visible,
    /// disabled ones are reported as final.
    pub fn not_interactable(message: impl Into<String>, recoverable: bool) -> Self {
        Self::new(ActionErrorCode::ElementNotInteractable, message, recoverable)
    }

    pub fn stale(message: impl Into<String>) -> Self {
        Self::new(ActionErrorCode::ElementStale, message, true)
            .with_suggestion("The page changed; the selector map will be refreshed")
    }

    pub fn obscured(message: impl Into<String>) -> Self {
        Self::new(ActionErrorCode::ElementObscured, message, true)
            .with_suggestion("Close overlays or scroll the element into view")
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ActionErrorCode::Timeout, message, true)
    }

    pub fn navigation_blocked(message: impl Into<String>) -> Self {
        Self::new(ActionErrorCode::NavigationBlocked, message, false)
    }

    pub fn cross_origin_denied(message: impl Into<String>) -> Self {
        Self::new(ActionErrorCode::CrossOriginDenied, message, false)
            .with_suggestion("ensure iframe is same-origin")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ActionErrorCode::ValidationFailed, message, false)
    }

    /// Wrap an unclassified failure. Messages that mention a stale or
    /// detached element are promoted to `ELEMENT_STALE`.
    pub fn unknown(message: impl Into<String>) -> Self {
        let message = message.into();
        if mentions_stale(&message) {
            return Self::stale(message);
        }
        Self::new(ActionErrorCode::UnknownError, message, false)
    }

    pub fn is_stale(&self) -> bool {
        self.code == ActionErrorCode::ElementStale
    }
}

fn mentions_stale(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("stale") || lower.contains("detached")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ActionErrorCode::ElementNotInteractable).unwrap();
        assert_eq!(json, "\"ELEMENT_NOT_INTERACTABLE\"");
        assert_eq!(ActionErrorCode::CrossOriginDenied.to_string(), "CROSS_ORIGIN_DENIED");
    }

    #[test]
    fn test_unknown_promotes_stale_messages() {
        assert!(ActionError::unknown("Node is detached from document").is_stale());
        assert!(ActionError::unknown("stale element reference").is_stale());
        let err = ActionError::unknown("something odd");
        assert_eq!(err.code, ActionErrorCode::UnknownError);
        assert_eq!(err.message, "something odd");
        assert!(!err.recoverable);
    }

    #[test]
    fn test_cross_origin_has_suggestion() {
        let err = ActionError::cross_origin_denied("iframe#pay");
        assert!(!err.recoverable);
        assert_eq!(err.suggestion.as_deref(), Some("ensure iframe is same-origin"));
    }

    #[test]
    fn test_display_includes_code_and_message() {
        let err = ActionError::obscured("button#go is covered by div.modal");
        assert_eq!(err.to_string(), "ELEMENT_OBSCURED: button#go is covered by div.modal");
    }

    #[test]
    fn test_error_json_shape() {
        let json = serde_json::to_value(ActionError::validation("bad")).unwrap();
        assert_eq!(json["code"], "VALIDATION_FAILED");
        assert_eq!(json["recoverable"], false);
        assert!(json.get("suggestion").is_none());
    }
}
