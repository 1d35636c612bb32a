//! Driver error types and their mapping onto the action error taxonomy.

use thiserror::Error;

use pagepilot_protocols::ActionError;

use crate::cdp::CdpError;

/// Errors raised by a [`PageDriver`](super::PageDriver).
#[derive(Debug, Error)]
pub enum DriverError {
    /// The handle points at a node that left the document.
    #[error("element is stale: {0}")]
    Stale(String),

    /// A frame's document belongs to another origin.
    #[error("cross-origin frame: {0}")]
    CrossOrigin(String),

    /// The page rejected a selector.
    #[error("invalid selector '{0}'")]
    InvalidSelector(String),

    /// Page script failed for a reason other than staleness.
    #[error("page script failed: {0}")]
    Script(String),

    #[error(transparent)]
    Cdp(CdpError),
}

impl From<CdpError> for DriverError {
    fn from(e: CdpError) -> Self {
        if e.is_stale_object() {
            return DriverError::Stale(e.to_string());
        }
        match e {
            CdpError::JavaScript(text) if text.contains("is not a valid selector") => {
                DriverError::InvalidSelector(text)
            }
            CdpError::JavaScript(text) => DriverError::Script(text),
            other => DriverError::Cdp(other),
        }
    }
}

impl From<DriverError> for ActionError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::Stale(msg) => ActionError::stale(msg),
            DriverError::CrossOrigin(msg) => ActionError::cross_origin_denied(msg),
            DriverError::InvalidSelector(sel) => {
                ActionError::validation(format!("invalid selector '{}'", sel))
            }
            DriverError::Cdp(CdpError::Timeout(msg)) => ActionError::timeout(msg),
            other => ActionError::unknown(other.to_string()),
        }
    }
}
