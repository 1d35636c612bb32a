//! Page tools exposed to the agent host.

mod capture;
mod page_action;

pub use capture::{CaptureParams, CaptureTool};
pub use page_action::PageActionTool;

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
