//! # PagePilot Protocols
//!
//! Shared definitions for the PagePilot page-interaction layer.
//! Contains only data types, error types and interface definitions - the
//! capture pipeline and the action engine live in their own crates.
//!
//! ## Modules
//!
//! - [`page`] - `PageModel`, `InteractiveControl` and the capture request
//! - [`selector_map`] - the per-page addressing table shared by capture and actions
//! - [`action`] - action commands, targets, results and the tool request/response
//! - [`error`] - `ActionError` taxonomy and `ToolError`
//! - [`tool`] - the [`Tool`] trait implemented by the page tools

#![recursion_limit = "256"]

pub mod action;
pub mod error;
pub mod page;
pub mod selector_map;
pub mod tool;
pub mod types;

pub use action::{
    ActionCommand, ActionExecutionResult, ActionParameters, ActionType, DetectedChanges,
    ElementContext, ElementTarget, PageActionRequest, PageActionResponse, RetryConfig,
};
pub use error::{ActionError, ActionErrorCode, ToolError};
pub use page::{
    BoundingBox, CaptureRequest, ControlRole, ControlState, InteractiveControl, LandmarkRegion,
    PageModel,
};
pub use selector_map::{DomSelectorMap, SelectorMapEntry};
pub use tool::{Tool, ToolContext, ToolDefinition, ToolResult};
pub use types::*;
