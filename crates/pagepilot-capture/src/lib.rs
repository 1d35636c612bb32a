//! # PagePilot Capture
//!
//! Turns raw HTML into a [`PageModel`](pagepilot_protocols::PageModel): a
//! capped, privacy-redacted list of interactive controls with stable ids and
//! selectors, plus the page's title, headings, landmarks and prose.
//!
//! The pipeline is pure and document-scoped. [`capture_interaction_content`]
//! runs it on a blocking thread under a timeout; [`InteractionCapture`] is
//! the synchronous entry point.

pub mod capture;
pub mod error;
pub mod headings;
pub mod name;
pub mod regions;
pub mod roles;
pub mod sanitize;
pub mod selector;
pub mod selector_map;
pub mod states;
pub mod text;
pub mod visibility;

mod util;

pub use capture::{
    DEFAULT_CAPTURE_TIMEOUT, InteractionCapture, MAX_HTML_BYTES, capture_interaction_content,
    capture_with_timeout,
};
pub use error::CaptureError;
pub use selector_map::build_selector_map;
