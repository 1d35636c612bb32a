//! Page-action execution engine for PagePilot.
//!
//! Drives a live page over the Chrome DevTools Protocol (CDP) and executes
//! verified click, input, scroll and verify actions against elements
//! addressed by selector, selector-map node id or a short description.
//!
//! ## Architecture
//!
//! ```text
//! PageActionTool ─► ActionEngine ─► ActionExecutor ─► ContextNavigator
//!                     │  retry          │               ElementLocator
//!                     │  history        ▼
//!                     └─ refresh ─► PageDriver ─► CdpPageDriver ─► Chrome
//! ```
//!
//! Every live-DOM primitive the engine needs is one [`PageDriver`] method.
//! [`CdpPageDriver`] implements them as JavaScript functions called on
//! remote objects, so they work the same inside same-origin frames and open
//! shadow roots.
//!
//! ## Setup
//!
//! Start Chrome with remote debugging enabled:
//!
//! ```bash
//! google-chrome --remote-debugging-port=9222
//! ```
//!
//! then attach with [`PageTools::connect`].
//!
//! ## Tools
//!
//! - `page_action` - run one action with retry and stale-element recovery
//! - `page_capture` - summarize the live page as a PageModel

pub mod cdp;
pub mod driver;
pub mod engine;
pub mod executors;
mod extension;
pub mod history;
pub mod locator;
pub mod navigator;
pub mod retry;
pub mod settle;
pub mod source;
mod tools;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use driver::{CdpPageDriver, DriverError, ElementHandle, PageDriver};
pub use engine::{ActionEngine, ActionNotice, ActionOutcome};
pub use executors::{ActionExecutor, ExecutionEnv};
pub use extension::{DEFAULT_CDP_ENDPOINT, PageTools, PageToolsConfig};
pub use history::{ActionHistory, HistoryEntry, SessionStats};
pub use locator::{ElementLocator, KeywordMatcher, SemanticMatcher};
pub use navigator::{ContextNavigator, ContextResolution};
pub use retry::{RetryDecision, RetryStrategy};
pub use settle::SettlePolicy;
pub use source::{LiveSelectorMapSource, SelectorMapSource};
pub use tools::*;
