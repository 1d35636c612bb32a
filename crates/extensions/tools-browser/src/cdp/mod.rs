//! Chrome DevTools Protocol (CDP) client.
//!
//! Connects to an already running Chrome/Chromium over WebSocket and speaks
//! the CDP JSON-RPC protocol. The action engine never calls this module
//! directly; it goes through [`crate::driver::CdpPageDriver`].
//!
//! ## Usage
//!
//! 1. Start Chrome with remote debugging:
//!    ```bash
//!    chrome --remote-debugging-port=9222
//!    ```
//!
//! 2. Attach to a page:
//!    ```rust,ignore
//!    let client = CdpClient::connect("http://127.0.0.1:9222", DEFAULT_COMMAND_TIMEOUT).await?;
//!    let page = client.attach(Some("example.com")).await?;
//!    let title = page.evaluate("document.title").await?;
//!    ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::{CdpClient, DEFAULT_COMMAND_TIMEOUT};
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
