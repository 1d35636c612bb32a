//! Page load state for CDP page session.

use std::time::{Duration, Instant};

use crate::cdp::error::CdpError;

use super::core::PageSession;

impl PageSession {
    /// Current `document.readyState`.
    pub async fn ready_state(&self) -> Result<String, CdpError> {
        let result = self.evaluate("document.readyState").await?;
        Ok(result.as_str().unwrap_or_default().to_string())
    }

    /// Poll until the document is at least interactive.
    pub async fn wait_for_load(&self, timeout: Duration) -> Result<(), CdpError> {
        let start = Instant::now();

        loop {
            // A navigation in flight destroys the execution context; keep polling.
            if let Ok(state) = self.ready_state().await {
                if state == "complete" || state == "interactive" {
                    return Ok(());
                }
            }

            if start.elapsed() > timeout {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Current URL.
    pub async fn get_url(&self) -> Result<String, CdpError> {
        let result = self.evaluate("window.location.href").await?;
        Ok(result.as_str().unwrap_or_default().to_string())
    }
}
