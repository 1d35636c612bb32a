//! Page tools bundle.

use std::sync::Arc;
use std::time::Duration;

use pagepilot_protocols::tool::Tool;
use pagepilot_protocols::{CaptureRequest, RetryConfig};

use crate::cdp::{CdpClient, CdpError, DEFAULT_COMMAND_TIMEOUT};
use crate::driver::{CdpPageDriver, PageDriver};
use crate::engine::{ActionEngine, ActionNotice};
use crate::executors::{DEFAULT_TYPING_DELAY, ExecutionEnv};
use crate::history::{ActionHistory, DEFAULT_HISTORY_CAPACITY};
use crate::settle::SettlePolicy;
use crate::source::LiveSelectorMapSource;
use crate::tools::{CaptureTool, PageActionTool};

/// Default DevTools HTTP endpoint.
pub const DEFAULT_CDP_ENDPOINT: &str = "http://127.0.0.1:9222";

/// Settings for [`PageTools`].
#[derive(Debug, Clone)]
pub struct PageToolsConfig {
    /// DevTools HTTP endpoint of a browser started with
    /// `--remote-debugging-port`.
    pub endpoint: String,
    /// Page id or URL fragment to attach to; the first page when unset.
    pub target: Option<String>,
    pub command_timeout: Duration,
    pub settle: SettlePolicy,
    pub retry: RetryConfig,
    pub typing_delay: Duration,
    pub history_capacity: usize,
    /// Options used when a stale element forces a selector map rebuild.
    pub refresh_capture: CaptureRequest,
}

impl Default for PageToolsConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CDP_ENDPOINT.to_string(),
            target: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            settle: SettlePolicy::default(),
            retry: RetryConfig::default(),
            typing_delay: DEFAULT_TYPING_DELAY,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            refresh_capture: CaptureRequest::default(),
        }
    }
}

impl PageToolsConfig {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// The `page_action` and `page_capture` tools over one page.
pub struct PageTools {
    engine: Arc<ActionEngine>,
    page_action: Arc<PageActionTool>,
    capture: Arc<CaptureTool>,
    // Owns the WebSocket; dropping it ends the session.
    _client: Option<CdpClient>,
}

impl PageTools {
    /// Build the tools over any driver.
    pub fn from_driver(driver: Arc<dyn PageDriver>, config: &PageToolsConfig) -> Self {
        let history = Arc::new(ActionHistory::with_capacity(config.history_capacity));
        let env = ExecutionEnv::new(driver.clone())
            .with_settle(config.settle.clone())
            .with_typing_delay(config.typing_delay);
        let source = Arc::new(LiveSelectorMapSource::with_request(
            driver.clone(),
            config.refresh_capture.clone(),
        ));
        let engine = Arc::new(
            ActionEngine::new(env, history)
                .with_retry_config(config.retry.clone())
                .with_selector_map_source(source),
        );

        Self {
            page_action: Arc::new(PageActionTool::new(engine.clone())),
            capture: Arc::new(CaptureTool::new(driver)),
            engine,
            _client: None,
        }
    }

    /// Connect to the browser at `config.endpoint` and attach to a page.
    pub async fn connect(config: &PageToolsConfig) -> Result<Self, CdpError> {
        let client = CdpClient::connect(&config.endpoint, config.command_timeout).await?;
        let session = client.attach(config.target.as_deref()).await?;
        tracing::info!(
            "Page tools attached to target {} via {}",
            session.target_id(),
            config.endpoint
        );

        let driver: Arc<dyn PageDriver> = Arc::new(CdpPageDriver::new(Arc::new(session)));
        let mut tools = Self::from_driver(driver, config);
        tools._client = Some(client);
        Ok(tools)
    }

    pub fn engine(&self) -> &Arc<ActionEngine> {
        &self.engine
    }

    pub fn history(&self) -> &Arc<ActionHistory> {
        self.engine.history()
    }

    pub fn page_action(&self) -> &Arc<PageActionTool> {
        &self.page_action
    }

    pub fn capture(&self) -> &Arc<CaptureTool> {
        &self.capture
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ActionNotice> {
        self.engine.subscribe()
    }

    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![self.page_action.clone(), self.capture.clone()]
    }

    /// Look up a tool by id.
    pub fn tool(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.tools().into_iter().find(|t| t.definition().id == id)
    }
}

#[cfg(test)]
#[path = "extension_tests.rs"]
mod tests;
