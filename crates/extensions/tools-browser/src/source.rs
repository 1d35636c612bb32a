//! Where a fresh selector map comes from when the page changes underneath
//! an action.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use pagepilot_capture::build_selector_map;
use pagepilot_protocols::{ActionError, CaptureRequest, DomSelectorMap};

use crate::driver::PageDriver;

/// Produces a selector map for the page as it is now.
#[async_trait]
pub trait SelectorMapSource: Send + Sync {
    async fn refresh(&self) -> Result<DomSelectorMap, ActionError>;
}

/// Rebuilds the selector map from the live page's serialized DOM.
pub struct LiveSelectorMapSource {
    driver: Arc<dyn PageDriver>,
    request: CaptureRequest,
}

impl LiveSelectorMapSource {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self::with_request(driver, CaptureRequest::default())
    }

    pub fn with_request(driver: Arc<dyn PageDriver>, request: CaptureRequest) -> Self {
        Self { driver, request }
    }
}

#[async_trait]
impl SelectorMapSource for LiveSelectorMapSource {
    async fn refresh(&self) -> Result<DomSelectorMap, ActionError> {
        let html = self.driver.page_html().await?;
        let mut request = self.request.clone();
        if request.base_url.is_none() {
            request.base_url = Some(self.driver.page_state().await?.url);
        }

        let map = tokio::task::spawn_blocking(move || build_selector_map(&html, &request))
            .await
            .map_err(|e| ActionError::unknown(format!("selector map task failed: {}", e)))?
            .map_err(|e| ActionError::unknown(format!("selector map refresh failed: {}", e)))?;
        debug!("Selector map refreshed: {} entries", map.len());
        Ok(map)
    }
}
