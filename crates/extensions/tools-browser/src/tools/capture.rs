//! `page_capture`: summarize the live page as a PageModel.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use pagepilot_capture::{
    CaptureError, DEFAULT_CAPTURE_TIMEOUT, build_selector_map, capture_with_timeout,
};
use pagepilot_protocols::CaptureRequest;
use pagepilot_protocols::error::ToolError;
use pagepilot_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};

use crate::driver::PageDriver;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureParams {
    #[serde(flatten)]
    pub request: CaptureRequest,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Also return the selector map for nodeId addressing.
    #[serde(default)]
    pub include_selector_map: bool,
}

/// Captures the current document of a [`PageDriver`].
pub struct CaptureTool {
    definition: ToolDefinition,
    driver: Arc<dyn PageDriver>,
}

impl CaptureTool {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        let definition = ToolDefinition::new(
            "page_capture",
            "Page Capture",
            "Summarize the current page: title, headings, landmark regions and the visible \
             interactive controls, each with an id and a selector usable by page_action.",
        )
        .with_parameters_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "maxControls": { "type": "integer", "minimum": 1, "maximum": 400, "default": 400 },
                "maxHeadings": { "type": "integer", "minimum": 0, "default": 30 },
                "includeValues": { "type": "boolean", "default": false },
                "maxIframeDepth": { "type": "integer", "minimum": 0, "default": 1 },
                "maxTextBlocks": { "type": "integer", "minimum": 0, "default": 40 },
                "timeoutMs": { "type": "integer", "minimum": 1 },
                "includeSelectorMap": { "type": "boolean", "default": false }
            }
        }));
        Self { definition, driver }
    }
}

fn capture_failed(err: CaptureError) -> ToolError {
    match err {
        CaptureError::Timeout(ms) => ToolError::Timeout(ms),
        other => ToolError::ExecutionFailed(other.to_string()),
    }
}

#[async_trait]
impl Tool for CaptureTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: ToolContext,
    ) -> Result<ToolResult, ToolError> {
        if ctx.is_aborted() {
            return Err(ToolError::Cancelled);
        }
        let params: CaptureParams = if params.is_null() {
            CaptureParams::default()
        } else {
            serde_json::from_value(params).map_err(|e| ToolError::InvalidParameters(e.to_string()))?
        };

        let html = self
            .driver
            .page_html()
            .await
            .map_err(|e| ToolError::BrowserUnavailable(e.to_string()))?;
        let mut request = params.request;
        if request.base_url.is_none() {
            let state = self
                .driver
                .page_state()
                .await
                .map_err(|e| ToolError::BrowserUnavailable(e.to_string()))?;
            request.base_url = Some(state.url);
        }

        let selector_map = if params.include_selector_map {
            let (html, request) = (html.clone(), request.clone());
            let map = tokio::task::spawn_blocking(move || build_selector_map(&html, &request))
                .await
                .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?
                .map_err(capture_failed)?;
            Some(map)
        } else {
            None
        };

        let timeout = params
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_CAPTURE_TIMEOUT);
        let model = capture_with_timeout(html, request, timeout)
            .await
            .map_err(capture_failed)?;
        let controls = model.controls.len();
        debug!("page_capture: {} controls, {} headings", controls, model.headings.len());

        let mut output = serde_json::json!({ "pageModel": model });
        if let Some(map) = selector_map {
            output["selectorMap"] = serde_json::to_value(map)?;
        }
        let content = serde_json::to_string(&output)?;
        Ok(ToolResult::success_json(content, output)
            .with_metadata("controls", serde_json::json!(controls)))
    }
}
