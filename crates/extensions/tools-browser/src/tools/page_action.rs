//! `page_action`: run one click, input, scroll or verify against the page.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use pagepilot_protocols::action::{PageActionData, ResponseMetadata};
use pagepilot_protocols::error::ToolError;
use pagepilot_protocols::tool::{Tool, ToolContext, ToolDefinition, ToolResult};
use pagepilot_protocols::types::RiskLevel;
use pagepilot_protocols::{PageActionRequest, PageActionResponse};

use crate::engine::ActionEngine;

/// Executes a [`PageActionRequest`] through the [`ActionEngine`].
pub struct PageActionTool {
    definition: ToolDefinition,
    engine: Arc<ActionEngine>,
}

impl PageActionTool {
    pub fn new(engine: Arc<ActionEngine>) -> Self {
        let definition = ToolDefinition::new(
            "page_action",
            "Page Action",
            "Click, type into, scroll or verify an element on the current page. Address the \
             element by CSS selector, by nodeId from a selector map, or by a short description.",
        )
        .with_parameters_schema(parameters_schema())
        .with_risk_level(RiskLevel::Medium);
        Self { definition, engine }
    }

    pub fn engine(&self) -> &Arc<ActionEngine> {
        &self.engine
    }
}

fn parameters_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "action": {
                "type": "object",
                "properties": {
                    "type": {
                        "type": "string",
                        "enum": ["click", "input", "scroll", "verify"]
                    },
                    "targetElement": {
                        "type": "object",
                        "properties": {
                            "selector": { "type": "string" },
                            "nodeId": { "type": "integer" },
                            "semanticDescription": { "type": "string" },
                            "context": {
                                "type": "object",
                                "properties": {
                                    "iframePath": { "type": "array", "items": { "type": "string" } },
                                    "shadowPath": { "type": "array", "items": { "type": "string" } }
                                }
                            }
                        }
                    },
                    "parameters": {
                        "type": "object",
                        "description": "click: button, modifiers, waitForNavigation. input: text, clearFirst, simulateTyping, typingDelay. scroll: direction (up|down|left|right|top|bottom|into_view), amount, waitForLazyLoad. verify: exists, visible, enabled, checked, textContains, valueEquals."
                    },
                    "sessionId": { "type": "string", "format": "uuid" },
                    "turnId": { "type": "string" },
                    "timeout": { "type": "integer", "minimum": 1000, "maximum": 60000, "default": 30000 },
                    "retryConfig": {
                        "type": "object",
                        "properties": {
                            "maxAttempts": { "type": "integer", "minimum": 1 },
                            "baseDelay": { "type": "integer" },
                            "backoffMultiplier": { "type": "number" },
                            "maxDelay": { "type": "integer" }
                        }
                    }
                },
                "required": ["type", "targetElement", "sessionId"]
            },
            "selectorMap": {
                "type": "object",
                "description": "Selector map from the last capture; needed for nodeId targets"
            },
            "tabId": { "type": "integer" }
        },
        "required": ["action"]
    })
}

#[async_trait]
impl Tool for PageActionTool {
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
        let request: PageActionRequest = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParameters(e.to_string()))?;
        let tab_id = request.tab_id;
        debug!("page_action: {}", request.action.describe());

        let outcome = self
            .engine
            .perform(request.action, request.selector_map)
            .await;
        let result = outcome.result;

        let response = PageActionResponse {
            success: result.success,
            error: result.error.clone(),
            metadata: ResponseMetadata {
                execution_time_ms: result.duration,
                attempts: result.attempts_count,
                session_id: result.action_command.session_id.clone(),
                tab_id,
                timestamp: Utc::now(),
            },
            data: Some(PageActionData {
                result,
                updated_selector_map: outcome.updated_selector_map,
            }),
        };

        let output = serde_json::to_value(&response)?;
        let content = serde_json::to_string(&response)?;
        let tool_result = match &response.error {
            None => ToolResult::success_json(content, output),
            Some(err) => ToolResult::error(err.to_string()).with_structured_output(output),
        };
        Ok(tool_result
            .with_metadata("attempts", serde_json::json!(response.metadata.attempts))
            .with_metadata("refreshes", serde_json::json!(outcome.refreshes)))
    }
}
