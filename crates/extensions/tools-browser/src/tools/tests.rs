use std::sync::Arc;
use std::time::Duration;

use pagepilot_protocols::error::ToolError;
use pagepilot_protocols::tool::{Tool, ToolContext};
use pagepilot_protocols::types::RiskLevel;
use pagepilot_protocols::{ActionErrorCode, PageActionResponse, RetryConfig};

use super::*;
use crate::driver::fake::{ClickEffect, DOC, FakeElement, FakePage};
use crate::engine::ActionEngine;
use crate::executors::ExecutionEnv;
use crate::history::ActionHistory;
use crate::settle::SettlePolicy;

const SESSION: &str = "9a7b6c5d-4e3f-4a1b-8c2d-0e1f2a3b4c5d";

fn action_tool(page: &Arc<FakePage>) -> PageActionTool {
    let env = ExecutionEnv::new(page.clone())
        .with_settle(SettlePolicy::immediate())
        .with_typing_delay(Duration::ZERO);
    let engine = ActionEngine::new(env, Arc::new(ActionHistory::new())).with_retry_config(
        RetryConfig {
            base_delay_ms: 1,
            ..Default::default()
        },
    );
    PageActionTool::new(Arc::new(engine))
}

fn response(result: &pagepilot_protocols::ToolResult) -> PageActionResponse {
    serde_json::from_value(result.structured_output.clone().unwrap()).unwrap()
}

#[test]
fn test_page_action_definition() {
    let page = Arc::new(FakePage::new("https://shop.example/"));
    let tool = action_tool(&page);
    assert_eq!(tool.definition().id, "page_action");
    assert_eq!(tool.risk_level(), RiskLevel::Medium);
    assert!(tool.validate(&serde_json::json!("click")).is_err());
}

#[tokio::test]
async fn test_page_action_click_success() {
    let page = Arc::new(FakePage::new("https://shop.example/"));
    page.add(
        DOC,
        "#add",
        "add",
        FakeElement::new("button").on_click(ClickEffect::Mutate(2)),
    );
    let tool = action_tool(&page);
    let params = serde_json::json!({
        "action": {
            "type": "click",
            "targetElement": { "selector": "#add" },
            "parameters": {},
            "sessionId": SESSION
        },
        "tabId": 17
    });

    let result = tool.execute(params, ToolContext::new(SESSION)).await.unwrap();
    assert!(result.success);
    let response = response(&result);
    assert!(response.success);
    assert_eq!(response.metadata.attempts, 1);
    assert_eq!(response.metadata.tab_id, Some(17));
    assert_eq!(response.metadata.session_id, SESSION);
    let data = response.data.unwrap();
    assert_eq!(data.result.detected_changes.dom_mutations, 2);
    assert!(data.updated_selector_map.is_none());
    assert_eq!(tool.engine().history().get_by_session(SESSION).len(), 1);
}

#[tokio::test]
async fn test_page_action_failure_is_structured() {
    let page = Arc::new(FakePage::new("https://shop.example/"));
    let tool = action_tool(&page);
    let params = serde_json::json!({
        "action": {
            "type": "input",
            "targetElement": { "selector": "#missing" },
            "parameters": { "text": "hello" },
            "sessionId": SESSION
        }
    });

    let result = tool.execute(params, ToolContext::new(SESSION)).await.unwrap();
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("ELEMENT_NOT_FOUND"));
    let response = response(&result);
    let err = response.error.unwrap();
    assert_eq!(err.code, ActionErrorCode::ElementNotFound);
    assert!(err.message.contains("input on '#missing'"));
    assert!(response.data.is_some());
}

#[tokio::test]
async fn test_page_action_rejects_bad_request() {
    let page = Arc::new(FakePage::new("https://shop.example/"));
    let tool = action_tool(&page);
    let params = serde_json::json!({
        "action": {
            "type": "click",
            "targetElement": { "selector": "#a" },
            "sessionId": "session-1"
        }
    });
    let err = tool
        .execute(params, ToolContext::new(SESSION))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidParameters(msg) if msg.contains("UUID")));
}

#[tokio::test]
async fn test_page_action_honors_abort() {
    let page = Arc::new(FakePage::new("https://shop.example/"));
    let tool = action_tool(&page);
    let ctx = ToolContext::new(SESSION);
    ctx.abort_signal.abort();
    let err = tool.execute(serde_json::json!({}), ctx).await.unwrap_err();
    assert!(matches!(err, ToolError::Cancelled));
}

const SHOP_HTML: &str = r#"<html><head><title>Shop</title></head><body>
    <nav><a href="/deals">Deals</a></nav>
    <main>
      <h1>Wireless mouse</h1>
      <input id="qty" name="qty" aria-label="Quantity" value="1">
      <button id="add">Add to cart</button>
    </main>
</body></html>"#;

#[tokio::test]
async fn test_capture_tool_reads_live_page() {
    let page = Arc::new(FakePage::new("https://shop.example/p/42"));
    page.set_html(SHOP_HTML);
    let tool = CaptureTool::new(page);
    assert_eq!(tool.definition().id, "page_capture");
    assert_eq!(tool.risk_level(), RiskLevel::Low);

    let result = tool
        .execute(serde_json::json!({}), ToolContext::new(SESSION))
        .await
        .unwrap();
    assert!(result.success);
    let output = result.structured_output.unwrap();
    let model = &output["pageModel"];
    assert_eq!(model["title"], "Shop");
    assert_eq!(model["controls"].as_array().unwrap().len(), 3);
    let deals = model["controls"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Deals")
        .unwrap();
    assert_eq!(deals["states"]["href"], "https://shop.example/deals");
    assert!(output.get("selectorMap").is_none());
    assert_eq!(result.metadata["controls"], 3);
}

#[tokio::test]
async fn test_capture_tool_with_selector_map_and_caps() {
    let page = Arc::new(FakePage::new("https://shop.example/p/42"));
    page.set_html(SHOP_HTML);
    let tool = CaptureTool::new(page);

    let result = tool
        .execute(
            serde_json::json!({ "maxControls": 1, "includeSelectorMap": true }),
            ToolContext::new(SESSION),
        )
        .await
        .unwrap();
    let output = result.structured_output.unwrap();
    assert_eq!(output["pageModel"]["controls"].as_array().unwrap().len(), 1);
    assert_eq!(output["selectorMap"]["selectorMap"].as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_capture_tool_invalid_html() {
    let page = Arc::new(FakePage::new("https://shop.example/"));
    page.set_html("not a document");
    let err = CaptureTool::new(page)
        .execute(serde_json::Value::Null, ToolContext::new(SESSION))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::ExecutionFailed(msg) if msg.contains("Invalid HTML")));
}
