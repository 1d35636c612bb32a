//! `act` subcommand.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use pagepilot_config::Config;
use pagepilot_protocols::{Tool, ToolContext};
use pagepilot_tools_browser::PageTools;

use crate::cmd_capture::print_json;
use crate::settings::page_tools_config;

/// Accept either a full `page_action` request or a bare action command.
fn into_request(value: Value) -> Value {
    match value {
        Value::Object(ref map) if map.contains_key("action") => value,
        other => serde_json::json!({ "action": other }),
    }
}

/// Give the command the configured default timeout when it carries none.
fn apply_default_timeout(request: &mut Value, timeout_ms: u64) {
    if let Some(Value::Object(action)) = request.get_mut("action") {
        action
            .entry("timeout")
            .or_insert_with(|| Value::from(timeout_ms));
    }
}

fn session_of(request: &Value) -> String {
    request
        .pointer("/action/sessionId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub(crate) async fn run_act(
    config: &Config,
    action: &Path,
    endpoint: Option<String>,
    target: Option<String>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw: Value = serde_json::from_str(&std::fs::read_to_string(action)?)?;
    let mut request = into_request(raw);
    apply_default_timeout(&mut request, config.actions.default_timeout_ms);

    let mut tools_config = page_tools_config(config);
    if let Some(endpoint) = endpoint {
        tools_config = tools_config.endpoint(endpoint);
    }
    if let Some(target) = target {
        tools_config = tools_config.target(target);
    }

    let connect_timeout = Duration::from_millis(config.browser.connect_timeout_ms);
    let tools = tokio::time::timeout(connect_timeout, PageTools::connect(&tools_config))
        .await
        .map_err(|_| {
            format!(
                "timed out connecting to {} after {}ms",
                tools_config.endpoint,
                connect_timeout.as_millis()
            )
        })??;

    let ctx = ToolContext::new(session_of(&request));
    let result = tools.page_action().execute(request, ctx).await?;

    match &result.structured_output {
        Some(output) => print_json(output, pretty)?,
        None => println!("{}", result.content),
    }

    if result.success {
        info!("Page action succeeded");
        Ok(())
    } else {
        let message = result.error.unwrap_or_else(|| "page action failed".to_string());
        warn!("{}", message);
        Err(message.into())
    }
}
