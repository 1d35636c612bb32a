use super::*;

#[test]
fn test_tool_result_success() {
    let result = ToolResult::success("OK");
    assert!(result.success);
    assert_eq!(result.content, "OK");
    assert!(result.error.is_none());
    assert!(result.structured_output.is_none());
}

#[test]
fn test_tool_result_success_json() {
    let result = ToolResult::success_json("OK", serde_json::json!({"title": "Login"}));
    assert!(result.success);
    assert_eq!(result.structured_output.as_ref().unwrap()["title"], "Login");
}

#[test]
fn test_error_result_can_carry_structured_output() {
    let result = ToolResult::error("click failed")
        .with_structured_output(serde_json::json!({"success": false}));
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("click failed"));
    assert_eq!(result.structured_output.unwrap()["success"], false);
}

#[test]
fn test_tool_result_with_metadata() {
    let result = ToolResult::success("OK").with_metadata("attempts", serde_json::json!(2));
    assert_eq!(result.metadata["attempts"], serde_json::json!(2));
}

#[test]
fn test_tool_result_serialization_skips_empty_fields() {
    let json = serde_json::to_value(ToolResult::success("OK")).unwrap();
    assert!(json.get("error").is_none());
    assert!(json.get("structured_output").is_none());
    assert_eq!(json["success"], true);
}
