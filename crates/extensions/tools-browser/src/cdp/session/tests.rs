use serde_json::json;

use super::js::check_exception;
use crate::cdp::error::CdpError;

#[test]
fn test_check_exception_passes_clean_result() {
    assert!(check_exception(&json!({"result": {"type": "number", "value": 1}})).is_ok());
}

#[test]
fn test_check_exception_prefers_thrown_description() {
    let result = json!({
        "result": {"type": "object"},
        "exceptionDetails": {
            "text": "Uncaught",
            "exception": {"description": "Error: element is detached from the DOM"}
        }
    });
    match check_exception(&result) {
        Err(err @ CdpError::JavaScript(_)) => {
            assert!(err.to_string().contains("detached"));
            assert!(err.is_stale_object());
        }
        other => panic!("expected JavaScript error, got {:?}", other),
    }
}

#[test]
fn test_check_exception_falls_back_to_text() {
    let result = json!({"exceptionDetails": {"text": "SyntaxError"}});
    match check_exception(&result) {
        Err(CdpError::JavaScript(text)) => assert_eq!(text, "SyntaxError"),
        other => panic!("expected JavaScript error, got {:?}", other),
    }
}

#[test]
fn test_stale_object_protocol_errors() {
    let gone = CdpError::Protocol {
        code: -32000,
        message: "Could not find object with given id".to_string(),
    };
    assert!(gone.is_stale_object());
    let other = CdpError::Protocol {
        code: -32601,
        message: "'Foo.bar' wasn't found".to_string(),
    };
    assert!(!other.is_stale_object());
}
