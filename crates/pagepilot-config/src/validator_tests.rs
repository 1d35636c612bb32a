use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_zero_max_controls_is_error() {
    let mut config = Config::default();
    config.capture.max_controls = 0;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "capture.max_controls"));
}

#[test]
fn test_oversize_max_controls_is_warning() {
    let mut config = Config::default();
    config.capture.max_controls = 4000;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "capture.max_controls"));
}

#[test]
fn test_include_values_warns() {
    let mut config = Config::default();
    config.capture.include_values = true;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "capture.include_values"));
}

#[test]
fn test_action_timeout_bounds() {
    let mut config = Config::default();
    config.actions.default_timeout_ms = 500;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "actions.default_timeout_ms"));
}

#[test]
fn test_retry_settings() {
    let mut config = Config::default();
    config.actions.retry.max_attempts = 0;
    config.actions.retry.backoff_multiplier = 0.5;
    let result = ConfigValidator::validate(&config).unwrap();
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_settle_quiet_window_warning() {
    let mut config = Config::default();
    config.actions.settle.quiet_window_ms = 10_000;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "actions.settle.quiet_window_ms"));
}

#[test]
fn test_history_capacity_zero() {
    let mut config = Config::default();
    config.history.capacity = 0;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
}

#[test]
fn test_browser_endpoint_scheme() {
    let mut config = Config::default();
    config.browser.cdp_endpoint = "localhost:9222".to_string();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "browser.cdp_endpoint"));

    config.browser.cdp_endpoint = "ws://127.0.0.1:9222/devtools/page/ABC".to_string();
    assert!(ConfigValidator::validate(&config).unwrap().is_valid());
}

#[test]
fn test_logging_level() {
    let mut config = Config::default();
    config.logging.level = "verbose".to_string();
    assert!(!ConfigValidator::validate(&config).unwrap().is_valid());

    config.logging.level = "pagepilot=debug,info".to_string();
    assert!(ConfigValidator::validate(&config).unwrap().is_valid());
}

#[test]
fn test_zero_command_timeout_is_error() {
    let mut config = Config::default();
    config.browser.command_timeout_ms = 0;
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "browser.command_timeout_ms"));
}
