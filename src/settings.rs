//! Configuration to runtime settings.

use std::time::Duration;

use pagepilot_config::{ActionsConfig, CaptureConfig, Config};
use pagepilot_protocols::{CaptureRequest, RetryConfig};
use pagepilot_tools_browser::{PageToolsConfig, SettlePolicy};

pub(crate) fn capture_request(config: &CaptureConfig) -> CaptureRequest {
    CaptureRequest {
        base_url: None,
        max_controls: config.max_controls,
        max_headings: config.max_headings,
        include_values: config.include_values,
        max_iframe_depth: config.max_iframe_depth,
        max_text_blocks: config.max_text_blocks,
    }
}

pub(crate) fn retry_config(config: &ActionsConfig) -> RetryConfig {
    let retry = &config.retry;
    RetryConfig {
        max_attempts: retry.max_attempts,
        base_delay_ms: retry.base_delay_ms,
        backoff_multiplier: retry.backoff_multiplier,
        max_delay_ms: retry.max_delay_ms,
        ..Default::default()
    }
}

pub(crate) fn settle_policy(config: &ActionsConfig) -> SettlePolicy {
    let settle = &config.settle;
    SettlePolicy {
        post_action_delay: Duration::from_millis(settle.post_action_delay_ms),
        quiet_window: Duration::from_millis(settle.quiet_window_ms),
        max_wait: Duration::from_millis(settle.max_wait_ms),
        navigation_timeout: Duration::from_millis(settle.navigation_timeout_ms),
        poll_interval: Duration::from_millis(settle.poll_interval_ms),
    }
}

pub(crate) fn page_tools_config(config: &Config) -> PageToolsConfig {
    PageToolsConfig {
        endpoint: config.browser.cdp_endpoint.clone(),
        target: None,
        command_timeout: Duration::from_millis(config.browser.command_timeout_ms),
        settle: settle_policy(&config.actions),
        retry: retry_config(&config.actions),
        typing_delay: Duration::from_millis(config.actions.typing_delay_ms),
        history_capacity: config.history.capacity,
        refresh_capture: capture_request(&config.capture),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagepilot_config::ConfigLoader;

    #[test]
    fn test_defaults_line_up() {
        let config = Config::default();
        assert_eq!(capture_request(&config.capture), CaptureRequest::default());
        assert_eq!(retry_config(&config.actions), RetryConfig::default());
        assert_eq!(settle_policy(&config.actions), SettlePolicy::default());

        let tools = page_tools_config(&config);
        assert_eq!(tools.endpoint, "http://127.0.0.1:9222");
        assert_eq!(tools.history_capacity, 100);
        assert_eq!(tools.command_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides_flow_through() {
        let config = ConfigLoader::load_str(
            r#"
            [capture]
            max_controls = 50
            include_values = true

            [actions]
            typing_delay_ms = 10

            [actions.retry]
            max_attempts = 5
            base_delay_ms = 200

            [actions.settle]
            quiet_window_ms = 250

            [history]
            capacity = 20

            [browser]
            cdp_endpoint = "http://10.0.0.5:9222"
            command_timeout_ms = 5000
            "#,
        )
        .unwrap();

        let request = capture_request(&config.capture);
        assert_eq!(request.max_controls, 50);
        assert!(request.include_values);

        let retry = retry_config(&config.actions);
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(retry.retryable_errors.len(), 4);

        let tools = page_tools_config(&config);
        assert_eq!(tools.endpoint, "http://10.0.0.5:9222");
        assert_eq!(tools.command_timeout, Duration::from_millis(5000));
        assert_eq!(tools.typing_delay, Duration::from_millis(10));
        assert_eq!(tools.settle.quiet_window, Duration::from_millis(250));
        assert_eq!(tools.history_capacity, 20);
    }
}
