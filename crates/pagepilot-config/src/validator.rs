//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Hard cap on captured controls; larger values are clamped at capture time.
const MAX_CONTROLS_CAP: usize = 400;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_capture(config, &mut result);
        Self::validate_actions(config, &mut result);
        Self::validate_history(config, &mut result);
        Self::validate_browser(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    fn validate_capture(config: &Config, result: &mut ValidationResult) {
        let capture = &config.capture;
        if capture.max_controls == 0 {
            result.add_error(ValidationError::new(
                "capture.max_controls",
                "max_controls must be greater than 0",
            ));
        } else if capture.max_controls > MAX_CONTROLS_CAP {
            result.add_warning(ValidationWarning::new(
                "capture.max_controls",
                format!("max_controls above {} is clamped to {}", MAX_CONTROLS_CAP, MAX_CONTROLS_CAP),
            ));
        }

        if capture.timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "capture.timeout_ms",
                "timeout_ms must be greater than 0",
            ));
        }

        if capture.max_iframe_depth > 5 {
            result.add_warning(ValidationWarning::new(
                "capture.max_iframe_depth",
                "deep iframe traversal can make captures slow",
            ));
        }

        if capture.include_values {
            result.add_warning(ValidationWarning::new(
                "capture.include_values",
                "field values will appear in captured page models",
            ));
        }
    }

    fn validate_actions(config: &Config, result: &mut ValidationResult) {
        let actions = &config.actions;
        if !(1_000..=60_000).contains(&actions.default_timeout_ms) {
            result.add_error(ValidationError::new(
                "actions.default_timeout_ms",
                "default_timeout_ms must be between 1000 and 60000",
            ));
        }

        let retry = &actions.retry;
        if retry.max_attempts == 0 {
            result.add_error(ValidationError::new(
                "actions.retry.max_attempts",
                "max_attempts must be at least 1",
            ));
        }
        if retry.max_attempts > 10 {
            result.add_warning(ValidationWarning::new(
                "actions.retry.max_attempts",
                "more than 10 attempts delays failure reporting considerably",
            ));
        }
        if retry.backoff_multiplier < 1.0 {
            result.add_error(ValidationError::new(
                "actions.retry.backoff_multiplier",
                "backoff_multiplier must be at least 1.0",
            ));
        }
        if retry.max_delay_ms < retry.base_delay_ms {
            result.add_warning(ValidationWarning::new(
                "actions.retry.max_delay_ms",
                "max_delay_ms is below base_delay_ms, every retry uses max_delay_ms",
            ));
        }

        let settle = &actions.settle;
        if settle.poll_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "actions.settle.poll_interval_ms",
                "poll_interval_ms must be greater than 0",
            ));
        }
        if settle.quiet_window_ms > settle.max_wait_ms {
            result.add_warning(ValidationWarning::new(
                "actions.settle.quiet_window_ms",
                "quiet_window_ms exceeds max_wait_ms, lazy-load waits always time out",
            ));
        }
    }

    fn validate_history(config: &Config, result: &mut ValidationResult) {
        if config.history.capacity == 0 {
            result.add_error(ValidationError::new(
                "history.capacity",
                "capacity must be greater than 0",
            ));
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        let endpoint = &config.browser.cdp_endpoint;
        if endpoint.is_empty() {
            result.add_error(ValidationError::new(
                "browser.cdp_endpoint",
                "cdp_endpoint cannot be empty",
            ));
        } else if !(endpoint.starts_with("http://")
            || endpoint.starts_with("https://")
            || endpoint.starts_with("ws://"))
        {
            result.add_error(ValidationError::new(
                "browser.cdp_endpoint",
                "cdp_endpoint must be an http(s):// or ws:// URL",
            ));
        }
        if config.browser.command_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "browser.command_timeout_ms",
                "command_timeout_ms must be greater than 0",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let valid = ["trace", "debug", "info", "warn", "error"];
        let level = config.logging.level.to_lowercase();
        // Full filter directives such as "pagepilot=debug" are accepted as is.
        if !level.contains('=') && !valid.contains(&level.as_str()) {
            result.add_error(ValidationError::new(
                "logging.level",
                format!("unknown log level '{}'", config.logging.level),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
