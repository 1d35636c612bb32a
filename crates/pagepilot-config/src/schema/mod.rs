//! Configuration schema definitions.
//!
//! Every field has a serde default so an empty file is a valid config.

use serde::{Deserialize, Serialize};

mod schema_actions;

pub use schema_actions::*;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub actions: ActionsConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Capture pipeline limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "default_max_controls")]
    pub max_controls: usize,

    #[serde(default = "default_max_headings")]
    pub max_headings: usize,

    #[serde(default = "default_max_iframe_depth")]
    pub max_iframe_depth: usize,

    /// Report field values (never for password inputs).
    #[serde(default)]
    pub include_values: bool,

    #[serde(default = "default_max_text_blocks")]
    pub max_text_blocks: usize,

    #[serde(default = "default_capture_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_controls: default_max_controls(),
            max_headings: default_max_headings(),
            max_iframe_depth: default_max_iframe_depth(),
            include_values: false,
            max_text_blocks: default_max_text_blocks(),
            timeout_ms: default_capture_timeout_ms(),
        }
    }
}

fn default_max_controls() -> usize {
    400
}

fn default_max_headings() -> usize {
    30
}

fn default_max_iframe_depth() -> usize {
    1
}

fn default_max_text_blocks() -> usize {
    40
}

fn default_capture_timeout_ms() -> u64 {
    30_000
}

/// Action history settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

fn default_history_capacity() -> usize {
    100
}

/// Chrome DevTools connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// HTTP discovery endpoint of a browser started with remote debugging.
    #[serde(default = "default_cdp_endpoint")]
    pub cdp_endpoint: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Reply deadline for a single DevTools command.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            cdp_endpoint: default_cdp_endpoint(),
            connect_timeout_ms: default_connect_timeout_ms(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

fn default_cdp_endpoint() -> String {
    "http://127.0.0.1:9222".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_command_timeout_ms() -> u64 {
    30_000
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily-rolling log files. Console only when unset.
    #[serde(default)]
    pub file_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
