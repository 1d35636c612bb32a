//! Action engine configuration: timeouts, retry and settle timing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// Applied to commands that do not carry their own timeout.
    #[serde(default = "default_action_timeout_ms")]
    pub default_timeout_ms: u64,

    /// Per-character delay for simulated typing.
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub settle: SettleSettings,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_action_timeout_ms(),
            typing_delay_ms: default_typing_delay_ms(),
            retry: RetrySettings::default(),
            settle: SettleSettings::default(),
        }
    }
}

fn default_action_timeout_ms() -> u64 {
    30_000
}

fn default_typing_delay_ms() -> u64 {
    50
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_backoff_multiplier() -> f64 {
    3.0
}

fn default_max_delay_ms() -> u64 {
    5_000
}

/// How long to wait for the page to settle after an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettleSettings {
    #[serde(default = "default_post_action_delay_ms")]
    pub post_action_delay_ms: u64,

    /// Mutation-free window that counts as quiescent.
    #[serde(default = "default_quiet_window_ms")]
    pub quiet_window_ms: u64,

    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,

    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for SettleSettings {
    fn default() -> Self {
        Self {
            post_action_delay_ms: default_post_action_delay_ms(),
            quiet_window_ms: default_quiet_window_ms(),
            max_wait_ms: default_max_wait_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_post_action_delay_ms() -> u64 {
    100
}

fn default_quiet_window_ms() -> u64 {
    500
}

fn default_max_wait_ms() -> u64 {
    3_000
}

fn default_navigation_timeout_ms() -> u64 {
    5_000
}

fn default_poll_interval_ms() -> u64 {
    50
}
