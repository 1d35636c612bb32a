//! Exponential backoff over recoverable action errors.

use std::time::Duration;

use pagepilot_protocols::{ActionError, RetryConfig};

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep, then try again.
    Retry(Duration),
    GiveUp,
}

/// Applies a [`RetryConfig`] to a sequence of attempts.
#[derive(Debug, Clone, Default)]
pub struct RetryStrategy {
    config: RetryConfig,
}

impl RetryStrategy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// At least one attempt is always made.
    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts.max(1)
    }

    /// Decide after `attempt` (1-based) failed with `error`.
    pub fn decide(&self, attempt: u32, error: &ActionError) -> RetryDecision {
        if attempt >= self.max_attempts() || !self.config.should_retry(error) {
            return RetryDecision::GiveUp;
        }
        RetryDecision::Retry(self.config.delay_for_attempt(attempt))
    }
}
