//! Post-action settling and change detection.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace};

use pagepilot_protocols::action::{DetectedChanges, ScrollDelta};

use crate::driver::{DriverError, ObserverHandle, PageDriver, PageState};

/// How long executors wait for the page to react.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlePolicy {
    /// Fixed pause after an interaction before changes are read.
    pub post_action_delay: Duration,
    /// Mutation-free period that counts as "quiet".
    pub quiet_window: Duration,
    /// Upper bound on waiting for quiet.
    pub max_wait: Duration,
    /// Upper bound on waiting for a URL change after a click.
    pub navigation_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            post_action_delay: Duration::from_millis(100),
            quiet_window: Duration::from_millis(500),
            max_wait: Duration::from_millis(3_000),
            navigation_timeout: Duration::from_millis(5_000),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl SettlePolicy {
    /// Near-zero timings for tests and for callers that settle themselves.
    pub fn immediate() -> Self {
        Self {
            post_action_delay: Duration::ZERO,
            quiet_window: Duration::from_millis(5),
            max_wait: Duration::from_millis(50),
            navigation_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(1),
        }
    }

    pub async fn pause(&self) {
        if !self.post_action_delay.is_zero() {
            tokio::time::sleep(self.post_action_delay).await;
        }
    }
}

/// Page snapshot taken before an interaction.
pub struct ChangeTracker {
    before: PageState,
    observer: Option<ObserverHandle>,
}

impl ChangeTracker {
    /// Record URL and scroll offsets and start a mutation observer. An
    /// observer that cannot be installed only disables mutation counting.
    pub async fn start(driver: &dyn PageDriver) -> Result<Self, DriverError> {
        let before = driver.page_state().await?;
        let observer = match driver.observe_mutations().await {
            Ok(observer) => Some(observer),
            Err(e) => {
                debug!("Mutation observer unavailable: {}", e);
                None
            }
        };
        Ok(Self { before, observer })
    }

    pub fn url_before(&self) -> &str {
        &self.before.url
    }

    async fn mutations(&self, driver: &dyn PageDriver) -> u32 {
        match &self.observer {
            // The observer dies with its document after a navigation.
            Some(observer) => driver.mutation_count(observer).await.unwrap_or(0),
            None => 0,
        }
    }

    /// Poll until the URL differs from the snapshot or the policy's
    /// navigation timeout passes. Returns whether it changed.
    pub async fn wait_for_navigation(&self, driver: &dyn PageDriver, policy: &SettlePolicy) -> bool {
        let deadline = Instant::now() + policy.navigation_timeout;
        loop {
            if let Ok(state) = driver.page_state().await {
                if state.url != self.before.url {
                    debug!("Navigation detected: {} -> {}", self.before.url, state.url);
                    return true;
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(policy.poll_interval).await;
        }
    }

    /// Wait until no mutation arrives for `quiet_window`, bounded by
    /// `max_wait`. Returns the mutation count seen.
    pub async fn wait_for_quiet(&self, driver: &dyn PageDriver, policy: &SettlePolicy) -> u32 {
        let start = Instant::now();
        let mut last = self.mutations(driver).await;
        let mut last_change = start;
        loop {
            tokio::time::sleep(policy.poll_interval).await;
            let now = Instant::now();
            let count = self.mutations(driver).await;
            if count != last {
                trace!("mutations {} -> {}", last, count);
                last = count;
                last_change = now;
            } else if now - last_change >= policy.quiet_window {
                return count;
            }
            if now - start >= policy.max_wait {
                debug!("Page not quiet after {:?}", policy.max_wait);
                return count;
            }
        }
    }

    /// Compare against the snapshot and stop observing.
    pub async fn finish(self, driver: &dyn PageDriver) -> DetectedChanges {
        let dom_mutations = self.mutations(driver).await;
        if let Some(observer) = &self.observer {
            let _ = driver.disconnect(observer).await;
        }

        let Ok(after) = driver.page_state().await else {
            // Mid-navigation; the context to read from is gone.
            return DetectedChanges {
                navigation_occurred: true,
                dom_mutations,
                ..Default::default()
            };
        };

        let navigation_occurred = after.url != self.before.url;
        let dx = after.scroll_x - self.before.scroll_x;
        let dy = after.scroll_y - self.before.scroll_y;
        let scroll_changed = dx != 0.0 || dy != 0.0;

        DetectedChanges {
            navigation_occurred,
            new_url: navigation_occurred.then_some(after.url),
            dom_mutations,
            scroll_changed,
            scroll_delta: scroll_changed.then_some(ScrollDelta { x: dx, y: dy }),
            ..Default::default()
        }
    }
}
