//! The retry loop around the executors.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use pagepilot_protocols::{
    ActionCommand, ActionError, ActionExecutionResult, ActionType, DetectedChanges,
    DomSelectorMap, RetryConfig,
};

use crate::executors::{ActionExecutor, ExecutionEnv, default_executors};
use crate::history::ActionHistory;
use crate::retry::{RetryDecision, RetryStrategy};
use crate::source::SelectorMapSource;

const NOTICE_CAPACITY: usize = 64;

/// Side-channel events for anything watching the agent act.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionNotice {
    /// A stale element forced a selector map refresh.
    PageChanged {
        session_id: String,
        selector_count: usize,
    },
    ActionCompleted {
        session_id: String,
        action_type: ActionType,
        success: bool,
        attempts: u32,
    },
}

/// Result of [`ActionEngine::perform`].
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub result: ActionExecutionResult,
    /// The last map fetched during retries, if any.
    pub updated_selector_map: Option<DomSelectorMap>,
    pub refreshes: u32,
}

/// Validates commands, dispatches them to executors, retries recoverable
/// failures and records every outcome.
pub struct ActionEngine {
    env: ExecutionEnv,
    executors: Vec<Arc<dyn ActionExecutor>>,
    history: Arc<ActionHistory>,
    retry: RetryConfig,
    source: Option<Arc<dyn SelectorMapSource>>,
    notices: broadcast::Sender<ActionNotice>,
}

impl ActionEngine {
    pub fn new(env: ExecutionEnv, history: Arc<ActionHistory>) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            env,
            executors: default_executors(),
            history,
            retry: RetryConfig::default(),
            source: None,
            notices,
        }
    }

    /// Retry policy for commands that carry none.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_selector_map_source(mut self, source: Arc<dyn SelectorMapSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the executor for its action type.
    pub fn with_executor(mut self, executor: Arc<dyn ActionExecutor>) -> Self {
        let action_type = executor.action_type();
        self.executors.retain(|e| e.action_type() != action_type);
        self.executors.push(executor);
        self
    }

    pub fn history(&self) -> &Arc<ActionHistory> {
        &self.history
    }

    pub fn env(&self) -> &ExecutionEnv {
        &self.env
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ActionNotice> {
        self.notices.subscribe()
    }

    fn executor_for(&self, action_type: ActionType) -> Option<&Arc<dyn ActionExecutor>> {
        self.executors.iter().find(|e| e.action_type() == action_type)
    }

    /// Run `command` to completion. Failures are part of the outcome, never
    /// an `Err`.
    pub async fn perform(
        &self,
        command: ActionCommand,
        selector_map: Option<DomSelectorMap>,
    ) -> ActionOutcome {
        let started = Instant::now();
        let mut current_map = selector_map;
        let mut updated_selector_map = None;
        let mut refreshes = 0;

        let (attempts, outcome) = match self.prepare(&command) {
            Err(err) => (1, Err(err)),
            Ok((executor, strategy)) => {
                let mut attempt = 0;
                loop {
                    attempt += 1;
                    let err = match self.attempt(executor, &command, current_map.as_ref()).await {
                        Ok(changes) => break (attempt, Ok(changes)),
                        Err(err) => err,
                    };
                    let RetryDecision::Retry(delay) = strategy.decide(attempt, &err) else {
                        break (attempt, Err(err));
                    };
                    warn!(
                        "{} attempt {} failed ({}), retrying in {:?}",
                        command.describe(),
                        attempt,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;

                    if err.is_stale() {
                        if let Some(map) = self.refresh(&command.session_id).await {
                            refreshes += 1;
                            current_map = Some(map.clone());
                            updated_selector_map = Some(map);
                        }
                    }
                }
            }
        };

        let elapsed = started.elapsed();
        let result = match outcome {
            Ok(changes) => {
                info!(
                    "{} succeeded in {} attempt(s), {} ms",
                    command.describe(),
                    attempts,
                    elapsed.as_millis()
                );
                ActionExecutionResult::succeeded(command, changes, elapsed)
            }
            Err(mut err) => {
                err.message = format!(
                    "{} failed after {} attempt(s): {}",
                    command.describe(),
                    attempts,
                    err.message
                );
                info!("{}", err.message);
                ActionExecutionResult::failed(command, err, elapsed)
            }
        }
        .with_attempts(attempts);

        let session_id = result.action_command.session_id.clone();
        self.history.add_entry(result.clone(), &session_id);
        let _ = self.notices.send(ActionNotice::ActionCompleted {
            session_id,
            action_type: result.action_command.action_type,
            success: result.success,
            attempts,
        });

        ActionOutcome {
            result,
            updated_selector_map,
            refreshes,
        }
    }

    fn prepare(
        &self,
        command: &ActionCommand,
    ) -> Result<(&Arc<dyn ActionExecutor>, RetryStrategy), ActionError> {
        command.validate()?;
        let executor = self.executor_for(command.action_type).ok_or_else(|| {
            ActionError::validation(format!("no executor for '{}'", command.action_type))
        })?;
        let config = command.retry_config.clone().unwrap_or_else(|| self.retry.clone());
        Ok((executor, RetryStrategy::new(config)))
    }

    async fn attempt(
        &self,
        executor: &Arc<dyn ActionExecutor>,
        command: &ActionCommand,
        selector_map: Option<&DomSelectorMap>,
    ) -> Result<DetectedChanges, ActionError> {
        let timeout = command.timeout_duration();
        match tokio::time::timeout(timeout, executor.execute(&self.env, command, selector_map)).await
        {
            Ok(result) => result,
            Err(_) => Err(ActionError::timeout(format!(
                "attempt exceeded {} ms",
                timeout.as_millis()
            ))),
        }
    }

    /// Fetch a new selector map and announce the page change. A failed
    /// refresh keeps the old map.
    async fn refresh(&self, session_id: &str) -> Option<DomSelectorMap> {
        let source = self.source.as_ref()?;
        match source.refresh().await {
            Ok(map) => {
                debug!("Selector map refreshed after stale element: {} entries", map.len());
                let _ = self.notices.send(ActionNotice::PageChanged {
                    session_id: session_id.to_string(),
                    selector_count: map.len(),
                });
                Some(map)
            }
            Err(e) => {
                warn!("Selector map refresh failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
