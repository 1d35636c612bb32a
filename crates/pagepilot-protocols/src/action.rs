//! Page-action commands, results and the `page_action` wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{ActionError, ActionErrorCode};
use crate::selector_map::DomSelectorMap;

pub const MIN_ACTION_TIMEOUT_MS: u64 = 1_000;
pub const MAX_ACTION_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 30_000;

/// Iframe and shadow-host chain to traverse before resolving a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementContext {
    /// Iframe selectors, outermost first.
    #[serde(default)]
    pub iframe_path: Vec<String>,
    /// Shadow host selectors, applied inside the last frame.
    #[serde(default)]
    pub shadow_path: Vec<String>,
}

impl ElementContext {
    pub fn is_root(&self) -> bool {
        self.iframe_path.is_empty() && self.shadow_path.is_empty()
    }
}

/// How an action addresses its element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ElementContext>,
}

impl ElementTarget {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            ..Default::default()
        }
    }

    pub fn node(node_id: i64) -> Self {
        Self {
            node_id: Some(node_id),
            ..Default::default()
        }
    }

    pub fn semantic(description: impl Into<String>) -> Self {
        Self {
            semantic_description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn in_context(mut self, context: ElementContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn has_locator(&self) -> bool {
        self.selector.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self.node_id.is_some()
            || self
                .semantic_description
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty())
    }
}

impl fmt::Display for ElementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(selector) = &self.selector {
            write!(f, "'{}'", selector)
        } else if let Some(node_id) = self.node_id {
            write!(f, "node {}", node_id)
        } else if let Some(desc) = &self.semantic_description {
            write!(f, "\"{}\"", desc)
        } else {
            f.write_str("<no target>")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Click,
    Input,
    Scroll,
    Verify,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Input => "input",
            Self::Scroll => "scroll",
            Self::Verify => "verify",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickParameters {
    pub button: MouseButton,
    pub modifiers: Vec<Modifier>,
    pub wait_for_navigation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputParameters {
    pub text: String,
    #[serde(default = "default_true")]
    pub clear_first: bool,
    #[serde(default)]
    pub simulate_typing: bool,
    /// Per-character delay when typing; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing_delay: Option<u64>,
}

impl InputParameters {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            clear_first: true,
            simulate_typing: false,
            typing_delay: None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
    Top,
    Bottom,
    IntoView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollParameters {
    pub direction: ScrollDirection,
    /// Pixels for directional scrolls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
    #[serde(default)]
    pub wait_for_lazy_load: bool,
}

impl ScrollParameters {
    pub const DEFAULT_AMOUNT: u32 = 300;

    pub fn amount_or_default(&self) -> u32 {
        self.amount.unwrap_or(Self::DEFAULT_AMOUNT)
    }
}

/// Expectations checked by a verify action. Unset fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifyParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_equals: Option<String>,
}

/// Parameters discriminated by the command's `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionParameters {
    Click(ClickParameters),
    Input(InputParameters),
    Scroll(ScrollParameters),
    Verify(VerifyParameters),
}

impl ActionParameters {
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Click(_) => ActionType::Click,
            Self::Input(_) => ActionType::Input,
            Self::Scroll(_) => ActionType::Scroll,
            Self::Verify(_) => ActionType::Verify,
        }
    }

    fn parse(action_type: ActionType, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let value = if value.is_null() {
            serde_json::json!({})
        } else {
            value
        };
        Ok(match action_type {
            ActionType::Click => Self::Click(serde_json::from_value(value)?),
            ActionType::Input => Self::Input(serde_json::from_value(value)?),
            ActionType::Scroll => Self::Scroll(serde_json::from_value(value)?),
            ActionType::Verify => Self::Verify(serde_json::from_value(value)?),
        })
    }

    fn to_value(&self) -> serde_json::Value {
        let value = match self {
            Self::Click(p) => serde_json::to_value(p),
            Self::Input(p) => serde_json::to_value(p),
            Self::Scroll(p) => serde_json::to_value(p),
            Self::Verify(p) => serde_json::to_value(p),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

/// Backoff policy for one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    #[serde(rename = "baseDelay")]
    pub base_delay_ms: u64,
    pub backoff_multiplier: f64,
    #[serde(rename = "maxDelay")]
    pub max_delay_ms: u64,
    pub retryable_errors: Vec<ActionErrorCode>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            backoff_multiplier: 3.0,
            max_delay_ms: 5_000,
            retryable_errors: vec![
                ActionErrorCode::ElementNotInteractable,
                ActionErrorCode::ElementStale,
                ActionErrorCode::ElementObscured,
                ActionErrorCode::Timeout,
            ],
        }
    }
}

impl RetryConfig {
    /// Delay before the retry that follows `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let delay = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        Duration::from_millis((delay as u64).min(self.max_delay_ms))
    }

    /// Whether `error` should be retried: its code is retryable and it was
    /// not flagged as final.
    pub fn should_retry(&self, error: &ActionError) -> bool {
        error.recoverable && self.retryable_errors.contains(&error.code)
    }
}

/// A validated page action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawActionCommand", into = "RawActionCommand")]
pub struct ActionCommand {
    pub action_type: ActionType,
    pub target_element: ElementTarget,
    pub parameters: ActionParameters,
    pub session_id: String,
    pub turn_id: String,
    /// Milliseconds.
    pub timeout: u64,
    pub retry_config: Option<RetryConfig>,
}

impl ActionCommand {
    pub fn new(
        target: ElementTarget,
        parameters: ActionParameters,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            action_type: parameters.action_type(),
            target_element: target,
            parameters,
            session_id: session_id.into(),
            turn_id: String::new(),
            timeout: DEFAULT_ACTION_TIMEOUT_MS,
            retry_config: None,
        }
    }

    pub fn with_turn_id(mut self, turn_id: impl Into<String>) -> Self {
        self.turn_id = turn_id.into();
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = timeout_ms;
        self
    }

    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    /// Check the command before dispatch.
    pub fn validate(&self) -> Result<(), ActionError> {
        if self.parameters.action_type() != self.action_type {
            return Err(ActionError::validation(format!(
                "parameters do not match action type '{}'",
                self.action_type
            )));
        }
        if uuid::Uuid::parse_str(&self.session_id).is_err() {
            return Err(ActionError::validation(format!(
                "sessionId must be a UUID, got '{}'",
                self.session_id
            )));
        }
        if !(MIN_ACTION_TIMEOUT_MS..=MAX_ACTION_TIMEOUT_MS).contains(&self.timeout) {
            return Err(ActionError::validation(format!(
                "timeout must be between {} and {} ms, got {}",
                MIN_ACTION_TIMEOUT_MS, MAX_ACTION_TIMEOUT_MS, self.timeout
            )));
        }
        if !self.target_element.has_locator() {
            return Err(ActionError::validation(
                "targetElement requires one of selector, nodeId or semanticDescription",
            ));
        }
        if let Some(retry) = &self.retry_config {
            if retry.max_attempts == 0 {
                return Err(ActionError::validation("retryConfig.maxAttempts must be at least 1"));
            }
        }
        if let ActionParameters::Scroll(scroll) = &self.parameters {
            if scroll.amount == Some(0) {
                return Err(ActionError::validation("scroll amount must be positive"));
            }
        }
        Ok(())
    }

    /// Human-readable "click on '#submit'" description.
    pub fn describe(&self) -> String {
        format!("{} on {}", self.action_type, self.target_element)
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActionCommand {
    #[serde(rename = "type")]
    action_type: ActionType,
    target_element: ElementTarget,
    #[serde(default)]
    parameters: serde_json::Value,
    session_id: String,
    #[serde(default)]
    turn_id: String,
    #[serde(default = "default_timeout")]
    timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retry_config: Option<RetryConfig>,
}

fn default_timeout() -> u64 {
    DEFAULT_ACTION_TIMEOUT_MS
}

impl RawActionCommand {
    /// Typed parameters only; session id, timeout and target are not checked.
    fn into_command(self) -> Result<ActionCommand, ActionError> {
        let parameters = ActionParameters::parse(self.action_type, self.parameters).map_err(|e| {
            ActionError::validation(format!("invalid {} parameters: {}", self.action_type, e))
        })?;
        Ok(ActionCommand {
            action_type: self.action_type,
            target_element: self.target_element,
            parameters,
            session_id: self.session_id,
            turn_id: self.turn_id,
            timeout: self.timeout,
            retry_config: self.retry_config,
        })
    }
}

impl TryFrom<RawActionCommand> for ActionCommand {
    type Error = ActionError;

    fn try_from(raw: RawActionCommand) -> Result<Self, Self::Error> {
        let command = raw.into_command()?;
        command.validate()?;
        Ok(command)
    }
}

/// Recorded results keep commands that failed validation, so reading one
/// back must not validate again.
fn deserialize_recorded_command<'de, D>(deserializer: D) -> Result<ActionCommand, D::Error>
where
    D: Deserializer<'de>,
{
    RawActionCommand::deserialize(deserializer)?
        .into_command()
        .map_err(serde::de::Error::custom)
}

impl From<ActionCommand> for RawActionCommand {
    fn from(command: ActionCommand) -> Self {
        RawActionCommand {
            action_type: command.action_type,
            target_element: command.target_element,
            parameters: command.parameters.to_value(),
            session_id: command.session_id,
            turn_id: command.turn_id,
            timeout: command.timeout,
            retry_config: command.retry_config,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollDelta {
    pub x: f64,
    pub y: f64,
}

/// Observable effects of an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedChanges {
    pub navigation_occurred: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_url: Option<String>,
    pub dom_mutations: u32,
    pub scroll_changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_delta: Option<ScrollDelta>,
    pub value_changed: bool,
    /// Length of the field value after input; the value itself is never reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_len: Option<usize>,
}

/// Outcome of one action, including its retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionExecutionResult {
    pub success: bool,
    #[serde(deserialize_with = "deserialize_recorded_command")]
    pub action_command: ActionCommand,
    pub timestamp: DateTime<Utc>,
    /// Milliseconds.
    pub duration: u64,
    pub attempts_count: u32,
    pub detected_changes: DetectedChanges,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

impl ActionExecutionResult {
    pub fn succeeded(command: ActionCommand, changes: DetectedChanges, duration: Duration) -> Self {
        Self {
            success: true,
            action_command: command,
            timestamp: Utc::now(),
            duration: duration.as_millis() as u64,
            attempts_count: 1,
            detected_changes: changes,
            error: None,
        }
    }

    pub fn failed(command: ActionCommand, error: ActionError, duration: Duration) -> Self {
        Self {
            success: false,
            action_command: command,
            timestamp: Utc::now(),
            duration: duration.as_millis() as u64,
            attempts_count: 1,
            detected_changes: DetectedChanges::default(),
            error: Some(error),
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts_count = attempts;
        self
    }

    pub fn error_code(&self) -> Option<ActionErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }
}

/// Parameters of the `page_action` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageActionRequest {
    pub action: ActionCommand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector_map: Option<DomSelectorMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageActionData {
    pub result: ActionExecutionResult,
    /// Present when a stale element forced a refresh during retries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_selector_map: Option<DomSelectorMap>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub execution_time_ms: u64,
    pub attempts: u32,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

/// Result of the `page_action` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageActionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PageActionData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
    pub metadata: ResponseMetadata,
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
