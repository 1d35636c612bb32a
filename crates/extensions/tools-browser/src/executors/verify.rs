//! Verify executor: checks expectations without interacting.

use async_trait::async_trait;
use tracing::debug;

use pagepilot_protocols::action::VerifyParameters;
use pagepilot_protocols::{
    ActionCommand, ActionError, ActionErrorCode, ActionParameters, ActionType, DetectedChanges,
    DomSelectorMap,
};

use super::{ActionExecutor, ExecutionEnv, wrong_parameters};
use crate::driver::ElementState;

/// Locates the target without interactability checks and compares its
/// state to the expectations. A mismatch is `VALIDATION_FAILED`.
pub struct VerifyExecutor;

fn mismatch(what: &str, expected: impl std::fmt::Display, actual: impl std::fmt::Display) -> ActionError {
    ActionError::validation(format!("expected {} to be {}, found {}", what, expected, actual))
}

fn check(params: &VerifyParameters, state: &ElementState) -> Result<(), ActionError> {
    if let Some(expected) = params.visible {
        if state.visible != expected {
            return Err(mismatch("visible", expected, state.visible));
        }
    }
    if let Some(expected) = params.enabled {
        if !state.disabled != expected {
            return Err(mismatch("enabled", expected, !state.disabled));
        }
    }
    if let Some(expected) = params.checked {
        let actual = state.checked.unwrap_or(false);
        if actual != expected {
            return Err(mismatch("checked", expected, actual));
        }
    }
    if let Some(needle) = &params.text_contains {
        let haystack = state.text.to_lowercase();
        if !haystack.contains(&needle.to_lowercase()) {
            return Err(ActionError::validation(format!(
                "expected text to contain \"{}\"",
                needle
            )));
        }
    }
    if let Some(expected) = &params.value_equals {
        let actual = state.value.as_deref().unwrap_or_default();
        if actual != expected.as_str() {
            // Field values stay out of error messages.
            return Err(ActionError::validation(format!(
                "expected value of length {}, found a different value of length {}",
                expected.chars().count(),
                actual.chars().count()
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl ActionExecutor for VerifyExecutor {
    fn action_type(&self) -> ActionType {
        ActionType::Verify
    }

    async fn execute(
        &self,
        env: &ExecutionEnv,
        command: &ActionCommand,
        selector_map: Option<&DomSelectorMap>,
    ) -> Result<DetectedChanges, ActionError> {
        let ActionParameters::Verify(params) = &command.parameters else {
            return Err(wrong_parameters(command, ActionType::Verify));
        };
        let expect_exists = params.exists.unwrap_or(true);

        let element = match env.find(&command.target_element, selector_map).await {
            Ok(element) => element,
            Err(e) if e.code == ActionErrorCode::ElementNotFound && !expect_exists => {
                debug!("{} is absent as expected", command.target_element);
                return Ok(DetectedChanges::default());
            }
            Err(e) => return Err(e),
        };
        if !expect_exists {
            return Err(ActionError::validation(format!(
                "expected {} to be absent",
                command.target_element
            )));
        }

        let state = env.driver.element_state(&element).await?;
        if !state.connected {
            return Err(ActionError::stale("element was detached from the document"));
        }
        check(params, &state)?;
        debug!("Verified {}", command.target_element);
        Ok(DetectedChanges::default())
    }
}
