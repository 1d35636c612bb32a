//! Input executor.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use pagepilot_protocols::{
    ActionCommand, ActionError, ActionParameters, ActionType, DetectedChanges, DomSelectorMap,
};

use super::{ActionExecutor, ExecutionEnv, wrong_parameters};
use crate::settle::ChangeTracker;

/// Sets a field's value in one step, or types it character by character.
/// Either way the page sees `input` and `change` events.
pub struct InputExecutor;

#[async_trait]
impl ActionExecutor for InputExecutor {
    fn action_type(&self) -> ActionType {
        ActionType::Input
    }

    async fn execute(
        &self,
        env: &ExecutionEnv,
        command: &ActionCommand,
        selector_map: Option<&DomSelectorMap>,
    ) -> Result<DetectedChanges, ActionError> {
        let ActionParameters::Input(params) = &command.parameters else {
            return Err(wrong_parameters(command, ActionType::Input));
        };

        let (element, state) = env
            .find_interactable(&command.target_element, selector_map)
            .await?;
        if !state.editable {
            return Err(ActionError::not_interactable(
                format!("{} does not accept text", command.target_element),
                false,
            ));
        }

        let before = state.value.clone().unwrap_or_default();
        let tracker = ChangeTracker::start(env.driver.as_ref()).await?;
        env.driver.focus(&element).await?;

        if params.simulate_typing {
            if params.clear_first && !before.is_empty() {
                env.driver.set_value(&element, "").await?;
            }
            let delay = params
                .typing_delay
                .map(Duration::from_millis)
                .unwrap_or(env.typing_delay);
            for ch in params.text.chars() {
                env.driver.type_char(&element, ch).await?;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            env.driver.commit_value(&element).await?;
        } else {
            let next = if params.clear_first {
                params.text.clone()
            } else {
                format!("{}{}", before, params.text)
            };
            env.driver.set_value(&element, &next).await?;
        }
        debug!(
            "Entered {} characters into {}",
            params.text.chars().count(),
            command.target_element
        );

        env.settle.pause().await;
        let after = env.driver.element_state(&element).await;
        let mut changes = tracker.finish(env.driver.as_ref()).await;
        // A field replaced by a re-render has no value to compare.
        if let Some(after) = after.ok().filter(|s| s.connected) {
            let value = after.value.unwrap_or_default();
            changes.value_changed = value != before;
            changes.value_len = Some(value.chars().count());
        }
        Ok(changes)
    }
}
