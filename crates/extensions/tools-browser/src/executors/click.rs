//! Click executor.

use async_trait::async_trait;
use tracing::debug;

use pagepilot_protocols::{
    ActionCommand, ActionError, ActionParameters, ActionType, DetectedChanges, DomSelectorMap,
};

use super::{ActionExecutor, ExecutionEnv, wrong_parameters};
use crate::settle::ChangeTracker;

/// Left clicks use the element's native activation; other buttons and any
/// modifiers dispatch synthetic mouse events.
pub struct ClickExecutor;

#[async_trait]
impl ActionExecutor for ClickExecutor {
    fn action_type(&self) -> ActionType {
        ActionType::Click
    }

    async fn execute(
        &self,
        env: &ExecutionEnv,
        command: &ActionCommand,
        selector_map: Option<&DomSelectorMap>,
    ) -> Result<DetectedChanges, ActionError> {
        let ActionParameters::Click(params) = &command.parameters else {
            return Err(wrong_parameters(command, ActionType::Click));
        };

        let (element, _) = env
            .find_interactable(&command.target_element, selector_map)
            .await?;
        let tracker = ChangeTracker::start(env.driver.as_ref()).await?;

        env.driver
            .click(&element, params.button, &params.modifiers)
            .await?;
        debug!("Clicked {} with {:?}", command.target_element, params.button);

        if params.wait_for_navigation {
            if !tracker.wait_for_navigation(env.driver.as_ref(), &env.settle).await {
                debug!("No navigation within {:?}", env.settle.navigation_timeout);
            }
        } else {
            env.settle.pause().await;
        }

        Ok(tracker.finish(env.driver.as_ref()).await)
    }
}
