//! Click, input, scroll and verify executors.
//!
//! Every executor follows the same shape: enter the target's context,
//! locate, validate, snapshot, interact, settle, then report
//! [`DetectedChanges`].

mod click;
mod input;
mod scroll;
mod verify;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use pagepilot_protocols::{
    ActionCommand, ActionError, ActionType, DetectedChanges, DomSelectorMap, ElementTarget,
};

use crate::driver::{ElementHandle, ElementState, PageDriver};
use crate::locator::ElementLocator;
use crate::navigator::ContextNavigator;
use crate::settle::SettlePolicy;

pub use click::ClickExecutor;
pub use input::InputExecutor;
pub use scroll::ScrollExecutor;
pub use verify::VerifyExecutor;

/// Default per-character delay for simulated typing.
pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(50);

/// Collaborators shared by all executors.
pub struct ExecutionEnv {
    pub driver: Arc<dyn PageDriver>,
    pub navigator: ContextNavigator,
    pub locator: ElementLocator,
    pub settle: SettlePolicy,
    pub typing_delay: Duration,
}

impl ExecutionEnv {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            navigator: ContextNavigator::new(driver.clone()),
            locator: ElementLocator::new(driver.clone()),
            driver,
            settle: SettlePolicy::default(),
            typing_delay: DEFAULT_TYPING_DELAY,
        }
    }

    pub fn with_locator(mut self, locator: ElementLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_settle(mut self, settle: SettlePolicy) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_typing_delay(mut self, delay: Duration) -> Self {
        self.typing_delay = delay;
        self
    }

    /// Enter the target's context and locate it; `ELEMENT_NOT_FOUND` when
    /// nothing matches.
    pub async fn find(
        &self,
        target: &ElementTarget,
        selector_map: Option<&DomSelectorMap>,
    ) -> Result<ElementHandle, ActionError> {
        let root = self
            .navigator
            .navigate_to_context(target.context.as_ref())
            .await?;
        self.locator
            .locate_element(&root, target, selector_map)
            .await?
            .ok_or_else(|| ActionError::not_found(format!("no element matches {}", target)))
    }

    /// [`find`](Self::find), scroll into view, then check interactability.
    pub async fn find_interactable(
        &self,
        target: &ElementTarget,
        selector_map: Option<&DomSelectorMap>,
    ) -> Result<(ElementHandle, ElementState), ActionError> {
        let element = self.find(target, selector_map).await?;
        self.driver.scroll_into_view(&element).await?;
        let state = self.locator.validate_interactability(&element).await?;
        Ok((element, state))
    }
}

/// Performs one kind of action, once. Retries happen above this layer.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    fn action_type(&self) -> ActionType;

    async fn execute(
        &self,
        env: &ExecutionEnv,
        command: &ActionCommand,
        selector_map: Option<&DomSelectorMap>,
    ) -> Result<DetectedChanges, ActionError>;
}

/// The executor for each action type.
pub fn default_executors() -> Vec<Arc<dyn ActionExecutor>> {
    vec![
        Arc::new(ClickExecutor),
        Arc::new(InputExecutor),
        Arc::new(ScrollExecutor),
        Arc::new(VerifyExecutor),
    ]
}

/// Parameter mismatch; `ActionCommand::validate` normally rules this out.
fn wrong_parameters(command: &ActionCommand, expected: ActionType) -> ActionError {
    ActionError::validation(format!(
        "{} executor received {} parameters",
        expected,
        command.parameters.action_type()
    ))
}

#[cfg(test)]
#[path = "executors_tests.rs"]
mod tests;
