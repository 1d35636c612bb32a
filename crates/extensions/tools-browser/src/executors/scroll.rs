//! Scroll executor.

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::debug;

use pagepilot_protocols::action::{ScrollDelta, ScrollDirection, ScrollParameters};
use pagepilot_protocols::{
    ActionCommand, ActionError, ActionParameters, ActionType, DetectedChanges, DomSelectorMap,
};

use super::{ActionExecutor, ExecutionEnv, wrong_parameters};
use crate::driver::{ElementHandle, ScrollOp};
use crate::settle::ChangeTracker;

/// Scrolls the target into view, or scrolls its nearest scroll container
/// (the page when there is none) in a direction.
pub struct ScrollExecutor;

fn scroll_op(params: &ScrollParameters) -> Option<ScrollOp> {
    let amount = params.amount_or_default() as f64;
    match params.direction {
        ScrollDirection::Up => Some(ScrollOp::By { dx: 0.0, dy: -amount }),
        ScrollDirection::Down => Some(ScrollOp::By { dx: 0.0, dy: amount }),
        ScrollDirection::Left => Some(ScrollOp::By { dx: -amount, dy: 0.0 }),
        ScrollDirection::Right => Some(ScrollOp::By { dx: amount, dy: 0.0 }),
        ScrollDirection::Top => Some(ScrollOp::Top),
        ScrollDirection::Bottom => Some(ScrollOp::Bottom),
        ScrollDirection::IntoView => None,
    }
}

/// Poll the scroll offset until two reads agree or `max_wait` passes.
async fn wait_for_scroll_end(
    env: &ExecutionEnv,
    element: &ElementHandle,
) -> Result<(f64, f64), ActionError> {
    let deadline = Instant::now() + env.settle.max_wait;
    let mut last = env.driver.scroll_position(element).await?;
    loop {
        tokio::time::sleep(env.settle.poll_interval).await;
        let current = env.driver.scroll_position(element).await?;
        if current == last || Instant::now() >= deadline {
            return Ok(current);
        }
        last = current;
    }
}

#[async_trait]
impl ActionExecutor for ScrollExecutor {
    fn action_type(&self) -> ActionType {
        ActionType::Scroll
    }

    async fn execute(
        &self,
        env: &ExecutionEnv,
        command: &ActionCommand,
        selector_map: Option<&DomSelectorMap>,
    ) -> Result<DetectedChanges, ActionError> {
        let ActionParameters::Scroll(params) = &command.parameters else {
            return Err(wrong_parameters(command, ActionType::Scroll));
        };

        let element = env.find(&command.target_element, selector_map).await?;
        env.locator.validate_visible(&element).await?;
        let tracker = ChangeTracker::start(env.driver.as_ref()).await?;

        let container_delta = match scroll_op(params) {
            None => {
                env.driver.scroll_into_view(&element).await?;
                wait_for_scroll_end(env, &element).await?;
                None
            }
            Some(op) => {
                let before = env.driver.scroll_position(&element).await?;
                env.driver.scroll(&element, op).await?;
                let after = wait_for_scroll_end(env, &element).await?;
                Some((after.0 - before.0, after.1 - before.1))
            }
        };
        debug!("Scrolled {:?} at {}", params.direction, command.target_element);

        if params.wait_for_lazy_load {
            tracker.wait_for_quiet(env.driver.as_ref(), &env.settle).await;
        } else {
            env.settle.pause().await;
        }

        let mut changes = tracker.finish(env.driver.as_ref()).await;
        if let Some((dx, dy)) = container_delta {
            changes.scroll_changed = dx != 0.0 || dy != 0.0;
            changes.scroll_delta = changes.scroll_changed.then_some(ScrollDelta { x: dx, y: dy });
        }
        Ok(changes)
    }
}
