//! [`PageDriver`] over a CDP page session.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use pagepilot_protocols::action::{Modifier, MouseButton};

use super::scripts;
use super::{
    DomRoot, DriverError, ElementDescription, ElementHandle, ElementState, FrameAccess,
    ObserverHandle, PageDriver, PageState, ScrollOp,
};
use crate::cdp::{CallArgument, PageSession, RemoteObject};

/// Drives a live Chrome page through remote object handles.
pub struct CdpPageDriver {
    session: Arc<PageSession>,
}

impl CdpPageDriver {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }

    async fn call_value(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<CallArgument>,
    ) -> Result<Value, DriverError> {
        Ok(self.session.call_function_on(object_id, function, args).await?)
    }

    async fn call_handle(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<CallArgument>,
    ) -> Result<Option<RemoteObject>, DriverError> {
        let remote = self
            .session
            .call_function_handle(object_id, function, args)
            .await?;
        Ok((!remote.is_nullish()).then_some(remote))
    }

    async fn call_element(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<CallArgument>,
    ) -> Result<Option<ElementHandle>, DriverError> {
        let remote = self.call_handle(object_id, function, args).await?;
        Ok(remote.and_then(|r| r.object_id).map(ElementHandle::new))
    }
}

fn object_id(remote: &RemoteObject, what: &str) -> Result<String, DriverError> {
    remote
        .object_id
        .clone()
        .ok_or_else(|| DriverError::Script(format!("{} returned no object", what)))
}

fn json_arg<T: serde::Serialize>(value: &T) -> Result<CallArgument, DriverError> {
    let value = serde_json::to_value(value).map_err(|e| DriverError::Script(e.to_string()))?;
    Ok(CallArgument::value(value))
}

#[async_trait]
impl PageDriver for CdpPageDriver {
    async fn document(&self) -> Result<DomRoot, DriverError> {
        let remote = self.session.evaluate_handle("document").await?;
        Ok(DomRoot::new(object_id(&remote, "document")?))
    }

    async fn query_selector(
        &self,
        root: &DomRoot,
        selector: &str,
    ) -> Result<Option<ElementHandle>, DriverError> {
        self.call_element(
            root.id(),
            scripts::QUERY_SELECTOR,
            vec![CallArgument::value(selector)],
        )
        .await
    }

    async fn query_all(
        &self,
        root: &DomRoot,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        let Some(array) = self
            .call_handle(root.id(), scripts::QUERY_ALL, vec![CallArgument::value(selector)])
            .await?
        else {
            return Ok(Vec::new());
        };
        let array_id = object_id(&array, "querySelectorAll")?;
        let items = self.session.array_items(&array_id).await?;
        let _ = self.session.release_object(&array_id).await;
        Ok(items
            .into_iter()
            .filter_map(|item| item.object_id)
            .map(ElementHandle::new)
            .collect())
    }

    async fn frame_document(&self, frame: &ElementHandle) -> Result<FrameAccess, DriverError> {
        let Some(remote) = self.call_handle(frame.id(), scripts::FRAME_DOCUMENT, vec![]).await?
        else {
            return Ok(FrameAccess::Denied);
        };
        if remote.object_type == "string" {
            return Ok(match remote.value.as_ref().and_then(Value::as_str) {
                Some("not-a-frame") => FrameAccess::NotAFrame,
                _ => FrameAccess::Denied,
            });
        }
        Ok(FrameAccess::Accessible(DomRoot::new(object_id(&remote, "contentDocument")?)))
    }

    async fn shadow_root(&self, host: &ElementHandle) -> Result<Option<DomRoot>, DriverError> {
        let remote = self.call_handle(host.id(), scripts::SHADOW_ROOT, vec![]).await?;
        Ok(remote.and_then(|r| r.object_id).map(DomRoot::new))
    }

    async fn describe(&self, element: &ElementHandle) -> Result<ElementDescription, DriverError> {
        let value = self.call_value(element.id(), scripts::DESCRIBE, vec![]).await?;
        serde_json::from_value(value).map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn element_state(&self, element: &ElementHandle) -> Result<ElementState, DriverError> {
        let value = self.call_value(element.id(), scripts::ELEMENT_STATE, vec![]).await?;
        serde_json::from_value(value).map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn element_from_point(
        &self,
        element: &ElementHandle,
        x: f64,
        y: f64,
    ) -> Result<Option<ElementHandle>, DriverError> {
        self.call_element(
            element.id(),
            scripts::ELEMENT_FROM_POINT,
            vec![CallArgument::value(x), CallArgument::value(y)],
        )
        .await
    }

    async fn contains(
        &self,
        ancestor: &ElementHandle,
        node: &ElementHandle,
    ) -> Result<bool, DriverError> {
        let value = self
            .call_value(
                ancestor.id(),
                scripts::CONTAINS,
                vec![CallArgument::object(node.id())],
            )
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn page_state(&self) -> Result<PageState, DriverError> {
        let value = self.session.evaluate(scripts::PAGE_STATE).await?;
        serde_json::from_value(value).map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn page_html(&self) -> Result<String, DriverError> {
        Ok(self.session.get_content().await?)
    }

    async fn observe_mutations(&self) -> Result<ObserverHandle, DriverError> {
        let remote = self.session.evaluate_handle(scripts::OBSERVE_MUTATIONS).await?;
        Ok(ObserverHandle::new(object_id(&remote, "MutationObserver")?))
    }

    async fn mutation_count(&self, observer: &ObserverHandle) -> Result<u32, DriverError> {
        let value = self.call_value(observer.id(), scripts::MUTATION_COUNT, vec![]).await?;
        Ok(value.as_u64().unwrap_or(0) as u32)
    }

    async fn disconnect(&self, observer: &ObserverHandle) -> Result<(), DriverError> {
        self.call_value(observer.id(), scripts::DISCONNECT, vec![]).await?;
        let _ = self.session.release_object(observer.id()).await;
        Ok(())
    }

    async fn click(
        &self,
        element: &ElementHandle,
        button: MouseButton,
        modifiers: &[Modifier],
    ) -> Result<(), DriverError> {
        trace!("click {:?} {:?} on {}", button, modifiers, element.id());
        self.call_value(
            element.id(),
            scripts::CLICK,
            vec![json_arg(&button)?, json_arg(&modifiers)?],
        )
        .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.call_value(element.id(), scripts::SCROLL_INTO_VIEW, vec![]).await?;
        Ok(())
    }

    async fn focus(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.call_value(element.id(), scripts::FOCUS, vec![]).await?;
        Ok(())
    }

    async fn set_value(&self, element: &ElementHandle, value: &str) -> Result<(), DriverError> {
        self.call_value(element.id(), scripts::SET_VALUE, vec![CallArgument::value(value)])
            .await?;
        Ok(())
    }

    async fn type_char(&self, element: &ElementHandle, ch: char) -> Result<(), DriverError> {
        self.call_value(
            element.id(),
            scripts::TYPE_CHAR,
            vec![CallArgument::value(ch.to_string())],
        )
        .await?;
        Ok(())
    }

    async fn commit_value(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.call_value(element.id(), scripts::COMMIT_VALUE, vec![]).await?;
        Ok(())
    }

    async fn scroll(&self, element: &ElementHandle, op: ScrollOp) -> Result<(), DriverError> {
        let args = match op {
            ScrollOp::By { dx, dy } => vec![
                CallArgument::value("by"),
                CallArgument::value(dx),
                CallArgument::value(dy),
            ],
            ScrollOp::Top => vec![CallArgument::value("top")],
            ScrollOp::Bottom => vec![CallArgument::value("bottom")],
        };
        self.call_value(element.id(), scripts::SCROLL, args).await?;
        Ok(())
    }

    async fn scroll_position(&self, element: &ElementHandle) -> Result<(f64, f64), DriverError> {
        let value = self.call_value(element.id(), scripts::SCROLL_POSITION, vec![]).await?;
        let x = value[0].as_f64().unwrap_or(0.0);
        let y = value[1].as_f64().unwrap_or(0.0);
        Ok((x, y))
    }
}
