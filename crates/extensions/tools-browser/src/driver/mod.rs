//! The seam between the action engine and a live page.
//!
//! Every DOM primitive the engine needs is one [`PageDriver`] method. Handles
//! are opaque strings owned by the driver; two handles to the same node may
//! differ, so identity checks go through [`PageDriver::contains`].

mod cdp;
mod error;
mod scripts;

#[cfg(test)]
pub(crate) mod fake;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pagepilot_protocols::{BoundingBox, action::{Modifier, MouseButton}};

pub use cdp::CdpPageDriver;
pub use error::DriverError;

macro_rules! opaque_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn id(&self) -> &str {
                &self.0
            }
        }
    };
}

opaque_handle!(
    /// A located element.
    ElementHandle
);
opaque_handle!(
    /// A document or shadow root that selectors are evaluated in.
    DomRoot
);
opaque_handle!(
    /// A running mutation observer.
    ObserverHandle
);

/// Result of entering an iframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameAccess {
    Accessible(DomRoot),
    /// The frame's document belongs to another origin.
    Denied,
    /// The element is not a frame.
    NotAFrame,
}

/// Live state of an element, read in one round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementState {
    /// False once the node has been removed from its document.
    pub connected: bool,
    pub visible: bool,
    pub disabled: bool,
    pub checked: Option<bool>,
    /// Viewport-relative box within the element's own frame.
    pub bounding_box: Option<BoundingBox>,
    pub text: String,
    pub value: Option<String>,
    pub editable: bool,
}

/// Static description of an element used for semantic matching and messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementDescription {
    /// Lowercase tag name.
    pub node_name: String,
    pub attributes: BTreeMap<String, String>,
    /// Trimmed visible text, truncated.
    pub text: String,
}

impl ElementDescription {
    /// Short `tag#id.class` label for log and error messages.
    pub fn label(&self) -> String {
        let mut label = self.node_name.clone();
        if let Some(id) = self.attributes.get("id").filter(|v| !v.is_empty()) {
            label.push('#');
            label.push_str(id);
        } else if let Some(class) = self.attributes.get("class") {
            if let Some(first) = class.split_whitespace().next() {
                label.push('.');
                label.push_str(first);
            }
        }
        label
    }
}

/// Top-level page state used for change detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageState {
    pub url: String,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub ready_state: String,
}

/// A scroll applied to the element's nearest scroll container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollOp {
    By { dx: f64, dy: f64 },
    Top,
    Bottom,
}

/// Everything the action engine does to a page.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// The top-level document.
    async fn document(&self) -> Result<DomRoot, DriverError>;

    async fn query_selector(
        &self,
        root: &DomRoot,
        selector: &str,
    ) -> Result<Option<ElementHandle>, DriverError>;

    async fn query_all(&self, root: &DomRoot, selector: &str)
    -> Result<Vec<ElementHandle>, DriverError>;

    async fn frame_document(&self, frame: &ElementHandle) -> Result<FrameAccess, DriverError>;

    async fn shadow_root(&self, host: &ElementHandle) -> Result<Option<DomRoot>, DriverError>;

    async fn describe(&self, element: &ElementHandle) -> Result<ElementDescription, DriverError>;

    async fn element_state(&self, element: &ElementHandle) -> Result<ElementState, DriverError>;

    /// Topmost element at `(x, y)` in the coordinate space of `element`'s frame.
    async fn element_from_point(
        &self,
        element: &ElementHandle,
        x: f64,
        y: f64,
    ) -> Result<Option<ElementHandle>, DriverError>;

    /// True when `node` is `ancestor` or one of its descendants.
    async fn contains(
        &self,
        ancestor: &ElementHandle,
        node: &ElementHandle,
    ) -> Result<bool, DriverError>;

    async fn page_state(&self) -> Result<PageState, DriverError>;

    /// Serialized HTML of the top document.
    async fn page_html(&self) -> Result<String, DriverError>;

    /// Start counting mutations under `document.body`.
    async fn observe_mutations(&self) -> Result<ObserverHandle, DriverError>;

    async fn mutation_count(&self, observer: &ObserverHandle) -> Result<u32, DriverError>;

    async fn disconnect(&self, observer: &ObserverHandle) -> Result<(), DriverError>;

    async fn click(
        &self,
        element: &ElementHandle,
        button: MouseButton,
        modifiers: &[Modifier],
    ) -> Result<(), DriverError>;

    async fn scroll_into_view(&self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn focus(&self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Replace the value and fire `input` and `change`.
    async fn set_value(&self, element: &ElementHandle, value: &str) -> Result<(), DriverError>;

    /// Append one typed character and fire `input`.
    async fn type_char(&self, element: &ElementHandle, ch: char) -> Result<(), DriverError>;

    /// Fire `change` after typing.
    async fn commit_value(&self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn scroll(&self, element: &ElementHandle, op: ScrollOp) -> Result<(), DriverError>;

    /// Scroll offset of the container [`scroll`](Self::scroll) would move.
    async fn scroll_position(&self, element: &ElementHandle) -> Result<(f64, f64), DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_label() {
        let mut desc = ElementDescription {
            node_name: "button".into(),
            ..Default::default()
        };
        assert_eq!(desc.label(), "button");
        desc.attributes.insert("class".into(), "btn primary".into());
        assert_eq!(desc.label(), "button.btn");
        desc.attributes.insert("id".into(), "save".into());
        assert_eq!(desc.label(), "button#save");
    }

    #[test]
    fn test_element_state_deserializes_partial_json() {
        let state: ElementState =
            serde_json::from_str(r#"{"connected": true, "visible": true, "value": "abc"}"#).unwrap();
        assert!(state.connected);
        assert!(!state.disabled);
        assert_eq!(state.value.as_deref(), Some("abc"));
        assert!(state.bounding_box.is_none());
    }
}
