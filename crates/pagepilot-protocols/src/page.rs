//! Captured page model.
//!
//! A [`PageModel`] is the capped, privacy-redacted summary of a page that an
//! agent reasons over. Every control in it is addressable through `aimap`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hard upper bound for `CaptureRequest::max_controls`.
pub const MAX_CONTROLS_CAP: usize = 400;

/// Semantic role of an interactive control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlRole {
    Button,
    Link,
    Textbox,
    Searchbox,
    Checkbox,
    Radio,
    Combobox,
    Listbox,
    #[serde(rename = "option")]
    ListOption,
    Menuitem,
    Menuitemcheckbox,
    Menuitemradio,
    Tab,
    Switch,
    Slider,
    Spinbutton,
    Treeitem,
    Dialog,
    Main,
    Navigation,
    Banner,
    Contentinfo,
    Complementary,
    Search,
    Form,
    Region,
}

impl ControlRole {
    /// Parse an ARIA role token. `alertdialog` folds into `dialog`.
    pub fn from_aria(token: &str) -> Option<Self> {
        let role = match token.to_ascii_lowercase().as_str() {
            "button" => Self::Button,
            "link" => Self::Link,
            "textbox" => Self::Textbox,
            "searchbox" => Self::Searchbox,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "combobox" => Self::Combobox,
            "listbox" => Self::Listbox,
            "option" => Self::ListOption,
            "menuitem" => Self::Menuitem,
            "menuitemcheckbox" => Self::Menuitemcheckbox,
            "menuitemradio" => Self::Menuitemradio,
            "tab" => Self::Tab,
            "switch" => Self::Switch,
            "slider" => Self::Slider,
            "spinbutton" => Self::Spinbutton,
            "treeitem" => Self::Treeitem,
            "dialog" | "alertdialog" => Self::Dialog,
            "main" => Self::Main,
            "navigation" => Self::Navigation,
            "banner" => Self::Banner,
            "contentinfo" => Self::Contentinfo,
            "complementary" => Self::Complementary,
            "search" => Self::Search,
            "form" => Self::Form,
            "region" => Self::Region,
            _ => return None,
        };
        Some(role)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Link => "link",
            Self::Textbox => "textbox",
            Self::Searchbox => "searchbox",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Combobox => "combobox",
            Self::Listbox => "listbox",
            Self::ListOption => "option",
            Self::Menuitem => "menuitem",
            Self::Menuitemcheckbox => "menuitemcheckbox",
            Self::Menuitemradio => "menuitemradio",
            Self::Tab => "tab",
            Self::Switch => "switch",
            Self::Slider => "slider",
            Self::Spinbutton => "spinbutton",
            Self::Treeitem => "treeitem",
            Self::Dialog => "dialog",
            Self::Main => "main",
            Self::Navigation => "navigation",
            Self::Banner => "banner",
            Self::Contentinfo => "contentinfo",
            Self::Complementary => "complementary",
            Self::Search => "search",
            Self::Form => "form",
            Self::Region => "region",
        }
    }

    /// Roles a user operates directly, as opposed to structural landmarks.
    pub fn is_widget(&self) -> bool {
        !matches!(
            self,
            Self::Dialog
                | Self::Main
                | Self::Navigation
                | Self::Banner
                | Self::Contentinfo
                | Self::Complementary
                | Self::Search
                | Self::Form
                | Self::Region
        )
    }

    /// Roles that carry a `checked` state.
    pub fn is_checkable(&self) -> bool {
        matches!(
            self,
            Self::Checkbox | Self::Radio | Self::Switch | Self::Menuitemcheckbox | Self::Menuitemradio
        )
    }
}

impl std::fmt::Display for ControlRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Landmark categories reported on a page and attached to controls.
///
/// Variant order is the canonical order of `PageModel::regions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkRegion {
    Main,
    Navigation,
    Header,
    Footer,
    Aside,
    Dialog,
    Search,
    Region,
}

impl LandmarkRegion {
    pub const ALL: [LandmarkRegion; 8] = [
        Self::Main,
        Self::Navigation,
        Self::Header,
        Self::Footer,
        Self::Aside,
        Self::Dialog,
        Self::Search,
        Self::Region,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Navigation => "navigation",
            Self::Header => "header",
            Self::Footer => "footer",
            Self::Aside => "aside",
            Self::Dialog => "dialog",
            Self::Search => "search",
            Self::Region => "region",
        }
    }
}

/// Element geometry in CSS pixels. Only available from a live page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Interaction state of a control. Absent fields were not observed.
///
/// `value` and `value_len` are never set for password inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// One addressable interactive element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveControl {
    /// `{prefix}_{n}`, unique within one capture.
    pub id: String,
    pub role: ControlRole,
    pub name: String,
    pub states: ControlState,
    pub selector: String,
    pub visible: bool,
    pub in_viewport: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<LandmarkRegion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Iframe selectors, outermost first, for controls captured inside
    /// inline frames.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frame_path: Vec<String>,
}

/// Result of one capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageModel {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub headings: Vec<String>,
    pub regions: Vec<LandmarkRegion>,
    pub controls: Vec<InteractiveControl>,
    /// Control id to selector.
    pub aimap: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<Vec<String>>,
}

impl PageModel {
    pub fn control(&self, id: &str) -> Option<&InteractiveControl> {
        self.controls.iter().find(|c| c.id == id)
    }

    /// True when `aimap` and `controls` describe the same id/selector pairs.
    pub fn is_consistent(&self) -> bool {
        self.aimap.len() == self.controls.len()
            && self
                .controls
                .iter()
                .all(|c| self.aimap.get(&c.id) == Some(&c.selector))
    }
}

/// Capture options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureRequest {
    /// Base for resolving relative hrefs.
    pub base_url: Option<String>,
    pub max_controls: usize,
    pub max_headings: usize,
    pub include_values: bool,
    pub max_iframe_depth: usize,
    pub max_text_blocks: usize,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            base_url: None,
            max_controls: MAX_CONTROLS_CAP,
            max_headings: 30,
            include_values: false,
            max_iframe_depth: 1,
            max_text_blocks: 40,
        }
    }
}

impl CaptureRequest {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_max_controls(mut self, max: usize) -> Self {
        self.max_controls = max;
        self
    }

    pub fn with_max_headings(mut self, max: usize) -> Self {
        self.max_headings = max;
        self
    }

    pub fn with_include_values(mut self, include: bool) -> Self {
        self.include_values = include;
        self
    }

    /// `max_controls` clamped to the hard cap.
    pub fn effective_max_controls(&self) -> usize {
        self.max_controls.min(MAX_CONTROLS_CAP)
    }
}

/// JSON Schema describing the serialized [`PageModel`].
pub fn page_model_schema() -> serde_json::Value {
    let roles: Vec<&str> = [
        ControlRole::Button,
        ControlRole::Link,
        ControlRole::Textbox,
        ControlRole::Searchbox,
        ControlRole::Checkbox,
        ControlRole::Radio,
        ControlRole::Combobox,
        ControlRole::Listbox,
        ControlRole::ListOption,
        ControlRole::Menuitem,
        ControlRole::Menuitemcheckbox,
        ControlRole::Menuitemradio,
        ControlRole::Tab,
        ControlRole::Switch,
        ControlRole::Slider,
        ControlRole::Spinbutton,
        ControlRole::Treeitem,
        ControlRole::Dialog,
        ControlRole::Main,
        ControlRole::Navigation,
        ControlRole::Banner,
        ControlRole::Contentinfo,
        ControlRole::Complementary,
        ControlRole::Search,
        ControlRole::Form,
        ControlRole::Region,
    ]
    .iter()
    .map(|r| r.as_str())
    .collect();
    let regions: Vec<&str> = LandmarkRegion::ALL.iter().map(|r| r.as_str()).collect();

    serde_json::json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "PageModel",
        "type": "object",
        "required": ["title", "headings", "regions", "controls", "aimap"],
        "additionalProperties": false,
        "properties": {
            "title": { "type": "string", "maxLength": 200 },
            "url": { "type": "string" },
            "headings": { "type": "array", "items": { "type": "string" } },
            "regions": {
                "type": "array",
                "uniqueItems": true,
                "items": { "enum": regions }
            },
            "controls": {
                "type": "array",
                "maxItems": MAX_CONTROLS_CAP,
                "items": {
                    "type": "object",
                    "required": ["id", "role", "name", "states", "selector", "visible", "inViewport"],
                    "additionalProperties": false,
                    "properties": {
                        "id": { "type": "string", "pattern": "^[a-z]{2}_\\d+$" },
                        "role": { "enum": roles },
                        "name": { "type": "string", "minLength": 1 },
                        "selector": { "type": "string", "minLength": 1 },
                        "visible": { "type": "boolean" },
                        "inViewport": { "type": "boolean" },
                        "region": { "enum": regions },
                        "framePath": { "type": "array", "items": { "type": "string" } },
                        "boundingBox": {
                            "type": "object",
                            "required": ["x", "y", "width", "height"],
                            "properties": {
                                "x": { "type": "number" },
                                "y": { "type": "number" },
                                "width": { "type": "number" },
                                "height": { "type": "number" }
                            }
                        },
                        "states": {
                            "type": "object",
                            "additionalProperties": false,
                            "properties": {
                                "checked": { "type": "boolean" },
                                "disabled": { "type": "boolean" },
                                "required": { "type": "boolean" },
                                "expanded": { "type": "boolean" },
                                "href": { "type": "string" },
                                "placeholder": { "type": "string" },
                                "value_len": { "type": "integer", "minimum": 0 },
                                "value": { "type": "string" }
                            }
                        }
                    }
                }
            },
            "aimap": {
                "type": "object",
                "propertyNames": { "pattern": "^[a-z]{2}_\\d+$" },
                "additionalProperties": { "type": "string" }
            },
            "textContent": { "type": "array", "items": { "type": "string" } }
        }
    })
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
