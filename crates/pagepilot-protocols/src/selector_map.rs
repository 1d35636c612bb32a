//! Selector map shared between capture and the action engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::page::BoundingBox;

/// One addressable node keyed by its generated selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorMapEntry {
    /// Node id; for statically built maps this is the document-order index.
    pub backend_node_id: i64,
    /// Uppercase tag name.
    pub node_name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_position: Option<BoundingBox>,
    pub is_visible: bool,
}

impl SelectorMapEntry {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorMapMetadata {
    /// Build time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub total_elements: usize,
    pub interactive_elements: usize,
}

/// Per-page addressing table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomSelectorMap {
    /// Compact one-line-per-node rendering of the mapped elements.
    #[serde(default)]
    pub serialized_tree: String,
    pub selector_map: BTreeMap<String, SelectorMapEntry>,
    #[serde(default)]
    pub metadata: SelectorMapMetadata,
}

impl DomSelectorMap {
    pub fn len(&self) -> usize {
        self.selector_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selector_map.is_empty()
    }

    pub fn get(&self, selector: &str) -> Option<&SelectorMapEntry> {
        self.selector_map.get(selector)
    }

    /// Selector of the entry carrying `backend_node_id`.
    pub fn selector_for_node(&self, backend_node_id: i64) -> Option<&str> {
        self.selector_map
            .iter()
            .find(|(_, entry)| entry.backend_node_id == backend_node_id)
            .map(|(selector, _)| selector.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SelectorMapEntry)> {
        self.selector_map.iter()
    }
}
