//! Selector map construction from static HTML.
//!
//! Covers the top-level document. Controls inside inline frames are
//! addressed through their `framePath` instead.

use pagepilot_protocols::selector_map::SelectorMapMetadata;
use pagepilot_protocols::{CaptureRequest, DomSelectorMap, SelectorMapEntry, now_millis};
use scraper::ElementRef;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::capture::{collect_candidates, load_frames, parse_sanitized, validate_html};
use crate::error::CaptureError;
use crate::name::accessible_name;
use crate::selector::generate_selector;
use crate::util::input_type;
use crate::visibility::{is_visible, prioritize_visible};

const MAPPED_ATTRIBUTES: &[&str] = &[
    "id",
    "class",
    "name",
    "type",
    "role",
    "href",
    "title",
    "alt",
    "placeholder",
    "aria-label",
    "aria-expanded",
    "aria-checked",
    "data-testid",
    "data-test",
    "data-test-id",
    "value",
];

/// Build the addressing table for `html`.
///
/// `backend_node_id` is the element's index in document order.
pub fn build_selector_map(
    html: &str,
    request: &CaptureRequest,
) -> Result<DomSelectorMap, CaptureError> {
    validate_html(html)?;
    let frames = load_frames(parse_sanitized(html), 0);
    let document = &frames[0].document;

    let order: HashMap<_, i64> = document
        .root_element()
        .descendants()
        .filter(|node| node.value().is_element())
        .enumerate()
        .map(|(index, node)| (node.id(), index as i64))
        .collect();

    let candidates = collect_candidates(&frames);
    let interactive = candidates.len();
    let selected: Vec<_> = prioritize_visible(candidates, |c| c.visible)
        .into_iter()
        .take(request.effective_max_controls())
        .collect();

    let mut selector_map = BTreeMap::new();
    let mut lines = Vec::with_capacity(selected.len());
    for candidate in selected {
        let el = candidate.el;
        let Some(&backend_node_id) = order.get(&el.id()) else {
            continue;
        };
        let selector = generate_selector(el, document);
        let entry = SelectorMapEntry {
            backend_node_id,
            node_name: el.value().name().to_ascii_uppercase(),
            attributes: mapped_attributes(el),
            absolute_position: None,
            is_visible: is_visible(el),
        };
        lines.push(tree_line(&entry, accessible_name(el, document).as_deref()));
        selector_map.insert(selector, entry);
    }

    debug!(entries = selector_map.len(), interactive, "Built selector map");

    Ok(DomSelectorMap {
        serialized_tree: lines.join("\n"),
        selector_map,
        metadata: SelectorMapMetadata {
            timestamp: now_millis(),
            url: request.base_url.clone(),
            total_elements: order.len(),
            interactive_elements: interactive,
        },
    })
}

fn mapped_attributes(el: ElementRef<'_>) -> BTreeMap<String, String> {
    let is_password = el.value().name() == "input" && input_type(el) == "password";
    el.value()
        .attrs()
        .filter(|(name, _)| MAPPED_ATTRIBUTES.contains(name))
        .filter(|(name, _)| !(is_password && *name == "value"))
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn tree_line(entry: &SelectorMapEntry, name: Option<&str>) -> String {
    let mut line = format!("[{}]<{}", entry.backend_node_id, entry.node_name.to_ascii_lowercase());
    for key in ["id", "type", "role", "name"] {
        if let Some(value) = entry.attr(key) {
            line.push_str(&format!(" {}=\"{}\"", key, value));
        }
    }
    line.push('>');
    if let Some(name) = name {
        line.push_str(name);
    }
    if !entry.is_visible {
        line.push_str(" (hidden)");
    }
    line
}
