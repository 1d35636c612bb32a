//! HTML sanitization.
//!
//! Two passes: [`sanitize_html`] drops executable and style blocks from the
//! raw markup before parsing, and [`sanitize_dom_tree`] removes whatever
//! non-content elements survive parsing and scrubs attributes on the parsed
//! elements. Event-handler attributes keep their name with an empty value so
//! `onclick` still marks an element as interactive.

use regex::Regex;
use scraper::{Html, Node, Selector};
use std::sync::LazyLock;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("static regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("static regex"));
static OBJECT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<object\b[^>]*>.*?</object\s*>").expect("static regex"));
static EMBED_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<embed\b[^>]*>").expect("static regex"));
static REMOVED_ELEMENTS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, noscript, template, object, embed").expect("static selector")
});

const URL_ATTRIBUTES: [&str; 4] = ["href", "src", "action", "formaction"];

/// Strip executable and style blocks from raw markup.
pub fn sanitize_html(html: &str) -> String {
    let html = SCRIPT_BLOCK.replace_all(html, "");
    let html = STYLE_BLOCK.replace_all(&html, "");
    let html = OBJECT_BLOCK.replace_all(&html, "");
    EMBED_TAG.replace_all(&html, "").into_owned()
}

fn is_javascript_url(value: &str) -> bool {
    value
        .trim_start()
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}

/// Blank event handlers and neutralize `javascript:` URLs on one element.
fn scrub_attributes(node: &mut Node) {
    let Node::Element(element) = node else {
        return;
    };
    for (name, value) in element.attrs.iter_mut() {
        let local: &str = &name.local;
        if local.len() > 2 && local.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("on")) {
            value.clear();
        } else if URL_ATTRIBUTES.iter().any(|a| local.eq_ignore_ascii_case(a))
            && is_javascript_url(value)
        {
            *value = "#".into();
        }
    }
}

/// Detach non-content elements from a parsed document and scrub the
/// attributes of the rest. Returns how many elements were removed.
pub fn sanitize_dom_tree(document: &mut Html) -> usize {
    let ids: Vec<_> = document.select(&REMOVED_ELEMENTS).map(|el| el.id()).collect();
    let mut removed = 0;
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
            removed += 1;
        }
    }

    let elements: Vec<_> = document
        .tree
        .nodes()
        .filter(|node| node.value().is_element())
        .map(|node| node.id())
        .collect();
    for id in elements {
        if let Some(mut node) = document.tree.get_mut(id) {
            scrub_attributes(node.value());
        }
    }
    removed
}
