//! Accessible name computation.
//!
//! A heuristic subset of ARIA name computation: labelledby, aria-label,
//! associated `<label>`, button values, alt, title, placeholder and finally
//! the element's own text.

use pagepilot_protocols::ControlRole;
use scraper::{ElementRef, Html};

use crate::util::{attr_nonempty, compact_ws, element_ancestors, input_type, rendered_text, truncate_chars};

/// Maximum length of a computed name.
pub const MAX_NAME_CHARS: usize = 100;

const LABELABLE: &[&str] = &["input", "select", "textarea", "button", "meter", "output", "progress"];

/// Accessible name of `el`, or `None` when no source yields text.
pub fn accessible_name(el: ElementRef<'_>, document: &Html) -> Option<String> {
    compute_name(el, document).map(|name| truncate_chars(&name, MAX_NAME_CHARS))
}

fn compute_name(el: ElementRef<'_>, document: &Html) -> Option<String> {
    let element = el.value();
    let tag = element.name();

    if let Some(ids) = attr_nonempty(el, "aria-labelledby") {
        let text = ids
            .split_whitespace()
            .filter_map(|id| find_by_id(document, id))
            .map(rendered_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !text.is_empty() {
            return Some(text);
        }
    }

    if let Some(label) = attr_nonempty(el, "aria-label") {
        return Some(compact_ws(label));
    }

    if LABELABLE.contains(&tag) {
        if let Some(text) = label_text(el, document) {
            return Some(text);
        }
    }

    if tag == "input" {
        let kind = input_type(el);
        match kind.as_str() {
            "submit" | "reset" | "button" => {
                if let Some(value) = attr_nonempty(el, "value") {
                    return Some(compact_ws(value));
                }
                if kind == "submit" {
                    return Some("Submit".to_string());
                }
                if kind == "reset" {
                    return Some("Reset".to_string());
                }
            }
            "image" => {
                if let Some(alt) = attr_nonempty(el, "alt") {
                    return Some(compact_ws(alt));
                }
            }
            _ => {}
        }
    }

    if tag == "img" {
        if let Some(alt) = attr_nonempty(el, "alt") {
            return Some(compact_ws(alt));
        }
    }

    if let Some(title) = attr_nonempty(el, "title") {
        return Some(compact_ws(title));
    }

    if let Some(placeholder) = attr_nonempty(el, "placeholder") {
        return Some(compact_ws(placeholder));
    }

    if matches!(tag, "input" | "textarea" | "select") {
        return None;
    }

    let text = rendered_text(el);
    (!text.is_empty()).then_some(text)
}

/// Text of the `<label for=id>` or the wrapping `<label>`.
fn label_text(el: ElementRef<'_>, document: &Html) -> Option<String> {
    if let Some(id) = attr_nonempty(el, "id") {
        let explicit = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|candidate| {
                candidate.value().name() == "label" && candidate.value().attr("for") == Some(id)
            });
        if let Some(label) = explicit {
            let text = rendered_text(label);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    element_ancestors(el)
        .find(|ancestor| ancestor.value().name() == "label")
        .map(rendered_text)
        .filter(|text| !text.is_empty())
}

fn find_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|candidate| candidate.value().id() == Some(id))
}

/// Substitute name for elements with no accessible name. `None` means the
/// element carries no naming signal at all and is dropped.
pub fn fallback_name(el: ElementRef<'_>, role: ControlRole) -> Option<String> {
    if let Some(id) = attr_nonempty(el, "id") {
        let humanized = humanize(id);
        if !humanized.is_empty() {
            return Some(truncate_chars(&humanized, MAX_NAME_CHARS));
        }
    }
    if let Some(name) = attr_nonempty(el, "name") {
        let humanized = humanize(name);
        if !humanized.is_empty() {
            return Some(truncate_chars(&humanized, MAX_NAME_CHARS));
        }
    }
    if el.value().name() == "input" {
        return Some(format!("{} input", input_type(el)));
    }
    if role != ControlRole::Region {
        return Some(role.as_str().to_string());
    }
    None
}

/// `user_email`, `userEmail` and `user-email` all become `User email`.
pub(crate) fn humanize(raw: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in raw.chars() {
        if ch == '_' || ch == '-' || ch == '.' || ch == '[' || ch == ']' || ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    let joined = words.join(" ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
