//! Static visibility rules and visible-first prioritization.
//!
//! Without layout, visibility comes from the `hidden` attribute, inline
//! `display`/`visibility`/`opacity` styles, hidden inputs, closed
//! `<details>` bodies and non-rendered containers. `inViewport` has no
//! geometry to work from and mirrors `visible`.

use scraper::ElementRef;

use crate::util::input_type;

/// Whether `el` would be rendered.
pub fn is_visible(el: ElementRef<'_>) -> bool {
    if hidden_by_self(el) {
        return false;
    }
    let mut child = el;
    for ancestor in el.ancestors().filter_map(ElementRef::wrap) {
        if hidden_by_self(ancestor) {
            return false;
        }
        if ancestor.value().name() == "details"
            && ancestor.value().attr("open").is_none()
            && child.value().name() != "summary"
        {
            return false;
        }
        child = ancestor;
    }
    true
}

/// Viewport membership for a statically parsed document.
pub fn is_in_viewport(el: ElementRef<'_>) -> bool {
    is_visible(el)
}

fn hidden_by_self(el: ElementRef<'_>) -> bool {
    let element = el.value();
    match element.name() {
        "head" | "template" | "script" | "style" | "noscript" | "title" | "meta" | "link" => {
            return true;
        }
        "input" if input_type(el) == "hidden" => return true,
        _ => {}
    }
    if element.attr("hidden").is_some() {
        return true;
    }
    element.attr("style").is_some_and(style_hides)
}

/// Inline style declarations that hide an element.
pub(crate) fn style_hides(style: &str) -> bool {
    style.split(';').any(|declaration| {
        let Some((property, value)) = declaration.split_once(':') else {
            return false;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        match property.as_str() {
            "display" => value == "none",
            "visibility" => value == "hidden" || value == "collapse",
            "opacity" => value.parse::<f64>().is_ok_and(|o| o <= 0.0),
            _ => false,
        }
    })
}

/// Stable reorder putting visible items first.
pub fn prioritize_visible<T>(items: Vec<T>, visible: impl Fn(&T) -> bool) -> Vec<T> {
    let (mut shown, hidden): (Vec<T>, Vec<T>) = items.into_iter().partition(|item| visible(item));
    shown.extend(hidden);
    shown
}
