//! Control state extraction with value redaction.

use pagepilot_protocols::{ControlRole, ControlState};
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::util::{attr_nonempty, element_ancestors, input_type};

static SELECTED_OPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option[selected]").expect("static selector"));
static ANY_OPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option").expect("static selector"));

/// Inputs whose value is not free text.
const NON_TEXT_INPUTS: &[&str] = &[
    "button", "submit", "reset", "image", "file", "color", "checkbox", "radio", "hidden",
];

/// Interaction state of `el`.
///
/// `value_len` is reported for every value-bearing field, `value` only when
/// `include_values` is set. Password inputs report neither.
pub fn extract_states(
    el: ElementRef<'_>,
    role: ControlRole,
    include_values: bool,
    base_url: Option<&str>,
) -> ControlState {
    let element = el.value();
    let mut state = ControlState::default();

    if role.is_checkable() {
        state.checked = checked_state(el);
    }

    if is_disabled(el) {
        state.disabled = Some(true);
    }

    if element.attr("required").is_some() || aria_true(el, "aria-required") {
        state.required = Some(true);
    }

    state.expanded = match element.attr("aria-expanded").map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") => Some(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Some(false),
        _ if element.name() == "summary" => el
            .parent()
            .and_then(ElementRef::wrap)
            .filter(|parent| parent.value().name() == "details")
            .map(|details| details.value().attr("open").is_some()),
        _ => None,
    };

    if role == ControlRole::Link {
        state.href = element
            .attr("href")
            .and_then(|href| normalize_href(href, base_url));
    }

    state.placeholder = attr_nonempty(el, "placeholder").map(str::to_string);

    if let Some(value) = field_value(el) {
        state.value_len = Some(value.chars().count());
        if include_values {
            state.value = Some(value);
        }
    }

    state
}

fn checked_state(el: ElementRef<'_>) -> Option<bool> {
    let element = el.value();
    if element.name() == "input" && matches!(input_type(el).as_str(), "checkbox" | "radio") {
        return Some(element.attr("checked").is_some());
    }
    match element.attr("aria-checked").map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("mixed") => Some(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn aria_true(el: ElementRef<'_>, attr: &str) -> bool {
    el.value()
        .attr(attr)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Native `disabled`, a disabled `<fieldset>` ancestor, or `aria-disabled`.
pub fn is_disabled(el: ElementRef<'_>) -> bool {
    let element = el.value();
    let form_control = matches!(
        element.name(),
        "button" | "input" | "select" | "textarea" | "option" | "optgroup" | "fieldset"
    );
    if form_control && element.attr("disabled").is_some() {
        return true;
    }
    if form_control
        && element_ancestors(el).any(|a| a.value().name() == "fieldset" && a.value().attr("disabled").is_some())
    {
        return true;
    }
    aria_true(el, "aria-disabled")
}

/// Current value of a value-bearing field. `None` for password inputs and
/// non-field elements.
fn field_value(el: ElementRef<'_>) -> Option<String> {
    let element = el.value();
    match element.name() {
        "input" => {
            let kind = input_type(el);
            if kind == "password" || NON_TEXT_INPUTS.contains(&kind.as_str()) {
                return None;
            }
            Some(element.attr("value").unwrap_or_default().to_string())
        }
        "textarea" => Some(el.text().collect::<String>()),
        "select" => {
            let option = el
                .select(&SELECTED_OPTION)
                .next()
                .or_else(|| el.select(&ANY_OPTION).next())?;
            let value = option
                .value()
                .attr("value")
                .map(str::to_string)
                .unwrap_or_else(|| option.text().collect::<String>().trim().to_string());
            Some(value)
        }
        _ => None,
    }
}

/// Resolve `href` against `base_url`. Script URLs and bare `#` are dropped.
pub fn normalize_href(href: &str, base_url: Option<&str>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href == "#" {
        return None;
    }
    if href.get(..11).is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:")) {
        return None;
    }
    let resolved = base_url
        .and_then(|base| Url::parse(base).ok())
        .and_then(|base| base.join(href).ok())
        .map(|url| url.to_string());
    Some(resolved.unwrap_or_else(|| href.to_string()))
}
