//! Role detection.
//!
//! Roles come from the first valid token of an explicit `role` attribute,
//! then from the tag (and `type` for inputs), and fall back to `region`.

use pagepilot_protocols::ControlRole;
use scraper::ElementRef;

use crate::util::input_type;

/// Semantic role of `el`.
pub fn detect_role(el: ElementRef<'_>) -> ControlRole {
    explicit_role(el)
        .or_else(|| implicit_role(el))
        .unwrap_or(ControlRole::Region)
}

/// First recognized token of the `role` attribute.
pub fn explicit_role(el: ElementRef<'_>) -> Option<ControlRole> {
    el.value()
        .attr("role")?
        .split_whitespace()
        .find_map(ControlRole::from_aria)
}

/// Role implied by the element's tag.
pub fn implicit_role(el: ElementRef<'_>) -> Option<ControlRole> {
    let element = el.value();
    let role = match element.name() {
        "a" | "area" => {
            element.attr("href")?;
            ControlRole::Link
        }
        "button" | "summary" => ControlRole::Button,
        "input" => return input_role(el),
        "select" => {
            let size = element
                .attr("size")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .unwrap_or(0);
            if element.attr("multiple").is_some() || size > 1 {
                ControlRole::Listbox
            } else {
                ControlRole::Combobox
            }
        }
        "textarea" => ControlRole::Textbox,
        "option" => ControlRole::ListOption,
        "dialog" => ControlRole::Dialog,
        "main" => ControlRole::Main,
        "nav" => ControlRole::Navigation,
        "header" => ControlRole::Banner,
        "footer" => ControlRole::Contentinfo,
        "aside" => ControlRole::Complementary,
        "form" => ControlRole::Form,
        "search" => ControlRole::Search,
        _ if is_content_editable(el) => ControlRole::Textbox,
        _ => return None,
    };
    Some(role)
}

fn input_role(el: ElementRef<'_>) -> Option<ControlRole> {
    let role = match input_type(el).as_str() {
        "button" | "submit" | "reset" | "image" | "file" | "color" => ControlRole::Button,
        "checkbox" => ControlRole::Checkbox,
        "radio" => ControlRole::Radio,
        "search" => ControlRole::Searchbox,
        "range" => ControlRole::Slider,
        "number" => ControlRole::Spinbutton,
        "hidden" => return None,
        _ if el.value().attr("list").is_some() => ControlRole::Combobox,
        _ => ControlRole::Textbox,
    };
    Some(role)
}

pub(crate) fn is_content_editable(el: ElementRef<'_>) -> bool {
    el.value()
        .attr("contenteditable")
        .is_some_and(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
}

/// Whether `el` belongs in the control list.
pub fn is_interactive_element(el: ElementRef<'_>) -> bool {
    if detect_role(el).is_widget() {
        return true;
    }
    let element = el.value();
    let focusable = element
        .attr("tabindex")
        .and_then(|t| t.trim().parse::<i32>().ok())
        .is_some_and(|t| t >= 0);
    focusable || element.attr("onclick").is_some() || is_content_editable(el)
}

/// Two-letter id prefix for a role name. Unknown names map to `re`.
pub fn role_prefix(role: &str) -> &'static str {
    match role {
        "button" => "bu",
        "link" => "li",
        "textbox" => "tx",
        "searchbox" => "sb",
        "checkbox" => "cb",
        "radio" => "rd",
        "combobox" => "co",
        "listbox" => "lb",
        "option" => "op",
        "menuitem" => "mi",
        "menuitemcheckbox" => "mc",
        "menuitemradio" => "mr",
        "tab" => "ta",
        "switch" => "sw",
        "slider" => "sl",
        "spinbutton" => "sp",
        "treeitem" => "ti",
        "dialog" => "dg",
        "main" => "ma",
        "navigation" => "na",
        "banner" => "bn",
        "contentinfo" => "ci",
        "complementary" => "cm",
        "search" => "se",
        "form" => "fo",
        _ => "re",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn role_of(html: &str) -> ControlRole {
        let doc = Html::parse_document(&format!("<html><body>{}</body></html>", html));
        let sel = Selector::parse("#t").unwrap();
        detect_role(doc.select(&sel).next().unwrap())
    }

    fn interactive(html: &str) -> bool {
        let doc = Html::parse_document(&format!("<html><body>{}</body></html>", html));
        let sel = Selector::parse("#t").unwrap();
        is_interactive_element(doc.select(&sel).next().unwrap())
    }

    #[test]
    fn test_explicit_role_first_valid_token() {
        assert_eq!(role_of(r#"<div id="t" role="bogus switch button">x</div>"#), ControlRole::Switch);
        assert_eq!(role_of(r#"<a id="t" href="/" role="tab">x</a>"#), ControlRole::Tab);
        assert_eq!(role_of(r#"<button id="t" role="nonsense">x</button>"#), ControlRole::Button);
    }

    #[test]
    fn test_link_requires_href() {
        assert_eq!(role_of(r#"<a id="t" href="/home">x</a>"#), ControlRole::Link);
        assert_eq!(role_of(r#"<a id="t">x</a>"#), ControlRole::Region);
    }

    #[test]
    fn test_input_types() {
        assert_eq!(role_of(r#"<input id="t">"#), ControlRole::Textbox);
        assert_eq!(role_of(r#"<input id="t" type="EMAIL">"#), ControlRole::Textbox);
        assert_eq!(role_of(r#"<input id="t" type="password">"#), ControlRole::Textbox);
        assert_eq!(role_of(r#"<input id="t" type="submit">"#), ControlRole::Button);
        assert_eq!(role_of(r#"<input id="t" type="checkbox">"#), ControlRole::Checkbox);
        assert_eq!(role_of(r#"<input id="t" type="radio">"#), ControlRole::Radio);
        assert_eq!(role_of(r#"<input id="t" type="search">"#), ControlRole::Searchbox);
        assert_eq!(role_of(r#"<input id="t" type="range">"#), ControlRole::Slider);
        assert_eq!(role_of(r#"<input id="t" type="number">"#), ControlRole::Spinbutton);
        assert_eq!(role_of(r#"<input id="t" list="opts">"#), ControlRole::Combobox);
        assert_eq!(role_of(r#"<input id="t" type="hidden">"#), ControlRole::Region);
    }

    #[test]
    fn test_select_variants() {
        assert_eq!(role_of(r#"<select id="t"></select>"#), ControlRole::Combobox);
        assert_eq!(role_of(r#"<select id="t" multiple></select>"#), ControlRole::Listbox);
        assert_eq!(role_of(r#"<select id="t" size="4"></select>"#), ControlRole::Listbox);
    }

    #[test]
    fn test_landmark_tags() {
        assert_eq!(role_of(r#"<nav id="t"></nav>"#), ControlRole::Navigation);
        assert_eq!(role_of(r#"<aside id="t"></aside>"#), ControlRole::Complementary);
        assert_eq!(role_of(r#"<div id="t"></div>"#), ControlRole::Region);
        assert_eq!(role_of(r#"<div id="t" contenteditable="true"></div>"#), ControlRole::Textbox);
    }

    #[test]
    fn test_interactive_heuristics() {
        assert!(interactive(r#"<button id="t">x</button>"#));
        assert!(interactive(r#"<div id="t" tabindex="0">x</div>"#));
        assert!(!interactive(r#"<div id="t" tabindex="-1">x</div>"#));
        assert!(interactive(r#"<span id="t" onclick="">x</span>"#));
        assert!(!interactive(r#"<nav id="t">x</nav>"#));
        assert!(!interactive(r#"<div id="t" role="navigation">x</div>"#));
        assert!(!interactive(r#"<input id="t" type="hidden">"#));
    }

    #[test]
    fn test_role_prefixes() {
        assert_eq!(role_prefix("button"), "bu");
        assert_eq!(role_prefix("link"), "li");
        assert_eq!(role_prefix("textbox"), "tx");
        assert_eq!(role_prefix("checkbox"), "cb");
        assert_eq!(role_prefix("combobox"), "co");
        assert_eq!(role_prefix("whatever"), "re");
        assert_eq!(role_prefix(ControlRole::ListOption.as_str()), "op");
    }
}
