//! CSS selector generation.
//!
//! Produces the shortest selector from a fixed ladder that matches exactly
//! the element at generation time: id, test-id attribute, `tag.class`, a
//! short ancestor path, and finally an `nth-child` path from the root.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::util::{attr_nonempty, element_ancestors};

const TEST_ID_ATTRS: &[&str] = &["data-testid", "data-test", "data-test-id"];
const MAX_PATH_SEGMENTS: usize = 3;

/// Classes describing state, layout or utility styling rather than identity.
static UTILITY_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        [:\[\]/] |
        ^(?:is|has|js|u|ng|v|css|sc|jsx|emotion)-  |
        ^(?:active|selected|disabled|hidden|visible|show|open|closed|focus|hover|current|
            container|row|col|clearfix|block|inline|flex|grid|absolute|relative|fixed|sticky)$ |
        ^(?:[mp][xytrbl]?|w|h|min-w|min-h|max-w|max-h|gap|space-[xy]|col|row|text|bg|border|
            rounded|shadow|font|leading|tracking|items|justify|self|content|d|float|top|left|
            right|bottom|inset|z|opacity|overflow|cursor|transition|duration|ease|transform|
            translate-[xy]|scale|rotate|order|grow|shrink|basis|sm|md|lg|xl|2xl)-
        ",
    )
    .expect("static regex")
});

/// Selector matching `el` within `document`. Never empty.
pub fn generate_selector(el: ElementRef<'_>, document: &Html) -> String {
    let element = el.value();

    if let Some(id) = element.id().map(str::trim).filter(|id| !id.is_empty()) {
        let selector = format!("#{}", css_escape(id));
        if matches_only(&selector, el, document) {
            return selector;
        }
    }

    if let Some((attr, value)) = TEST_ID_ATTRS
        .iter()
        .find_map(|attr| attr_nonempty(el, attr).map(|v| (*attr, v)))
    {
        let selector = format!("[{}=\"{}\"]", attr, escape_attr_value(value));
        if matches_only(&selector, el, document) {
            return selector;
        }
    }

    if let Some(class) = distinguishing_class(el) {
        let selector = format!("{}.{}", element.name(), css_escape(class));
        if matches_only(&selector, el, document) {
            return selector;
        }
    }

    let mut segments = vec![segment(el)];
    let mut ancestors = element_ancestors(el);
    loop {
        let selector = segments.join(" > ");
        if matches_only(&selector, el, document) {
            return selector;
        }
        if segments.len() >= MAX_PATH_SEGMENTS {
            break;
        }
        match ancestors.next() {
            Some(parent) => segments.insert(0, segment(parent)),
            None => break,
        }
    }

    nth_child_path(el)
}

/// Whether `selector` parses and matches `el` and nothing else.
pub fn matches_only(selector: &str, el: ElementRef<'_>, document: &Html) -> bool {
    let Ok(parsed) = Selector::parse(selector) else {
        return false;
    };
    let mut matches = document.select(&parsed);
    matches.next() == Some(el) && matches.next().is_none()
}

fn distinguishing_class<'a>(el: ElementRef<'a>) -> Option<&'a str> {
    el.value()
        .classes()
        .find(|class| !class.is_empty() && !UTILITY_CLASS.is_match(class))
}

fn segment(el: ElementRef<'_>) -> String {
    let tag = el.value().name();
    match distinguishing_class(el) {
        Some(class) => format!("{}.{}", tag, css_escape(class)),
        None => tag.to_string(),
    }
}

/// `html > body > div:nth-child(2) > a` style path. Positions are only added
/// where a same-tag sibling exists.
fn nth_child_path(el: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    let mut current = Some(el);
    while let Some(node) = current {
        parts.push(positioned_tag(node));
        current = node.parent().and_then(ElementRef::wrap);
    }
    parts.reverse();
    parts.join(" > ")
}

fn positioned_tag(el: ElementRef<'_>) -> String {
    let tag = el.value().name();
    let Some(parent) = el.parent() else {
        return tag.to_string();
    };
    let siblings: Vec<ElementRef<'_>> = parent.children().filter_map(ElementRef::wrap).collect();
    let same_tag = siblings.iter().filter(|s| s.value().name() == tag).count();
    if same_tag <= 1 {
        return tag.to_string();
    }
    match siblings.iter().position(|s| *s == el) {
        Some(index) => format!("{}:nth-child({})", tag, index + 1),
        None => tag.to_string(),
    }
}

/// Escape an identifier for use after `#` or `.`.
pub fn css_escape(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let chars: Vec<char> = ident.chars().collect();
    if chars == ['-'] {
        return "\\-".to_string();
    }
    for (i, &ch) in chars.iter().enumerate() {
        let leading_digit =
            ch.is_ascii_digit() && (i == 0 || (i == 1 && chars[0] == '-'));
        if ch == '\0' {
            out.push('\u{FFFD}');
        } else if ch.is_control() || leading_digit {
            out.push_str(&format!("\\{:x} ", ch as u32));
        } else if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii() {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}

fn escape_attr_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    fn selector_for(document: &Html, find: &str) -> String {
        let sel = Selector::parse(find).unwrap();
        let el = document.select(&sel).next().unwrap();
        let generated = generate_selector(el, document);
        assert!(matches_only(&generated, el, document), "{} is not unique", generated);
        generated
    }

    #[test]
    fn test_prefers_id() {
        let d = doc(r#"<button id="save" data-testid="x" class="btn">Save</button>"#);
        assert_eq!(selector_for(&d, "button"), "#save");
    }

    #[test]
    fn test_escapes_awkward_ids() {
        let d = doc(r#"<input id="1st.name"><input id="user:email">"#);
        assert_eq!(selector_for(&d, "input"), "#\\31 st\\.name");
        let generated = selector_for(&d, "input:nth-of-type(2)");
        assert_eq!(generated, "#user\\:email");
    }

    #[test]
    fn test_duplicate_id_falls_through() {
        let d = doc(r#"<div><button id="dup" class="primary">A</button></div><p><button id="dup">B</button></p>"#);
        assert_eq!(selector_for(&d, "div > button"), "button.primary");
    }

    #[test]
    fn test_test_id_attributes() {
        let d = doc(r#"<button data-testid="login-submit" class="btn">Go</button><a data-test="nav-home" href="/">Home</a>"#);
        assert_eq!(selector_for(&d, "button"), r#"[data-testid="login-submit"]"#);
        assert_eq!(selector_for(&d, "a"), r#"[data-test="nav-home"]"#);
    }

    #[test]
    fn test_skips_utility_classes() {
        let d = doc(r#"<button class="px-4 is-active checkout-btn">Pay</button><button class="px-4">Other</button>"#);
        assert_eq!(selector_for(&d, "button"), "button.checkout-btn");
    }

    #[test]
    fn test_ancestor_path() {
        let d = doc(
            r#"<form class="login"><button class="submit">In</button></form>
               <form class="signup"><button class="submit">Up</button></form>"#,
        );
        assert_eq!(selector_for(&d, "form.signup button"), "form.signup > button.submit");
    }

    #[test]
    fn test_nth_child_fallback() {
        let d = doc(r#"<ul><li><a href="/a">A</a></li><li><a href="/b">B</a></li></ul>"#);
        let generated = selector_for(&d, "li:nth-child(2) a");
        assert_eq!(generated, "html > body > ul > li:nth-child(2) > a");
    }

    #[test]
    fn test_matches_only_rejects_malformed() {
        let d = doc("<p>x</p>");
        let el = d.select(&Selector::parse("p").unwrap()).next().unwrap();
        assert!(!matches_only("p[", el, &d));
    }

    #[test]
    fn test_css_escape() {
        assert_eq!(css_escape("simple-id_1"), "simple-id_1");
        assert_eq!(css_escape("9lives"), "\\39 lives");
        assert_eq!(css_escape("-2x"), "-\\32 x");
        assert_eq!(css_escape("-"), "\\-");
        assert_eq!(css_escape("a b"), "a\\ b");
        assert_eq!(css_escape("naïve"), "naïve");
    }
}
