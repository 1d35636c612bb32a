use scraper::{ElementRef, Node};

/// Collapse runs of whitespace into single spaces and trim.
pub(crate) fn compact_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// Text an element presents to a reader: descendant text, `img[alt]`
/// contributes its alt, form field contents and non-rendered elements
/// are skipped.
pub(crate) fn rendered_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(el, &mut out);
    compact_ws(&out)
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match child_el.value().name() {
                    "script" | "style" | "template" | "select" | "textarea" | "noscript" => {}
                    "img" => {
                        if let Some(alt) = child_el.value().attr("alt") {
                            out.push(' ');
                            out.push_str(alt);
                            out.push(' ');
                        }
                    }
                    _ => {
                        out.push(' ');
                        collect_text(child_el, out);
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

/// Ancestors of `el` that are elements, nearest first.
pub(crate) fn element_ancestors<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.ancestors().filter_map(ElementRef::wrap)
}

/// Non-empty, trimmed attribute value.
pub(crate) fn attr_nonempty<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Lowercased `type` of an `<input>`, defaulting to `text`.
pub(crate) fn input_type(el: ElementRef<'_>) -> String {
    el.value()
        .attr("type")
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "text".to_string())
}
