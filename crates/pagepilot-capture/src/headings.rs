//! Heading outline extraction.

use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::util::{rendered_text, truncate_chars};
use crate::visibility::is_visible;

static HEADINGS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"h1, h2, h3, h4, h5, h6, [role="heading"]"#).expect("static selector")
});

const MAX_HEADING_CHARS: usize = 150;

/// Visible, non-empty headings in document order, at most `max`.
pub fn extract_headings(document: &Html, max: usize) -> Vec<String> {
    document
        .select(&HEADINGS)
        .filter(|el| is_visible(*el))
        .map(rendered_text)
        .filter(|text| !text.is_empty())
        .map(|text| truncate_chars(&text, MAX_HEADING_CHARS))
        .take(max)
        .collect()
}
