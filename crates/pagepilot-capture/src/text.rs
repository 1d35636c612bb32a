//! Prose block extraction.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::util::{element_ancestors, rendered_text, truncate_chars};
use crate::visibility::is_visible;

static TEXT_BLOCKS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p, li, blockquote, figcaption, dd, td, th, pre")
        .expect("static selector")
});

const MAX_BLOCK_CHARS: usize = 300;
const MIN_BLOCK_CHARS: usize = 3;

/// Visible prose blocks, deduplicated, at most `max`.
///
/// Blocks nested in another block (a `<p>` inside an `<li>`) are skipped so
/// text is not repeated, and so are blocks inside buttons and links.
pub fn extract_text_blocks(document: &Html, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut blocks = Vec::new();
    for el in document.select(&TEXT_BLOCKS) {
        if blocks.len() >= max {
            break;
        }
        if !is_visible(el) || nested_in_block(el) {
            continue;
        }
        let text = rendered_text(el);
        if text.chars().count() < MIN_BLOCK_CHARS {
            continue;
        }
        let text = truncate_chars(&text, MAX_BLOCK_CHARS);
        if seen.insert(text.clone()) {
            blocks.push(text);
        }
    }
    blocks
}

fn nested_in_block(el: ElementRef<'_>) -> bool {
    element_ancestors(el).any(|ancestor| {
        matches!(
            ancestor.value().name(),
            "p" | "li" | "blockquote" | "figcaption" | "dd" | "td" | "th" | "pre" | "a" | "button"
        )
    })
}
