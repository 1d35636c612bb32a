//! Scoring of elements against a natural-language description.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Attributes that carry human-facing meaning.
pub const MATCHED_ATTRIBUTES: &[&str] = &["name", "aria-label", "placeholder", "title", "role"];

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("static regex"));

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "for", "in", "into", "is", "of", "on", "or", "the", "this", "to", "with",
];

/// What a matcher sees of one candidate element.
#[derive(Debug, Clone, Copy)]
pub struct MatchCandidate<'a> {
    /// Selector text, when the candidate comes from a selector map.
    pub selector: Option<&'a str>,
    /// Tag name in any case.
    pub node_name: &'a str,
    pub attributes: &'a BTreeMap<String, String>,
    /// Visible text, when known.
    pub text: Option<&'a str>,
}

/// Scores candidates for a semantic target. Zero means "no match".
pub trait SemanticMatcher: Send + Sync {
    fn score(&self, description: &str, candidate: &MatchCandidate<'_>) -> f64;
}

/// Fraction of description keywords found in the candidate's selector,
/// labelling attributes, tag name and text.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordMatcher;

impl KeywordMatcher {
    pub fn keywords(description: &str) -> Vec<String> {
        let lower = description.to_lowercase();
        let mut words: Vec<String> = TOKEN
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .filter(|w| !STOPWORDS.contains(&w.as_str()))
            .collect();
        words.dedup();
        words
    }

    fn haystack(candidate: &MatchCandidate<'_>) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(selector) = candidate.selector {
            parts.push(selector.to_lowercase());
        }
        for name in MATCHED_ATTRIBUTES {
            if let Some(value) = candidate.attributes.get(*name) {
                parts.push(value.to_lowercase());
            }
        }
        parts.push(candidate.node_name.to_lowercase());
        if let Some(text) = candidate.text {
            parts.push(text.to_lowercase());
        }
        parts
    }
}

impl SemanticMatcher for KeywordMatcher {
    fn score(&self, description: &str, candidate: &MatchCandidate<'_>) -> f64 {
        let keywords = Self::keywords(description);
        if keywords.is_empty() {
            return 0.0;
        }
        let haystack = Self::haystack(candidate);
        let hits = keywords
            .iter()
            .filter(|k| haystack.iter().any(|h| h.contains(k.as_str())))
            .count();
        hits as f64 / keywords.len() as f64
    }
}
