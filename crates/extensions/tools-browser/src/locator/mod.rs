//! Target resolution and interactability checks.

mod matcher;

use std::sync::Arc;

use tracing::{debug, trace};

use pagepilot_protocols::{ActionError, DomSelectorMap, ElementTarget};

use crate::driver::{DomRoot, ElementHandle, ElementState, PageDriver};

pub use matcher::{KeywordMatcher, MATCHED_ATTRIBUTES, MatchCandidate, SemanticMatcher};

/// Live elements considered for a semantic target when no selector map
/// produced a match.
pub const SEMANTIC_CANDIDATES: &str = "a[href], button, input, select, textarea, summary, label, \
     [role], [onclick], [tabindex], [contenteditable='true']";

/// Resolves an [`ElementTarget`] within a root.
pub struct ElementLocator {
    driver: Arc<dyn PageDriver>,
    matcher: Arc<dyn SemanticMatcher>,
}

impl ElementLocator {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self::with_matcher(driver, Arc::new(KeywordMatcher))
    }

    pub fn with_matcher(driver: Arc<dyn PageDriver>, matcher: Arc<dyn SemanticMatcher>) -> Self {
        Self { driver, matcher }
    }

    /// Find the target: by selector, else by node id through the selector
    /// map, else by semantic description. `Ok(None)` means nothing matched.
    pub async fn locate_element(
        &self,
        root: &DomRoot,
        target: &ElementTarget,
        selector_map: Option<&DomSelectorMap>,
    ) -> Result<Option<ElementHandle>, ActionError> {
        if let Some(selector) = target.selector.as_deref().filter(|s| !s.trim().is_empty()) {
            return Ok(self.driver.query_selector(root, selector).await?);
        }

        if let Some(node_id) = target.node_id {
            let map = selector_map.ok_or_else(|| {
                ActionError::validation("nodeId targets need a selector map")
            })?;
            let Some(selector) = map.selector_for_node(node_id) else {
                debug!("node {} is not in the selector map", node_id);
                return Ok(None);
            };
            return Ok(self.driver.query_selector(root, selector).await?);
        }

        if let Some(description) = target
            .semantic_description
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            return self.locate_semantic(root, description, selector_map).await;
        }

        Err(ActionError::validation(
            "targetElement requires one of selector, nodeId or semanticDescription",
        ))
    }

    async fn locate_semantic(
        &self,
        root: &DomRoot,
        description: &str,
        selector_map: Option<&DomSelectorMap>,
    ) -> Result<Option<ElementHandle>, ActionError> {
        if let Some(map) = selector_map {
            let mut best: Option<(&str, f64, bool)> = None;
            for (selector, entry) in map.iter() {
                let candidate = MatchCandidate {
                    selector: Some(selector.as_str()),
                    node_name: &entry.node_name,
                    attributes: &entry.attributes,
                    text: None,
                };
                let score = self.matcher.score(description, &candidate);
                // Visible entries win ties.
                let better = match best {
                    None => score > 0.0,
                    Some((_, s, visible)) => score > s || (score == s && entry.is_visible && !visible),
                };
                if better {
                    best = Some((selector.as_str(), score, entry.is_visible));
                }
            }
            if let Some((selector, score, _)) = best {
                debug!("\"{}\" matched '{}' (score {:.2})", description, selector, score);
                if let Some(found) = self.driver.query_selector(root, selector).await? {
                    return Ok(Some(found));
                }
            }
        }

        let mut best: Option<(ElementHandle, f64)> = None;
        for element in self.driver.query_all(root, SEMANTIC_CANDIDATES).await? {
            let desc = self.driver.describe(&element).await?;
            let candidate = MatchCandidate {
                selector: None,
                node_name: &desc.node_name,
                attributes: &desc.attributes,
                text: Some(desc.text.as_str()),
            };
            let score = self.matcher.score(description, &candidate);
            trace!("candidate {} scored {:.2}", desc.label(), score);
            if score > 0.0 && best.as_ref().is_none_or(|(_, s)| score > *s) {
                best = Some((element, score));
            }
        }
        Ok(best.map(|(element, _)| element))
    }

    /// Check that `element` can receive input. Returns the state read.
    pub async fn validate_interactability(
        &self,
        element: &ElementHandle,
    ) -> Result<ElementState, ActionError> {
        let state = self.validate_visible(element).await?;
        if state.disabled {
            return Err(ActionError::not_interactable("element is disabled", false));
        }

        if let Some(bbox) = state.bounding_box.filter(|b| !b.is_empty()) {
            let (x, y) = bbox.center();
            if let Some(hit) = self.driver.element_from_point(element, x, y).await? {
                if !self.driver.contains(element, &hit).await? {
                    let covering = self
                        .driver
                        .describe(&hit)
                        .await
                        .map(|d| d.label())
                        .unwrap_or_else(|_| "another element".to_string());
                    return Err(ActionError::obscured(format!(
                        "element is covered by {} at ({:.0}, {:.0})",
                        covering, x, y
                    )));
                }
            }
        }
        Ok(state)
    }

    /// Attached and rendered; no enabled or hit-test checks. Scroll targets
    /// may sit outside the viewport, so this is all they need.
    pub async fn validate_visible(
        &self,
        element: &ElementHandle,
    ) -> Result<ElementState, ActionError> {
        let state = self.driver.element_state(element).await?;
        if !state.connected {
            return Err(ActionError::stale("element was detached from the document"));
        }
        if !state.visible {
            return Err(ActionError::not_interactable("element is not visible", true));
        }
        Ok(state)
    }
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
