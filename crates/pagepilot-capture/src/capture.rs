//! Capture orchestrator.
//!
//! Validates and sanitizes the markup, parses it, folds in inline
//! (`srcdoc`) iframes, collects interactive candidates, orders them
//! visible-first, applies the control cap and turns each survivor into an
//! [`InteractiveControl`] with an id and an `aimap` entry.

use pagepilot_protocols::{
    CaptureRequest, ControlRole, InteractiveControl, LandmarkRegion, PageModel,
};
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::error::CaptureError;
use crate::headings::extract_headings;
use crate::name::{accessible_name, fallback_name};
use crate::regions::{detect_regions, most_specific_region};
use crate::roles::{detect_role, is_interactive_element, role_prefix};
use crate::sanitize::{sanitize_dom_tree, sanitize_html};
use crate::selector::generate_selector;
use crate::states::extract_states;
use crate::text::extract_text_blocks;
use crate::util::{compact_ws, truncate_chars};
use crate::visibility::{is_in_viewport, is_visible, prioritize_visible};

/// Largest accepted document.
pub const MAX_HTML_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_TITLE_CHARS: usize = 200;
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

static CANDIDATES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        r#"a[href], area[href], button, input:not([type="hidden"]), select, textarea, summary, [role], [tabindex], [onclick], [contenteditable="true"]"#,
    )
    .expect("static selector")
});
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));
static INLINE_FRAMES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe[srcdoc]").expect("static selector"));

/// A parsed document: the page itself or an inline iframe inside it.
pub(crate) struct Frame {
    pub(crate) document: Html,
    /// Iframe selectors from the top document down to this frame.
    pub(crate) path: Vec<String>,
    /// False when the iframe element itself is hidden.
    pub(crate) visible: bool,
    /// Landmark around the iframe element in its parent document.
    pub(crate) region: Option<LandmarkRegion>,
    depth: usize,
}

pub(crate) struct Candidate<'a> {
    pub(crate) el: ElementRef<'a>,
    pub(crate) frame: &'a Frame,
    pub(crate) visible: bool,
}

/// Per-prefix id counters for one capture.
#[derive(Default)]
struct IdAllocator {
    counters: HashMap<&'static str, u32>,
}

impl IdAllocator {
    fn next(&mut self, role: ControlRole) -> String {
        let prefix = role_prefix(role.as_str());
        let counter = self.counters.entry(prefix).or_insert(0);
        *counter += 1;
        format!("{}_{}", prefix, counter)
    }
}

/// Synchronous capture with fixed options.
#[derive(Debug, Clone, Default)]
pub struct InteractionCapture {
    request: CaptureRequest,
}

impl InteractionCapture {
    pub fn new(request: CaptureRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &CaptureRequest {
        &self.request
    }

    /// Build the page model for `html`.
    pub fn capture(&self, html: &str) -> Result<PageModel, CaptureError> {
        validate_html(html)?;
        let document = parse_sanitized(html);

        let title = extract_title(&document);
        let headings = extract_headings(&document, self.request.max_headings);
        let text_blocks = extract_text_blocks(&document, self.request.max_text_blocks);

        let frames = load_frames(document, self.request.max_iframe_depth);
        let regions: BTreeSet<LandmarkRegion> = frames
            .iter()
            .flat_map(|frame| detect_regions(&frame.document))
            .collect();

        let candidates = collect_candidates(&frames);
        let total = candidates.len();
        let max = self.request.effective_max_controls();
        let selected: Vec<Candidate<'_>> = prioritize_visible(candidates, |c| c.visible)
            .into_iter()
            .take(max)
            .collect();

        let mut ids = IdAllocator::default();
        let mut controls = Vec::with_capacity(selected.len());
        let mut aimap = BTreeMap::new();
        for candidate in &selected {
            match build_control(candidate, &self.request, &mut ids) {
                Ok(Some(control)) => {
                    aimap.insert(control.id.clone(), control.selector.clone());
                    controls.push(control);
                }
                Ok(None) => trace!(tag = candidate.el.value().name(), "Dropping nameless element"),
                Err(err) => warn!(error = %err, "Skipping element"),
            }
        }

        debug!(
            frames = frames.len(),
            candidates = total,
            controls = controls.len(),
            "Captured page"
        );

        Ok(PageModel {
            title,
            url: self.request.base_url.clone(),
            headings,
            regions: regions.into_iter().collect(),
            controls,
            aimap,
            text_content: (!text_blocks.is_empty()).then_some(text_blocks),
        })
    }
}

/// Capture `html` on a blocking thread under the default timeout.
pub async fn capture_interaction_content(
    html: String,
    request: CaptureRequest,
) -> Result<PageModel, CaptureError> {
    capture_with_timeout(html, request, DEFAULT_CAPTURE_TIMEOUT).await
}

/// Capture `html` on a blocking thread, giving up after `timeout`.
///
/// The blocking work is not cancelled when the timeout wins; its result is
/// discarded.
pub async fn capture_with_timeout(
    html: String,
    request: CaptureRequest,
    timeout: Duration,
) -> Result<PageModel, CaptureError> {
    let capture = InteractionCapture::new(request);
    let task = tokio::task::spawn_blocking(move || capture.capture(&html));
    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined?,
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "Capture timed out");
            Err(CaptureError::Timeout(timeout.as_millis() as u64))
        }
    }
}

pub(crate) fn validate_html(html: &str) -> Result<(), CaptureError> {
    if html.len() > MAX_HTML_BYTES {
        return Err(CaptureError::TooLarge {
            size: html.len(),
            max: MAX_HTML_BYTES,
        });
    }
    if !html.to_ascii_lowercase().contains("<html") {
        return Err(CaptureError::InvalidHtml("missing <html> element".to_string()));
    }
    Ok(())
}

pub(crate) fn parse_sanitized(html: &str) -> Html {
    let clean = sanitize_html(html);
    let mut document = Html::parse_document(&clean);
    let removed = sanitize_dom_tree(&mut document);
    if removed > 0 {
        trace!(removed, "Removed non-content elements after parse");
    }
    document
}

fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE)
        .next()
        .map(|title| compact_ws(&title.text().collect::<String>()))
        .map(|title| truncate_chars(&title, MAX_TITLE_CHARS))
        .unwrap_or_default()
}

/// The top document followed by every inline iframe reachable within
/// `max_depth` levels, breadth first.
pub(crate) fn load_frames(root: Html, max_depth: usize) -> Vec<Frame> {
    let mut frames = vec![Frame {
        document: root,
        path: Vec::new(),
        visible: true,
        region: None,
        depth: 0,
    }];

    let mut index = 0;
    while index < frames.len() {
        if frames[index].depth < max_depth {
            let parent = &frames[index];
            let children: Vec<Frame> = parent
                .document
                .select(&INLINE_FRAMES)
                .filter_map(|iframe| {
                    let srcdoc = iframe.value().attr("srcdoc")?;
                    let mut path = parent.path.clone();
                    path.push(generate_selector(iframe, &parent.document));
                    Some(Frame {
                        document: parse_sanitized(srcdoc),
                        path,
                        visible: parent.visible && is_visible(iframe),
                        region: most_specific_region(iframe).or(parent.region),
                        depth: parent.depth + 1,
                    })
                })
                .collect();
            if !children.is_empty() {
                trace!(count = children.len(), depth = frames[index].depth + 1, "Loaded inline frames");
            }
            frames.extend(children);
        }
        index += 1;
    }
    frames
}

/// Interactive elements of every frame, in document order per frame.
pub(crate) fn collect_candidates(frames: &[Frame]) -> Vec<Candidate<'_>> {
    frames
        .iter()
        .flat_map(|frame| {
            frame
                .document
                .select(&CANDIDATES)
                .filter(|el| is_interactive_element(*el))
                .map(move |el| Candidate {
                    el,
                    frame,
                    visible: frame.visible && is_visible(el),
                })
        })
        .collect()
}

fn build_control(
    candidate: &Candidate<'_>,
    request: &CaptureRequest,
    ids: &mut IdAllocator,
) -> Result<Option<InteractiveControl>, CaptureError> {
    let el = candidate.el;
    let document = &candidate.frame.document;

    let role = detect_role(el);
    let Some(name) = accessible_name(el, document).or_else(|| fallback_name(el, role)) else {
        return Ok(None);
    };
    let states = extract_states(el, role, request.include_values, request.base_url.as_deref());

    let selector = generate_selector(el, document);
    if let Err(err) = Selector::parse(&selector) {
        return Err(CaptureError::Element {
            tag: el.value().name().to_string(),
            reason: format!("generated selector '{}' does not parse: {:?}", selector, err),
        });
    }

    let region = most_specific_region(el).or(candidate.frame.region);
    let in_viewport = candidate.visible && is_in_viewport(el);

    Ok(Some(InteractiveControl {
        id: ids.next(role),
        role,
        name,
        states,
        selector,
        visible: candidate.visible,
        in_viewport,
        region,
        bounding_box: None,
        frame_path: candidate.frame.path.clone(),
    }))
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
