//! Landmark region detection.

use pagepilot_protocols::LandmarkRegion;
use scraper::{ElementRef, Html};
use std::collections::BTreeSet;

/// Narrowest landmark first. A control inside `<aside><nav>` belongs to
/// navigation, one inside `<main><dialog>` to the dialog.
pub const REGION_PRECEDENCE: [LandmarkRegion; 8] = [
    LandmarkRegion::Search,
    LandmarkRegion::Navigation,
    LandmarkRegion::Dialog,
    LandmarkRegion::Aside,
    LandmarkRegion::Main,
    LandmarkRegion::Header,
    LandmarkRegion::Footer,
    LandmarkRegion::Region,
];

/// Landmark represented by `el` itself, from an explicit role or its tag.
pub fn landmark_of(el: ElementRef<'_>) -> Option<LandmarkRegion> {
    let element = el.value();
    if let Some(role) = element.attr("role") {
        let explicit = role.split_whitespace().find_map(|token| {
            let region = match token.to_ascii_lowercase().as_str() {
                "main" => LandmarkRegion::Main,
                "navigation" => LandmarkRegion::Navigation,
                "banner" => LandmarkRegion::Header,
                "contentinfo" => LandmarkRegion::Footer,
                "complementary" => LandmarkRegion::Aside,
                "dialog" | "alertdialog" => LandmarkRegion::Dialog,
                "search" => LandmarkRegion::Search,
                "region" => LandmarkRegion::Region,
                _ => return None,
            };
            Some(region)
        });
        if explicit.is_some() {
            return explicit;
        }
    }
    match element.name() {
        "main" => Some(LandmarkRegion::Main),
        "nav" => Some(LandmarkRegion::Navigation),
        "header" => Some(LandmarkRegion::Header),
        "footer" => Some(LandmarkRegion::Footer),
        "aside" => Some(LandmarkRegion::Aside),
        "dialog" => Some(LandmarkRegion::Dialog),
        _ => None,
    }
}

/// Distinct landmark types present in `document`, in canonical order.
pub fn detect_regions(document: &Html) -> Vec<LandmarkRegion> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(landmark_of)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Most specific landmark containing `el` (including `el` itself).
pub fn most_specific_region(el: ElementRef<'_>) -> Option<LandmarkRegion> {
    let found: BTreeSet<LandmarkRegion> = std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .filter_map(landmark_of)
        .collect();
    REGION_PRECEDENCE
        .iter()
        .copied()
        .find(|region| found.contains(region))
}
