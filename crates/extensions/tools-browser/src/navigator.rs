//! Iframe and shadow-root traversal ahead of element lookup.

use std::sync::Arc;

use tracing::debug;

use pagepilot_protocols::{ActionError, ElementContext};

use crate::driver::{DomRoot, FrameAccess, PageDriver};

/// Outcome of walking an [`ElementContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextResolution {
    /// The root to resolve the target in.
    Root(DomRoot),
    /// An iframe on the path belongs to another origin.
    CrossOriginDenied { frame_selector: String },
    /// A path segment matched nothing, or matched a non-frame/non-host.
    NotFound { selector: String, reason: &'static str },
}

/// Walks iframe selectors through frame documents, then shadow hosts
/// through their open shadow roots. Nothing is cached between calls.
pub struct ContextNavigator {
    driver: Arc<dyn PageDriver>,
}

impl ContextNavigator {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self { driver }
    }

    pub async fn resolve(
        &self,
        context: Option<&ElementContext>,
    ) -> Result<ContextResolution, ActionError> {
        let mut root = self.driver.document().await?;
        let Some(context) = context.filter(|c| !c.is_root()) else {
            return Ok(ContextResolution::Root(root));
        };

        for selector in &context.iframe_path {
            let Some(frame) = self.driver.query_selector(&root, selector).await? else {
                return Ok(ContextResolution::NotFound {
                    selector: selector.clone(),
                    reason: "iframe not found",
                });
            };
            root = match self.driver.frame_document(&frame).await? {
                FrameAccess::Accessible(doc) => doc,
                FrameAccess::Denied => {
                    return Ok(ContextResolution::CrossOriginDenied {
                        frame_selector: selector.clone(),
                    });
                }
                FrameAccess::NotAFrame => {
                    return Ok(ContextResolution::NotFound {
                        selector: selector.clone(),
                        reason: "element is not an iframe",
                    });
                }
            };
            debug!("Entered iframe '{}'", selector);
        }

        for selector in &context.shadow_path {
            let Some(host) = self.driver.query_selector(&root, selector).await? else {
                return Ok(ContextResolution::NotFound {
                    selector: selector.clone(),
                    reason: "shadow host not found",
                });
            };
            root = match self.driver.shadow_root(&host).await? {
                Some(shadow) => shadow,
                None => {
                    return Ok(ContextResolution::NotFound {
                        selector: selector.clone(),
                        reason: "element has no open shadow root",
                    });
                }
            };
            debug!("Entered shadow root of '{}'", selector);
        }

        Ok(ContextResolution::Root(root))
    }

    /// [`resolve`](Self::resolve) with failures turned into action errors.
    pub async fn navigate_to_context(
        &self,
        context: Option<&ElementContext>,
    ) -> Result<DomRoot, ActionError> {
        match self.resolve(context).await? {
            ContextResolution::Root(root) => Ok(root),
            ContextResolution::CrossOriginDenied { frame_selector } => {
                Err(ActionError::cross_origin_denied(format!(
                    "iframe '{}' is cross-origin and cannot be entered",
                    frame_selector
                )))
            }
            ContextResolution::NotFound { selector, reason } => Err(ActionError::not_found(
                format!("context '{}': {}", selector, reason),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::fake::{DOC, FakeElement, FakePage};
    use pagepilot_protocols::ActionErrorCode;

    fn navigator(page: FakePage) -> ContextNavigator {
        ContextNavigator::new(Arc::new(page))
    }

    fn context(frames: &[&str], shadows: &[&str]) -> ElementContext {
        ElementContext {
            iframe_path: frames.iter().map(|s| s.to_string()).collect(),
            shadow_path: shadows.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_no_context_is_document() {
        let nav = navigator(FakePage::new("https://a.example/"));
        assert_eq!(nav.resolve(None).await.unwrap(), ContextResolution::Root(DomRoot::new(DOC)));
        let empty = ElementContext::default();
        assert_eq!(nav.navigate_to_context(Some(&empty)).await.unwrap(), DomRoot::new(DOC));
    }

    #[tokio::test]
    async fn test_iframe_then_shadow() {
        let page = FakePage::new("https://a.example/");
        page.add(
            DOC,
            "iframe#editor",
            "f1",
            FakeElement::new("iframe").frame(FrameAccess::Accessible(DomRoot::new("frame-doc"))),
        );
        page.add("frame-doc", "x-toolbar", "host", FakeElement::new("x-toolbar").shadow("shadow-1"));
        let nav = navigator(page);

        let root = nav
            .navigate_to_context(Some(&context(&["iframe#editor"], &["x-toolbar"])))
            .await
            .unwrap();
        assert_eq!(root, DomRoot::new("shadow-1"));
    }

    #[tokio::test]
    async fn test_cross_origin_frame_denied() {
        let page = FakePage::new("https://a.example/");
        page.add(DOC, "iframe.pay", "f1", FakeElement::new("iframe").frame(FrameAccess::Denied));
        let nav = navigator(page);

        let ctx = context(&["iframe.pay"], &[]);
        assert_eq!(
            nav.resolve(Some(&ctx)).await.unwrap(),
            ContextResolution::CrossOriginDenied {
                frame_selector: "iframe.pay".into()
            }
        );
        let err = nav.navigate_to_context(Some(&ctx)).await.unwrap_err();
        assert_eq!(err.code, ActionErrorCode::CrossOriginDenied);
        assert!(!err.recoverable);
        assert_eq!(err.suggestion.as_deref(), Some("ensure iframe is same-origin"));
    }

    #[tokio::test]
    async fn test_missing_segments_are_not_found() {
        let page = FakePage::new("https://a.example/");
        page.add(DOC, "div.card", "d1", FakeElement::new("div"));
        let nav = navigator(page);

        let missing = nav.resolve(Some(&context(&["iframe#gone"], &[]))).await.unwrap();
        assert!(matches!(missing, ContextResolution::NotFound { reason: "iframe not found", .. }));

        let not_frame = nav.resolve(Some(&context(&["div.card"], &[]))).await.unwrap();
        assert!(matches!(
            not_frame,
            ContextResolution::NotFound { reason: "element is not an iframe", .. }
        ));

        let closed = nav.resolve(Some(&context(&[], &["div.card"]))).await.unwrap();
        assert!(matches!(closed, ContextResolution::NotFound { .. }));

        let err = nav
            .navigate_to_context(Some(&context(&[], &["div.card"])))
            .await
            .unwrap_err();
        assert_eq!(err.code, ActionErrorCode::ElementNotFound);
        assert!(err.message.contains("div.card"));
    }
}
