//! In-memory page used by the engine tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::Mutex;

use pagepilot_protocols::BoundingBox;
use pagepilot_protocols::action::{Modifier, MouseButton};

use super::{
    DomRoot, DriverError, ElementDescription, ElementHandle, ElementState, FrameAccess,
    ObserverHandle, PageDriver, PageState, ScrollOp,
};

pub(crate) const DOC: &str = "doc";
const MAX_SCROLL: f64 = 5_000.0;

/// What a click does to the page.
#[derive(Debug, Clone)]
pub(crate) enum ClickEffect {
    Navigate(String),
    Mutate(u32),
}

#[derive(Debug, Clone)]
pub(crate) struct FakeElement {
    pub node_name: String,
    pub attributes: BTreeMap<String, String>,
    pub state: ElementState,
    pub parent: Option<String>,
    pub frame: Option<FrameAccess>,
    pub shadow: Option<String>,
    /// Element reported by hit testing at this element's centre.
    pub hit: Option<String>,
    pub on_click: Vec<ClickEffect>,
    root: String,
}

impl FakeElement {
    pub fn new(node_name: &str) -> Self {
        Self {
            node_name: node_name.to_string(),
            attributes: BTreeMap::new(),
            state: ElementState {
                connected: true,
                visible: true,
                bounding_box: Some(BoundingBox::new(10.0, 10.0, 120.0, 24.0)),
                editable: matches!(node_name, "input" | "textarea" | "select"),
                value: matches!(node_name, "input" | "textarea").then(String::new),
                ..Default::default()
            },
            parent: None,
            frame: None,
            shadow: None,
            hit: None,
            on_click: Vec::new(),
            root: DOC.to_string(),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.state.text = text.to_string();
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.state.value = Some(value.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.state.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.state.disabled = true;
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.state.checked = Some(checked);
        self
    }

    pub fn child_of(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn covered_by(mut self, other: &str) -> Self {
        self.hit = Some(other.to_string());
        self
    }

    pub fn frame(mut self, access: FrameAccess) -> Self {
        self.frame = Some(access);
        self
    }

    pub fn shadow(mut self, root: &str) -> Self {
        self.shadow = Some(root.to_string());
        self
    }

    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.on_click.push(effect);
        self
    }
}

#[derive(Default)]
struct Inner {
    elements: HashMap<String, FakeElement>,
    order: Vec<String>,
    selectors: HashMap<(String, String), String>,
    url: String,
    html: String,
    scroll: (f64, f64),
    mutations: u32,
    mutations_per_scroll: u32,
    observers: HashMap<String, u32>,
    stale_reads: HashMap<String, u32>,
    events: Vec<String>,
}

/// Scriptable [`PageDriver`] with selector lookups registered up front.
#[derive(Default)]
pub(crate) struct FakePage {
    inner: Mutex<Inner>,
}

impl FakePage {
    pub fn new(url: &str) -> Self {
        let page = Self::default();
        page.inner.lock().url = url.to_string();
        page
    }

    /// Register `element` under `id`, reachable by `selector` from `root`.
    pub fn add(&self, root: &str, selector: &str, id: &str, mut element: FakeElement) {
        element.root = root.to_string();
        let mut inner = self.inner.lock();
        inner
            .selectors
            .insert((root.to_string(), selector.to_string()), id.to_string());
        inner.order.push(id.to_string());
        inner.elements.insert(id.to_string(), element);
    }

    pub fn set_html(&self, html: &str) {
        self.inner.lock().html = html.to_string();
    }

    /// The next `reads` state reads of `id` report a detached node.
    pub fn go_stale(&self, id: &str, reads: u32) {
        self.inner.lock().stale_reads.insert(id.to_string(), reads);
    }

    pub fn set_mutations_per_scroll(&self, count: u32) {
        self.inner.lock().mutations_per_scroll = count;
    }

    pub fn events(&self) -> Vec<String> {
        self.inner.lock().events.clone()
    }

    pub fn value_of(&self, id: &str) -> Option<String> {
        self.inner.lock().elements.get(id).and_then(|e| e.state.value.clone())
    }

    pub fn url(&self) -> String {
        self.inner.lock().url.clone()
    }

    fn with_element<T>(
        &self,
        handle: &ElementHandle,
        f: impl FnOnce(&mut FakeElement) -> T,
    ) -> Result<T, DriverError> {
        let mut inner = self.inner.lock();
        inner
            .elements
            .get_mut(handle.id())
            .map(f)
            .ok_or_else(|| DriverError::Stale(format!("no node {}", handle.id())))
    }

    fn record(&self, event: String) {
        self.inner.lock().events.push(event);
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn document(&self) -> Result<DomRoot, DriverError> {
        Ok(DomRoot::new(DOC))
    }

    async fn query_selector(
        &self,
        root: &DomRoot,
        selector: &str,
    ) -> Result<Option<ElementHandle>, DriverError> {
        if selector.starts_with("##") {
            return Err(DriverError::InvalidSelector(selector.to_string()));
        }
        let inner = self.inner.lock();
        Ok(inner
            .selectors
            .get(&(root.id().to_string(), selector.to_string()))
            .map(ElementHandle::new))
    }

    async fn query_all(
        &self,
        root: &DomRoot,
        _selector: &str,
    ) -> Result<Vec<ElementHandle>, DriverError> {
        let inner = self.inner.lock();
        Ok(inner
            .order
            .iter()
            .filter(|id| inner.elements.get(*id).is_some_and(|e| e.root == root.id()))
            .map(ElementHandle::new)
            .collect())
    }

    async fn frame_document(&self, frame: &ElementHandle) -> Result<FrameAccess, DriverError> {
        self.with_element(frame, |e| e.frame.clone().unwrap_or(FrameAccess::NotAFrame))
    }

    async fn shadow_root(&self, host: &ElementHandle) -> Result<Option<DomRoot>, DriverError> {
        self.with_element(host, |e| e.shadow.clone().map(DomRoot::new))
    }

    async fn describe(&self, element: &ElementHandle) -> Result<ElementDescription, DriverError> {
        self.with_element(element, |e| ElementDescription {
            node_name: e.node_name.clone(),
            attributes: e.attributes.clone(),
            text: e.state.text.clone(),
        })
    }

    async fn element_state(&self, element: &ElementHandle) -> Result<ElementState, DriverError> {
        {
            let mut inner = self.inner.lock();
            if let Some(left) = inner.stale_reads.get_mut(element.id()) {
                if *left > 0 {
                    *left -= 1;
                    return Ok(ElementState::default());
                }
            }
        }
        self.with_element(element, |e| e.state.clone())
    }

    async fn element_from_point(
        &self,
        element: &ElementHandle,
        _x: f64,
        _y: f64,
    ) -> Result<Option<ElementHandle>, DriverError> {
        self.with_element(element, |e| {
            Some(ElementHandle::new(e.hit.clone().unwrap_or_else(|| element.id().to_string())))
        })
    }

    async fn contains(
        &self,
        ancestor: &ElementHandle,
        node: &ElementHandle,
    ) -> Result<bool, DriverError> {
        let inner = self.inner.lock();
        let mut current = Some(node.id().to_string());
        while let Some(id) = current {
            if id == ancestor.id() {
                return Ok(true);
            }
            current = inner.elements.get(&id).and_then(|e| e.parent.clone());
        }
        Ok(false)
    }

    async fn page_state(&self) -> Result<PageState, DriverError> {
        let inner = self.inner.lock();
        Ok(PageState {
            url: inner.url.clone(),
            scroll_x: inner.scroll.0,
            scroll_y: inner.scroll.1,
            ready_state: "complete".to_string(),
        })
    }

    async fn page_html(&self) -> Result<String, DriverError> {
        Ok(self.inner.lock().html.clone())
    }

    async fn observe_mutations(&self) -> Result<ObserverHandle, DriverError> {
        let mut inner = self.inner.lock();
        let id = format!("obs-{}", inner.observers.len() + 1);
        let baseline = inner.mutations;
        inner.observers.insert(id.clone(), baseline);
        Ok(ObserverHandle::new(id))
    }

    async fn mutation_count(&self, observer: &ObserverHandle) -> Result<u32, DriverError> {
        let inner = self.inner.lock();
        let baseline = inner.observers.get(observer.id()).copied().unwrap_or(inner.mutations);
        Ok(inner.mutations - baseline)
    }

    async fn disconnect(&self, observer: &ObserverHandle) -> Result<(), DriverError> {
        self.record(format!("disconnect:{}", observer.id()));
        Ok(())
    }

    async fn click(
        &self,
        element: &ElementHandle,
        button: MouseButton,
        modifiers: &[Modifier],
    ) -> Result<(), DriverError> {
        let effects = self.with_element(element, |e| e.on_click.clone())?;
        let mut inner = self.inner.lock();
        inner.events.push(format!(
            "click:{}:{:?}:{}",
            element.id(),
            button,
            modifiers.len()
        ));
        for effect in effects {
            match effect {
                ClickEffect::Navigate(url) => inner.url = url,
                ClickEffect::Mutate(n) => inner.mutations += n,
            }
        }
        Ok(())
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.record(format!("scroll_into_view:{}", element.id()));
        Ok(())
    }

    async fn focus(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.record(format!("focus:{}", element.id()));
        Ok(())
    }

    async fn set_value(&self, element: &ElementHandle, value: &str) -> Result<(), DriverError> {
        self.with_element(element, |e| e.state.value = Some(value.to_string()))?;
        self.record(format!("set_value:{}", element.id()));
        Ok(())
    }

    async fn type_char(&self, element: &ElementHandle, ch: char) -> Result<(), DriverError> {
        self.with_element(element, |e| e.state.value.get_or_insert_with(String::new).push(ch))?;
        self.record(format!("type:{}", element.id()));
        Ok(())
    }

    async fn commit_value(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.record(format!("change:{}", element.id()));
        Ok(())
    }

    async fn scroll(&self, element: &ElementHandle, op: ScrollOp) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        let (x, y) = inner.scroll;
        inner.scroll = match op {
            ScrollOp::By { dx, dy } => (
                (x + dx).clamp(0.0, MAX_SCROLL),
                (y + dy).clamp(0.0, MAX_SCROLL),
            ),
            ScrollOp::Top => (x, 0.0),
            ScrollOp::Bottom => (x, MAX_SCROLL),
        };
        inner.mutations += inner.mutations_per_scroll;
        inner.events.push(format!("scroll:{}", element.id()));
        Ok(())
    }

    async fn scroll_position(&self, _element: &ElementHandle) -> Result<(f64, f64), DriverError> {
        Ok(self.inner.lock().scroll)
    }
}
