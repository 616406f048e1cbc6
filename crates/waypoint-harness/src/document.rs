#![forbid(unsafe_code)]

//! In-memory [`Document`].
//!
//! Elements are flat rectangles in client coordinates with an explicit
//! parent. Paint order is insertion order: an element added later sits on
//! top of everything added before it. Scroll commands are recorded, not
//! applied.

use std::cell::RefCell;
use std::rc::Rc;

use waypoint_core::{
    Document, ElementId, Overflow, Point, Rect, ScrollCapabilities, ScrollIntoView, Size,
};

/// A scroll command issued against the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollCall {
    IntoView {
        element: ElementId,
        options: ScrollIntoView,
    },
    To {
        container: ElementId,
        left: f64,
        top: f64,
    },
}

#[derive(Debug, Clone)]
struct SimElement {
    parent: Option<ElementId>,
    rect: Rect,
    overflow: Overflow,
    client_height: f64,
    scroll_height: f64,
    selector: Option<String>,
}

#[derive(Debug)]
struct SimInner {
    viewport: Size,
    elements: Vec<SimElement>,
    capabilities: ScrollCapabilities,
    scrolls: Vec<ScrollCall>,
}

/// Shared handle to a simulated page. Clones see the same page.
#[derive(Debug, Clone)]
pub struct SimDocument {
    inner: Rc<RefCell<SimInner>>,
}

impl SimDocument {
    const ROOT: ElementId = ElementId(0);

    /// An empty page with the given viewport.
    pub fn new(width: f64, height: f64) -> Self {
        let root = SimElement {
            parent: None,
            rect: Rect::from_size(width, height),
            overflow: Overflow::Auto,
            client_height: height,
            scroll_height: height,
            selector: Some("html".into()),
        };
        Self {
            inner: Rc::new(RefCell::new(SimInner {
                viewport: Size::new(width, height),
                elements: vec![root],
                capabilities: ScrollCapabilities::default(),
                scrolls: Vec::new(),
            })),
        }
    }

    /// Add an element under `parent`, painted above every existing one.
    pub fn add(&self, parent: ElementId, rect: Rect) -> ElementId {
        let mut inner = self.inner.borrow_mut();
        let id = ElementId(inner.elements.len() as u64);
        inner.elements.push(SimElement {
            parent: Some(parent),
            rect,
            overflow: Overflow::Visible,
            client_height: rect.height,
            scroll_height: rect.height,
            selector: None,
        });
        id
    }

    /// Add an element directly under the root.
    pub fn add_to_root(&self, rect: Rect) -> ElementId {
        self.add(Self::ROOT, rect)
    }

    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        self.with_element(element, |el| el.rect = rect);
    }

    pub fn set_overflow(&self, element: ElementId, overflow: Overflow) {
        self.with_element(element, |el| el.overflow = overflow);
    }

    /// Set `clientHeight` and `scrollHeight`.
    pub fn set_heights(&self, element: ElementId, client: f64, scroll: f64) {
        self.with_element(element, |el| {
            el.client_height = client;
            el.scroll_height = scroll;
        });
    }

    /// Make `element` answer `query_selector(selector)`.
    pub fn set_selector(&self, element: ElementId, selector: impl Into<String>) {
        let selector = selector.into();
        self.with_element(element, |el| el.selector = Some(selector));
    }

    pub fn set_capabilities(&self, capabilities: ScrollCapabilities) {
        self.inner.borrow_mut().capabilities = capabilities;
    }

    /// Scroll commands received so far.
    pub fn scroll_calls(&self) -> Vec<ScrollCall> {
        self.inner.borrow().scrolls.clone()
    }

    pub fn clear_scroll_calls(&self) {
        self.inner.borrow_mut().scrolls.clear();
    }

    fn with_element(&self, element: ElementId, f: impl FnOnce(&mut SimElement)) {
        let mut inner = self.inner.borrow_mut();
        if let Some(el) = usize::try_from(element.0)
            .ok()
            .and_then(|i| inner.elements.get_mut(i))
        {
            f(el);
        }
    }

    fn read<R>(&self, element: ElementId, f: impl FnOnce(&SimElement) -> R) -> Option<R> {
        let inner = self.inner.borrow();
        usize::try_from(element.0)
            .ok()
            .and_then(|i| inner.elements.get(i))
            .map(f)
    }
}

impl Document for SimDocument {
    fn root(&self) -> ElementId {
        Self::ROOT
    }

    fn viewport(&self) -> Size {
        self.inner.borrow().viewport
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        self.read(element, |el| el.rect).unwrap_or_default()
    }

    fn client_height(&self, element: ElementId) -> f64 {
        self.read(element, |el| el.client_height).unwrap_or_default()
    }

    fn scroll_height(&self, element: ElementId) -> f64 {
        self.read(element, |el| el.scroll_height).unwrap_or_default()
    }

    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.read(element, |el| el.parent).flatten()
    }

    fn overflow(&self, element: ElementId) -> Overflow {
        self.read(element, |el| el.overflow).unwrap_or_default()
    }

    fn element_from_point(&self, point: Point) -> Option<ElementId> {
        let inner = self.inner.borrow();
        if !inner.viewport.to_rect().contains(point) {
            return None;
        }
        let hit = inner
            .elements
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, el)| el.rect.contains(point))
            .map(|(i, _)| ElementId(i as u64));
        Some(hit.unwrap_or(Self::ROOT))
    }

    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        self.inner
            .borrow()
            .elements
            .iter()
            .position(|el| el.selector.as_deref() == Some(selector))
            .map(|i| ElementId(i as u64))
    }

    fn capabilities(&self) -> ScrollCapabilities {
        self.inner.borrow().capabilities
    }

    fn scroll_into_view(&mut self, element: ElementId, options: ScrollIntoView) {
        self.inner
            .borrow_mut()
            .scrolls
            .push(ScrollCall::IntoView { element, options });
    }

    fn scroll_to(&mut self, container: ElementId, left: f64, top: f64) {
        self.inner.borrow_mut().scrolls.push(ScrollCall::To {
            container,
            left,
            top,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_elements_paint_on_top() {
        let doc = SimDocument::new(800.0, 600.0);
        let below = doc.add_to_root(Rect::new(0.0, 0.0, 100.0, 100.0));
        let above = doc.add_to_root(Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(doc.element_from_point(Point::new(10.0, 10.0)), Some(below));
        assert_eq!(doc.element_from_point(Point::new(60.0, 60.0)), Some(above));
        assert_eq!(doc.element_from_point(Point::new(500.0, 500.0)), Some(doc.root()));
        assert_eq!(doc.element_from_point(Point::new(900.0, 10.0)), None);
    }

    #[test]
    fn parent_chain_and_selectors() {
        let doc = SimDocument::new(800.0, 600.0);
        let panel = doc.add_to_root(Rect::new(0.0, 0.0, 400.0, 300.0));
        let item = doc.add(panel, Rect::new(10.0, 10.0, 50.0, 20.0));
        doc.set_selector(panel, ".panel");
        assert_eq!(doc.parent(item), Some(panel));
        assert_eq!(doc.parent(doc.root()), None);
        assert!(doc.contains(doc.root(), item));
        assert_eq!(doc.query_selector(".panel"), Some(panel));
        assert_eq!(doc.query_selector(".missing"), None);
    }

    #[test]
    fn clones_share_scroll_log() {
        let doc = SimDocument::new(800.0, 600.0);
        let mut handle = doc.clone();
        handle.scroll_to(doc.root(), 0.0, 120.0);
        assert_eq!(
            doc.scroll_calls(),
            vec![ScrollCall::To {
                container: doc.root(),
                left: 0.0,
                top: 120.0
            }]
        );
        doc.clear_scroll_calls();
        assert!(handle.scroll_calls().is_empty());
    }
}
