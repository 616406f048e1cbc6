#![forbid(unsafe_code)]

//! Viewport membership, occlusion, and scroll-container queries.
//!
//! All functions are pure over a [`Document`]; none of them scroll.
//!
//! # Edge semantics
//!
//! An edge counts as visible when its own coordinate lies inside the
//! viewport on its axis *and* the segment it spans fits on the other axis.
//! The top edge of a 591px wide element therefore needs `0 <= top <= height`
//! and `left >= 0 && right <= width`. Testing [`ElementSides::ALL`] is the
//! same as asking whether the whole element is inside the viewport.

use crate::document::{Document, ElementId};
use crate::geometry::{ElementSides, Point, Rect, Size};

/// Distance (px) probe points are moved inside the element's edge so the
/// hit test lands on the element rather than on its neighbour.
const EDGE_PROBE_INSET: f64 = 1.0;

/// Check `rect` against `viewport` for the requested edges.
pub fn edges_in_viewport(rect: &Rect, viewport: Size, sides: ElementSides) -> bool {
    let horizontal_fits = rect.left() >= 0.0 && rect.right() <= viewport.width;
    let vertical_fits = rect.top() >= 0.0 && rect.bottom() <= viewport.height;
    let within_height = |y: f64| y >= 0.0 && y <= viewport.height;
    let within_width = |x: f64| x >= 0.0 && x <= viewport.width;

    if sides.contains(ElementSides::TOP) && !(within_height(rect.top()) && horizontal_fits) {
        return false;
    }
    if sides.contains(ElementSides::BOTTOM) && !(within_height(rect.bottom()) && horizontal_fits) {
        return false;
    }
    if sides.contains(ElementSides::LEFT) && !(within_width(rect.left()) && vertical_fits) {
        return false;
    }
    if sides.contains(ElementSides::RIGHT) && !(within_width(rect.right()) && vertical_fits) {
        return false;
    }
    true
}

/// Whether the requested edges of `element` are inside the viewport.
pub fn is_in_viewport(doc: &dyn Document, element: ElementId, sides: ElementSides) -> bool {
    edges_in_viewport(&doc.bounding_rect(element), doc.viewport(), sides)
}

/// Whether any requested edge of `element` is hidden under another element.
///
/// Probes the midpoint of each edge. A probe is covered when the topmost
/// element at that point is neither `element` nor one of its descendants.
/// A probe that hits nothing (outside the page) is not covered.
pub fn is_covered(doc: &dyn Document, element: ElementId, sides: ElementSides) -> bool {
    let rect = doc.bounding_rect(element);
    edge_probes(&rect, sides).into_iter().flatten().any(|point| {
        doc.element_from_point(point)
            .is_some_and(|hit| !doc.contains(element, hit))
    })
}

fn edge_probes(rect: &Rect, sides: ElementSides) -> [Option<Point>; 4] {
    let probe = |side: ElementSides, point: Point| sides.contains(side).then_some(point);
    [
        probe(
            ElementSides::TOP,
            Point::new(rect.center_x(), rect.top() + EDGE_PROBE_INSET),
        ),
        probe(
            ElementSides::BOTTOM,
            Point::new(rect.center_x(), rect.bottom() - EDGE_PROBE_INSET),
        ),
        probe(
            ElementSides::LEFT,
            Point::new(rect.left() + EDGE_PROBE_INSET, rect.center_y()),
        ),
        probe(
            ElementSides::RIGHT,
            Point::new(rect.right() - EDGE_PROBE_INSET, rect.center_y()),
        ),
    ]
}

/// Explicit scroll container requested by a step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ScrollContainer {
    /// CSS selector, resolved with [`Document::query_selector`].
    Selector(String),
    /// Direct element reference.
    Element(ElementId),
}

impl From<&str> for ScrollContainer {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<ElementId> for ScrollContainer {
    fn from(element: ElementId) -> Self {
        Self::Element(element)
    }
}

/// Resolve the element that scrolls `element`.
///
/// An explicit override wins (a selector that matches nothing yields
/// `None`). Otherwise the nearest ancestor whose overflow allows scrolling
/// and whose content is taller than its box. `None` means the page itself
/// scrolls; callers fall back to [`Document::root`].
pub fn scroll_container(
    doc: &dyn Document,
    element: ElementId,
    override_container: Option<&ScrollContainer>,
) -> Option<ElementId> {
    match override_container {
        Some(ScrollContainer::Selector(selector)) => doc.query_selector(selector),
        Some(ScrollContainer::Element(id)) => Some(*id),
        None => {
            let root = doc.root();
            let mut cursor = doc.parent(element);
            while let Some(ancestor) = cursor {
                if ancestor == root {
                    return None;
                }
                if doc.overflow(ancestor).allows_scrolling()
                    && doc.scroll_height(ancestor) > doc.client_height(ancestor)
                {
                    return Some(ancestor);
                }
                cursor = doc.parent(ancestor);
            }
            None
        }
    }
}

/// Height of `container` that is actually on screen.
pub fn visible_height(doc: &dyn Document, container: ElementId) -> f64 {
    let viewport = doc.viewport();
    if container == doc.root() {
        return viewport.height;
    }
    let rect = doc.bounding_rect(container);
    let visible = rect.intersection(&viewport.to_rect()).height;
    visible.min(doc.client_height(container))
}

/// Whether `element` is taller than the visible part of `container`.
pub fn is_height_overflowing(doc: &dyn Document, element: ElementId, container: ElementId) -> bool {
    doc.bounding_rect(element).height > visible_height(doc, container)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Overflow, ScrollIntoView};
    use std::collections::HashMap;

    const VIEWPORT: Size = Size::new(800.0, 600.0);

    fn base_rect() -> Rect {
        Rect::from_edges(137.0, 631.0, 255.0, 40.0)
    }

    fn with_edges(top: f64, right: f64, bottom: f64, left: f64) -> Rect {
        Rect::from_edges(top, right, bottom, left)
    }

    #[test]
    fn top_edge_visibility() {
        let sides = ElementSides::TOP;
        assert!(edges_in_viewport(&base_rect(), VIEWPORT, sides));
        assert!(!edges_in_viewport(&with_edges(-100.0, 631.0, 255.0, 40.0), VIEWPORT, sides));
        assert!(edges_in_viewport(&with_edges(137.0, 631.0, 700.0, 40.0), VIEWPORT, sides));
        assert!(!edges_in_viewport(&with_edges(137.0, 631.0, 255.0, -10.0), VIEWPORT, sides));
        assert!(!edges_in_viewport(&with_edges(137.0, 900.0, 255.0, 40.0), VIEWPORT, sides));
    }

    #[test]
    fn bottom_edge_visibility() {
        let sides = ElementSides::BOTTOM;
        assert!(edges_in_viewport(&base_rect(), VIEWPORT, sides));
        assert!(edges_in_viewport(&with_edges(-100.0, 631.0, 255.0, 40.0), VIEWPORT, sides));
        assert!(!edges_in_viewport(&with_edges(137.0, 631.0, 700.0, 40.0), VIEWPORT, sides));
        assert!(!edges_in_viewport(&with_edges(137.0, 631.0, 255.0, -10.0), VIEWPORT, sides));
        assert!(!edges_in_viewport(&with_edges(137.0, 900.0, 255.0, 40.0), VIEWPORT, sides));
    }

    #[test]
    fn whole_element_visibility() {
        let sides = ElementSides::ALL;
        assert!(edges_in_viewport(&base_rect(), VIEWPORT, sides));
        assert!(!edges_in_viewport(&with_edges(-100.0, 631.0, 255.0, 40.0), VIEWPORT, sides));
        assert!(!edges_in_viewport(&with_edges(137.0, 631.0, 700.0, 40.0), VIEWPORT, sides));
        assert!(!edges_in_viewport(&with_edges(137.0, 631.0, 255.0, -10.0), VIEWPORT, sides));
        assert!(!edges_in_viewport(&with_edges(137.0, 900.0, 255.0, 40.0), VIEWPORT, sides));
    }

    #[test]
    fn left_edge_ignores_horizontal_overflow_on_the_right() {
        let rect = with_edges(137.0, 900.0, 255.0, 40.0);
        assert!(edges_in_viewport(&rect, VIEWPORT, ElementSides::LEFT));
        assert!(!edges_in_viewport(&rect, VIEWPORT, ElementSides::RIGHT));
    }

    /// Minimal flat document: every element is a child of root unless told otherwise.
    #[derive(Default)]
    struct FlatDoc {
        rects: HashMap<ElementId, Rect>,
        parents: HashMap<ElementId, ElementId>,
        overflow: HashMap<ElementId, Overflow>,
        heights: HashMap<ElementId, (f64, f64)>,
        topmost: Vec<ElementId>,
    }

    const ROOT: ElementId = ElementId(0);

    impl FlatDoc {
        fn add(&mut self, id: u64, parent: ElementId, rect: Rect) -> ElementId {
            let id = ElementId(id);
            self.rects.insert(id, rect);
            self.parents.insert(id, parent);
            self.topmost.push(id);
            id
        }
    }

    impl Document for FlatDoc {
        fn root(&self) -> ElementId {
            ROOT
        }
        fn viewport(&self) -> Size {
            VIEWPORT
        }
        fn bounding_rect(&self, element: ElementId) -> Rect {
            self.rects.get(&element).copied().unwrap_or_default()
        }
        fn client_height(&self, element: ElementId) -> f64 {
            self.heights.get(&element).map_or(0.0, |h| h.0)
        }
        fn scroll_height(&self, element: ElementId) -> f64 {
            self.heights.get(&element).map_or(0.0, |h| h.1)
        }
        fn parent(&self, element: ElementId) -> Option<ElementId> {
            self.parents.get(&element).copied()
        }
        fn overflow(&self, element: ElementId) -> Overflow {
            self.overflow.get(&element).copied().unwrap_or_default()
        }
        fn element_from_point(&self, point: Point) -> Option<ElementId> {
            // Later additions paint on top.
            self.topmost
                .iter()
                .rev()
                .find(|id| self.rects[id].contains(point))
                .copied()
        }
        fn query_selector(&self, selector: &str) -> Option<ElementId> {
            selector.strip_prefix('#')?.parse().ok().map(ElementId)
        }
        fn scroll_into_view(&mut self, _element: ElementId, _options: ScrollIntoView) {}
        fn scroll_to(&mut self, _container: ElementId, _left: f64, _top: f64) {}
    }

    #[test]
    fn covered_by_overlay_on_top_edge_only() {
        let mut doc = FlatDoc::default();
        let anchor = doc.add(1, ROOT, Rect::new(100.0, 100.0, 200.0, 100.0));
        doc.add(2, ROOT, Rect::new(0.0, 90.0, 800.0, 20.0));
        assert!(is_covered(&doc, anchor, ElementSides::TOP));
        assert!(!is_covered(&doc, anchor, ElementSides::BOTTOM));
    }

    #[test]
    fn descendants_do_not_cover() {
        let mut doc = FlatDoc::default();
        let anchor = doc.add(1, ROOT, Rect::new(100.0, 100.0, 200.0, 100.0));
        doc.add(2, anchor, Rect::new(100.0, 100.0, 200.0, 100.0));
        assert!(!is_covered(&doc, anchor, ElementSides::ALL));
    }

    #[test]
    fn scroll_container_finds_scrollable_ancestor() {
        let mut doc = FlatDoc::default();
        let panel = doc.add(1, ROOT, Rect::new(0.0, 0.0, 400.0, 300.0));
        let inner = doc.add(2, panel, Rect::new(0.0, 0.0, 400.0, 900.0));
        let anchor = doc.add(3, inner, Rect::new(0.0, 500.0, 100.0, 40.0));
        doc.overflow.insert(panel, Overflow::Auto);
        doc.heights.insert(panel, (300.0, 900.0));

        assert_eq!(scroll_container(&doc, anchor, None), Some(panel));
    }

    #[test]
    fn scroll_container_skips_non_overflowing_ancestors() {
        let mut doc = FlatDoc::default();
        let panel = doc.add(1, ROOT, Rect::new(0.0, 0.0, 400.0, 300.0));
        let anchor = doc.add(2, panel, Rect::new(0.0, 10.0, 100.0, 40.0));
        doc.overflow.insert(panel, Overflow::Scroll);
        doc.heights.insert(panel, (300.0, 300.0));

        assert_eq!(scroll_container(&doc, anchor, None), None);
    }

    #[test]
    fn scroll_container_override_wins() {
        let mut doc = FlatDoc::default();
        let anchor = doc.add(1, ROOT, Rect::new(0.0, 0.0, 10.0, 10.0));
        let by_selector = ScrollContainer::from("#42");
        assert_eq!(
            scroll_container(&doc, anchor, Some(&by_selector)),
            Some(ElementId(42))
        );
        let missing = ScrollContainer::from(".nope");
        assert_eq!(scroll_container(&doc, anchor, Some(&missing)), None);
        let direct = ScrollContainer::from(ElementId(9));
        assert_eq!(
            scroll_container(&doc, anchor, Some(&direct)),
            Some(ElementId(9))
        );
    }

    #[test]
    fn height_overflow_against_root_uses_viewport() {
        let mut doc = FlatDoc::default();
        let tall = doc.add(1, ROOT, Rect::new(0.0, 0.0, 100.0, 700.0));
        let short = doc.add(2, ROOT, Rect::new(0.0, 0.0, 100.0, 500.0));
        assert!(is_height_overflowing(&doc, tall, ROOT));
        assert!(!is_height_overflowing(&doc, short, ROOT));
    }

    #[test]
    fn height_overflow_against_partially_visible_container() {
        let mut doc = FlatDoc::default();
        let panel = doc.add(1, ROOT, Rect::new(0.0, 400.0, 400.0, 400.0));
        doc.heights.insert(panel, (400.0, 1200.0));
        let anchor = doc.add(2, panel, Rect::new(0.0, 420.0, 100.0, 250.0));
        // Only 200px of the panel are on screen.
        assert!(is_height_overflowing(&doc, anchor, panel));
    }
}
