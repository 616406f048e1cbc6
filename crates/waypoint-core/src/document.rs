#![forbid(unsafe_code)]

//! Host document abstraction.
//!
//! The tour never touches a real DOM. Everything it needs to know about
//! layout, and the two scroll commands it issues, go through [`Document`].
//! A browser binding implements it over `web-sys`; tests use the in-memory
//! document from `waypoint-harness`.
//!
//! # Invariants
//!
//! 1. [`ElementId`]s are opaque and stable for the lifetime of the element.
//! 2. [`Document::root`] is the scrolling element of the page
//!    (`document.documentElement`) and has no parent.
//! 3. Rectangles are in client coordinates, after any scrolling.

use crate::geometry::{Point, Rect, Size};

/// Opaque handle to an element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Computed `overflow-y` of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
    Overlay,
}

impl Overflow {
    /// Whether content exceeding the box can be scrolled by the user.
    #[inline]
    pub const fn allows_scrolling(self) -> bool {
        matches!(self, Self::Auto | Self::Scroll | Self::Overlay)
    }
}

/// Vertical/horizontal alignment for `scrollIntoView`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    Start,
    Center,
    End,
    Nearest,
}

/// Scroll animation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Jump instantly.
    #[default]
    Auto,
    /// Animate; completion must be detected from scroll events.
    Smooth,
}

/// Arguments for [`Document::scroll_into_view`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollIntoView {
    pub block: ScrollAlign,
    pub inline: ScrollAlign,
    pub behavior: ScrollBehavior,
}

/// What the host environment can do when scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCapabilities {
    /// Smooth scrolling is available (false during server-side rendering).
    pub smooth: bool,
    /// `block: "center"` animates correctly. Some engines mis-handle
    /// centering combined with smooth scrolling.
    pub center_alignment: bool,
}

impl Default for ScrollCapabilities {
    fn default() -> Self {
        Self {
            smooth: true,
            center_alignment: true,
        }
    }
}

/// Layout queries and scroll commands supplied by the host.
pub trait Document {
    /// The page scrolling element.
    fn root(&self) -> ElementId;

    /// Viewport dimensions.
    fn viewport(&self) -> Size;

    /// Bounding client rectangle of `element`.
    fn bounding_rect(&self, element: ElementId) -> Rect;

    /// Inner visible height of `element` (`clientHeight`).
    fn client_height(&self, element: ElementId) -> f64;

    /// Total content height of `element` (`scrollHeight`).
    fn scroll_height(&self, element: ElementId) -> f64;

    /// Parent element, `None` for the root.
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// Computed vertical overflow of `element`.
    fn overflow(&self, element: ElementId) -> Overflow;

    /// Topmost element at a client point (`elementFromPoint`).
    fn element_from_point(&self, point: Point) -> Option<ElementId>;

    /// Resolve a CSS selector against the document.
    fn query_selector(&self, selector: &str) -> Option<ElementId>;

    /// Scroll capabilities of the environment.
    fn capabilities(&self) -> ScrollCapabilities {
        ScrollCapabilities::default()
    }

    /// Scroll `element` into view.
    fn scroll_into_view(&mut self, element: ElementId, options: ScrollIntoView);

    /// Scroll `container` to absolute offsets.
    fn scroll_to(&mut self, container: ElementId, left: f64, top: f64);

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_scrollability() {
        assert!(Overflow::Auto.allows_scrolling());
        assert!(Overflow::Scroll.allows_scrolling());
        assert!(Overflow::Overlay.allows_scrolling());
        assert!(!Overflow::Visible.allows_scrolling());
        assert!(!Overflow::Hidden.allows_scrolling());
        assert!(!Overflow::Clip.allows_scrolling());
    }

    #[test]
    fn element_id_display() {
        assert_eq!(ElementId(7).to_string(), "#7");
    }
}
