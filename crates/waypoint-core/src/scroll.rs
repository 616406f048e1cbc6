#![forbid(unsafe_code)]

//! Scroll coordination: bring a tour anchor into view and report when the
//! page has stopped moving.
//!
//! # Policy
//!
//! [`plan_scroll`] picks exactly one action, first match wins:
//!
//! 1. scrolling disabled → nothing
//! 2. explicit non-zero coordinates → scroll the container there
//! 3. anchor taller than its container → align start
//! 4. centering requested and supported → align center
//! 5. bottom edge off-screen or covered → align end
//! 6. top edge off-screen or covered → align start
//! 7. otherwise → nothing
//!
//! # Settling
//!
//! Smooth scrolls finish asynchronously. [`ScrollSettle`] tracks the scroll
//! events the host forwards and resolves once the container has been quiet
//! for [`SCROLL_DEBOUNCE`], or, if no scroll event ever arrives, after
//! [`SCROLL_IDLE_TIMEOUT`] plus the debounce. Time is whatever monotonic
//! clock the caller passes in.

use std::time::Duration;

use tracing::{debug, trace};

use crate::document::{Document, ElementId, ScrollAlign, ScrollBehavior, ScrollIntoView};
use crate::geometry::ElementSides;
use crate::viewport::{ScrollContainer, is_covered, is_height_overflowing, is_in_viewport, scroll_container};

/// Quiet period after the last scroll event before the scroll counts as done.
pub const SCROLL_DEBOUNCE: Duration = Duration::from_millis(50);

/// How long to wait for the first (or next) scroll event before giving up.
pub const SCROLL_IDLE_TIMEOUT: Duration = Duration::from_millis(75);

/// Target offsets for an explicit scroll.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

impl Coordinates {
    /// Create new coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `{0, 0}` means "no explicit coordinates".
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Resolved scroll preferences for a single step.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollSettings {
    pub disable_scroll_to_anchor: bool,
    pub center_anchor_on_scroll: bool,
    pub smooth_scroll: bool,
    /// Block page scrolling while the step is shown. Not used by the
    /// coordinator itself; the tour hands it to the scroll-lock collaborator.
    pub disable_page_scrolling: bool,
    pub scroll_container: Option<ScrollContainer>,
    pub coordinates: Coordinates,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            disable_scroll_to_anchor: false,
            center_anchor_on_scroll: true,
            smooth_scroll: true,
            disable_page_scrolling: true,
            scroll_container: None,
            coordinates: Coordinates::default(),
        }
    }
}

/// The single scroll action chosen for an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollPlan {
    /// Leave the page alone.
    None,
    /// Scroll `container` to fixed offsets.
    ToCoordinates {
        container: ElementId,
        coordinates: Coordinates,
    },
    /// Call `scrollIntoView` on the anchor.
    IntoView(ScrollIntoView),
}

/// Decide how to bring `anchor` into view without touching the document.
pub fn plan_scroll(doc: &dyn Document, anchor: ElementId, settings: &ScrollSettings) -> ScrollPlan {
    if settings.disable_scroll_to_anchor {
        return ScrollPlan::None;
    }

    let caps = doc.capabilities();
    let behavior = if settings.smooth_scroll && caps.smooth {
        ScrollBehavior::Smooth
    } else {
        ScrollBehavior::Auto
    };
    let container = scroll_container(doc, anchor, settings.scroll_container.as_ref())
        .unwrap_or_else(|| doc.root());

    if !settings.coordinates.is_zero() {
        return ScrollPlan::ToCoordinates {
            container,
            coordinates: settings.coordinates,
        };
    }

    let into_view = |block, inline| {
        ScrollPlan::IntoView(ScrollIntoView {
            block,
            inline,
            behavior,
        })
    };

    if is_height_overflowing(doc, anchor, container) {
        into_view(ScrollAlign::Start, ScrollAlign::Start)
    } else if settings.center_anchor_on_scroll && caps.center_alignment {
        into_view(ScrollAlign::Center, ScrollAlign::Center)
    } else if !is_in_viewport(doc, anchor, ElementSides::BOTTOM)
        || is_covered(doc, anchor, ElementSides::BOTTOM)
    {
        into_view(ScrollAlign::End, ScrollAlign::Nearest)
    } else if !is_in_viewport(doc, anchor, ElementSides::TOP)
        || is_covered(doc, anchor, ElementSides::TOP)
    {
        into_view(ScrollAlign::Start, ScrollAlign::Nearest)
    } else {
        ScrollPlan::None
    }
}

/// Outcome of [`ensure_visible`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollCompletion {
    /// Nothing to wait for; the anchor may be rendered now.
    Ready,
    /// A smooth scroll is running; feed scroll events to the settle tracker.
    Settling(ScrollSettle),
}

impl ScrollCompletion {
    /// Whether the caller can continue immediately.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Bring `anchor` into view according to `settings`.
///
/// `now` is the caller's monotonic clock, used to start the settle timer.
pub fn ensure_visible(
    doc: &mut dyn Document,
    anchor: ElementId,
    settings: &ScrollSettings,
    now: Duration,
) -> ScrollCompletion {
    let plan = plan_scroll(&*doc, anchor, settings);
    debug!(%anchor, ?plan, "scroll plan");
    match plan {
        ScrollPlan::None => ScrollCompletion::Ready,
        ScrollPlan::ToCoordinates {
            container,
            coordinates,
        } => {
            doc.scroll_to(container, coordinates.x, coordinates.y);
            ScrollCompletion::Ready
        }
        ScrollPlan::IntoView(options) => {
            doc.scroll_into_view(anchor, options);
            match options.behavior {
                ScrollBehavior::Auto => ScrollCompletion::Ready,
                ScrollBehavior::Smooth => {
                    let container = scroll_container(&*doc, anchor, settings.scroll_container.as_ref())
                        .unwrap_or_else(|| doc.root());
                    ScrollCompletion::Settling(ScrollSettle::new(container, now))
                }
            }
        }
    }
}

/// Debounced detector for the end of a smooth scroll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollSettle {
    container: ElementId,
    started: Duration,
    last_scroll: Option<Duration>,
}

impl ScrollSettle {
    /// Start tracking scroll events on `container` at time `now`.
    pub fn new(container: ElementId, now: Duration) -> Self {
        Self {
            container,
            started: now,
            last_scroll: None,
        }
    }

    /// The container whose scroll events are tracked.
    pub fn container(&self) -> ElementId {
        self.container
    }

    /// Record a scroll event. Events from other containers are ignored.
    ///
    /// Returns whether the event was accepted.
    pub fn record_scroll(&mut self, container: ElementId, now: Duration) -> bool {
        if container != self.container {
            trace!(%container, expected = %self.container, "ignoring foreign scroll event");
            return false;
        }
        self.last_scroll = Some(now);
        true
    }

    /// Clock value at which the scroll counts as settled.
    pub fn deadline(&self) -> Duration {
        match self.last_scroll {
            Some(at) => at + SCROLL_DEBOUNCE,
            None => self.started + SCROLL_IDLE_TIMEOUT + SCROLL_DEBOUNCE,
        }
    }

    /// Whether the scroll has settled at `now`.
    pub fn is_settled(&self, now: Duration) -> bool {
        now >= self.deadline()
    }
}
