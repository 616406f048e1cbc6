#![forbid(unsafe_code)]

//! Host collaborators.
//!
//! The tour service drives the page through a small set of traits. A host
//! supplies real implementations (router, overlay, scroll blocker, click
//! listener); the no-op ones here fill in whatever a host doesn't need.

use waypoint_core::{Document, ElementId, ScrollContainer};

use crate::route::is_url_active;
use crate::step::Step;

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The router finished; `false` means it rejected the navigation.
    Completed(bool),
    /// The router will report back through
    /// [`TourService::complete_navigation`](crate::service::TourService::complete_navigation).
    Pending,
}

/// What triggered a navigation the service did not start itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTrigger {
    /// Program code called the router.
    Imperative,
    /// Browser back/forward.
    Popstate,
    /// The URL fragment changed.
    Hashchange,
}

/// Application router.
pub trait Navigator {
    /// The URL currently displayed.
    fn current_url(&self) -> String;

    /// Whether `url` is the active route.
    fn is_active(&self, url: &str) -> bool {
        is_url_active(&self.current_url(), url)
    }

    /// Navigate to `url`.
    fn navigate_by_url(&mut self, url: &str) -> NavigationOutcome;
}

/// Overlay that dims the page around the active anchor.
pub trait Backdrop {
    fn show(&mut self, anchor: ElementId, step: &Step);
    fn close(&mut self);
    /// Drop only the spotlight cut-out, keeping the dimmed overlay.
    fn close_spotlight(&mut self);
    fn disconnect_resize_observer(&mut self);
}

/// Blocks user scrolling of a container (the page when `None`).
pub trait ScrollLock {
    fn enable(&mut self, container: Option<&ScrollContainer>);
    fn disable(&mut self);
}

/// Click listener on the active anchor. The host forwards clicks as
/// [`TourMsg::AnchorClicked`](crate::service::TourMsg::AnchorClicked).
pub trait AnchorClick {
    fn add_listener(&mut self, element: ElementId);
    fn remove_listener(&mut self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoBackdrop;

impl Backdrop for NoBackdrop {
    fn show(&mut self, _anchor: ElementId, _step: &Step) {}
    fn close(&mut self) {}
    fn close_spotlight(&mut self) {}
    fn disconnect_resize_observer(&mut self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoScrollLock;

impl ScrollLock for NoScrollLock {
    fn enable(&mut self, _container: Option<&ScrollContainer>) {}
    fn disable(&mut self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoAnchorClick;

impl AnchorClick for NoAnchorClick {
    fn add_listener(&mut self, _element: ElementId) {}
    fn remove_listener(&mut self) {}
}

/// Everything the tour service needs from the host.
pub struct TourHost {
    pub document: Box<dyn Document>,
    pub navigator: Box<dyn Navigator>,
    pub backdrop: Box<dyn Backdrop>,
    pub scroll_lock: Box<dyn ScrollLock>,
    pub anchor_click: Box<dyn AnchorClick>,
}

impl TourHost {
    /// A host with a document and router; the rest are no-ops.
    pub fn new(document: impl Document + 'static, navigator: impl Navigator + 'static) -> Self {
        Self {
            document: Box::new(document),
            navigator: Box::new(navigator),
            backdrop: Box::new(NoBackdrop),
            scroll_lock: Box::new(NoScrollLock),
            anchor_click: Box::new(NoAnchorClick),
        }
    }

    #[must_use]
    pub fn with_backdrop(mut self, backdrop: impl Backdrop + 'static) -> Self {
        self.backdrop = Box::new(backdrop);
        self
    }

    #[must_use]
    pub fn with_scroll_lock(mut self, scroll_lock: impl ScrollLock + 'static) -> Self {
        self.scroll_lock = Box::new(scroll_lock);
        self
    }

    #[must_use]
    pub fn with_anchor_click(mut self, anchor_click: impl AnchorClick + 'static) -> Self {
        self.anchor_click = Box::new(anchor_click);
        self
    }
}

impl std::fmt::Debug for TourHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourHost").finish_non_exhaustive()
    }
}
