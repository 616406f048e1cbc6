#![forbid(unsafe_code)]

//! Anchors that remember what they were asked to render.

use std::cell::RefCell;
use std::rc::Rc;

use waypoint_core::ElementId;
use waypoint_runtime::{Step, TourAnchor};

#[derive(Debug, Default)]
struct AnchorState {
    visible: bool,
    shows: usize,
    hides: usize,
    last_step: Option<Step>,
}

/// A [`TourAnchor`] recording shows and hides.
///
/// Clones share state. The tour only holds a weak handle, so keep the
/// [`handle`](Self::handle) alive for as long as the anchor is "mounted".
#[derive(Debug, Clone)]
pub struct RecordingAnchor {
    element: ElementId,
    state: Rc<RefCell<AnchorState>>,
}

impl RecordingAnchor {
    pub fn new(element: ElementId) -> Self {
        Self {
            element,
            state: Rc::default(),
        }
    }

    /// A strong handle suitable for `TourService::register`.
    pub fn handle(&self) -> Rc<dyn TourAnchor> {
        Rc::new(self.clone())
    }

    /// Whether a step is currently rendered on this anchor.
    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn show_count(&self) -> usize {
        self.state.borrow().shows
    }

    pub fn hide_count(&self) -> usize {
        self.state.borrow().hides
    }

    /// The most recent step shown here.
    pub fn last_step(&self) -> Option<Step> {
        self.state.borrow().last_step.clone()
    }
}

impl TourAnchor for RecordingAnchor {
    fn element(&self) -> ElementId {
        self.element
    }

    fn show_tour_step(&self, step: &Step) {
        let mut state = self.state.borrow_mut();
        state.visible = true;
        state.shows += 1;
        state.last_step = Some(step.clone());
    }

    fn hide_tour_step(&self) {
        let mut state = self.state.borrow_mut();
        state.visible = false;
        state.hides += 1;
    }
}
