#![forbid(unsafe_code)]

//! Anchors and the anchor registry.
//!
//! An anchor is a host element a step attaches to. The host owns it; the
//! registry only keeps a [`Weak`] handle. An anchor whose owner has dropped
//! it counts as unregistered even before `unregister` is called.

use std::rc::{Rc, Weak};

use ahash::AHashMap;
use waypoint_core::ElementId;

use crate::step::Step;

/// A host element that can display a tour step.
///
/// Methods take `&self`; implementations use interior mutability for their
/// render state.
pub trait TourAnchor {
    /// The element the step points at.
    fn element(&self) -> ElementId;

    /// Render `step` next to this anchor.
    fn show_tour_step(&self, step: &Step);

    /// Remove whatever `show_tour_step` rendered.
    fn hide_tour_step(&self);
}

/// Anchor id → weak anchor handle.
#[derive(Default)]
pub struct AnchorRegistry {
    anchors: AHashMap<String, Weak<dyn TourAnchor>>,
}

impl std::fmt::Debug for AnchorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorRegistry")
            .field("len", &self.anchors.len())
            .finish()
    }
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live handle for `id`.
    pub fn get(&self, id: &str) -> Option<Rc<dyn TourAnchor>> {
        self.anchors.get(id).and_then(Weak::upgrade)
    }

    /// Whether a live anchor is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Store `anchor` under `id`, replacing any previous handle.
    pub fn insert(&mut self, id: impl Into<String>, anchor: &Rc<dyn TourAnchor>) {
        self.anchors.insert(id.into(), Rc::downgrade(anchor));
    }

    /// Drop the handle for `id`. Returns whether one was stored.
    pub fn remove(&mut self, id: &str) -> bool {
        self.anchors.remove(id).is_some()
    }

    /// Number of stored handles, live or not.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Forget handles whose anchor has been dropped.
    pub fn prune(&mut self) {
        self.anchors.retain(|_, w| w.strong_count() > 0);
    }
}
