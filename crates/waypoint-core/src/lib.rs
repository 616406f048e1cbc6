#![forbid(unsafe_code)]

//! Core: geometry, document probing, and scroll coordination.
//!
//! # Role in waypoint
//! `waypoint-core` knows nothing about tours. It answers layout questions
//! about a host page (is this edge on screen, is it covered, which element
//! scrolls it) and decides how to scroll an anchor into view.
//!
//! # Primary responsibilities
//! - **Geometry**: [`Rect`], [`Size`], [`ElementSides`] in CSS pixels.
//! - **Document**: the [`Document`] trait a host implements over its DOM.
//! - **Viewport**: edge visibility, occlusion, scroll-container lookup.
//! - **Scroll**: [`scroll::ensure_visible`] and the [`ScrollSettle`] debounce.
//! - **Keys**: the small [`KeyCode`] set used for tour hotkeys.
//!
//! # How it fits in the system
//! `waypoint-runtime` owns the tour state machine and calls into this crate
//! whenever a step is about to be shown.

pub mod document;
pub mod event;
pub mod geometry;
pub mod scroll;
pub mod viewport;

pub use document::{
    Document, ElementId, Overflow, ScrollAlign, ScrollBehavior, ScrollCapabilities,
    ScrollIntoView,
};
pub use event::{KeyCode, KeyEvent, KeyEventKind};
pub use geometry::{ElementSides, Point, Rect, Size};
pub use scroll::{Coordinates, ScrollCompletion, ScrollPlan, ScrollSettings, ScrollSettle};
pub use viewport::ScrollContainer;
