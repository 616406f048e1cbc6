#![forbid(unsafe_code)]

//! waypoint public facade crate.
//!
//! Guided tours that walk a user through a host page one anchored step at a
//! time. This crate re-exports the stable surface of the internal crates,
//! adds the unified [`Error`] model, and offers a prelude for day-to-day use.
//!
//! ```rust,ignore
//! use waypoint::prelude::*;
//!
//! let mut tour = TourService::new(TourHost::new(document, navigator));
//! let _errors = waypoint::report_errors(tour.events());
//! tour.register("search", &search_anchor)?;
//! tour.initialize(&[StepOption::anchored("search").title("Search")], None)?;
//! tour.start();
//! // host frame loop
//! tour.update(TourMsg::Tick(frame_delta));
//! ```

pub mod error;

pub use error::{Error, Recovery, Result};

// --- Core re-exports -------------------------------------------------------

pub use waypoint_core::{
    Coordinates, Document, ElementId, ElementSides, KeyCode, KeyEvent, KeyEventKind, Overflow,
    Point, Rect, ScrollCapabilities, ScrollContainer, ScrollSettings, Size,
};

// --- Runtime re-exports ----------------------------------------------------

pub use waypoint_runtime::{
    AnchorClick, Backdrop, BackdropConfig, ConfigError, Direction, DuplicateAnchorHandling,
    EventBus, FrameClock, NavigationOutcome, NavigationTrigger, Navigator, Placement, Route,
    ScrollLock, ScrollOptions, Step, StepChange, StepOption, StepProgress, StepRef, Subscription,
    TourAnchor, TourConfig, TourError, TourEvent, TourEventKind, TourHost, TourMsg, TourService,
    TourStatus,
};

/// Log every error published on `events` with its recovery class.
///
/// Keep the returned subscription alive for as long as errors should be
/// reported.
pub fn report_errors(events: &EventBus) -> Subscription {
    events.on_error(|err| {
        let recovery = Error::Tour(err.clone()).recovery();
        tracing::warn!(%recovery, "tour error: {err}");
    })
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Direction, Document, ElementId, Error, KeyCode, KeyEvent, Navigator, Result, StepOption,
        StepRef, TourAnchor, TourEvent, TourHost, TourMsg, TourService, TourStatus,
    };

    pub use crate::{core, runtime};
}

pub use waypoint_core as core;
pub use waypoint_runtime as runtime;
