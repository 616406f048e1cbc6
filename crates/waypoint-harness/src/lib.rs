#![forbid(unsafe_code)]

//! Test harness for waypoint tours.
//!
//! - [`SimDocument`]: an in-memory page with hit testing and a scroll log.
//! - [`RecordingAnchor`]: an anchor that counts shows and hides.
//! - [`FakeNavigator`] and the recording backdrop, scroll-lock and click
//!   collaborators.
//! - [`TourFixture`]: a service wired to all of the above, plus an
//!   [`EventLog`] of everything it published.
//! - [`capture_logs`]: collect `tracing` output from a closure.

pub mod anchor;
pub mod capture;
pub mod collab;
pub mod document;
pub mod fixture;

pub use anchor::RecordingAnchor;
pub use capture::{CapturedEvent, capture_logs, capture_warnings};
pub use collab::{
    BackdropCall, FakeNavigator, NavigationMode, RecordingAnchorClick, RecordingBackdrop,
    RecordingScrollLock,
};
pub use document::{ScrollCall, SimDocument};
pub use fixture::{EventLog, TourFixture};
