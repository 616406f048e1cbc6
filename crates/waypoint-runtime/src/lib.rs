#![forbid(unsafe_code)]

//! Runtime: the tour state machine and everything it talks to.
//!
//! # Role in waypoint
//! `waypoint-runtime` owns a tour: the resolved steps, the current position,
//! the lifecycle status, and the pending waits between steps. It drives the
//! host page through the collaborator traits in [`host`] and reports what
//! happened on the [`EventBus`].
//!
//! # Primary responsibilities
//! - **Steps**: [`StepOption`] layering and validation ([`step`]).
//! - **Anchors**: the weak [`AnchorRegistry`] and the [`TourAnchor`] contract.
//! - **State machine**: [`TourService`], driven by [`TourMsg`] and a logical
//!   clock.
//! - **Events**: multicast [`EventBus`] of [`TourEvent`]s.
//! - **Routes**: [`UrlTree`] matching for step routes.
//! - **Config**: [`TourConfig`], loadable from TOML/JSON with `config`.
//!
//! # How it fits in the system
//! Layout and scrolling questions go to `waypoint-core`. The `waypoint`
//! facade re-exports this crate and adds the unified error model.

pub mod anchor;
pub mod bus;
pub mod clock;
pub mod config;
pub mod error;
pub mod host;
pub mod route;
pub mod service;
pub mod step;

pub use anchor::{AnchorRegistry, TourAnchor};
pub use bus::{Direction, EventBus, StepChange, Subject, Subscription, TourEvent, TourEventKind};
pub use clock::FrameClock;
pub use config::{ConfigError, TourConfig};
pub use error::TourError;
pub use host::{
    AnchorClick, Backdrop, NavigationOutcome, NavigationTrigger, Navigator, ScrollLock, TourHost,
};
pub use route::{UrlTree, is_url_active};
pub use service::{StepProgress, TourMsg, TourService, TourStatus};
pub use step::{
    BackdropConfig, DuplicateAnchorHandling, Overlay, Placement, Route, ScrollOptions, Step,
    StepDimensions, StepOption, StepRef,
};
