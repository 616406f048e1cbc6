#![forbid(unsafe_code)]

//! Unified error model.
//!
//! Tour failures come in two families:
//!
//! 1. **Configuration**: a step list that can't be initialized, an anchor id
//!    registered twice, or a tour file that can't be loaded. The call that
//!    caused it fails and nothing changes.
//! 2. **Resolution**: a step target, anchor or route that can't be reached
//!    mid-tour. The tour has already ended by the time the error is seen on
//!    the event bus.
//!
//! Redundant calls (starting a running tour, moving while a scroll is in
//! flight) are not errors; they log a warning and return.

use std::fmt;

use waypoint_runtime::{ConfigError, TourError};

/// Top-level error type for waypoint hosts.
#[derive(Debug)]
pub enum Error {
    /// Raised by the tour service, either returned or published.
    Tour(TourError),
    /// Loading or applying a tour definition failed.
    Config(ConfigError),
}

/// Standard result type for waypoint APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// What a host should do about an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The call failed; the tour is unchanged. Fix the input and retry.
    FailCall,
    /// The tour ended. Re-`initialize` or `start` to run it again.
    EndTour,
}

impl Error {
    /// Classify the error for recovery.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Tour(err) | Self::Config(ConfigError::Tour(err)) => tour_recovery(err),
            Self::Config(_) => Recovery::FailCall,
        }
    }

    /// Error type label for logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Tour(TourError::InvalidStep { .. }) => "invalid_step",
            Self::Tour(TourError::DuplicateAnchor { .. }) => "duplicate_anchor",
            Self::Tour(TourError::StepNotFound { .. }) => "step_not_found",
            Self::Tour(TourError::AnchorNotRegistered { .. }) => "anchor_not_registered",
            Self::Tour(TourError::NavigationFailed { .. }) => "navigation_failed",
            Self::Config(_) => "config",
        }
    }

    /// Whether the tour is still in the state it was before the error.
    pub fn is_recoverable(&self) -> bool {
        self.recovery() == Recovery::FailCall
    }
}

fn tour_recovery(err: &TourError) -> Recovery {
    if err.is_configuration() {
        Recovery::FailCall
    } else {
        Recovery::EndTour
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tour(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailCall => f.write_str("fail_call"),
            Self::EndTour => f.write_str("end_tour"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tour(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<TourError> for Error {
    fn from(err: TourError) -> Self {
        Self::Tour(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
