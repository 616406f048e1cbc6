#![forbid(unsafe_code)]

//! Tour errors.
//!
//! Two families, handled differently:
//!
//! 1. **Configuration** errors ([`TourError::InvalidStep`],
//!    [`TourError::DuplicateAnchor`]) fail the call that caused them and are
//!    returned as `Err`.
//! 2. **Resolution** errors ([`TourError::StepNotFound`],
//!    [`TourError::AnchorNotRegistered`], [`TourError::NavigationFailed`])
//!    happen during a transition. They are published on the event bus as
//!    [`TourEvent::Error`](crate::bus::TourEvent::Error) and the tour ends.

use std::fmt;

use crate::step::StepRef;

/// Errors raised by the tour service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourError {
    /// A step failed validation during `initialize`.
    InvalidStep {
        anchor_id: Option<String>,
        reason: &'static str,
    },
    /// An anchor id was registered twice under the `error` policy.
    DuplicateAnchor { anchor_id: String },
    /// A step reference matched no step.
    StepNotFound { target: StepRef },
    /// The step's anchor is not registered and the step is not optional.
    AnchorNotRegistered { anchor_id: Option<String> },
    /// Navigation to the step's route was rejected.
    NavigationFailed { url: String },
}

impl TourError {
    /// Whether the error is a configuration error, returned from the call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidStep { .. } | Self::DuplicateAnchor { .. })
    }
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStep { anchor_id, reason } => match anchor_id {
                Some(id) => write!(f, "invalid step for anchor \"{id}\": {reason}"),
                None => write!(f, "invalid step: {reason}"),
            },
            Self::DuplicateAnchor { anchor_id } => {
                write!(f, "anchor \"{anchor_id}\" is already registered")
            }
            Self::StepNotFound { target } => write!(f, "can't find step {target}"),
            Self::AnchorNotRegistered { anchor_id } => match anchor_id {
                Some(id) => write!(f, "can't attach to unregistered anchor \"{id}\""),
                None => f.write_str("step has no anchor id"),
            },
            Self::NavigationFailed { url } => write!(f, "navigation to \"{url}\" failed"),
        }
    }
}

impl std::error::Error for TourError {}
