#![forbid(unsafe_code)]

//! Tour event bus.
//!
//! # Design
//!
//! [`Subject<T>`] is a multicast channel over shared, reference-counted
//! storage (`Rc<RefCell<..>>`). Every emitted value is delivered to all live
//! subscribers, in registration order, synchronously. Subscribers are held
//! weakly: dropping the returned [`Subscription`] detaches the callback, and
//! dead entries are pruned lazily on the next emit.
//!
//! [`EventBus`] is one `Subject<TourEvent>` plus typed helpers for the
//! individual streams (`step_show`, `end`, `anchor_register`, ...).
//!
//! # Failure Modes
//!
//! - **Re-entrant service calls**: a subscriber runs while the tour service
//!   is mid-transition and must not call back into it. Queue a
//!   [`TourMsg`](crate::service::TourMsg) and feed it to `update` instead.
//! - **Subscriber leak**: callbacks live as long as their [`Subscription`]
//!   guard.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace_span;

use crate::error::TourError;
use crate::step::Step;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// A synchronous multicast channel.
///
/// Cloning a `Subject` creates a new handle to the **same** subscriber list.
///
/// # Invariants
///
/// 1. Subscribers are notified in registration order.
/// 2. A subscriber registered during an emit does not see that emit.
/// 3. A dropped [`Subscription`] is never called again.
pub struct Subject<T> {
    subscribers: Rc<RefCell<Vec<CallbackWeak<T>>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("subscriber_count", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<T: 'static> Subject<T> {
    /// Create a subject with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every future value.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.subscribers.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Deliver `value` to every live subscriber.
    pub fn emit(&self, value: &T) {
        // Snapshot first so callbacks may subscribe or emit without a
        // borrow conflict.
        let callbacks: Vec<CallbackRc<T>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|w| w.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for cb in &callbacks {
            cb(value);
        }
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

/// RAII guard for a subscriber callback. Dropping it unsubscribes.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Direction of the most recent step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forwards,
    Backwards,
}

/// Payload of `step_show` and `step_hide`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepChange {
    pub step: Rc<Step>,
    pub index: usize,
    pub direction: Direction,
}

/// Everything the tour service publishes.
#[derive(Debug, Clone, PartialEq)]
pub enum TourEvent {
    StepShow(StepChange),
    StepHide(StepChange),
    /// The resolved steps of a fresh `initialize`.
    Initialize(Vec<Rc<Step>>),
    Start,
    End,
    Pause,
    Resume,
    AnchorRegister(String),
    AnchorUnregister(String),
    /// A transition failed; the tour ends right after.
    Error(TourError),
}

/// Discriminant of [`TourEvent`], for filtered subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TourEventKind {
    StepShow,
    StepHide,
    Initialize,
    Start,
    End,
    Pause,
    Resume,
    AnchorRegister,
    AnchorUnregister,
    Error,
}

impl TourEvent {
    /// Discriminant of this event.
    pub fn kind(&self) -> TourEventKind {
        match self {
            Self::StepShow(_) => TourEventKind::StepShow,
            Self::StepHide(_) => TourEventKind::StepHide,
            Self::Initialize(_) => TourEventKind::Initialize,
            Self::Start => TourEventKind::Start,
            Self::End => TourEventKind::End,
            Self::Pause => TourEventKind::Pause,
            Self::Resume => TourEventKind::Resume,
            Self::AnchorRegister(_) => TourEventKind::AnchorRegister,
            Self::AnchorUnregister(_) => TourEventKind::AnchorUnregister,
            Self::Error(_) => TourEventKind::Error,
        }
    }
}

impl TourEventKind {
    /// Stream name, as used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::StepShow => "step_show",
            Self::StepHide => "step_hide",
            Self::Initialize => "initialize",
            Self::Start => "start",
            Self::End => "end",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::AnchorRegister => "anchor_register",
            Self::AnchorUnregister => "anchor_unregister",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for TourEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The tour's event streams.
///
/// Cloning shares the underlying subscriber list, so a host can keep a
/// handle after moving the service elsewhere.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Subject<TourEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event, in emission order.
    pub fn subscribe(&self, callback: impl Fn(&TourEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    /// Only events of `kind`.
    pub fn subscribe_kind(
        &self,
        kind: TourEventKind,
        callback: impl Fn(&TourEvent) + 'static,
    ) -> Subscription {
        self.events.subscribe(move |event| {
            if event.kind() == kind {
                callback(event);
            }
        })
    }

    pub fn on_step_show(&self, callback: impl Fn(&StepChange) + 'static) -> Subscription {
        self.events.subscribe(move |event| {
            if let TourEvent::StepShow(change) = event {
                callback(change);
            }
        })
    }

    pub fn on_step_hide(&self, callback: impl Fn(&StepChange) + 'static) -> Subscription {
        self.events.subscribe(move |event| {
            if let TourEvent::StepHide(change) = event {
                callback(change);
            }
        })
    }

    pub fn on_anchor_register(&self, callback: impl Fn(&str) + 'static) -> Subscription {
        self.events.subscribe(move |event| {
            if let TourEvent::AnchorRegister(id) = event {
                callback(id);
            }
        })
    }

    pub fn on_error(&self, callback: impl Fn(&TourError) + 'static) -> Subscription {
        self.events.subscribe(move |event| {
            if let TourEvent::Error(err) = event {
                callback(err);
            }
        })
    }

    pub(crate) fn emit(&self, event: TourEvent) {
        let _span = trace_span!("tour.event", kind = event.kind().name()).entered();
        self.events.emit(&event);
    }

    /// Live subscriber count, including unpruned dead entries.
    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}
