#![forbid(unsafe_code)]

//! Fake router and recording overlay collaborators.
//!
//! Each type is a cheap shared handle: hand one clone to the
//! [`TourHost`](waypoint_runtime::TourHost) and keep another for assertions.

use std::cell::RefCell;
use std::rc::Rc;

use waypoint_core::{ElementId, ScrollContainer};
use waypoint_runtime::{
    AnchorClick, Backdrop, NavigationOutcome, Navigator, ScrollLock, Step,
};

/// How [`FakeNavigator`] answers navigation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationMode {
    /// Move to the URL and report success.
    #[default]
    Succeed,
    /// Stay put and report failure.
    Reject,
    /// Report [`NavigationOutcome::Pending`]; the test finishes it.
    Defer,
}

#[derive(Debug, Default)]
struct NavigatorState {
    url: String,
    mode: NavigationMode,
    requests: Vec<String>,
}

/// In-memory router.
#[derive(Debug, Clone)]
pub struct FakeNavigator {
    state: Rc<RefCell<NavigatorState>>,
}

impl FakeNavigator {
    pub fn at(url: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(NavigatorState {
                url: url.into(),
                ..NavigatorState::default()
            })),
        }
    }

    pub fn set_mode(&self, mode: NavigationMode) {
        self.state.borrow_mut().mode = mode;
    }

    /// Change the location without going through the tour.
    pub fn set_url(&self, url: impl Into<String>) {
        self.state.borrow_mut().url = url.into();
    }

    pub fn url(&self) -> String {
        self.state.borrow().url.clone()
    }

    /// URLs the tour asked to navigate to.
    pub fn requests(&self) -> Vec<String> {
        self.state.borrow().requests.clone()
    }
}

impl Navigator for FakeNavigator {
    fn current_url(&self) -> String {
        self.url()
    }

    fn navigate_by_url(&mut self, url: &str) -> NavigationOutcome {
        let mut state = self.state.borrow_mut();
        state.requests.push(url.to_owned());
        match state.mode {
            NavigationMode::Succeed => {
                state.url = url.to_owned();
                NavigationOutcome::Completed(true)
            }
            NavigationMode::Reject => NavigationOutcome::Completed(false),
            NavigationMode::Defer => {
                state.url = url.to_owned();
                NavigationOutcome::Pending
            }
        }
    }
}

/// Calls received by [`RecordingBackdrop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropCall {
    Show(ElementId),
    Close,
    CloseSpotlight,
    DisconnectResizeObserver,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingBackdrop {
    calls: Rc<RefCell<Vec<BackdropCall>>>,
}

impl RecordingBackdrop {
    pub fn calls(&self) -> Vec<BackdropCall> {
        self.calls.borrow().clone()
    }

    /// Whether the last show was not followed by a close.
    pub fn is_shown(&self) -> bool {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|c| matches!(c, BackdropCall::Show(_) | BackdropCall::Close))
            .is_some_and(|c| matches!(c, BackdropCall::Show(_)))
    }
}

impl Backdrop for RecordingBackdrop {
    fn show(&mut self, anchor: ElementId, _step: &Step) {
        self.calls.borrow_mut().push(BackdropCall::Show(anchor));
    }

    fn close(&mut self) {
        self.calls.borrow_mut().push(BackdropCall::Close);
    }

    fn close_spotlight(&mut self) {
        self.calls.borrow_mut().push(BackdropCall::CloseSpotlight);
    }

    fn disconnect_resize_observer(&mut self) {
        self.calls
            .borrow_mut()
            .push(BackdropCall::DisconnectResizeObserver);
    }
}

#[derive(Debug, Default)]
struct LockState {
    enabled: bool,
    container: Option<ScrollContainer>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingScrollLock {
    state: Rc<RefCell<LockState>>,
}

impl RecordingScrollLock {
    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    /// Container passed to the last `enable`.
    pub fn container(&self) -> Option<ScrollContainer> {
        self.state.borrow().container.clone()
    }
}

impl ScrollLock for RecordingScrollLock {
    fn enable(&mut self, container: Option<&ScrollContainer>) {
        let mut state = self.state.borrow_mut();
        state.enabled = true;
        state.container = container.cloned();
    }

    fn disable(&mut self) {
        let mut state = self.state.borrow_mut();
        state.enabled = false;
        state.container = None;
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingAnchorClick {
    listening: Rc<RefCell<Option<ElementId>>>,
}

impl RecordingAnchorClick {
    /// Element with an active click listener.
    pub fn listening_on(&self) -> Option<ElementId> {
        *self.listening.borrow()
    }
}

impl AnchorClick for RecordingAnchorClick {
    fn add_listener(&mut self, element: ElementId) {
        *self.listening.borrow_mut() = Some(element);
    }

    fn remove_listener(&mut self) {
        *self.listening.borrow_mut() = None;
    }
}
