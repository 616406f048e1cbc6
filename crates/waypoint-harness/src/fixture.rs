#![forbid(unsafe_code)]

//! A tour wired to simulated collaborators.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use waypoint_core::{ElementId, Rect, ScrollCapabilities};
use waypoint_runtime::{
    Subscription, TourAnchor, TourError, TourEvent, TourEventKind, TourHost, TourService,
};

use crate::anchor::RecordingAnchor;
use crate::collab::{FakeNavigator, RecordingAnchorClick, RecordingBackdrop, RecordingScrollLock};
use crate::document::SimDocument;

/// Records every event published on a tour's bus.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Rc<RefCell<Vec<TourEvent>>>,
    _subscription: Rc<Subscription>,
}

impl EventLog {
    pub fn attach(tour: &TourService) -> Self {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let subscription = tour
            .events()
            .subscribe(move |event| sink.borrow_mut().push(event.clone()));
        Self {
            events,
            _subscription: Rc::new(subscription),
        }
    }

    pub fn events(&self) -> Vec<TourEvent> {
        self.events.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<TourEventKind> {
        self.events.borrow().iter().map(TourEvent::kind).collect()
    }

    pub fn count(&self, kind: TourEventKind) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }

    /// Anchor ids of shown steps, in order.
    pub fn shown(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TourEvent::StepShow(change) => Some(change.step.anchor_id.clone().unwrap_or_default()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<TourError> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TourEvent::Error(err) => Some(err.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// A [`TourService`] on a simulated page with recording collaborators.
///
/// The page is 1024x768 and scrolls instantly, so steps show on the first
/// `advance` unless a test opts into smooth scrolling.
pub struct TourFixture {
    pub tour: TourService,
    pub document: SimDocument,
    pub navigator: FakeNavigator,
    pub backdrop: RecordingBackdrop,
    pub scroll_lock: RecordingScrollLock,
    pub clicks: RecordingAnchorClick,
    pub log: EventLog,
    mounted: Vec<(String, Rc<dyn TourAnchor>)>,
}

impl Default for TourFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TourFixture {
    pub fn new() -> Self {
        let document = SimDocument::new(1024.0, 768.0);
        document.set_capabilities(ScrollCapabilities {
            smooth: false,
            center_alignment: true,
        });
        Self::with_document(document)
    }

    pub fn with_document(document: SimDocument) -> Self {
        let navigator = FakeNavigator::at("/");
        let backdrop = RecordingBackdrop::default();
        let scroll_lock = RecordingScrollLock::default();
        let clicks = RecordingAnchorClick::default();
        let host = TourHost::new(document.clone(), navigator.clone())
            .with_backdrop(backdrop.clone())
            .with_scroll_lock(scroll_lock.clone())
            .with_anchor_click(clicks.clone());
        let tour = TourService::new(host);
        let log = EventLog::attach(&tour);
        Self {
            tour,
            document,
            navigator,
            backdrop,
            scroll_lock,
            clicks,
            log,
            mounted: Vec::new(),
        }
    }

    /// Add an on-screen element and register an anchor for it.
    pub fn mount(&mut self, anchor_id: &str) -> Result<RecordingAnchor, TourError> {
        let slot = self.mounted.len() as f64;
        let element = self
            .document
            .add_to_root(Rect::new(40.0, 40.0 + slot * 60.0, 200.0, 40.0));
        self.mount_element(anchor_id, element)
    }

    /// Register an anchor for an existing element.
    pub fn mount_element(
        &mut self,
        anchor_id: &str,
        element: ElementId,
    ) -> Result<RecordingAnchor, TourError> {
        let anchor = RecordingAnchor::new(element);
        let handle = anchor.handle();
        self.tour.register(anchor_id, &handle)?;
        self.mounted.push((anchor_id.to_owned(), handle));
        Ok(anchor)
    }

    /// Unregister `anchor_id` and drop every handle mounted under it.
    pub fn unmount(&mut self, anchor_id: &str) {
        self.tour.unregister(anchor_id);
        self.mounted.retain(|(id, _)| id != anchor_id);
    }

    /// Drop the handles without telling the tour.
    pub fn drop_handles(&mut self, anchor_id: &str) {
        self.mounted.retain(|(id, _)| id != anchor_id);
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.tour.advance(Duration::from_millis(ms));
    }

    /// Run everything due now.
    pub fn flush(&mut self) {
        self.tour.advance(Duration::ZERO);
    }
}
