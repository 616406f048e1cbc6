#![forbid(unsafe_code)]

//! The tour state machine.
//!
//! # States
//!
//! ```text
//!          start / start_at          pause
//!   OFF ─────────────────────▶ ON ─────────▶ PAUSED
//!    ▲                          │  ◀─────────   │
//!    │            end           │    resume     │ end
//!    └──────────────────────────┴───────────────┘
//! ```
//!
//! # Time
//!
//! The service never blocks and never reads a wall clock. Every wait (the
//! delay before a step is shown, an async anchor, a smooth scroll settling)
//! is stored as a pending continuation with a deadline on a logical clock.
//! The host moves that clock with [`TourService::advance`] (or
//! [`TourMsg::Tick`]); due continuations run in deadline order. A zero delay
//! runs on the next `advance`, never inline.
//!
//! # Host input
//!
//! Anchor clicks, navigation events, container scrolls and key presses
//! arrive as [`TourMsg`]s through [`TourService::update`]. Event-bus
//! subscribers must not call back into the service; they queue messages.

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, debug_span, trace, warn};
use waypoint_core::scroll::ensure_visible;
use waypoint_core::{ElementId, KeyCode, KeyEvent, ScrollCompletion, ScrollSettle};

use crate::anchor::{AnchorRegistry, TourAnchor};
use crate::bus::{Direction, EventBus, StepChange, TourEvent};
use crate::error::TourError;
use crate::host::{NavigationOutcome, NavigationTrigger, TourHost};
use crate::step::{DuplicateAnchorHandling, Step, StepOption, StepRef};

/// Continuations run by a single `advance` before yielding. Guards against
/// cycles of optional steps whose anchors never register.
const MAX_CONTINUATIONS_PER_ADVANCE: usize = 1024;

/// Lifecycle state of a tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TourStatus {
    #[default]
    Off,
    On,
    Paused,
}

/// Host input, delivered through [`TourService::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourMsg {
    /// Logical time moved forward.
    Tick(Duration),
    /// The active anchor was clicked.
    AnchorClicked,
    /// The router began a navigation.
    NavigationStart(NavigationTrigger),
    /// A navigation left pending by the navigator finished.
    NavigationFinished(bool),
    /// A scroll event fired on the given container.
    Scrolled(ElementId),
    /// A key was pressed.
    Key(KeyEvent),
}

/// "n / total" for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepProgress {
    /// One-based position of the current step.
    pub position: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy)]
struct PendingShow {
    at: Duration,
    index: usize,
}

#[derive(Debug, Clone)]
struct AnchorWait {
    index: usize,
    anchor_id: Option<String>,
    deadline: Option<Duration>,
    ready_at: Option<Duration>,
}

impl AnchorWait {
    fn due_at(&self) -> Option<Duration> {
        self.ready_at.or(self.deadline)
    }
}

struct ScrollWait {
    index: usize,
    anchor: Rc<dyn TourAnchor>,
    settle: ScrollSettle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Continuation {
    ScrollSettled,
    AnchorWait,
    Show,
}

/// Guided tour controller.
pub struct TourService {
    host: TourHost,
    bus: EventBus,
    anchors: AnchorRegistry,
    steps: Vec<Rc<Step>>,
    user_defaults: Option<StepOption>,
    current: Option<usize>,
    status: TourStatus,
    direction: Direction,
    hotkeys_enabled: bool,
    waiting_for_scroll: bool,
    navigation_started: bool,
    watching_routes: bool,
    click_listener_armed: bool,
    now: Duration,
    pending_show: Option<PendingShow>,
    anchor_wait: Option<AnchorWait>,
    pending_navigation: Option<(usize, String)>,
    scroll_wait: Option<ScrollWait>,
}

impl std::fmt::Debug for TourService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TourService")
            .field("status", &self.status)
            .field("current", &self.current)
            .field("steps", &self.steps.len())
            .field("direction", &self.direction)
            .field("waiting_for_scroll", &self.waiting_for_scroll)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl TourService {
    pub fn new(host: TourHost) -> Self {
        Self {
            host,
            bus: EventBus::new(),
            anchors: AnchorRegistry::new(),
            steps: Vec::new(),
            user_defaults: None,
            current: None,
            status: TourStatus::Off,
            direction: Direction::Forwards,
            hotkeys_enabled: true,
            waiting_for_scroll: false,
            navigation_started: false,
            watching_routes: false,
            click_listener_armed: false,
            now: Duration::ZERO,
            pending_show: None,
            anchor_wait: None,
            pending_navigation: None,
            scroll_wait: None,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// The event streams. Clone the bus to keep a handle.
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn status(&self) -> TourStatus {
        self.status
    }

    pub fn steps(&self) -> &[Rc<Step>] {
        &self.steps
    }

    pub fn current_step(&self) -> Option<&Rc<Step>> {
        self.current.and_then(|index| self.steps.get(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_waiting_for_scroll(&self) -> bool {
        self.waiting_for_scroll
    }

    /// Logical clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_registered(&self, anchor_id: &str) -> bool {
        self.anchors.contains(anchor_id)
    }

    /// Position of the current step, when it asks for a progress display.
    pub fn progress(&self) -> Option<StepProgress> {
        let index = self.current?;
        let step = self.steps.get(index)?;
        step.show_progress.then_some(StepProgress {
            position: index + 1,
            total: self.steps.len(),
        })
    }

    pub fn is_hotkeys_enabled(&self) -> bool {
        self.hotkeys_enabled
    }

    pub fn enable_hotkeys(&mut self) {
        self.hotkeys_enabled = true;
    }

    pub fn disable_hotkeys(&mut self) {
        self.hotkeys_enabled = false;
    }

    // ── Setup ───────────────────────────────────────────────────────────

    /// Defaults layered under every future `initialize`.
    pub fn set_defaults(&mut self, defaults: StepOption) {
        self.user_defaults = Some(defaults);
    }

    pub fn defaults(&self) -> Option<&StepOption> {
        self.user_defaults.as_ref()
    }

    /// Load a new step list.
    ///
    /// Ignored with a warning while the tour is ON or when `steps` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`TourError::InvalidStep`] if any resolved step fails
    /// validation. Nothing is stored in that case.
    pub fn initialize(
        &mut self,
        steps: &[StepOption],
        step_defaults: Option<&StepOption>,
    ) -> Result<(), TourError> {
        let _span = debug_span!("tour.initialize", steps = steps.len()).entered();
        if self.status == TourStatus::On {
            warn!("can't re-initialize the tour while it is active");
            return Ok(());
        }
        if steps.is_empty() {
            warn!("initialize called without steps");
            return Ok(());
        }

        let layers = [self.user_defaults.as_ref(), step_defaults];
        let resolved: Vec<Step> = steps
            .iter()
            .map(|option| Step::resolve(&option.layered(&layers)))
            .collect();
        for step in &resolved {
            step.validate()?;
        }

        self.status = TourStatus::Off;
        self.current = None;
        self.cancel_continuations();
        // A settle wait indexes into the old step list.
        self.scroll_wait = None;
        self.waiting_for_scroll = false;
        self.steps = resolved.into_iter().map(Rc::new).collect();
        self.watching_routes = true;
        debug!(steps = self.steps.len(), "tour initialized");
        self.bus.emit(TourEvent::Initialize(self.steps.clone()));
        Ok(())
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    pub fn start(&mut self) {
        if self.status == TourStatus::On {
            warn!("start called while the tour is already running");
            return;
        }
        self.start_at(StepRef::Index(0));
    }

    pub fn start_at(&mut self, target: impl Into<StepRef>) {
        let target = target.into();
        let _span = debug_span!("tour.start_at", %target).entered();
        if self.waiting_for_scroll {
            warn!("start_at ignored while scrolling");
            return;
        }
        self.status = TourStatus::On;
        self.bus.emit(TourEvent::Start);
        self.go_to_step(target);
    }

    pub fn end(&mut self) {
        let _span = debug_span!("tour.end").entered();
        if self.waiting_for_scroll {
            warn!("end ignored while scrolling");
            return;
        }
        if self.status == TourStatus::Off {
            return;
        }
        self.status = TourStatus::Off;
        self.disable_tour();
        self.current = None;
        self.direction = Direction::Forwards;
        self.watching_routes = false;
        self.cancel_continuations();
        self.bus.emit(TourEvent::End);
    }

    pub fn pause(&mut self) {
        let _span = debug_span!("tour.pause").entered();
        if self.status == TourStatus::Off {
            warn!("pause called while the tour is off");
            return;
        }
        self.status = TourStatus::Paused;
        self.disable_tour();
        self.cancel_continuations();
        self.bus.emit(TourEvent::Pause);
    }

    pub fn resume(&mut self) {
        let _span = debug_span!("tour.resume").entered();
        if self.status != TourStatus::Paused {
            warn!(status = ?self.status, "resume called while the tour is not paused");
            return;
        }
        let Some(index) = self.current else {
            warn!("resume called without a current step");
            return;
        };
        self.status = TourStatus::On;
        self.bus.emit(TourEvent::Resume);
        self.show_step(index, false);
    }

    /// `pause_mode`: pause/resume. Otherwise start/end.
    pub fn toggle(&mut self, pause_mode: bool) {
        if pause_mode {
            if self.status == TourStatus::Paused {
                self.resume();
            } else if self.current.is_some() {
                self.pause();
            } else {
                warn!("toggle: nothing to pause");
            }
        } else if self.current.is_some() {
            self.end();
        } else {
            self.start();
        }
    }

    // ── Movement ────────────────────────────────────────────────────────

    pub fn next(&mut self) {
        let _span = debug_span!("tour.next").entered();
        if self.waiting_for_scroll {
            warn!("next ignored while scrolling");
            return;
        }
        self.direction = Direction::Forwards;
        if !self.has_next() {
            return;
        }
        let Some(index) = self.current else { return };
        let target = self
            .steps
            .get(index)
            .and_then(|step| step.next_step.clone())
            .unwrap_or(StepRef::Index(index + 1));
        self.go_to_step(target);
    }

    pub fn prev(&mut self) {
        let _span = debug_span!("tour.prev").entered();
        if self.waiting_for_scroll {
            warn!("prev ignored while scrolling");
            return;
        }
        self.direction = Direction::Backwards;
        if !self.has_prev() {
            return;
        }
        let Some(index) = self.current else { return };
        let target = match self.steps.get(index).and_then(|step| step.prev_step.clone()) {
            Some(target) => target,
            None => match index.checked_sub(1) {
                Some(prev) => StepRef::Index(prev),
                None => return,
            },
        };
        self.go_to_step(target);
    }

    /// Jump to `target` without touching the direction.
    ///
    /// Ignored with a warning while the tour is OFF: `goto` never starts a
    /// tour. Use [`start_at`](Self::start_at) to begin somewhere other than
    /// the first step.
    pub fn goto(&mut self, target: impl Into<StepRef>) {
        let target = target.into();
        let _span = debug_span!("tour.goto", %target).entered();
        if self.waiting_for_scroll {
            warn!("goto ignored while scrolling");
            return;
        }
        if self.status == TourStatus::Off {
            warn!(%target, "goto called while the tour is off");
            return;
        }
        self.go_to_step(target);
    }

    /// Whether `next` would move. Warns when there is no current step.
    pub fn has_next(&self) -> bool {
        match self.current {
            Some(index) => self.has_next_from(index),
            None => {
                warn!("can't get next step: no current step");
                false
            }
        }
    }

    /// Whether `prev` would move. Warns when there is no current step.
    pub fn has_prev(&self) -> bool {
        match self.current {
            Some(index) => self.has_prev_from(index),
            None => {
                warn!("can't get previous step: no current step");
                false
            }
        }
    }

    fn has_next_from(&self, index: usize) -> bool {
        let Some(step) = self.steps.get(index) else {
            return false;
        };
        step.next_step.is_some()
            || (index + 1 < self.steps.len() && !self.optional_run_missing(index + 1..self.steps.len()))
    }

    fn has_prev_from(&self, index: usize) -> bool {
        let Some(step) = self.steps.get(index) else {
            return false;
        };
        step.prev_step.is_some() || (index > 0 && !self.optional_run_missing((0..index).rev()))
    }

    /// True when every step in `indices` is optional with no live anchor,
    /// i.e. moving that way would skip off the end.
    fn optional_run_missing(&self, indices: impl Iterator<Item = usize>) -> bool {
        for i in indices {
            let Some(step) = self.steps.get(i) else { continue };
            let registered = step
                .anchor_id
                .as_deref()
                .is_some_and(|id| self.anchors.contains(id));
            if !step.is_optional || registered {
                return false;
            }
        }
        true
    }

    // ── Anchors ─────────────────────────────────────────────────────────

    /// Register a host anchor. Empty ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TourError::DuplicateAnchor`] when `anchor_id` is taken and
    /// the governing policy is [`DuplicateAnchorHandling::Error`]. The policy
    /// comes from the step bound to `anchor_id`, else the user defaults.
    pub fn register(&mut self, anchor_id: &str, anchor: &Rc<dyn TourAnchor>) -> Result<(), TourError> {
        if anchor_id.is_empty() {
            return Ok(());
        }
        let _span = debug_span!("tour.register", anchor_id).entered();
        self.anchors.prune();

        if self.anchors.contains(anchor_id) {
            let policy = self
                .steps
                .iter()
                .find(|step| step.anchor_id.as_deref() == Some(anchor_id))
                .map(|step| step.duplicate_anchor_handling)
                .or_else(|| {
                    self.user_defaults
                        .as_ref()
                        .and_then(|d| d.duplicate_anchor_handling)
                })
                .unwrap_or_default();
            match policy {
                DuplicateAnchorHandling::Error => {
                    warn!(anchor_id, "anchor already registered");
                    return Err(TourError::DuplicateAnchor {
                        anchor_id: anchor_id.to_owned(),
                    });
                }
                DuplicateAnchorHandling::RegisterFirst => {
                    debug!(anchor_id, "keeping first registration");
                    return Ok(());
                }
                DuplicateAnchorHandling::RegisterLast => {
                    debug!(anchor_id, "replacing earlier registration");
                }
            }
        }

        self.anchors.insert(anchor_id, anchor);
        self.bus.emit(TourEvent::AnchorRegister(anchor_id.to_owned()));

        if let Some(wait) = self.anchor_wait.as_mut() {
            if wait.anchor_id.as_deref() == Some(anchor_id) && wait.ready_at.is_none() {
                trace!(anchor_id, "awaited anchor registered");
                wait.ready_at = Some(self.now);
            }
        }
        Ok(())
    }

    /// Forget an anchor. Empty ids are ignored.
    pub fn unregister(&mut self, anchor_id: &str) {
        if anchor_id.is_empty() {
            return;
        }
        self.anchors.remove(anchor_id);
        self.bus.emit(TourEvent::AnchorUnregister(anchor_id.to_owned()));
    }

    // ── Host input ──────────────────────────────────────────────────────

    /// Apply one host message.
    pub fn update(&mut self, msg: TourMsg) {
        match msg {
            TourMsg::Tick(delta) => self.advance(delta),
            TourMsg::AnchorClicked => self.anchor_clicked(),
            TourMsg::NavigationStart(trigger) => self.handle_navigation_start(trigger),
            TourMsg::NavigationFinished(success) => self.complete_navigation(success),
            TourMsg::Scrolled(container) => self.scrolled(container),
            TourMsg::Key(event) => {
                self.handle_key(event);
            }
        }
    }

    /// Move the logical clock and run everything that became due.
    pub fn advance(&mut self, delta: Duration) {
        self.now += delta;
        for _ in 0..MAX_CONTINUATIONS_PER_ADVANCE {
            let Some(due) = self.next_due() else { return };
            self.run(due);
        }
        warn!("continuation limit reached; deferring the rest to the next advance");
    }

    /// Resolve a navigation the navigator reported as pending.
    pub fn complete_navigation(&mut self, success: bool) {
        match self.pending_navigation.take() {
            Some((index, url)) => self.finish_navigation(index, url, success),
            None => warn!(success, "navigation finished but none was pending"),
        }
    }

    /// The router started a navigation.
    pub fn handle_navigation_start(&mut self, trigger: NavigationTrigger) {
        if !self.watching_routes {
            return;
        }
        let Some(step) = self.current_step() else { return };
        let user_allowed = step.allow_user_initiated_navigation;
        if !self.navigation_started && (trigger == NavigationTrigger::Popstate || !user_allowed) {
            debug!(?trigger, "user navigation ends the tour");
            self.end();
        }
    }

    /// The active anchor was clicked.
    pub fn anchor_clicked(&mut self) {
        if self.click_listener_armed {
            self.next();
        }
    }

    /// A scroll event fired on `container`.
    pub fn scrolled(&mut self, container: ElementId) {
        let now = self.now;
        if let Some(wait) = self.scroll_wait.as_mut() {
            wait.settle.record_scroll(container, now);
        }
    }

    /// Tour hotkeys. Returns whether the key was consumed.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        if !event.is_press() || self.status != TourStatus::On || !self.hotkeys_enabled {
            return false;
        }
        let Some(index) = self.current else {
            return false;
        };
        match event.code {
            KeyCode::Escape => {
                self.end();
                true
            }
            KeyCode::Right if self.has_next_from(index) => {
                self.next();
                true
            }
            KeyCode::Left
                if self.has_prev_from(index)
                    && !self.steps.get(index).is_some_and(|s| s.disable_prev_step) =>
            {
                self.prev();
                true
            }
            _ => false,
        }
    }

    // ── Transitions ─────────────────────────────────────────────────────

    fn load_step(&self, target: &StepRef) -> Option<usize> {
        match target {
            StepRef::Index(index) => (*index < self.steps.len()).then_some(*index),
            StepRef::Id(id) => self
                .steps
                .iter()
                .position(|step| step.step_id.as_deref() == Some(id.as_str())),
        }
    }

    fn go_to_step(&mut self, target: StepRef) {
        let Some(index) = self.load_step(&target) else {
            warn!(%target, "can't go to non-existent step");
            self.fail(TourError::StepNotFound { target });
            return;
        };
        if let Some(current) = self.current {
            self.host.backdrop.close_spotlight();
            self.hide_step(current);
        }
        self.host.anchor_click.remove_listener();
        self.click_listener_armed = false;

        let route = self.steps.get(index).and_then(|step| step.route.clone());
        match route {
            Some(route) => self.navigate_and_set_step(index, route.to_url()),
            None => self.set_current_step_after(index, Duration::ZERO),
        }
    }

    fn navigate_and_set_step(&mut self, index: usize, url: String) {
        if self.host.navigator.is_active(&url) {
            trace!(%url, "route already active");
            self.set_current_step_after(index, Duration::ZERO);
            return;
        }
        debug!(%url, "navigating to step route");
        self.navigation_started = true;
        match self.host.navigator.navigate_by_url(&url) {
            NavigationOutcome::Completed(success) => self.finish_navigation(index, url, success),
            NavigationOutcome::Pending => self.pending_navigation = Some((index, url)),
        }
    }

    fn finish_navigation(&mut self, index: usize, url: String, success: bool) {
        self.navigation_started = false;
        if !success {
            warn!(%url, "navigation to step route failed");
            self.fail(TourError::NavigationFailed { url });
            return;
        }
        let delay = self
            .steps
            .get(index)
            .map(|step| step.delay_after_navigation)
            .unwrap_or_default();
        self.set_current_step_after(index, delay);
    }

    /// Schedule the step to become current. A zero `delay` falls back to
    /// the step's `delay_before_step_show`.
    fn set_current_step_after(&mut self, index: usize, delay: Duration) {
        let delay = if delay.is_zero() {
            self.steps
                .get(index)
                .map(|step| step.delay_before_step_show)
                .unwrap_or_default()
        } else {
            delay
        };
        trace!(index, ?delay, "step show scheduled");
        self.pending_show = Some(PendingShow {
            at: self.now + delay,
            index,
        });
    }

    fn show_step(&mut self, index: usize, skip_async: bool) {
        let Some(step) = self.steps.get(index).cloned() else {
            return;
        };
        let anchor = step.anchor_id.as_deref().and_then(|id| self.anchors.get(id));

        let Some(anchor) = anchor else {
            if step.is_async && !skip_async {
                self.wait_for_anchor(index, &step);
            } else if step.is_optional {
                debug!(index, "skipping optional step without anchor");
                match self.direction {
                    Direction::Forwards => self.next(),
                    Direction::Backwards => self.prev(),
                }
            } else {
                warn!(anchor_id = ?step.anchor_id, "can't attach to unregistered anchor");
                self.fail(TourError::AnchorNotRegistered {
                    anchor_id: step.anchor_id.clone(),
                });
            }
            return;
        };

        if step.next_on_anchor_click {
            self.host.anchor_click.add_listener(anchor.element());
            self.click_listener_armed = true;
        }

        self.waiting_for_scroll = true;
        match ensure_visible(
            self.host.document.as_mut(),
            anchor.element(),
            &step.scroll_settings,
            self.now,
        ) {
            ScrollCompletion::Ready => self.finish_show(index, anchor),
            ScrollCompletion::Settling(settle) => {
                trace!(index, container = %settle.container(), "waiting for scroll to settle");
                self.scroll_wait = Some(ScrollWait {
                    index,
                    anchor,
                    settle,
                });
            }
        }
    }

    fn finish_show(&mut self, index: usize, anchor: Rc<dyn TourAnchor>) {
        self.waiting_for_scroll = false;
        if self.status != TourStatus::On {
            debug!(index, status = ?self.status, "tour not running after scroll; step stays hidden");
            return;
        }
        let Some(step) = self.steps.get(index).cloned() else {
            return;
        };
        anchor.show_tour_step(&step);

        if step.enable_backdrop {
            self.host.backdrop.show(anchor.element(), &step);
        } else {
            self.host.backdrop.close();
        }
        if step.scroll_settings.disable_page_scrolling {
            self.host
                .scroll_lock
                .enable(step.scroll_settings.scroll_container.as_ref());
        } else {
            self.host.scroll_lock.disable();
        }

        debug!(index, "step shown");
        self.bus.emit(TourEvent::StepShow(StepChange {
            step,
            index,
            direction: self.direction,
        }));
    }

    fn hide_step(&mut self, index: usize) {
        let Some(step) = self.steps.get(index).cloned() else {
            return;
        };
        let Some(anchor) = step.anchor_id.as_deref().and_then(|id| self.anchors.get(id)) else {
            return;
        };
        anchor.hide_tour_step();
        self.bus.emit(TourEvent::StepHide(StepChange {
            step,
            index,
            direction: self.direction,
        }));
    }

    fn wait_for_anchor(&mut self, index: usize, step: &Step) {
        if self.anchor_wait.as_ref().is_some_and(|w| w.index == index) {
            trace!(index, "already waiting for this anchor");
            return;
        }
        debug!(index, anchor_id = ?step.anchor_id, timeout = ?step.async_step_timeout, "waiting for async anchor");
        self.anchor_wait = Some(AnchorWait {
            index,
            anchor_id: step.anchor_id.clone(),
            deadline: step.async_step_timeout.map(|timeout| self.now + timeout),
            ready_at: None,
        });
    }

    fn disable_tour(&mut self) {
        if let Some(index) = self.current {
            self.hide_step(index);
        }
        self.host.anchor_click.remove_listener();
        self.click_listener_armed = false;
        self.host.backdrop.close();
        self.host.backdrop.disconnect_resize_observer();
        self.host.scroll_lock.disable();
    }

    /// Publish a resolution error and end the tour.
    fn fail(&mut self, error: TourError) {
        self.bus.emit(TourEvent::Error(error));
        self.end();
    }

    /// Drop delayed shows, async waits and pending navigations. The scroll
    /// wait is left to settle on its own.
    fn cancel_continuations(&mut self) {
        self.pending_show = None;
        self.anchor_wait = None;
        self.pending_navigation = None;
        self.navigation_started = false;
    }

    // ── Scheduler ───────────────────────────────────────────────────────

    fn next_due(&self) -> Option<Continuation> {
        [
            self.scroll_wait
                .as_ref()
                .map(|w| (w.settle.deadline(), Continuation::ScrollSettled)),
            self.anchor_wait
                .as_ref()
                .and_then(AnchorWait::due_at)
                .map(|at| (at, Continuation::AnchorWait)),
            self.pending_show.map(|p| (p.at, Continuation::Show)),
        ]
        .into_iter()
        .flatten()
        .filter(|(at, _)| *at <= self.now)
        .min()
        .map(|(_, continuation)| continuation)
    }

    fn run(&mut self, due: Continuation) {
        match due {
            Continuation::ScrollSettled => {
                if let Some(wait) = self.scroll_wait.take() {
                    trace!(index = wait.index, "scroll settled");
                    self.finish_show(wait.index, wait.anchor);
                }
            }
            Continuation::AnchorWait => {
                if let Some(wait) = self.anchor_wait.take() {
                    if wait.ready_at.is_none() {
                        debug!(index = wait.index, "async anchor timed out");
                    }
                    self.show_step(wait.index, true);
                }
            }
            Continuation::Show => {
                if let Some(show) = self.pending_show.take() {
                    self.current = Some(show.index);
                    self.show_step(show.index, false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use waypoint_core::{Document, Overflow, Point, Rect, ScrollCapabilities, ScrollIntoView, Size};

    use crate::host::Navigator;

    /// Every element sits in the middle of an 800x600 page.
    struct StaticDocument;

    impl Document for StaticDocument {
        fn root(&self) -> ElementId {
            ElementId(0)
        }
        fn viewport(&self) -> Size {
            Size::new(800.0, 600.0)
        }
        fn bounding_rect(&self, element: ElementId) -> Rect {
            if element == ElementId(0) {
                Rect::new(0.0, 0.0, 800.0, 600.0)
            } else {
                Rect::new(100.0, 100.0, 100.0, 50.0)
            }
        }
        fn client_height(&self, _element: ElementId) -> f64 {
            600.0
        }
        fn scroll_height(&self, _element: ElementId) -> f64 {
            600.0
        }
        fn parent(&self, element: ElementId) -> Option<ElementId> {
            (element != ElementId(0)).then_some(ElementId(0))
        }
        fn overflow(&self, _element: ElementId) -> Overflow {
            Overflow::Visible
        }
        fn element_from_point(&self, _point: Point) -> Option<ElementId> {
            None
        }
        fn query_selector(&self, _selector: &str) -> Option<ElementId> {
            None
        }
        fn capabilities(&self) -> ScrollCapabilities {
            ScrollCapabilities {
                smooth: false,
                center_alignment: true,
            }
        }
        fn scroll_into_view(&mut self, _element: ElementId, _options: ScrollIntoView) {}
        fn scroll_to(&mut self, _container: ElementId, _left: f64, _top: f64) {}
    }

    struct RootNavigator;

    impl Navigator for RootNavigator {
        fn current_url(&self) -> String {
            "/".into()
        }
        fn navigate_by_url(&mut self, _url: &str) -> NavigationOutcome {
            NavigationOutcome::Completed(false)
        }
    }

    #[derive(Default)]
    struct Shown(RefCell<Vec<&'static str>>);

    struct Named {
        name: &'static str,
        log: Rc<Shown>,
    }

    impl TourAnchor for Named {
        fn element(&self) -> ElementId {
            ElementId(1)
        }
        fn show_tour_step(&self, _step: &Step) {
            self.log.0.borrow_mut().push(self.name);
        }
        fn hide_tour_step(&self) {}
    }

    fn service() -> TourService {
        TourService::new(TourHost::new(StaticDocument, RootNavigator))
    }

    fn anchor(name: &'static str, log: &Rc<Shown>) -> Rc<dyn TourAnchor> {
        Rc::new(Named {
            name,
            log: Rc::clone(log),
        })
    }

    const TICK: Duration = Duration::from_millis(1);

    #[test]
    fn initialize_leaves_tour_off() {
        let mut tour = service();
        tour.initialize(&[StepOption::anchored("a")], None).unwrap();
        assert_eq!(tour.status(), TourStatus::Off);
        assert_eq!(tour.steps().len(), 1);
    }

    #[test]
    fn initialize_rejects_async_optional_without_timeout() {
        let mut tour = service();
        let steps = [
            StepOption::anchored("a"),
            StepOption::anchored("b").optional(true).asynchronous(None),
        ];
        assert!(tour.initialize(&steps, None).is_err());
        assert!(tour.steps().is_empty());
    }

    #[test]
    fn start_shows_first_step_on_next_advance() {
        let log = Rc::new(Shown::default());
        let a = anchor("a", &log);
        let mut tour = service();
        tour.register("a", &a).unwrap();
        tour.initialize(&[StepOption::anchored("a")], None).unwrap();

        tour.start();
        assert_eq!(tour.status(), TourStatus::On);
        assert!(log.0.borrow().is_empty());

        tour.advance(TICK);
        assert_eq!(*log.0.borrow(), vec!["a"]);
        assert_eq!(tour.current_index(), Some(0));
    }

    #[test]
    fn delay_before_step_show_is_honoured() {
        let log = Rc::new(Shown::default());
        let a = anchor("a", &log);
        let mut tour = service();
        tour.register("a", &a).unwrap();
        tour.initialize(
            &[StepOption::anchored("a").delay_before_step_show(Duration::from_millis(200))],
            None,
        )
        .unwrap();

        tour.start();
        tour.advance(Duration::from_millis(199));
        assert!(log.0.borrow().is_empty());
        tour.advance(TICK);
        assert_eq!(*log.0.borrow(), vec!["a"]);
    }

    #[test]
    fn missing_required_anchor_ends_tour() {
        let mut tour = service();
        tour.initialize(&[StepOption::anchored("ghost")], None).unwrap();
        tour.start();
        tour.advance(TICK);
        assert_eq!(tour.status(), TourStatus::Off);
        assert_eq!(tour.current_index(), None);
    }

    #[test]
    fn goto_unknown_id_ends_tour() {
        let log = Rc::new(Shown::default());
        let a = anchor("a", &log);
        let mut tour = service();
        tour.register("a", &a).unwrap();
        tour.initialize(&[StepOption::anchored("a")], None).unwrap();
        tour.start();
        tour.advance(TICK);

        tour.goto("nope");
        assert_eq!(tour.status(), TourStatus::Off);
    }

    #[test]
    fn progress_reports_one_based_position() {
        let log = Rc::new(Shown::default());
        let a = anchor("a", &log);
        let b = anchor("b", &log);
        let mut tour = service();
        tour.register("a", &a).unwrap();
        tour.register("b", &b).unwrap();
        tour.initialize(&[StepOption::anchored("a"), StepOption::anchored("b")], None)
            .unwrap();
        assert_eq!(tour.progress(), None);

        tour.start_at(1_usize);
        tour.advance(TICK);
        assert_eq!(
            tour.progress(),
            Some(StepProgress {
                position: 2,
                total: 2
            })
        );
    }

    #[test]
    fn empty_anchor_ids_are_ignored() {
        let log = Rc::new(Shown::default());
        let a = anchor("a", &log);
        let mut tour = service();
        tour.register("", &a).unwrap();
        tour.unregister("");
        assert!(!tour.is_registered(""));
    }

    #[test]
    fn pause_and_resume_keep_current_step() {
        let log = Rc::new(Shown::default());
        let a = anchor("a", &log);
        let mut tour = service();
        tour.register("a", &a).unwrap();
        tour.initialize(&[StepOption::anchored("a")], None).unwrap();
        tour.start();
        tour.advance(TICK);

        tour.pause();
        assert_eq!(tour.status(), TourStatus::Paused);
        assert_eq!(tour.current_index(), Some(0));

        tour.resume();
        assert_eq!(tour.status(), TourStatus::On);
        assert_eq!(*log.0.borrow(), vec!["a", "a"]);
    }

    #[test]
    fn toggle_pause_mode_alternates() {
        let log = Rc::new(Shown::default());
        let a = anchor("a", &log);
        let mut tour = service();
        tour.register("a", &a).unwrap();
        tour.initialize(&[StepOption::anchored("a")], None).unwrap();
        tour.start();
        tour.advance(TICK);

        tour.toggle(true);
        assert_eq!(tour.status(), TourStatus::Paused);
        tour.toggle(true);
        assert_eq!(tour.status(), TourStatus::On);
        tour.toggle(false);
        assert_eq!(tour.status(), TourStatus::Off);
        tour.toggle(false);
        assert_eq!(tour.status(), TourStatus::On);
    }
}
