#![forbid(unsafe_code)]

//! Wall-clock driver for [`TourService::advance`](crate::service::TourService::advance).
//!
//! The service runs on a logical clock that only moves when the host says
//! so. Hosts with their own frame loop pass frame deltas directly; everyone
//! else can tick a [`FrameClock`].

use std::time::Duration;

use web_time::Instant;

/// Turns wall time into deltas.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { last: start }
    }

    /// Time since the previous tick.
    pub fn tick(&mut self) -> Duration {
        self.tick_at(Instant::now())
    }

    /// Time between the previous tick and `now`. A `now` earlier than the
    /// previous tick yields zero and does not move the clock back.
    pub fn tick_at(&mut self, now: Instant) -> Duration {
        let delta = now.saturating_duration_since(self.last);
        if now > self.last {
            self.last = now;
        }
        delta
    }
}
