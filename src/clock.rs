// src/clock.rs
//
// Time source and the absolute time windows derived from it.
//
// Every deadline in a session (end of playback, end of a rest) is stored
// as an absolute clock time. Remaining time is always recomputed by
// subtraction at read time, never counted down.

use std::cell::Cell;

/// Monotonic time source in seconds.
///
/// In the browser this is the audio context's hardware clock.
pub trait Clock {
    fn now(&self) -> f64;
}

/// A clock that only moves when told to.
///
/// Used by the simulation binary and by tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Move the clock forward. Negative steps are ignored.
    pub fn advance(&self, seconds: f64) {
        if seconds > 0.0 {
            self.now.set(self.now.get() + seconds);
        }
    }

    /// Jump to an absolute time, never backwards.
    pub fn set(&self, time: f64) {
        if time > self.now.get() {
            self.now.set(time);
        }
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Playback window of one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionWindow {
    /// Clock time of the first tick.
    pub anchor_time: f64,

    /// Clock time at which the session finishes.
    /// `None` for the unlimited progressive ramp.
    pub end_time: Option<f64>,
}

impl SessionWindow {
    pub fn new(anchor_time: f64, end_time: Option<f64>) -> Self {
        Self {
            anchor_time,
            end_time,
        }
    }

    /// Seconds since the anchor, never negative.
    #[inline]
    pub fn elapsed(&self, now: f64) -> f64 {
        (now - self.anchor_time).max(0.0)
    }

    /// Seconds until the end time, if there is one.
    pub fn remaining(&self, now: f64) -> Option<f64> {
        self.end_time.map(|end| (end - now).max(0.0))
    }

    pub fn is_over(&self, now: f64) -> bool {
        self.end_time.is_some_and(|end| now >= end)
    }
}

/// What a rest window is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestKind {
    BetweenReps,
    BetweenSets,
    BeforeRestart,
}

/// A pause that ends at an absolute clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestWindow {
    pub kind: RestKind,
    pub until_time: f64,
}

impl RestWindow {
    pub fn new(kind: RestKind, until_time: f64) -> Self {
        Self { kind, until_time }
    }

    #[inline]
    pub fn is_active(&self, now: f64) -> bool {
        now < self.until_time
    }

    pub fn remaining(&self, now: f64) -> f64 {
        (self.until_time - now).max(0.0)
    }
}

/// Format seconds as `M:SS`, flooring to whole seconds.
pub fn format_mmss(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
