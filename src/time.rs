//! Clock abstraction and interval timers.
//!
//! This module provides:
//! - [`Clock`] - source of "now" for recency tracking
//! - [`SystemClock`] - wall clock used in production
//! - [`ManualClock`] - advanceable clock for tests and deterministic hosts
//! - [`IntervalTimer`] - fires once per elapsed interval when polled
//!
//! # Examples
//!
//! ```
//! use ar_resources::time::{Clock, IntervalTimer, ManualClock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut sweep = IntervalTimer::new(Duration::from_secs(60), clock.now());
//!
//! clock.advance(Duration::from_secs(59));
//! assert!(!sweep.poll(clock.now()));
//!
//! clock.advance(Duration::from_secs(1));
//! assert!(sweep.poll(clock.now()));
//! ```

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Time provider used by the resource manager
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// System time provider for production use
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Periodic timer polled from the host's frame loop
#[derive(Clone, Debug)]
pub struct IntervalTimer {
    interval: Duration,
    last_fired: Instant,
}

impl IntervalTimer {
    /// Create a timer whose first period starts at `now`
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_fired: now,
        }
    }

    /// Returns true at most once per call when a full interval has elapsed.
    ///
    /// Missed periods are not replayed: a long stall yields a single firing.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_fired) >= self.interval {
            self.last_fired = now;
            true
        } else {
            false
        }
    }

    /// Restart the current period at `now`
    pub fn reset(&mut self, now: Instant) {
        self.last_fired = now;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next firing
    pub fn remaining(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last_fired))
    }
}
