//! Time source for the cycle timer and session controller.
//!
//! The timer never measures time by summing nominal phase durations. It asks a
//! [`Clock`] for the current instant on every tick, so slow rendering shows up
//! as elapsed time. [`ManualClock`] makes that deterministic in tests.

use std::sync::Mutex;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Suspend the caller for roughly `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by `Instant::now` and `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock whose time only moves when slept on or advanced explicitly.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move time forward without sleeping, e.g. to simulate slow rendering.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }

    /// Total time advanced since construction.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Whole seconds between `since` and `clock.now()`, rounded down.
pub fn whole_secs_since(clock: &dyn Clock, since: Instant) -> u64 {
    clock.now().saturating_duration_since(since).as_secs()
}
