//! Monotonic clock abstraction
//!
//! The ticker and the animator read time through [`Clock`] so the simulation
//! can be driven by the tokio clock in production and by a hand-advanced
//! clock in tests.

use std::time::Duration;
use tokio::time::Instant;

/// Source of monotonic time, measured from an arbitrary origin
pub trait Clock: Clone {
    /// Time elapsed since the clock's origin
    fn now(&self) -> Duration;
}

/// Clock backed by `tokio::time::Instant`
///
/// Follows tokio's paused time in tests, so the driver can be exercised
/// without real waits.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Convert a clock reading back into a tokio instant for sleeping
    pub fn instant_at(&self, reading: Duration) -> Instant {
        self.origin + reading
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<Duration>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
