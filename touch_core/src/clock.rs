//! Millisecond clocks for cooldown bookkeeping.

use std::cell::Cell;
use std::time::Instant;

/// Source of "now" in milliseconds.  Only differences matter.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Monotonic wall clock, zeroed at construction.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self { SystemClock { start: Instant::now() } }
}

impl Default for SystemClock {
    fn default() -> Self { SystemClock::new() }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self { ManualClock { now: Cell::new(start_ms) } }

    pub fn set(&self, ms: f64) { self.now.set(ms); }

    pub fn advance(&self, ms: f64) { self.now.set(self.now.get() + ms); }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 { self.now.get() }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> f64 { (**self).now_ms() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let c = ManualClock::new(10.0);
        c.advance(6.0);
        assert_eq!(c.now_ms(), 16.0);
        c.set(0.0);
        assert_eq!(c.now_ms(), 0.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let c = SystemClock::new();
        let a = c.now_ms();
        let b = c.now_ms();
        assert!(b >= a);
    }
}
