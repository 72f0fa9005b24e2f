//! Debounced, leading-edge triggers.
//!
//! A hovering hand keeps a point inside a region for many frames and the
//! sensor jitters it across the edge now and then.  A trigger therefore
//! fires only when all three hold:
//!
//! 1. the region contains a point this frame,
//! 2. the region was not already active last frame (leading edge),
//! 3. at least `cooldown_ms` passed since the region last fired.
//!
//! The cooldown clock and the "active" latch are independent: leaving a
//! region re-arms the latch immediately, but the clock still has to run out.

use std::collections::HashMap;

use tracing::trace;

use crate::RegionId;

/// Cooldown for the single full-screen region of the color scene.
pub const COLOR_COOLDOWN_MS: f64 = 200.0;

/// Cooldown applied to each key of the keyboard scene.
pub const KEY_COOLDOWN_MS: f64 = 500.0;

// ════════════════════════════════════════════════════════════════════════════
// DebouncedTrigger
// ════════════════════════════════════════════════════════════════════════════

/// Per-region cooldown clocks plus the leading-edge rule.
///
/// Regions never seen before behave as if they last fired at −∞.
#[derive(Clone, Debug)]
pub struct DebouncedTrigger {
    cooldown_ms: f64,
    clocks:      HashMap<RegionId, f64>,
}

impl DebouncedTrigger {
    pub fn new(cooldown_ms: f64) -> Self {
        DebouncedTrigger {
            cooldown_ms: cooldown_ms.max(0.0),
            clocks:      HashMap::new(),
        }
    }

    /// Decide whether `id` fires this frame.
    ///
    /// On `true` the region's clock has already been stamped with `now_ms`,
    /// so the caller runs its action afterwards and a second evaluation in
    /// the same tick is suppressed by the cooldown.
    pub fn evaluate(
        &mut self,
        id:             RegionId,
        contained_now:  bool,
        marked_active:  bool,
        now_ms:         f64,
    ) -> bool {
        if !contained_now || marked_active {
            return false;
        }
        let since = now_ms - self.last_triggered(id);
        if since < self.cooldown_ms {
            trace!(region = %id, since, "cooling down");
            return false;
        }
        self.clocks.insert(id, now_ms);
        trace!(region = %id, now_ms, "fired");
        true
    }

    /// When `id` last fired (`f64::NEG_INFINITY` if never).
    pub fn last_triggered(&self, id: RegionId) -> f64 {
        self.clocks.get(&id).copied().unwrap_or(f64::NEG_INFINITY)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const R: RegionId = RegionId(0);

    #[test]
    fn first_contact_fires() {
        let mut t = DebouncedTrigger::new(COLOR_COOLDOWN_MS);
        assert!(t.evaluate(R, true, false, 0.0));
        assert_eq!(t.last_triggered(R), 0.0);
    }

    #[test]
    fn not_contained_never_fires() {
        let mut t = DebouncedTrigger::new(COLOR_COOLDOWN_MS);
        assert!(!t.evaluate(R, false, false, 0.0));
        assert_eq!(t.last_triggered(R), f64::NEG_INFINITY);
    }

    #[test]
    fn suppressed_inside_cooldown() {
        let mut t = DebouncedTrigger::new(200.0);
        assert!(t.evaluate(R, true, false, 0.0));
        // exited and re-entered, but only 150 ms later
        assert!(!t.evaluate(R, true, false, 150.0));
        assert!(t.evaluate(R, true, false, 200.0));
    }

    #[test]
    fn held_contact_fires_once() {
        let mut t = DebouncedTrigger::new(200.0);
        let mut fired = 0;
        let mut active = false;
        for frame in 0..10 {
            let now = frame as f64 * 1000.0;   // far apart: only the latch holds it back
            if t.evaluate(R, true, active, now) { fired += 1; }
            active = true;
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn same_tick_reentry_is_suppressed() {
        let mut t = DebouncedTrigger::new(KEY_COOLDOWN_MS);
        assert!(t.evaluate(R, true, false, 42.0));
        assert!(!t.evaluate(R, true, false, 42.0));
    }

    #[test]
    fn clocks_are_per_region() {
        let mut t = DebouncedTrigger::new(KEY_COOLDOWN_MS);
        assert!(t.evaluate(RegionId(1), true, false, 0.0));
        assert!(t.evaluate(RegionId(2), true, false, 10.0));
        assert!(!t.evaluate(RegionId(1), true, false, 20.0));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut t = DebouncedTrigger::new(200.0);
        assert!(t.evaluate(R, true, false, 1000.0));
        // a clock step backwards cannot fire or rewind the stamp
        assert!(!t.evaluate(R, true, false, 10.0));
        assert_eq!(t.last_triggered(R), 1000.0);
    }
}
