//! Animation state the visualizer keeps between frames.
//!
//! Scenes only say *that* something happened (revealed, fired, active); how
//! it fades in and out on screen lives here and is advanced once per
//! presented frame.

use std::collections::HashMap;

use touch_core::RegionId;

// ════════════════════════════════════════════════════════════════════════════
// Color math
// ════════════════════════════════════════════════════════════════════════════

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// Two-stop linear gradient over a `w`×`h` area, CSS style: 0° runs bottom
/// to top, angles turn clockwise.  Returns the gradient position of pixel
/// (`x`, `y`) in 0.0–1.0.
pub fn gradient_t(angle_deg: u16, x: f32, y: f32, w: f32, h: f32) -> f32 {
    let a = (angle_deg as f32).to_radians();
    let (dx, dy) = (a.sin(), -a.cos());
    let half = (w * dx.abs() + h * dy.abs()) / 2.0;
    if half <= f32::EPSILON {
        return 0.0;
    }
    let proj = (x - w / 2.0) * dx + (y - h / 2.0) * dy;
    (0.5 + proj / (2.0 * half)).clamp(0.0, 1.0)
}

/// Elastic ease-out: 0.0 → 1.0 with a damped overshoot past 1.0 on the way.
pub fn elastic_out(t: f32) -> f32 {
    if t <= 0.0 { return 0.0; }
    if t >= 1.0 { return 1.0; }
    let c = std::f32::consts::TAU / 3.0;
    2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c).sin() + 1.0
}

// ════════════════════════════════════════════════════════════════════════════
// CoverPhase — the start screen lifting away on first touch
// ════════════════════════════════════════════════════════════════════════════

/// Fade step per frame: one second at 60 fps.
const COVER_STEP: f32 = 1.0 / 60.0;

#[derive(Clone, Debug, PartialEq)]
pub enum CoverPhase {
    /// Nobody has touched yet.
    Covered,
    /// Fading out.
    Lifting { progress: f32 },
    /// Content fully visible.
    Lifted,
}

impl CoverPhase {
    /// Start fading if still covered.
    pub fn lift(&mut self) {
        if *self == CoverPhase::Covered {
            *self = CoverPhase::Lifting { progress: 0.0 };
        }
    }

    /// How much of the cover still shows, 1.0 = opaque.
    pub fn opacity(&self) -> f32 {
        match self {
            CoverPhase::Covered               => 1.0,
            CoverPhase::Lifting { progress }  => 1.0 - progress,
            CoverPhase::Lifted                => 0.0,
        }
    }

    /// Advance one frame.  Returns true when the fade completes.
    pub fn tick(&mut self) -> bool {
        if let CoverPhase::Lifting { progress } = self {
            *progress += COVER_STEP;
            if *progress >= 1.0 {
                *self = CoverPhase::Lifted;
                return true;
            }
        }
        false
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CaptionPop — color caption scaling in after each change
// ════════════════════════════════════════════════════════════════════════════

/// Scale of the color caption, restarted whenever the shown color changes.
/// Runs for 36 frames (0.6 s at 60 fps).
#[derive(Debug, Default)]
pub struct CaptionPop {
    shown:    Option<usize>,
    progress: f32,
}

impl CaptionPop {
    /// Advance one frame with `index` on screen and return the caption's
    /// scale factor.
    pub fn tick(&mut self, index: usize) -> f32 {
        if self.shown != Some(index) {
            self.shown = Some(index);
            self.progress = 0.0;
        }
        self.progress = (self.progress + 1.0 / 36.0).min(1.0);
        elastic_out(self.progress)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// KeyGlow — short flash on each struck key
// ════════════════════════════════════════════════════════════════════════════

/// Per-key flash intensity, 1.0 right after a strike, decaying per frame.
#[derive(Debug, Default)]
pub struct KeyGlow {
    glow: HashMap<RegionId, f32>,
}

impl KeyGlow {
    pub fn flash(&mut self, id: RegionId) {
        self.glow.insert(id, 1.0);
    }

    pub fn level(&self, id: RegionId) -> f32 {
        self.glow.get(&id).copied().unwrap_or(0.0)
    }

    /// Advance flash decay.
    pub fn tick(&mut self) {
        for g in self.glow.values_mut() {
            *g = (*g - 0.08).max(0.0);
        }
        self.glow.retain(|_, g| *g > 0.0);
    }

    pub fn is_idle(&self) -> bool { self.glow.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
        assert_eq!(blend(0xFF000000, 0xFF0000FF, 0.5), 0xFF000080);
    }

    fn close(a: f32, b: f32) -> bool { (a - b).abs() < 1e-4 }

    #[test]
    fn gradient_runs_along_its_angle() {
        // 90° runs left → right
        assert!(close(gradient_t(90, 0.0, 50.0, 100.0, 100.0), 0.0));
        assert!(close(gradient_t(90, 100.0, 50.0, 100.0, 100.0), 1.0));
        // 0° runs bottom → top
        assert!(close(gradient_t(0, 50.0, 100.0, 100.0, 100.0), 0.0));
        assert!(close(gradient_t(0, 50.0, 0.0, 100.0, 100.0), 1.0));
        // centre is always halfway
        assert!(close(gradient_t(217, 50.0, 50.0, 100.0, 100.0), 0.5));
    }

    #[test]
    fn gradient_on_empty_area() {
        assert_eq!(gradient_t(45, 0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn elastic_settles_after_overshoot() {
        assert_eq!(elastic_out(0.0), 0.0);
        assert_eq!(elastic_out(1.0), 1.0);
        let peak = (1..100).map(|i| elastic_out(i as f32 / 100.0)).fold(0.0, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn caption_restarts_on_color_change() {
        let mut pop = CaptionPop::default();
        let first = pop.tick(3);
        assert!(first < 1.0);
        for _ in 0..40 { pop.tick(3); }
        assert_eq!(pop.tick(3), 1.0);
        assert!(pop.tick(7) < 1.0);
    }

    #[test]
    fn cover_fade_takes_about_a_second() {
        let mut c = CoverPhase::Covered;
        c.lift();
        let frames = (1..=200).find(|_| c.tick()).unwrap();
        assert!((59..=61).contains(&frames), "{frames}");
    }

    #[test]
    fn cover_lifts_once_and_completes() {
        let mut c = CoverPhase::Covered;
        assert_eq!(c.opacity(), 1.0);
        assert!(!c.tick());
        c.lift();
        let mut done = false;
        for _ in 0..100 {
            if c.tick() { done = true; break; }
        }
        assert!(done);
        assert_eq!(c, CoverPhase::Lifted);
        c.lift();
        assert_eq!(c, CoverPhase::Lifted);
        assert_eq!(c.opacity(), 0.0);
    }

    #[test]
    fn glow_decays_to_idle() {
        let mut g = KeyGlow::default();
        g.flash(RegionId(3));
        assert_eq!(g.level(RegionId(3)), 1.0);
        assert_eq!(g.level(RegionId(4)), 0.0);
        for _ in 0..20 { g.tick(); }
        assert!(g.is_idle());
    }
}
