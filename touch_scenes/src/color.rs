//! Color changer: one full-screen region, one shared 200 ms clock.
//!
//! ```text
//!   first point ──► on_start: reveal + show initial color
//!   hand enters ──► trigger fires ──► pick ≠ current ──► show, speak, burst
//!   hand stays  ──► nothing (leading edge only)
//!   hand leaves ──► re-armed, cooldown still applies
//! ```

use rand::Rng;
use tracing::{debug, info};

use touch_core::{
    ActiveSet, DebouncedTrigger, EffectError, Frame, LayoutProvider, Reconciler, RegionId, Scene,
    TickReport, COLOR_COOLDOWN_MS,
};

use crate::palette::{pick_next, Palette, Swatch};

/// The main content element; it covers the whole viewport.
pub const SCREEN: RegionId = RegionId(0);

/// How long the color burst plays after each change.
pub const BURST_MS: f64 = 500.0;

/// What the color scene asks of its host.
pub trait ColorEffects {
    /// Remove the cover and show the content for the first time.
    fn reveal(&mut self, swatch: &Swatch) -> Result<(), EffectError>;
    fn show_color(&mut self, swatch: &Swatch) -> Result<(), EffectError>;
    fn play_voice(&mut self, swatch: &Swatch) -> Result<(), EffectError>;
}

// ════════════════════════════════════════════════════════════════════════════
// ColorScene
// ════════════════════════════════════════════════════════════════════════════

pub struct ColorScene<E, R> {
    palette:        Palette,
    current:        usize,
    trigger:        DebouncedTrigger,
    reconciler:     Reconciler,
    effects:        E,
    rng:            R,
    revealed:       bool,
    burst_until_ms: f64,
}

impl<E: ColorEffects, R: Rng> ColorScene<E, R> {
    /// Build the scene with a random initial color.
    pub fn new(palette: Palette, effects: E, mut rng: R) -> Self {
        let current = if palette.is_empty() { 0 } else { rng.gen_range(0..palette.len()) };
        ColorScene {
            palette,
            current,
            trigger:        DebouncedTrigger::new(COLOR_COOLDOWN_MS),
            reconciler:     Reconciler::new(),
            effects,
            rng,
            revealed:       false,
            burst_until_ms: f64::NEG_INFINITY,
        }
    }

    pub fn palette(&self)        -> &Palette         { &self.palette }
    pub fn current(&self)        -> usize            { self.current }
    pub fn current_swatch(&self) -> Option<&Swatch>  { self.palette.get(self.current) }
    pub fn is_revealed(&self)    -> bool             { self.revealed }
    pub fn is_touched(&self)     -> bool             { self.reconciler.is_active(SCREEN) }
    pub fn effects(&self)        -> &E               { &self.effects }
    pub fn effects_mut(&mut self) -> &mut E          { &mut self.effects }

    /// The burst requested by the last change is still running at `now_ms`.
    pub fn burst_active(&self, now_ms: f64) -> bool { now_ms < self.burst_until_ms }

    /// Fraction of the burst left at `now_ms`, 1.0 right after a change.
    pub fn burst_remaining(&self, now_ms: f64) -> f64 {
        ((self.burst_until_ms - now_ms) / BURST_MS).clamp(0.0, 1.0)
    }

    fn change_color(&mut self, now_ms: f64, report: &mut TickReport) {
        self.current = pick_next(self.current, self.palette.len(), &mut self.rng);
        let Some(swatch) = self.palette.get(self.current) else {
            report.record(Err(EffectError::Unavailable { what: "palette".into() }));
            return;
        };
        debug!(color = swatch.name, "color change");
        report.record(self.effects.show_color(swatch));
        report.record(self.effects.play_voice(swatch));
        self.burst_until_ms = now_ms + BURST_MS;
    }
}

impl<E: ColorEffects, R: Rng> Scene for ColorScene<E, R> {
    fn name(&self) -> &str { "color" }

    fn on_start(&mut self, _frame: &Frame<'_>, report: &mut TickReport) {
        self.revealed = true;
        match self.palette.get(self.current) {
            Some(swatch) => {
                info!(color = swatch.name, "exhibit started");
                report.record(self.effects.reveal(swatch));
                report.record(self.effects.show_color(swatch));
            }
            None => report.record(Err(EffectError::Unavailable { what: "palette".into() })),
        }
    }

    fn on_frame(&mut self, frame: &Frame<'_>, layout: &dyn LayoutProvider, report: &mut TickReport) {
        let hits: ActiveSet = match layout.region(SCREEN) {
            Some(region) => frame.points.iter()
                .filter(|p| region.contains(**p))
                .map(|_| SCREEN)
                .collect(),
            None => {
                debug!(id = %SCREEN, "screen element absent; treated as not hit");
                report.skipped.push(SCREEN);
                ActiveSet::new()
            }
        };

        let contained = hits.contains(SCREEN);
        let was_active = self.reconciler.is_active(SCREEN);
        if self.trigger.evaluate(SCREEN, contained, was_active, frame.now_ms) {
            report.fired.push(SCREEN);
            self.change_color(frame.now_ms, report);
        }

        let outcome = self.reconciler.reconcile(hits);
        report.activated.extend(outcome.activated);
        report.deactivated.extend(outcome.deactivated);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use touch_core::{FrameLoop, ManualClock, Point, SharedSensor, StaticLayout, Viewport};

    #[derive(Default)]
    struct Recorder {
        calls:      Vec<String>,
        mute_voice: bool,
    }

    impl ColorEffects for Recorder {
        fn reveal(&mut self, s: &Swatch) -> Result<(), EffectError> {
            self.calls.push(format!("reveal {}", s.name));
            Ok(())
        }
        fn show_color(&mut self, s: &Swatch) -> Result<(), EffectError> {
            self.calls.push(format!("show {}", s.name));
            Ok(())
        }
        fn play_voice(&mut self, s: &Swatch) -> Result<(), EffectError> {
            if self.mute_voice {
                return Err(EffectError::Audio("muted".into()));
            }
            self.calls.push(format!("voice {}", s.name));
            Ok(())
        }
    }

    fn scene(seed: u64) -> ColorScene<Recorder, StdRng> {
        let mut rng = StdRng::seed_from_u64(seed);
        let palette = Palette::html16(&mut rng, "voice/nagisa");
        ColorScene::new(palette, Recorder::default(), rng)
    }

    fn layout() -> StaticLayout {
        let vp = Viewport::new(1280.0, 720.0);
        StaticLayout::new(vp).with(SCREEN, vp.bounds())
    }

    #[test]
    fn hover_fires_once_and_changes_color() {
        let sensor = SharedSensor::new();
        let clock  = ManualClock::new(0.0);
        let layout = layout();
        let mut fl = FrameLoop::new(scene(1), sensor.clone(), &clock);
        let initial = fl.scene().current();

        sensor.publish(vec![Point::ORIGIN]);
        let first = fl.tick(&layout);
        assert!(first.started);
        assert_eq!(first.fired, vec![SCREEN]);
        assert_ne!(fl.scene().current(), initial);
        assert!(fl.scene().is_revealed());

        for &t in &[16.0, 33.0] {
            clock.set(t);
            assert!(fl.tick(&layout).fired.is_empty());
        }

        sensor.clear();
        clock.set(50.0);
        let rep = fl.tick(&layout);
        assert_eq!(rep.deactivated, vec![SCREEN]);
        assert!(!fl.scene().is_touched());
    }

    #[test]
    fn start_reveals_then_first_change_follows() {
        let sensor = SharedSensor::new();
        let layout = layout();
        let mut fl = FrameLoop::new(scene(2), sensor.clone(), ManualClock::new(0.0));
        let initial = fl.scene().current_swatch().unwrap().name;
        sensor.publish(vec![Point::ORIGIN]);
        fl.tick(&layout);
        let calls = &fl.scene().effects().calls;
        assert_eq!(calls[0], format!("reveal {initial}"));
        assert_eq!(calls[1], format!("show {initial}"));
        assert!(calls[2].starts_with("show "));
        assert!(calls[3].starts_with("voice "));
        assert_eq!(calls.len(), 4);
    }

    #[test]
    fn repeated_touches_never_repeat_a_color() {
        let sensor = SharedSensor::new();
        let clock  = ManualClock::new(0.0);
        let layout = layout();
        let mut fl = FrameLoop::new(scene(3), sensor.clone(), &clock);
        let mut last = fl.scene().current();
        for _ in 0..50 {
            sensor.publish(vec![Point::new(0.5, -0.5)]);
            assert_eq!(fl.tick(&layout).fired, vec![SCREEN]);
            assert_ne!(fl.scene().current(), last);
            last = fl.scene().current();
            sensor.clear();
            clock.advance(100.0);
            fl.tick(&layout);
            clock.advance(100.0);
        }
    }

    #[test]
    fn empty_sensor_is_quiet() {
        let layout = layout();
        let mut fl = FrameLoop::new(scene(4), SharedSensor::new(), ManualClock::new(0.0));
        for _ in 0..10 {
            assert!(fl.tick(&layout).is_quiet());
        }
        assert!(!fl.scene().is_revealed());
        assert!(fl.scene().effects().calls.is_empty());
    }

    #[test]
    fn burst_runs_for_half_a_second() {
        let sensor = SharedSensor::new();
        let clock  = ManualClock::new(1_000.0);
        let layout = layout();
        let mut fl = FrameLoop::new(scene(5), sensor.clone(), &clock);
        sensor.publish(vec![Point::ORIGIN]);
        fl.tick(&layout);
        assert!(fl.scene().burst_active(1_000.0));
        assert!(fl.scene().burst_active(1_499.0));
        assert!(!fl.scene().burst_active(1_500.0));
        assert_eq!(fl.scene().burst_remaining(1_250.0), 0.5);
    }

    #[test]
    fn voice_failure_still_changes_color() {
        let sensor = SharedSensor::new();
        let layout = layout();
        let mut s = scene(6);
        s.effects_mut().mute_voice = true;
        let initial = s.current();
        let mut fl = FrameLoop::new(s, sensor.clone(), ManualClock::new(0.0));
        sensor.publish(vec![Point::ORIGIN]);
        let rep = fl.tick(&layout);
        assert_eq!(rep.failures.len(), 1);
        assert_ne!(fl.scene().current(), initial);
        assert!(fl.scene().is_touched());
    }

    #[test]
    fn absent_screen_counts_as_not_hit() {
        let sensor = SharedSensor::new();
        let layout = StaticLayout::new(Viewport::new(800.0, 600.0));
        let mut fl = FrameLoop::new(scene(7), sensor.clone(), ManualClock::new(0.0));
        sensor.publish(vec![Point::ORIGIN]);
        let rep = fl.tick(&layout);
        assert_eq!(rep.skipped, vec![SCREEN]);
        assert!(rep.fired.is_empty());
        assert!(!fl.scene().is_touched());
    }

    #[test]
    fn single_color_palette_keeps_its_index() {
        let mut rng = StdRng::seed_from_u64(8);
        let one = Palette::html16(&mut rng, "v").get(4).cloned().unwrap();
        let s = ColorScene::new(Palette::from_swatches(vec![one]), Recorder::default(), rng);
        let sensor = SharedSensor::new();
        let mut fl = FrameLoop::new(s, sensor.clone(), ManualClock::new(0.0));
        sensor.publish(vec![Point::ORIGIN]);
        let rep = fl.tick(&layout());
        assert_eq!(rep.fired, vec![SCREEN]);
        assert_eq!(fl.scene().current(), 0);
    }
}
