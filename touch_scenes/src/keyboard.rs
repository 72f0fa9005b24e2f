//! Air keyboard: one region per key, black keys layered over white keys.
//!
//! ```text
//!   ┌──┬─┬┬─┬──┬──┬─┬┬─┬┬─┬──┐   gate    = the keyboard body
//!   │  │█││█│  │  │█││█││█│  │   layer 0 = black keys (foreground)
//!   │  └┬┘└┬┘  │  └┬┘└┬┘└┬┘  │   layer 1 = white keys
//!   │ C │ D │ E│ F │ G │ A │ B│
//!   └───┴───┴──┴───┴───┴───┴──┘
//! ```
//!
//! Every key has its own 500 ms cooldown.  A trigger strikes the key's note
//! for a 32nd note at the scene tempo; the key's active flag follows the
//! reconciled hit set.

use tracing::{debug, info};

use touch_core::{
    ActiveSet, DebouncedTrigger, EffectError, Frame, HitLayers, LayoutProvider, PixelRect,
    Reconciler, RegionId, Scene, TickReport, KEY_COOLDOWN_MS,
};
use touch_midi::{KeySpec, KeyboardLayout, Note, NoteValue};

/// The keyboard body; points must land inside it before any key is tested.
pub const KEYBOARD: RegionId = RegionId(0);

/// Black keys are this fraction of a white key's width.
const BLACK_WIDTH: f64 = 0.6;
/// Black keys are this fraction of the keyboard's height.
const BLACK_HEIGHT: f64 = 0.6;

/// What the keyboard scene asks of its host.
pub trait KeyboardEffects {
    /// Play `note` and release it after `hold_ms`.
    fn strike(&mut self, note: Note, hold_ms: f64) -> Result<(), EffectError>;
    /// Set or clear the key's active flag.
    fn set_active(&mut self, id: RegionId, active: bool) -> Result<(), EffectError>;
}

/// A key and the region id it is hit-tested under.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Key {
    pub id:   RegionId,
    pub spec: KeySpec,
}

impl Key {
    pub fn note(&self) -> Note { self.spec.note }
    pub fn is_black(&self) -> bool { self.spec.is_black() }
}

// ════════════════════════════════════════════════════════════════════════════
// KeyboardScene
// ════════════════════════════════════════════════════════════════════════════

pub struct KeyboardScene<E> {
    keyboard:   KeyboardLayout,
    /// White keys first (ids 1..=W), then black keys.
    keys:       Vec<Key>,
    layers:     HitLayers,
    trigger:    DebouncedTrigger,
    reconciler: Reconciler,
    effects:    E,
    hold_ms:    f64,
}

impl<E: KeyboardEffects> KeyboardScene<E> {
    pub fn new(keyboard: KeyboardLayout, effects: E, bpm: f64) -> Self {
        let keys: Vec<Key> = keyboard.white_keys().iter()
            .chain(keyboard.black_keys())
            .enumerate()
            .map(|(i, &spec)| Key { id: RegionId(i + 1), spec })
            .collect();
        let layer = |black: bool| -> Vec<RegionId> {
            keys.iter().filter(|k| k.is_black() == black).map(|k| k.id).collect()
        };
        let layers = HitLayers::new()
            .with_gate(KEYBOARD)
            .with_layer(layer(true))
            .with_layer(layer(false));
        let hold_ms = NoteValue::THIRTY_SECOND.duration_ms(bpm);
        info!(keys = keys.len(), hold_ms, "keyboard scene built");
        KeyboardScene {
            keyboard,
            keys,
            layers,
            trigger: DebouncedTrigger::new(KEY_COOLDOWN_MS),
            reconciler: Reconciler::new(),
            effects,
            hold_ms,
        }
    }

    pub fn keyboard(&self)         -> &KeyboardLayout { &self.keyboard }
    pub fn keys(&self)             -> &[Key]          { &self.keys }
    pub fn hold_ms(&self)          -> f64             { self.hold_ms }
    pub fn active(&self)           -> &ActiveSet      { self.reconciler.active() }
    pub fn is_active(&self, id: RegionId) -> bool     { self.reconciler.is_active(id) }
    pub fn effects(&self)          -> &E              { &self.effects }
    pub fn effects_mut(&mut self)  -> &mut E          { &mut self.effects }

    pub fn key(&self, id: RegionId) -> Option<&Key> {
        id.index().checked_sub(1).and_then(|i| self.keys.get(i))
    }

    pub fn key_for(&self, note: Note) -> Option<&Key> {
        self.keys.iter().find(|k| k.note() == note)
    }

    /// Lay the keyboard out inside `area`, returning the body and every key.
    ///
    /// White keys split the width evenly.  Each black key is centred on the
    /// right edge of the white key it belongs to and covers the top part of
    /// the keyboard.
    pub fn place_keys(&self, area: PixelRect) -> Vec<(RegionId, PixelRect)> {
        let whites = self.keyboard.white_keys().len().max(1) as f64;
        let ww = area.width / whites;
        let bw = ww * BLACK_WIDTH;
        let bh = area.height * BLACK_HEIGHT;

        let mut placed = Vec::with_capacity(self.keys.len() + 1);
        placed.push((KEYBOARD, area));
        for key in &self.keys {
            let left = area.x + ww * key.spec.white_index as f64;
            let rect = if key.is_black() {
                PixelRect::new(left + ww - bw / 2.0, area.y, bw, bh)
            } else {
                PixelRect::new(left, area.y, ww, area.height)
            };
            placed.push((key.id, rect));
        }
        placed
    }
}

impl<E: KeyboardEffects> Scene for KeyboardScene<E> {
    fn name(&self) -> &str { "keyboard" }

    fn on_frame(&mut self, frame: &Frame<'_>, layout: &dyn LayoutProvider, report: &mut TickReport) {
        let resolved = self.layers.resolve(layout);
        report.skipped.extend(resolved.skipped.iter().copied());

        let mut hits = ActiveSet::new();
        for &point in frame.points {
            let Some(id) = resolved.claim(point) else { continue };
            if !hits.insert(id) {
                continue;
            }
            let was_active = self.reconciler.is_active(id);
            if !self.trigger.evaluate(id, true, was_active, frame.now_ms) {
                continue;
            }
            report.fired.push(id);
            match id.index().checked_sub(1).and_then(|i| self.keys.get(i)) {
                Some(key) => {
                    debug!(%id, note = %key.spec.note, "strike");
                    report.record(self.effects.strike(key.spec.note, self.hold_ms));
                }
                None => report.record(Err(EffectError::Unavailable { what: id.to_string() })),
            }
        }

        let outcome = self.reconciler.reconcile(hits);
        for &id in &outcome.activated {
            report.record(self.effects.set_active(id, true));
        }
        for &id in &outcome.deactivated {
            report.record(self.effects.set_active(id, false));
        }
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
    use touch_core::{from_pixels, FrameLoop, ManualClock, Point, SharedSensor, StaticLayout, Viewport};

    #[derive(Default)]
    struct Recorder {
        struck: Vec<String>,
        flags:  Vec<(RegionId, bool)>,
    }

    impl KeyboardEffects for Recorder {
        fn strike(&mut self, note: Note, _hold_ms: f64) -> Result<(), EffectError> {
            self.struck.push(note.name());
            Ok(())
        }
        fn set_active(&mut self, id: RegionId, active: bool) -> Result<(), EffectError> {
            self.flags.push((id, active));
            Ok(())
        }
    }

    const VP: Viewport = Viewport { width: 700.0, height: 200.0 };

    fn scene() -> KeyboardScene<Recorder> {
        KeyboardScene::new(KeyboardLayout::new(4..=4), Recorder::default(), 120.0)
    }

    fn layout_for(scene: &KeyboardScene<Recorder>) -> StaticLayout {
        scene.place_keys(VP.bounds()).into_iter()
            .fold(StaticLayout::new(VP), |l, (id, rect)| l.with(id, rect))
    }

    fn px(x: f64, y: f64) -> Point { from_pixels(x, y, VP).unwrap() }

    fn id_of(scene: &KeyboardScene<Recorder>, name: &str) -> RegionId {
        scene.key_for(Note::parse(name).unwrap()).unwrap().id
    }

    #[test]
    fn ids_are_white_then_black() {
        let s = scene();
        assert_eq!(s.keys().len(), 12);
        assert_eq!(s.key(RegionId(1)).unwrap().note().name(), "C4");
        assert_eq!(s.key(RegionId(7)).unwrap().note().name(), "B4");
        assert_eq!(s.key(RegionId(8)).unwrap().note().name(), "C#4");
        assert!(s.key(KEYBOARD).is_none());
        assert!(s.key(RegionId(13)).is_none());
    }

    #[test]
    fn black_keys_sit_over_white_edges() {
        let s = scene();
        let placed = s.place_keys(VP.bounds());
        let rect = |name: &str| {
            let id = id_of(&s, name);
            placed.iter().find(|(i, _)| *i == id).unwrap().1
        };
        assert_eq!(rect("C4"), PixelRect::new(0.0, 0.0, 100.0, 200.0));
        assert_eq!(rect("C#4"), PixelRect::new(70.0, 0.0, 60.0, 120.0));
        assert_eq!(rect("A#4"), PixelRect::new(570.0, 0.0, 60.0, 120.0));
        assert_eq!(placed[0], (KEYBOARD, VP.bounds()));
    }

    #[test]
    fn overlap_goes_to_black_key() {
        let s = scene();
        let layout = layout_for(&s);
        let sensor = SharedSensor::new();
        let mut fl = FrameLoop::new(s, sensor.clone(), ManualClock::new(0.0));
        // (90px, 50px) lies on both C4 and C#4
        sensor.publish(vec![px(90.0, 50.0)]);
        let rep = fl.tick(&layout);
        assert_eq!(rep.fired, vec![id_of(fl.scene(), "C#4")]);
        assert_eq!(fl.scene().effects().struck, vec!["C#4"]);
    }

    #[test]
    fn lower_half_plays_white_key() {
        let s = scene();
        let layout = layout_for(&s);
        let sensor = SharedSensor::new();
        let mut fl = FrameLoop::new(s, sensor.clone(), ManualClock::new(0.0));
        sensor.publish(vec![px(90.0, 170.0), px(350.0, 170.0)]);
        fl.tick(&layout);
        assert_eq!(fl.scene().effects().struck, vec!["C4", "F4"]);
    }

    #[test]
    fn each_key_has_its_own_cooldown() {
        let s = scene();
        let layout = layout_for(&s);
        let sensor = SharedSensor::new();
        let clock  = ManualClock::new(0.0);
        let mut fl = FrameLoop::new(s, sensor.clone(), &clock);
        let c = px(50.0, 170.0);
        let e = px(250.0, 170.0);

        sensor.publish(vec![c]);
        fl.tick(&layout);                                   // C at 0
        sensor.clear();
        clock.set(100.0); fl.tick(&layout);
        sensor.publish(vec![c, e]);
        clock.set(200.0); fl.tick(&layout);                 // C cooling, E fires
        sensor.clear();
        clock.set(300.0); fl.tick(&layout);
        sensor.publish(vec![c]);
        clock.set(500.0); fl.tick(&layout);                 // C again
        assert_eq!(fl.scene().effects().struck, vec!["C4", "E4", "C4"]);
    }

    #[test]
    fn two_points_on_one_key_strike_once() {
        let s = scene();
        let layout = layout_for(&s);
        let sensor = SharedSensor::new();
        let mut fl = FrameLoop::new(s, sensor.clone(), ManualClock::new(0.0));
        sensor.publish(vec![px(20.0, 170.0), px(30.0, 180.0)]);
        let rep = fl.tick(&layout);
        assert_eq!(rep.fired.len(), 1);
        assert_eq!(rep.activated.len(), 1);
    }

    #[test]
    fn empty_sensor_clears_active_flags() {
        let s = scene();
        let layout = layout_for(&s);
        let sensor = SharedSensor::new();
        let mut fl = FrameLoop::new(s, sensor.clone(), ManualClock::new(0.0));
        sensor.publish(vec![px(50.0, 170.0), px(150.0, 170.0)]);
        fl.tick(&layout);
        assert_eq!(fl.scene().active().len(), 2);

        sensor.clear();
        let rep = fl.tick(&layout);
        assert!(rep.fired.is_empty());
        assert_eq!(rep.deactivated.len(), 2);
        assert!(fl.scene().active().is_empty());
        let cleared = fl.scene().effects().flags.iter().filter(|(_, on)| !on).count();
        assert_eq!(cleared, 2);
    }

    #[test]
    fn points_outside_the_body_are_ignored() {
        let s = scene();
        let vp = Viewport::new(700.0, 400.0);
        let layout = s.place_keys(PixelRect::new(0.0, 0.0, 700.0, 200.0)).into_iter()
            .fold(StaticLayout::new(vp), |l, (id, rect)| l.with(id, rect));
        let sensor = SharedSensor::new();
        let mut fl = FrameLoop::new(s, sensor.clone(), ManualClock::new(0.0));
        sensor.publish(vec![from_pixels(50.0, 300.0, vp).unwrap()]);
        assert!(fl.tick(&layout).fired.is_empty());
    }

    #[test]
    fn strike_lasts_a_thirty_second_note() {
        assert_eq!(scene().hold_ms(), 62.5);
    }
}
