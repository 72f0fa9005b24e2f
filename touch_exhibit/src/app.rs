//! Top-level wiring.
//!
//! `run` builds the pointer source, the MIDI player and the window, hands
//! the chosen scene to a [`FrameLoop`] and lets the window drive it at the
//! display rate until it is closed.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::mpsc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info};

use touch_core::{EffectError, FrameLoop, RegionId, SystemClock};
use touch_midi::{GeneralMidi, KeyboardLayout, Note};
use touch_scenes::{ColorEffects, ColorScene, KeyboardEffects, KeyboardScene, Palette, Swatch};

use crate::player::{Player, PlayerGone};
use crate::sensor::{spawn_point_source, SimInput};
use crate::visualizer::Visualizer;

#[cfg(feature = "leap")]
use crate::sensor::{InteractionBox, LeapSensor};
#[cfg(not(feature = "leap"))]
use crate::sensor::SimPointerSensor;

/// How long a color chime rings.
const CHIME_MS: f64 = 400.0;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// Anything that stops the exhibit from starting.
#[derive(Debug, Error)]
pub enum ExhibitError {
    #[error("window: {0}")]
    Window(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<PlayerGone> for EffectError {
    fn from(_: PlayerGone) -> Self {
        EffectError::Unavailable { what: "MIDI player".into() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneKind { Color, Keyboard }

impl SceneKind {
    pub fn name(self) -> &'static str {
        match self {
            SceneKind::Color    => "color",
            SceneKind::Keyboard => "keyboard",
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for SceneKind {
    type Err = ExhibitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(SceneKind::Color),
            "keyboard" | "piano" => Ok(SceneKind::Keyboard),
            other => Err(ExhibitError::Config(format!("unknown scene {other:?}"))),
        }
    }
}

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub scene:       SceneKind,
    /// Keyboard range, whole octaves.
    pub low_octave:  i8,
    pub high_octave: i8,
    pub tempo_bpm:   u32,
    pub instrument:  GeneralMidi,
    pub velocity:    u8,
    pub channel:     u8,
    /// Directory holding the `<color>.m4a` voice recordings.
    pub voice_dir:   String,
    /// Fixed seed for palette angles and color picks; random if `None`.
    pub seed:        Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            scene:       SceneKind::Color,
            low_octave:  4,
            high_octave: 4,
            tempo_bpm:   120,
            instrument:  GeneralMidi::AcousticGrandPiano,
            velocity:    100,
            channel:     0,
            voice_dir:   "./voice/nagisa".to_string(),
            seed:        None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ExhibitError> {
        let bad = |msg: String| Err(ExhibitError::Config(msg));
        if self.low_octave > self.high_octave {
            return bad(format!("octave range {}..={} is empty", self.low_octave, self.high_octave));
        }
        if self.low_octave < -1 || self.high_octave > 8 {
            return bad(format!("octaves must lie within -1..=8, got {}..={}",
                               self.low_octave, self.high_octave));
        }
        if !(20..=300).contains(&self.tempo_bpm) {
            return bad(format!("tempo {} BPM outside 20–300", self.tempo_bpm));
        }
        if self.velocity == 0 || self.velocity > 127 {
            return bad(format!("velocity {} outside 1–127", self.velocity));
        }
        if self.channel > 15 {
            return bad(format!("MIDI channel {} outside 0–15", self.channel));
        }
        Ok(())
    }

    pub fn keyboard(&self) -> KeyboardLayout {
        KeyboardLayout::new(self.low_octave..=self.high_octave)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ExhibitSink — trigger effects for both scenes
// ════════════════════════════════════════════════════════════════════════════

/// Turns scene triggers into MIDI and keeps the keys' active flags for the
/// renderer.
pub struct ExhibitSink {
    player:   Player,
    velocity: u8,
    chimes:   HashMap<&'static str, u8>,
    lit:      BTreeSet<RegionId>,
}

/// Chime for the `index`-th palette color: C major pentatonic from C5 up,
/// wrapping back to C5 after four octaves so the note stays below 128.
pub fn chime_note(index: usize) -> u8 {
    const STEPS: [u8; 5] = [0, 2, 4, 7, 9];
    let octave = ((index / STEPS.len()) % 4) as u8;
    72 + 12 * octave + STEPS[index % STEPS.len()]
}

impl ExhibitSink {
    pub fn new(player: Player, velocity: u8) -> Self {
        ExhibitSink { player, velocity, chimes: HashMap::new(), lit: BTreeSet::new() }
    }

    /// Give every palette color its own chime.
    pub fn with_chimes(mut self, palette: &Palette) -> Self {
        self.chimes = palette.iter().enumerate().map(|(i, s)| (s.name, chime_note(i))).collect();
        self
    }

    pub fn lit(&self) -> &BTreeSet<RegionId> { &self.lit }
    pub fn is_lit(&self, id: RegionId) -> bool { self.lit.contains(&id) }

    /// Switch the player to `instrument` for every following strike.
    pub fn set_instrument(&self, instrument: GeneralMidi) -> Result<(), EffectError> {
        info!(instrument = instrument.name(), "instrument changed");
        self.player.set_instrument(instrument.program())?;
        Ok(())
    }
}

impl ColorEffects for ExhibitSink {
    fn reveal(&mut self, swatch: &Swatch) -> Result<(), EffectError> {
        info!(color = swatch.name, "cover lifted");
        Ok(())
    }

    fn show_color(&mut self, swatch: &Swatch) -> Result<(), EffectError> {
        debug!(color = swatch.name, label = swatch.label, angle = swatch.angle_deg, "show");
        Ok(())
    }

    fn play_voice(&mut self, swatch: &Swatch) -> Result<(), EffectError> {
        let note = *self.chimes.get(swatch.name).ok_or_else(|| EffectError::Unavailable {
            what: format!("chime for {}", swatch.name),
        })?;
        debug!(voice = %swatch.voice, note, "voice cue");
        self.player.strike(note, self.velocity, CHIME_MS)?;
        Ok(())
    }
}

impl KeyboardEffects for ExhibitSink {
    fn strike(&mut self, note: Note, hold_ms: f64) -> Result<(), EffectError> {
        let midi = note.midi()
            .ok_or_else(|| EffectError::Audio(format!("{note} has no MIDI number")))?;
        self.player.strike(midi, self.velocity, hold_ms)?;
        Ok(())
    }

    fn set_active(&mut self, id: RegionId, active: bool) -> Result<(), EffectError> {
        if active { self.lit.insert(id); } else { self.lit.remove(&id); }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the exhibit until its window is closed.
///
/// This is the entry point called from `main.rs`.  Returns the number of
/// frames shown.
pub fn run(cfg: AppConfig) -> Result<u64, ExhibitError> {
    cfg.validate()?;

    // ── Pointer source ────────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    #[cfg(feature = "leap")]
    let sensor = {
        drop(sim_rx);
        spawn_point_source(LeapSensor { volume: InteractionBox::DEFAULT })
    };
    #[cfg(not(feature = "leap"))]
    let sensor = spawn_point_source(SimPointerSensor { rx: sim_rx });

    // ── Sound, clock, window ──────────────────────────────────────────────
    let player = Player::spawn(cfg.instrument.program(), cfg.channel);
    let clock  = SystemClock::new();
    let mut vis = Visualizer::new(sim_tx, clock, cfg.instrument)?;
    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    };
    let sink = ExhibitSink::new(player.clone(), cfg.velocity);

    info!(scene = %cfg.scene, instrument = cfg.instrument.name(), "exhibit starting");
    let frames = match cfg.scene {
        SceneKind::Color => {
            let palette = Palette::html16(&mut rng, &cfg.voice_dir);
            let sink = sink.with_chimes(&palette);
            let scene = ColorScene::new(palette, sink, rng);
            FrameLoop::new(scene, sensor, clock).run(&mut vis)
        }
        SceneKind::Keyboard => {
            let scene = KeyboardScene::new(cfg.keyboard(), sink, cfg.tempo_bpm as f64);
            vis.lay_out_keyboard(&scene);
            FrameLoop::new(scene, sensor, clock).run(&mut vis)
        }
    };

    player.quit();
    info!(frames, "exhibit closed");
    Ok(frames)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
