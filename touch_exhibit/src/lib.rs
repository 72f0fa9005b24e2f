//! # touch_exhibit
//!
//! Host for the touchless exhibits: a window, a pointer source, a MIDI
//! synth, and the [`touch_core::FrameLoop`] tying them together.
//!
//! ## Scenes
//!
//! | Scene | Touch | Result |
//! |---|---|---|
//! | `color` | anywhere on screen | background jumps to another HTML color, a chime plays, a ring bursts out |
//! | `keyboard` | a key on the on-screen keyboard | the key's note sounds for a 32nd note and the key lights up |
//!
//! The first touch lifts the cover screen.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: hold the left mouse button to touch.
//! * `leap` — **Hardware mode**: index fingertips from a LeapMotion
//!   controller via LeapC.
//!
//! ### Window keys
//!
//! | Key | Action |
//! |---|---|
//! | `Q` / `Escape` | Quit |
//!
//! Logging goes through `tracing`; set `RUST_LOG=touch_core=trace` to see
//! every tick.

pub mod sensor;
pub mod stage;
pub mod player;
pub mod visualizer;
pub mod app;
