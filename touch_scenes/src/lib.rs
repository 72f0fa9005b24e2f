//! # touch_scenes
//!
//! The two exhibits that sit on top of [`touch_core`]:
//!
//! | Scene | Regions | Cooldown | Trigger |
//! |---|---|---|---|
//! | [`ColorScene`] | one, full screen | 200 ms, shared | jump to a different palette color, say its name |
//! | [`KeyboardScene`] | one per key, black over white | 500 ms, per key | strike the key's note for a 32nd note |
//!
//! Both scenes own their effect sink.  Hosts implement [`ColorEffects`] or
//! [`KeyboardEffects`] to turn triggers into sound and pixels, then read the
//! scene back when presenting a frame.

pub mod color;
pub mod keyboard;
pub mod palette;

pub use color::{ColorEffects, ColorScene, BURST_MS, SCREEN};
pub use keyboard::{Key, KeyboardEffects, KeyboardScene, KEYBOARD};
pub use palette::{pick_next, Palette, Swatch, TextTone};
