//! The color scene's palette: the sixteen HTML 3.2 color names.
//!
//! Every swatch carries what the screen and the speaker need: a kana label
//! for the caption, a two-stop gradient, a caption tone that stays readable
//! on the gradient, and the recorded voice cue.

use rand::Rng;

/// Caption color that stays readable on a swatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextTone { Dark, Light }

impl TextTone {
    pub fn argb(self) -> u32 {
        match self {
            TextTone::Dark  => 0xFF000000,
            TextTone::Light => 0xFFFFFFFF,
        }
    }
}

/// One palette entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Swatch {
    /// CSS color keyword, e.g. `"teal"`.
    pub name:      &'static str,
    /// Caption shown to visitors.
    pub label:     &'static str,
    /// Gradient start (the named color), packed ARGB.
    pub base:      u32,
    /// Gradient end, a darker or softer neighbour.
    pub shade:     u32,
    /// Gradient direction in degrees, fixed when the palette is built.
    pub angle_deg: u16,
    pub text:      TextTone,
    /// Voice recording played when the swatch appears.
    pub voice:     String,
}

// (name, label, base, shade)
const HTML16: [(&str, &str, u32, u32); 16] = [
    ("black",   "くろ",       0xFF000000, 0xFFA9A9A9),
    ("silver",  "ぎん",       0xFFC0C0C0, 0xFFD3D3D3),
    ("gray",    "はいいろ",   0xFF808080, 0xFFA9A9A9),
    ("white",   "しろ",       0xFFFFFFFF, 0xFFF5F5F5),
    ("maroon",  "くりいろ",   0xFF800000, 0xFF8B0000),
    ("red",     "あか",       0xFFFF0000, 0xFF8B0000),
    ("purple",  "むらさき",   0xFF800080, 0xFF4B0082),
    ("fuchsia", "ピンク",     0xFFFF00FF, 0xFFFF1493),
    ("green",   "みどり",     0xFF008000, 0xFF006400),
    ("lime",    "きみどり",   0xFF00FF00, 0xFF32CD32),
    ("olive",   "おりーぶ",   0xFF808000, 0xFF556B2F),
    ("yellow",  "きいろ",     0xFFFFFF00, 0xFFDAA520),
    ("navy",    "こん",       0xFF000080, 0xFF191970),
    ("blue",    "あお",       0xFF0000FF, 0xFF000080),
    ("teal",    "あおみどり", 0xFF008080, 0xFF2F4F4F),
    ("aqua",    "みずいろ",   0xFF00FFFF, 0xFF20B2AA),
];

/// Colors light enough to need a dark caption.
const DARK_TEXT: [&str; 3] = ["white", "silver", "yellow"];

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
}

impl Palette {
    /// The sixteen basic HTML colors, each with a random gradient angle.
    pub fn html16<R: Rng + ?Sized>(rng: &mut R, voice_dir: &str) -> Self {
        let swatches = HTML16.iter().map(|&(name, label, base, shade)| Swatch {
            name,
            label,
            base,
            shade,
            angle_deg: rng.gen_range(0..360),
            text: if DARK_TEXT.contains(&name) { TextTone::Dark } else { TextTone::Light },
            voice: format!("{}/{}.m4a", voice_dir.trim_end_matches('/'), name),
        }).collect();
        Palette { swatches }
    }

    pub fn from_swatches(swatches: Vec<Swatch>) -> Self { Palette { swatches } }

    pub fn len(&self) -> usize { self.swatches.len() }
    pub fn is_empty(&self) -> bool { self.swatches.is_empty() }
    pub fn get(&self, index: usize) -> Option<&Swatch> { self.swatches.get(index) }
    pub fn iter(&self) -> impl Iterator<Item = &Swatch> { self.swatches.iter() }
}

/// Uniform pick among every index except `current`.
///
/// With fewer than two entries there is nothing else to pick and `current`
/// is returned unchanged.
pub fn pick_next<R: Rng + ?Sized>(current: usize, len: usize, rng: &mut R) -> usize {
    if len < 2 {
        return current;
    }
    let i = rng.gen_range(0..len - 1);
    if i >= current { i + 1 } else { i }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
