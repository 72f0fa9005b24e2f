//! Software-rendered window using `minifb`.
//!
//! The window is the frame loop's host: every [`present`] draws the scene,
//! waits for the next refresh (~60 fps), feeds the mouse to the pointer
//! simulation and lays out the hit regions for the next tick from the
//! current window size.
//!
//! ```text
//! color                               keyboard
//! ┌───────────────────────────┐       ┌───────────────────────────┐
//! │ gradient, full window     │       │                           │
//! │          ◯ burst          │       │  ┌─┬█┬█┬─┬█┬█┬█┬─┐        │
//! │         TEAL              │       │  │ └┬┘└┬┘ └┬┘└┬┘└┬┘ │      │
//! │                           │       │  │C4│D4│E4│F4│G4│A4│B4│    │
//! └───────────────────────────┘       └───────────────────────────┘
//! ```
//!
//! [`present`]: HostScheduler::present

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use rand::Rng;
use tracing::warn;

use touch_core::{
    from_pixels, Clock, HostScheduler, LayoutProvider, PixelRect, StaticLayout, SystemClock,
    TickReport, Viewport,
};
use touch_midi::GeneralMidi;
use touch_scenes::{ColorEffects, ColorScene, KeyboardScene, SCREEN};

use crate::app::{ExhibitError, ExhibitSink};
use crate::sensor::SimInput;
use crate::stage::{blend, gradient_t, CaptionPop, CoverPhase, KeyGlow};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 1280;
pub const WIN_H:     usize = 720;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const COVER_COLOR:   u32   = 0xFF0F3460;
const WHITE_KEY:     u32   = 0xFFF4F1E8;
const BLACK_KEY:     u32   = 0xFF202020;
const LIT_COLOR:     u32   = 0xFF4FC3F7;
const FLASH_COLOR:   u32   = 0xFFFFD700;
const BURST_COLOR:   u32   = 0xFFFFFFFF;
const LABEL_COLOR:   u32   = 0xFF555555;

/// Where the keyboard sits in a window of size `vp`.
pub fn keyboard_area(vp: Viewport) -> PixelRect {
    PixelRect::new(vp.width * 0.05, vp.height * 0.35, vp.width * 0.90, vp.height * 0.50)
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    canvas:  Canvas,
    sim_tx:  Sender<SimInput>,
    clock:   SystemClock,
    layout:  StaticLayout,
    cover:   CoverPhase,
    caption: CaptionPop,
    glow:    KeyGlow,
    pressed: bool,
    /// Current keyboard instrument; Tab steps through the GM table.
    instrument: GeneralMidi,
}

impl Visualizer {
    /// Open the window.  `clock` must be the frame loop's clock so bursts
    /// line up with the ticks that started them.
    pub fn new(
        sim_tx:     Sender<SimInput>,
        clock:      SystemClock,
        instrument: GeneralMidi,
    ) -> Result<Self, ExhibitError> {
        let mut window = Window::new(
            "Touch Exhibit",
            WIN_W, WIN_H,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        ).map_err(|e| ExhibitError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        let vp = Viewport::new(WIN_W as f64, WIN_H as f64);
        Ok(Visualizer {
            window,
            canvas:  Canvas::new(WIN_W, WIN_H),
            sim_tx,
            clock,
            layout:  StaticLayout::new(vp).with(SCREEN, vp.bounds()),
            cover:   CoverPhase::Covered,
            caption: CaptionPop::default(),
            glow:    KeyGlow::default(),
            pressed: false,
            instrument,
        })
    }

    fn viewport(&self) -> Viewport {
        let (w, h) = self.window.get_size();
        Viewport::new(w as f64, h as f64)
    }

    /// Lay out the keyboard's regions for the current window size.
    pub fn lay_out_keyboard(&mut self, scene: &KeyboardScene<ExhibitSink>) {
        let vp = self.viewport();
        self.layout = scene.place_keys(keyboard_area(vp)).into_iter()
            .fold(StaticLayout::new(vp), |l, (id, rect)| l.with(id, rect));
    }

    /// Poll keyboard and mouse.  Returns false when the window should close.
    fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let quit = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        if quit(Key::Q) || quit(Key::Escape) {
            let _ = self.sim_tx.send(SimInput::Quit);
            return false;
        }

        let vp = self.viewport();
        let held = self.window.get_mouse_down(MouseButton::Left);
        let point = self.window.get_mouse_pos(MouseMode::Discard)
            .and_then(|(x, y)| from_pixels(x as f64, y as f64, vp));

        match (held, point) {
            (true, Some(p)) => {
                self.pressed = true;
                let _ = self.sim_tx.send(SimInput::Press(p));
            }
            _ if self.pressed => {
                self.pressed = false;
                let _ = self.sim_tx.send(SimInput::Release);
            }
            _ => {}
        }
        true
    }

    /// Per-frame housekeeping shared by both scenes.
    fn begin_frame(&mut self, revealed: bool) -> bool {
        if !self.poll_input() { return false; }
        let (w, h) = self.window.get_size();
        self.canvas.resize(w, h);
        if revealed { self.cover.lift(); }
        self.cover.tick();
        true
    }

    fn end_frame(&mut self) -> bool {
        let opacity = self.cover.opacity();
        if opacity > 0.0 {
            self.canvas.veil(COVER_COLOR, opacity);
            let text = "TOUCH TO START";
            let scale = 6;
            let x = self.canvas.width().saturating_sub(label_width(text, scale)) / 2;
            let y = self.canvas.height() / 2;
            self.canvas.draw_label(text, x, y, scale, blend(COVER_COLOR, 0xFFFFFFFF, opacity));
        }
        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.window.update_with_buffer(self.canvas.pixels(), w, h).is_ok() && self.window.is_open()
    }
}

// ── Color scene ───────────────────────────────────────────────────────────

impl<E: ColorEffects, R: Rng> HostScheduler<ColorScene<E, R>> for Visualizer {
    fn layout(&self) -> &dyn LayoutProvider { &self.layout }

    fn present(&mut self, scene: &ColorScene<E, R>, _report: &TickReport) -> bool {
        if !self.begin_frame(scene.is_revealed()) { return false; }
        let now = self.clock.now_ms();
        let (w, h) = (self.canvas.width(), self.canvas.height());

        match scene.current_swatch() {
            Some(s) => {
                self.canvas.fill_with(|x, y| {
                    blend(s.base, s.shade, gradient_t(s.angle_deg, x as f32, y as f32, w as f32, h as f32))
                });
                // the bitmap font has no kana, so the English name stands in
                // for the swatch's label
                let pop = if scene.is_revealed() { self.caption.tick(scene.current()) } else { 1.0 };
                let scale = ((h / 60).max(2) as f32 * pop.max(0.0)).round() as usize;
                if scale > 0 {
                    let name = s.name.to_uppercase();
                    let x = w.saturating_sub(label_width(&name, scale)) / 2;
                    let y = h.saturating_sub(5 * scale) / 2;
                    self.canvas.draw_label(&name, x, y, scale, s.text.argb());
                }
            }
            None => self.canvas.fill(BG_COLOR),
        }

        if scene.burst_active(now) {
            let spent = 1.0 - scene.burst_remaining(now) as f32;
            let radius = spent * w.max(h) as f32 * 0.6;
            self.canvas.draw_ring(w / 2, h / 2, radius, 6.0 + 10.0 * (1.0 - spent), BURST_COLOR);
        }

        let vp = self.viewport();
        self.layout.set_viewport(vp);
        self.layout.set(SCREEN, vp.bounds());
        self.end_frame()
    }
}

// ── Keyboard scene ────────────────────────────────────────────────────────

impl HostScheduler<KeyboardScene<ExhibitSink>> for Visualizer {
    fn layout(&self) -> &dyn LayoutProvider { &self.layout }

    fn present(&mut self, scene: &KeyboardScene<ExhibitSink>, report: &TickReport) -> bool {
        for &id in &report.fired { self.glow.flash(id); }
        self.glow.tick();
        if !self.begin_frame(report.started) { return false; }

        if self.window.is_key_pressed(Key::Tab, KeyRepeat::No) {
            self.instrument = self.instrument.next();
            if let Err(e) = scene.effects().set_instrument(self.instrument) {
                warn!(error = %e, "instrument change failed");
            }
        }

        self.canvas.fill(BG_COLOR);
        let vp = self.viewport();
        let placed = scene.place_keys(keyboard_area(vp));

        // whites come before blacks in `placed`, so black keys paint on top
        for &(id, rect) in placed.iter().skip(1) {
            let Some(key) = scene.key(id) else { continue };
            let mut color = if key.is_black() { BLACK_KEY } else { WHITE_KEY };
            if scene.effects().is_lit(id) {
                color = blend(color, LIT_COLOR, 0.6);
            }
            color = blend(color, FLASH_COLOR, self.glow.level(id) * 0.5);

            let (x, y, w, h) = px_rect(rect);
            self.canvas.fill_rect(x, y, w, h, color);
            self.canvas.draw_border(x, y, w, h, 0xFF000000);

            if !key.is_black() {
                let name = key.note().name();
                let scale = (w / 16).clamp(1, 4);
                let lx = x + w.saturating_sub(label_width(&name, scale)) / 2;
                let ly = (y + h).saturating_sub(8 * scale);
                self.canvas.draw_label(&name, lx, ly, scale, LABEL_COLOR);
            }
        }

        self.layout = placed.into_iter()
            .fold(StaticLayout::new(vp), |l, (id, rect)| l.with(id, rect));
        self.end_frame()
    }
}

fn px_rect(r: PixelRect) -> (usize, usize, usize, usize) {
    let x = r.x.max(0.0).round() as usize;
    let y = r.y.max(0.0).round() as usize;
    let right  = r.right().max(0.0).round() as usize;
    let bottom = r.bottom().max(0.0).round() as usize;
    (x, y, right.saturating_sub(x), bottom.saturating_sub(y))
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — the framebuffer and its drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    buf: Vec<u32>,
    w:   usize,
    h:   usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; w * h], w, h }
    }

    pub fn width(&self)  -> usize  { self.w }
    pub fn height(&self) -> usize  { self.h }
    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.w && y < self.h).then(|| self.buf[y * self.w + x])
    }

    /// Match the window size; contents are undefined afterwards.
    pub fn resize(&mut self, w: usize, h: usize) {
        if (w, h) != (self.w, self.h) {
            self.w = w;
            self.h = h;
            self.buf.resize(w * h, BG_COLOR);
        }
    }

    pub fn fill(&mut self, color: u32) { self.buf.fill(color); }

    pub fn fill_with(&mut self, mut color_at: impl FnMut(usize, usize) -> u32) {
        for y in 0..self.h {
            for x in 0..self.w {
                self.buf[y * self.w + x] = color_at(x, y);
            }
        }
    }

    /// Blend the whole canvas toward `color`.
    pub fn veil(&mut self, color: u32, amount: f32) {
        for px in &mut self.buf {
            *px = blend(*px, color, amount);
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..(x + w).min(self.w) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y + h).min(self.h) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.w && y < self.h {
            self.buf[y * self.w + x] = color;
        }
    }

    /// Circle outline of outer radius `radius` around (`cx`, `cy`).
    pub fn draw_ring(&mut self, cx: usize, cy: usize, radius: f32, thickness: f32, color: u32) {
        if radius <= 0.0 { return; }
        let inner = (radius - thickness).max(0.0);
        let r = radius.ceil() as isize;
        for dy in -r..=r {
            for dx in -r..=r {
                let d = ((dx * dx + dy * dy) as f32).sqrt();
                if d < inner || d > radius { continue; }
                let (x, y) = (cx as isize + dx, cy as isize + dy);
                if x >= 0 && y >= 0 {
                    self.set_pixel(x as usize, y as usize, color);
                }
            }
        }
    }

    /// Minimal bitmap font — 3×5 characters, each pixel drawn as a
    /// `scale`×`scale` block.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx >= self.w { break; }
        }
    }
}

/// Pixel width of `text` drawn at `scale`, without the trailing gap.
pub fn label_width(text: &str, scale: usize) -> usize {
    let n = text.chars().count();
    if n == 0 { 0 } else { (4 * n - 1) * scale.max(1) }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b011],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
