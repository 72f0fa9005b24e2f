//! The frame loop and the seams it drives.
//!
//! One tick per display refresh, strictly one at a time:
//!
//! 1. read the sensor snapshot (absent ≡ empty),
//! 2. on the first tick that carries a point, run the scene's one-time
//!    start transition,
//! 3. let the scene hit-test, trigger and reconcile,
//! 4. hand control back to the host, which presents the frame and returns
//!    at the next refresh.
//!
//! The loop has no stop condition of its own; it ends only when the host
//! reports that it has been torn down.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, trace, warn};

use crate::clock::Clock;
use crate::error::EffectError;
use crate::geometry::{map_to_normalized, PixelRect, Point, Region, Viewport};
use crate::sensor::SensorSource;
use crate::RegionId;

// ════════════════════════════════════════════════════════════════════════════
// LayoutProvider — live element geometry
// ════════════════════════════════════════════════════════════════════════════

/// Synchronous access to on-screen element geometry.
pub trait LayoutProvider {
    /// Current viewport size in pixels.
    fn viewport(&self) -> Viewport;

    /// Current pixel bounding box of the element behind `id`, or `None`
    /// if the element is not present right now.
    fn bounding_box(&self, id: RegionId) -> Option<PixelRect>;

    /// Convenience: the element's box mapped into normalized space.
    fn region(&self, id: RegionId) -> Option<Region> {
        self.bounding_box(id).map(|rect| map_to_normalized(rect, self.viewport()))
    }
}

/// A fixed table of boxes; handy for tests and headless hosts.
#[derive(Clone, Debug)]
pub struct StaticLayout {
    viewport: Viewport,
    boxes:    HashMap<RegionId, PixelRect>,
}

impl StaticLayout {
    pub fn new(viewport: Viewport) -> Self {
        StaticLayout { viewport, boxes: HashMap::new() }
    }

    pub fn with(mut self, id: RegionId, rect: PixelRect) -> Self {
        self.boxes.insert(id, rect);
        self
    }

    pub fn set(&mut self, id: RegionId, rect: PixelRect) { self.boxes.insert(id, rect); }
    pub fn set_viewport(&mut self, viewport: Viewport) { self.viewport = viewport; }
}

impl LayoutProvider for StaticLayout {
    fn viewport(&self) -> Viewport { self.viewport }

    fn bounding_box(&self, id: RegionId) -> Option<PixelRect> {
        self.boxes.get(&id).copied()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame / TickReport
// ════════════════════════════════════════════════════════════════════════════

/// What a scene sees for one tick.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Zero-based tick counter.
    pub index:  u64,
    pub now_ms: f64,
    /// This tick's sensor points, possibly empty.
    pub points: &'a [Point],
}

/// Everything observable that happened during one tick.
#[derive(Debug, Default)]
pub struct TickReport {
    /// The one-time start transition ran on this tick.
    pub started:     bool,
    /// Regions whose trigger fired, in firing order.
    pub fired:       Vec<RegionId>,
    pub activated:   Vec<RegionId>,
    pub deactivated: Vec<RegionId>,
    /// Regions left out because their element was absent.
    pub skipped:     Vec<RegionId>,
    /// Effect failures, logged by the frame loop.
    pub failures:    Vec<EffectError>,
}

impl TickReport {
    /// Keep an effect's failure for the end-of-tick log.
    pub fn record(&mut self, result: Result<(), EffectError>) {
        if let Err(e) = result {
            self.failures.push(e);
        }
    }

    pub fn is_quiet(&self) -> bool {
        !self.started
            && self.fired.is_empty()
            && self.activated.is_empty()
            && self.deactivated.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Scene / HostScheduler traits
// ════════════════════════════════════════════════════════════════════════════

/// A hit-testing consumer driven by the [`FrameLoop`].
pub trait Scene {
    fn name(&self) -> &str;

    /// One-time start transition, run on the first tick with a point.
    fn on_start(&mut self, _frame: &Frame<'_>, _report: &mut TickReport) {}

    /// Per-tick hit testing, triggering and reconciliation.
    fn on_frame(&mut self, frame: &Frame<'_>, layout: &dyn LayoutProvider, report: &mut TickReport);
}

/// The host's refresh scheduler.
pub trait HostScheduler<S: ?Sized> {
    /// Layout to hit-test against this tick.
    fn layout(&self) -> &dyn LayoutProvider;

    /// Present the scene's current state and return at the next refresh.
    /// `false` means the host has been torn down.
    fn present(&mut self, scene: &S, report: &TickReport) -> bool;
}

// ════════════════════════════════════════════════════════════════════════════
// FrameLoop
// ════════════════════════════════════════════════════════════════════════════

pub struct FrameLoop<S, Src, C> {
    scene:   S,
    sensor:  Src,
    clock:   C,
    started: bool,
    frames:  u64,
}

impl<S: Scene, Src: SensorSource, C: Clock> FrameLoop<S, Src, C> {
    pub fn new(scene: S, sensor: Src, clock: C) -> Self {
        FrameLoop { scene, sensor, clock, started: false, frames: 0 }
    }

    pub fn scene(&self)         -> &S     { &self.scene }
    pub fn scene_mut(&mut self) -> &mut S { &mut self.scene }
    pub fn is_started(&self)    -> bool   { self.started }
    pub fn frames(&self)        -> u64    { self.frames }

    /// Run exactly one tick against `layout`.
    ///
    /// Never fails: effect errors are logged and returned in the report, and
    /// a panic inside the scene is caught and logged so the next tick runs.
    pub fn tick(&mut self, layout: &dyn LayoutProvider) -> TickReport {
        let now_ms = self.clock.now_ms();
        let mut points = self.sensor.snapshot().unwrap_or_default();
        points.retain(|p| p.x.is_finite() && p.y.is_finite());

        let frame = Frame { index: self.frames, now_ms, points: &points };
        self.frames += 1;

        let mut report = TickReport::default();
        let started = &mut self.started;
        let scene   = &mut self.scene;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if !*started && !frame.points.is_empty() {
                // latch first so a failing start can never run twice
                *started = true;
                report.started = true;
                scene.on_start(&frame, &mut report);
            }
            scene.on_frame(&frame, layout, &mut report);
        }));

        if let Err(payload) = outcome {
            let msg = panic_message(payload.as_ref());
            error!(scene = self.scene.name(), frame = frame.index, %msg, "tick panicked; continuing");
        }

        for failure in &report.failures {
            warn!(scene = self.scene.name(), frame = frame.index, error = %failure, "effect failed");
        }
        if !report.is_quiet() {
            trace!(
                frame = frame.index,
                fired = report.fired.len(),
                deactivated = report.deactivated.len(),
                "tick"
            );
        }
        report
    }

    /// Tick forever, yielding to `host` between ticks.
    ///
    /// Returns the number of ticks run once the host is torn down.
    ///
    /// A panic inside `present` is caught and logged like a scene panic; the
    /// host is assumed to still be up and the next tick runs.
    pub fn run<H: HostScheduler<S>>(&mut self, host: &mut H) -> u64 {
        loop {
            let report = self.tick(host.layout());
            let scene  = &self.scene;
            let alive = match panic::catch_unwind(AssertUnwindSafe(|| host.present(scene, &report))) {
                Ok(alive) => alive,
                Err(payload) => {
                    let msg = panic_message(payload.as_ref());
                    error!(scene = self.scene.name(), frame = self.frames - 1, %msg, "present panicked; continuing");
                    true
                }
            };
            if !alive {
                return self.frames;
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload.downcast_ref::<&str>().map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic".to_string())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
