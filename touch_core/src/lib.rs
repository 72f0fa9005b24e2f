//! # touch_core
//!
//! The perceptual core shared by every touchless exhibit: a proximity sensor
//! publishes normalized pointer coordinates, and each display refresh the
//! [`FrameLoop`] tests them against live UI geometry and turns
//! "point entered region" into exactly-once triggers.
//!
//! ## Pipeline
//!
//! ```text
//!  SensorSource ──► FrameLoop ──► Scene::on_frame
//!                                   │
//!       LayoutProvider ──► geometry::map_to_normalized ──► Region
//!                                   │
//!                       hit::first_hit / Region::contains
//!                                   │
//!             DebouncedTrigger ─────┴───── Reconciler
//!                    │                          │
//!              action sinks              active-flag sinks
//! ```
//!
//! ## Coordinate space
//!
//! Normalized space is centered on the viewport, y-up, with the full
//! viewport spanning `[-1, 1]` on both axes.  Screen space is the usual
//! top-left origin, y-down pixel grid.
//!
//! ## Quick start
//!
//! ```rust
//! use touch_core::{map_to_normalized, PixelRect, Point, Viewport};
//!
//! let vp     = Viewport::new(800.0, 600.0);
//! let region = map_to_normalized(PixelRect::new(0.0, 0.0, 800.0, 600.0), vp);
//! assert!(region.contains(Point::new(0.0, 0.0)));
//! assert!(!region.contains(Point::new(1.0, 0.0)));   // edges never count
//! ```

pub mod clock;
pub mod debounce;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod hit;
pub mod reconcile;
pub mod sensor;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::{DebouncedTrigger, COLOR_COOLDOWN_MS, KEY_COOLDOWN_MS};
pub use error::EffectError;
pub use frame::{
    Frame, FrameLoop, HostScheduler, LayoutProvider, Scene, StaticLayout, TickReport,
};
pub use geometry::{from_pixels, map_to_normalized, to_pixels, PixelRect, Point, Region, Viewport};
pub use hit::{contains, first_hit, HitLayers, ResolvedLayers};
pub use reconcile::{reconcile, ActiveSet, Reconciler, Reconciliation};
pub use sensor::{SensorSource, SharedSensor};

use std::fmt;

// ════════════════════════════════════════════════════════════════════════════
// RegionId — stable handle for a hit region
// ════════════════════════════════════════════════════════════════════════════

/// Stable identity of a hit region.
///
/// Debounce clocks and the active set are keyed by this handle, never by
/// geometry: the geometry behind an id is re-read from layout every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(pub usize);

impl RegionId {
    pub fn index(self) -> usize { self.0 }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}
