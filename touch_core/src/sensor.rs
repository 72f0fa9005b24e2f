//! Sensor side of the pipeline.
//!
//! A sensor is anything that can hand over its latest list of normalized
//! points on demand.  Hardware drivers usually run on their own thread and
//! publish into a [`SharedSensor`]; the frame loop reads one snapshot per
//! tick.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::geometry::Point;

// ════════════════════════════════════════════════════════════════════════════
// SensorSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Read-only access to the sensor's current points.
///
/// `None` means "no data this tick" and is handled exactly like an empty
/// list.  No ordering or identity is promised across reads.
pub trait SensorSource {
    fn snapshot(&self) -> Option<Vec<Point>>;
}

impl<S: SensorSource + ?Sized> SensorSource for &S {
    fn snapshot(&self) -> Option<Vec<Point>> { (**self).snapshot() }
}

impl<S: SensorSource + ?Sized> SensorSource for Box<S> {
    fn snapshot(&self) -> Option<Vec<Point>> { (**self).snapshot() }
}

// ════════════════════════════════════════════════════════════════════════════
// SharedSensor — cross-thread snapshot cell
// ════════════════════════════════════════════════════════════════════════════

/// Latest-value cell shared between a publishing driver and the frame loop.
///
/// Writers replace the whole snapshot; readers clone it under the lock, so
/// a tick never sees a half-written list.
#[derive(Clone, Debug, Default)]
pub struct SharedSensor {
    latest: Arc<Mutex<Option<Vec<Point>>>>,
}

impl SharedSensor {
    pub fn new() -> Self { SharedSensor::default() }

    /// Replace the published points.
    pub fn publish(&self, points: Vec<Point>) {
        *self.latest.lock() = Some(points);
    }

    /// Publish "no data".
    pub fn clear(&self) {
        *self.latest.lock() = None;
    }
}

impl SensorSource for SharedSensor {
    fn snapshot(&self) -> Option<Vec<Point>> {
        self.latest.lock().clone()
    }
}
