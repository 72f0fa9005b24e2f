//! Pointer sources — LeapMotion hardware and mouse simulation.
//!
//! Every source runs on its own thread and publishes into a
//! [`SharedSensor`]; the frame loop reads the latest snapshot once per tick.
//! Consumers don't need to know whether points came from real hardware or
//! the mouse.

use std::sync::mpsc::Receiver;
use std::thread;

use tracing::debug;

use touch_core::{Point, SharedSensor};

// ════════════════════════════════════════════════════════════════════════════
// PointSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can publish normalized pointer positions.
pub trait PointSource: Send + 'static {
    fn run(self: Box<Self>, sink: SharedSensor);
}

/// Spawn a point source on its own thread and return the snapshot cell it
/// publishes into.
pub fn spawn_point_source<P: PointSource>(source: P) -> SharedSensor {
    let sink = SharedSensor::new();
    let publisher = sink.clone();
    thread::spawn(move || Box::new(source).run(publisher));
    sink
}

// ════════════════════════════════════════════════════════════════════════════
// InteractionBox — tracking volume → normalized space
// ════════════════════════════════════════════════════════════════════════════

/// The slab of the tracking volume mapped onto the screen, in millimetres
/// relative to the controller (x to the right, y up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionBox {
    pub left:   f32,
    pub right:  f32,
    pub bottom: f32,
    pub top:    f32,
}

impl InteractionBox {
    /// 40 cm wide, 10–40 cm above the controller.
    pub const DEFAULT: InteractionBox = InteractionBox {
        left: -200.0, right: 200.0, bottom: 100.0, top: 400.0,
    };

    /// Map a tracked position into normalized space.
    ///
    /// Positions outside the box land outside [-1, 1] and hit nothing.
    /// A box with zero width or height maps to `None`.
    pub fn normalize(&self, x: f32, y: f32) -> Option<Point> {
        let w = self.right - self.left;
        let h = self.top - self.bottom;
        if w.abs() < f32::EPSILON || h.abs() < f32::EPSILON {
            return None;
        }
        let nx = (x - self.left) / w * 2.0 - 1.0;
        let ny = (y - self.bottom) / h * 2.0 - 1.0;
        Some(Point::new(nx as f64, ny as f64))
    }
}

impl Default for InteractionBox {
    fn default() -> Self { InteractionBox::DEFAULT }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapSensor — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Point source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Publishes the index fingertip of every tracked hand; a frame with no
/// hands publishes an empty list.
#[cfg(feature = "leap")]
pub struct LeapSensor {
    pub volume: InteractionBox,
}

#[cfg(feature = "leap")]
impl PointSource for LeapSensor {
    fn run(self: Box<Self>, sink: SharedSensor) {
        use leaprs::*;
        use tracing::{error, info};

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => { error!(error = ?e, "failed to create LeapC connection"); return; }
        };
        if let Err(e) = connection.open() {
            error!(error = ?e, "failed to open LeapMotion device");
            return;
        }
        info!("LeapMotion connected");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let points: Vec<Point> = frame.hands()
                    .filter_map(|hand| hand.digits().nth(1).map(|index| index.distal().next_joint()))
                    .filter_map(|tip| self.volume.normalize(tip.x, tip.y))
                    .collect();
                sink.publish(points);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimPointerSensor — mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Left button held at this normalized position.
    Press(Point),
    /// Button up, or pointer outside the window.
    Release,
    Quit,
}

/// Point source driven by [`SimInput`] events from the visualizer's window.
///
/// The visualizer sends `SimInput` events here; this translator publishes
/// them.  This decouples the window event loop from the sensor cell.
pub struct SimPointerSensor {
    pub rx: Receiver<SimInput>,
}

impl PointSource for SimPointerSensor {
    fn run(self: Box<Self>, sink: SharedSensor) {
        for input in self.rx {
            match input {
                SimInput::Press(p) => sink.publish(vec![p]),
                SimInput::Release  => sink.clear(),
                SimInput::Quit     => break,
            }
        }
        sink.clear();
        debug!("pointer simulation stopped");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
