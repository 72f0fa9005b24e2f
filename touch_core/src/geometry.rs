//! Geometry mapper — screen pixels → normalized sensor space.
//!
//! Screen space: origin top-left, y grows downward, units are pixels.
//! Sensor space: origin at the viewport center, y grows upward, the full
//! viewport spans `[-1, 1]` on both axes.

// ════════════════════════════════════════════════════════════════════════════
// Point / PixelRect / Viewport
// ════════════════════════════════════════════════════════════════════════════

/// A coordinate in normalized sensor space.
///
/// Conventionally within `[-1, 1]`, but sensors are allowed to report
/// slightly outside the viewport; such points simply hit nothing.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self { Point { x, y } }
}

/// An element's bounding box in screen pixels (top-left origin, y-down).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PixelRect {
    pub x:      f64,
    pub y:      f64,
    pub width:  f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        PixelRect { x, y, width, height }
    }

    pub fn right(&self)  -> f64 { self.x + self.width }
    pub fn bottom(&self) -> f64 { self.y + self.height }
}

/// Current viewport size in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width:  f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self { Viewport { width, height } }

    /// The whole viewport as a pixel rectangle.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0.0, 0.0, self.width, self.height)
    }

    fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Region
// ════════════════════════════════════════════════════════════════════════════

/// A rectangular hit area in normalized space.
///
/// Regions are cheap values derived from live layout; callers rebuild them
/// every frame instead of caching them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub center:      Point,
    pub half_width:  f64,
    pub half_height: f64,
}

impl Region {
    /// A zero-area region at the origin; contains nothing.
    pub const EMPTY: Region = Region { center: Point::ORIGIN, half_width: 0.0, half_height: 0.0 };

    pub fn new(center: Point, half_width: f64, half_height: f64) -> Self {
        Region { center, half_width, half_height }
    }

    pub fn left(&self)   -> f64 { self.center.x - self.half_width }
    pub fn right(&self)  -> f64 { self.center.x + self.half_width }
    pub fn bottom(&self) -> f64 { self.center.y - self.half_height }
    pub fn top(&self)    -> f64 { self.center.y + self.half_height }

    pub fn is_empty(&self) -> bool {
        !(self.half_width > 0.0 && self.half_height > 0.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Mapping
// ════════════════════════════════════════════════════════════════════════════

/// Map an element's pixel bounding box into normalized sensor space.
///
/// ```text
/// cx = (x + w/2) / vw * 2 - 1
/// cy = 1 - (y + h/2) / vh * 2
/// half_width  = w / vw
/// half_height = h / vh
/// ```
///
/// A zero-size box gives a zero-area region.  A viewport with a
/// non-positive dimension gives [`Region::EMPTY`].
pub fn map_to_normalized(rect: PixelRect, viewport: Viewport) -> Region {
    if viewport.is_degenerate() {
        return Region::EMPTY;
    }
    let cx = (rect.x + rect.width  * 0.5) / viewport.width  * 2.0 - 1.0;
    let cy = 1.0 - (rect.y + rect.height * 0.5) / viewport.height * 2.0;
    Region {
        center:      Point::new(cx, cy),
        half_width:  rect.width  / viewport.width,
        half_height: rect.height / viewport.height,
    }
}

/// Inverse mapping: a normalized point back to pixel coordinates.
///
/// Returns `None` for a degenerate viewport.
pub fn to_pixels(point: Point, viewport: Viewport) -> Option<(f64, f64)> {
    if viewport.is_degenerate() {
        return None;
    }
    let px = (point.x + 1.0) * 0.5 * viewport.width;
    let py = (1.0 - point.y) * 0.5 * viewport.height;
    Some((px, py))
}

/// Forward mapping for a single pixel position (window pointer → sensor).
///
/// Returns `None` for a degenerate viewport.
pub fn from_pixels(px: f64, py: f64, viewport: Viewport) -> Option<Point> {
    if viewport.is_degenerate() {
        return None;
    }
    Some(Point::new(
        px / viewport.width * 2.0 - 1.0,
        1.0 - py / viewport.height * 2.0,
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
