//! Hit tester.
//!
//! Containment is strict on every edge, so a point sitting exactly on the
//! boundary shared by two adjacent keys belongs to neither.

use tracing::debug;

use crate::frame::LayoutProvider;
use crate::geometry::{map_to_normalized, Point, Region};
use crate::RegionId;

impl Region {
    /// True iff `point` lies strictly inside the region.
    pub fn contains(&self, point: Point) -> bool {
        self.left()   < point.x && point.x < self.right()
            && self.bottom() < point.y && point.y < self.top()
    }
}

/// Free-function form of [`Region::contains`].
pub fn contains(region: &Region, point: Point) -> bool {
    region.contains(point)
}

/// First region containing `point`, scanning `candidates` in order.
pub fn first_hit<'a, I>(candidates: I, point: Point) -> Option<RegionId>
where
    I: IntoIterator<Item = &'a (RegionId, Region)>,
{
    candidates
        .into_iter()
        .find(|(_, region)| region.contains(point))
        .map(|(id, _)| *id)
}

// ════════════════════════════════════════════════════════════════════════════
// HitLayers — ordered, optionally gated region stacks
// ════════════════════════════════════════════════════════════════════════════

/// Regions grouped into layers, foreground first.
///
/// For every point the layers are scanned front to back and the first
/// containing region claims the point; regions underneath never see it.
/// An optional gate region (e.g. the keyboard body) must contain the point
/// before any layer is consulted.
#[derive(Clone, Debug, Default)]
pub struct HitLayers {
    gate:   Option<RegionId>,
    layers: Vec<Vec<RegionId>>,
}

impl HitLayers {
    pub fn new() -> Self { HitLayers::default() }

    /// Require points to fall inside `gate` first.
    pub fn with_gate(mut self, gate: RegionId) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Append a layer beneath the existing ones.
    pub fn with_layer(mut self, ids: Vec<RegionId>) -> Self {
        self.layers.push(ids);
        self
    }

    pub fn gate(&self) -> Option<RegionId> { self.gate }

    /// Every region id across all layers, front to back.
    pub fn regions(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.layers.iter().flatten().copied()
    }

    /// Read every region's geometry from live layout for this frame.
    ///
    /// Regions whose element is absent are left out and listed in
    /// [`ResolvedLayers::skipped`].
    pub fn resolve(&self, layout: &dyn LayoutProvider) -> ResolvedLayers {
        let viewport = layout.viewport();
        let mut skipped = Vec::new();

        let gate = match self.gate {
            None     => Gate::Open,
            Some(id) => match layout.bounding_box(id) {
                Some(rect) => Gate::Region(map_to_normalized(rect, viewport)),
                None => {
                    debug!(%id, "gate element absent; no point can hit this frame");
                    skipped.push(id);
                    Gate::Closed
                }
            },
        };

        let layers: Vec<Vec<(RegionId, Region)>> = self.layers.iter().map(|layer| {
            layer.iter().filter_map(|&id| match layout.bounding_box(id) {
                Some(rect) => Some((id, map_to_normalized(rect, viewport))),
                None => {
                    debug!(%id, "region element absent; skipped this frame");
                    skipped.push(id);
                    None
                }
            }).collect::<Vec<_>>()
        }).collect();

        ResolvedLayers { gate, layers, skipped }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gate {
    Open,
    Closed,
    Region(Region),
}

/// One frame's worth of resolved geometry for a [`HitLayers`] stack.
#[derive(Clone, Debug)]
pub struct ResolvedLayers {
    gate:        Gate,
    layers:      Vec<Vec<(RegionId, Region)>>,
    pub skipped: Vec<RegionId>,
}

impl ResolvedLayers {
    /// The region that claims `point`, if any (first match wins).
    pub fn claim(&self, point: Point) -> Option<RegionId> {
        match self.gate {
            Gate::Closed => return None,
            Gate::Region(r) if !r.contains(point) => return None,
            _ => {}
        }
        self.layers.iter().find_map(|layer| first_hit(layer, point))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::StaticLayout;
    use crate::geometry::{PixelRect, Viewport};

    fn unit_box() -> Region { Region::new(Point::ORIGIN, 0.1, 0.1) }

    #[test]
    fn point_just_inside_is_contained() {
        assert!(unit_box().contains(Point::new(0.099, 0.0)));
    }

    #[test]
    fn point_on_edge_is_not_contained() {
        let r = unit_box();
        assert!(!r.contains(Point::new(0.1, 0.0)));
        assert!(!r.contains(Point::new(-0.1, 0.0)));
        assert!(!r.contains(Point::new(0.0, 0.1)));
        assert!(!r.contains(Point::new(0.0, -0.1)));
    }

    #[test]
    fn empty_region_contains_nothing() {
        assert!(!Region::EMPTY.contains(Point::ORIGIN));
    }

    #[test]
    fn shared_boundary_hits_neither_neighbour() {
        let left  = Region::new(Point::new(-0.1, 0.0), 0.1, 0.5);
        let right = Region::new(Point::new( 0.1, 0.0), 0.1, 0.5);
        let p = Point::new(0.0, 0.0);
        assert!(!contains(&left, p));
        assert!(!contains(&right, p));
    }

    #[test]
    fn first_hit_respects_order() {
        let a = (RegionId(1), Region::new(Point::ORIGIN, 0.5, 0.5));
        let b = (RegionId(2), Region::new(Point::ORIGIN, 0.2, 0.2));
        assert_eq!(first_hit(&[a, b], Point::ORIGIN), Some(RegionId(1)));
        assert_eq!(first_hit(&[b, a], Point::ORIGIN), Some(RegionId(2)));
        assert_eq!(first_hit(&[b], Point::new(0.3, 0.0)), None);
    }

    // 100×100 viewport: white key spans the left half, the black key sits on
    // its upper right corner, the gate covers the top 80 px.
    fn layered_layout() -> (StaticLayout, HitLayers) {
        let layout = StaticLayout::new(Viewport::new(100.0, 100.0))
            .with(RegionId(0), PixelRect::new(0.0, 0.0, 100.0, 80.0))
            .with(RegionId(1), PixelRect::new(0.0, 0.0, 50.0, 80.0))
            .with(RegionId(2), PixelRect::new(35.0, 0.0, 30.0, 50.0));
        let layers = HitLayers::new()
            .with_gate(RegionId(0))
            .with_layer(vec![RegionId(2)])
            .with_layer(vec![RegionId(1)]);
        (layout, layers)
    }

    #[test]
    fn foreground_claims_overlap() {
        let (layout, layers) = layered_layout();
        let resolved = layers.resolve(&layout);
        // (40px, 20px) sits inside both keys
        let p = Point::new(-0.2, 0.6);
        assert_eq!(resolved.claim(p), Some(RegionId(2)));
        // (10px, 20px) is only on the white key
        assert_eq!(resolved.claim(Point::new(-0.8, 0.6)), Some(RegionId(1)));
    }

    #[test]
    fn gate_filters_points() {
        let (layout, layers) = layered_layout();
        let resolved = layers.resolve(&layout);
        // (10px, 90px) is on no key and below the gate
        assert_eq!(resolved.claim(Point::new(-0.8, -0.8)), None);
    }

    #[test]
    fn absent_region_is_skipped() {
        let layout = StaticLayout::new(Viewport::new(100.0, 100.0))
            .with(RegionId(1), PixelRect::new(0.0, 0.0, 100.0, 100.0));
        let layers = HitLayers::new().with_layer(vec![RegionId(7), RegionId(1)]);
        let resolved = layers.resolve(&layout);
        assert_eq!(resolved.skipped, vec![RegionId(7)]);
        assert_eq!(resolved.claim(Point::ORIGIN), Some(RegionId(1)));
    }

    #[test]
    fn absent_gate_closes_everything() {
        let layout = StaticLayout::new(Viewport::new(100.0, 100.0))
            .with(RegionId(1), PixelRect::new(0.0, 0.0, 100.0, 100.0));
        let layers = HitLayers::new().with_gate(RegionId(0)).with_layer(vec![RegionId(1)]);
        let resolved = layers.resolve(&layout);
        assert_eq!(resolved.claim(Point::ORIGIN), None);
        assert_eq!(resolved.skipped, vec![RegionId(0)]);
    }
}
