//! Segment geometry for rope crossing detection
//!
//! Crossing is decided with the classic orientation test: two segments cross
//! when each one's endpoints lie on opposite sides of the other. Collinear
//! configurations fall back to a bounding-box containment check, so touching
//! and overlapping segments count as intersecting.
//!
//! Ropes attached to the same node always "touch" there, which the raw test
//! reports as an intersection. `near_shared_node` suppresses those cases.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Turn direction of an ordered point triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Classify the triple (p1, p2, p3)
#[inline]
pub fn orientation(p1: Vec2, p2: Vec2, p3: Vec2) -> Orientation {
    let val = (p2.y - p1.y) * (p3.x - p2.x) - (p2.x - p1.x) * (p3.y - p2.y);
    if val == 0.0 {
        Orientation::Collinear
    } else if val > 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::CounterClockwise
    }
}

/// Check whether `q` lies within the bounding box of segment `p`-`r`
///
/// Only meaningful when the three points are already known to be collinear.
#[inline]
pub fn on_segment(p: Vec2, q: Vec2, r: Vec2) -> bool {
    q.x <= p.x.max(r.x) && q.x >= p.x.min(r.x) && q.y <= p.y.max(r.y) && q.y >= p.y.min(r.y)
}

/// Raw segment intersection test for `a`-`b` against `c`-`d`
///
/// Touching endpoints and collinear overlap report `true`.
pub fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(a, c, b))
        || (o2 == Orientation::Collinear && on_segment(a, d, b))
        || (o3 == Orientation::Collinear && on_segment(c, a, d))
        || (o4 == Orientation::Collinear && on_segment(c, b, d))
}

/// True when any endpoint of the first segment is within `radius` of any
/// endpoint of the second
pub fn near_shared_node(start1: Vec2, end1: Vec2, start2: Vec2, end2: Vec2, radius: f32) -> bool {
    start1.distance(start2) < radius
        || start1.distance(end2) < radius
        || end1.distance(start2) < radius
        || end1.distance(end2) < radius
}

/// A rope's resolved geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Direction angle in degrees, measured from +x
    pub fn angle_degrees(&self) -> f32 {
        let d = self.end - self.start;
        d.y.atan2(d.x).to_degrees()
    }

    /// Raw intersection, including touching
    pub fn intersects(&self, other: &Segment) -> bool {
        segments_intersect(self.start, self.end, other.start, other.end)
    }

    /// Intersection as used for coloring: crossings near a shared node are ignored
    pub fn crosses(&self, other: &Segment, near_node_radius: f32) -> bool {
        self.intersects(other)
            && !near_shared_node(self.start, self.end, other.start, other.end, near_node_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seg(x1: f32, y1: f32, x2: f32, y2: f32) -> Segment {
        Segment::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
    }

    #[test]
    fn test_orientation_classes() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(1.0, 0.0);
        assert_eq!(orientation(a, b, Vec2::new(2.0, 0.0)), Orientation::Collinear);

        let left = orientation(a, b, Vec2::new(0.5, 1.0));
        let right = orientation(a, b, Vec2::new(0.5, -1.0));
        assert_ne!(left, Orientation::Collinear);
        assert_ne!(right, Orientation::Collinear);
        assert_ne!(left, right);

        // Reversing the triple flips the turn
        assert_eq!(orientation(b, a, Vec2::new(0.5, 1.0)), right);
    }

    #[test]
    fn test_simple_cross() {
        assert!(seg(0.0, 0.0, 10.0, 0.0).intersects(&seg(5.0, -5.0, 5.0, 5.0)));
    }

    #[test]
    fn test_disjoint() {
        assert!(!seg(0.0, 0.0, 10.0, 0.0).intersects(&seg(20.0, -5.0, 20.0, 5.0)));
        // Parallel, offset
        assert!(!seg(0.0, 0.0, 10.0, 0.0).intersects(&seg(0.0, 1.0, 10.0, 1.0)));
        // Collinear but separated
        assert!(!seg(0.0, 0.0, 1.0, 0.0).intersects(&seg(2.0, 0.0, 3.0, 0.0)));
    }

    #[test]
    fn test_collinear_overlap() {
        assert!(seg(0.0, 0.0, 4.0, 0.0).intersects(&seg(2.0, 0.0, 6.0, 0.0)));
    }

    #[test]
    fn test_t_junction_touches() {
        // Endpoint of the second lies on the interior of the first
        assert!(seg(0.0, 0.0, 10.0, 0.0).intersects(&seg(5.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_shared_endpoint_excluded() {
        let a = seg(0.0, 0.0, 1.0, 0.0);
        let b = seg(1.0, 0.0, 2.0, 0.0);
        assert!(a.intersects(&b));
        assert!(!a.crosses(&b, 0.5));
    }

    #[test]
    fn test_crossing_far_from_endpoints_kept() {
        let a = seg(0.0, 0.0, 10.0, 0.0);
        let b = seg(5.0, -5.0, 5.0, 5.0);
        assert!(a.crosses(&b, 0.5));
    }

    #[test]
    fn test_near_shared_node_is_strict() {
        let a = Vec2::ZERO;
        let far = Vec2::new(100.0, 100.0);
        assert!(!near_shared_node(a, far, Vec2::new(0.5, 0.0), -far, 0.5));
        assert!(near_shared_node(a, far, Vec2::new(0.49, 0.0), -far, 0.5));
        // Each of the four endpoint pairs is considered
        assert!(near_shared_node(a, far, -far, Vec2::new(100.0, 100.2), 0.5));
    }

    #[test]
    fn test_segment_angle_and_length() {
        let s = seg(0.0, 0.0, 0.0, 2.0);
        assert!((s.length() - 2.0).abs() < 1e-6);
        assert!((s.angle_degrees() - 90.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_interior_cross_is_symmetric(
            cx in -50.0f32..50.0,
            cy in -50.0f32..50.0,
            half in 1.0f32..20.0,
        ) {
            // An axis-aligned plus sign centered at (cx, cy)
            let h = seg(cx - half, cy, cx + half, cy);
            let v = seg(cx, cy - half, cx, cy + half);
            let h_rev = seg(cx + half, cy, cx - half, cy);

            prop_assert!(h.intersects(&v));
            prop_assert!(v.intersects(&h));
            prop_assert!(h_rev.intersects(&v));
            prop_assert!(v.intersects(&h_rev));
        }

        #[test]
        fn prop_separated_boxes_never_intersect(
            ax in -50.0f32..0.0, ay in -50.0f32..50.0,
            bx in -50.0f32..0.0, by in -50.0f32..50.0,
            cx in 1.0f32..50.0, cy in -50.0f32..50.0,
            dx in 1.0f32..50.0, dy in -50.0f32..50.0,
        ) {
            // First segment lives left of x=0, second right of x=1
            let a = seg(ax, ay, bx, by);
            let b = seg(cx, cy, dx, dy);
            prop_assert!(!a.intersects(&b));
            prop_assert!(!b.intersects(&a));
        }
    }
}
