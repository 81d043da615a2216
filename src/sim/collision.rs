//! Collision primitives for swept segments and circles
//!
//! Bullets move fast relative to wall thickness, so bullet tests run against
//! the segment from an entity's previous to current position rather than its
//! point position. Touching, overlapping and collinear contacts all count as
//! hits: a grazing bullet must never slip through a wall edge.

use glam::Vec2;

/// 2-D orientation predicate: positive when `c` lies counter-clockwise of
/// the directed line `a` -> `b`, negative when clockwise, zero on the line.
#[inline]
fn orient(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// Bounding-box containment for a point known to be collinear with `a`-`b`
#[inline]
fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Whether segments `a1`-`a2` and `b1`-`b2` intersect.
///
/// Endpoint touches and collinear overlaps are intersections, not misses.
/// Zero-length segments degenerate to point-on-segment tests.
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

/// Minimum distance from point `p` to segment `a`-`b`
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
