//! Planar positions, velocities and facings
//!
//! Vector math comes from `glam`; only the segment helper the impact regions
//! need lives here.

/// A point or direction on the arena floor
pub use glam::DVec2 as Vec2;

/// Distance from `point` to the segment `a..b`, and the parameter `t` in
/// `[0, 1]` of the closest point on the segment
pub fn distance_to_segment(point: Vec2, a: Vec2, b: Vec2) -> (f64, f64) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f64::EPSILON {
        return (point.distance(a), 0.0);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (point.distance(a + ab * t), t)
}
