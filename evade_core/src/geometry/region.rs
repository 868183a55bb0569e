//! ImpactRegion - The area a hostile effect will hit

use super::vector::{distance_to_segment, Vec2};
use serde::{Deserialize, Serialize};

/// Area covered by an effect between now and its impact
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ImpactRegion {
    /// Swept line: a segment with a width (skillshots, projectiles)
    Line { start: Vec2, end: Vec2, width: f64 },
    /// Static or caster-centered circle
    Circle { center: Vec2, radius: f64 },
}

impl ImpactRegion {
    /// Signed gap between `point` and the region's edge.
    ///
    /// Negative values are inside the region.
    pub fn gap_to_edge(&self, point: Vec2) -> f64 {
        match *self {
            ImpactRegion::Line { start, end, width } => {
                let (dist, _) = distance_to_segment(point, start, end);
                dist - width / 2.0
            }
            ImpactRegion::Circle { center, radius } => point.distance(center) - radius,
        }
    }

    /// Whether a body of `body_radius` centered on `point` overlaps the region
    pub fn overlaps(&self, point: Vec2, body_radius: f64) -> bool {
        self.gap_to_edge(point) <= body_radius
    }

    /// Nearest position from which a body of `body_radius` clears the region
    /// by `margin`
    pub fn escape_point(&self, from: Vec2, body_radius: f64, margin: f64) -> Vec2 {
        match *self {
            ImpactRegion::Line { start, end, width } => {
                let (_, t) = distance_to_segment(from, start, end);
                let axis = end - start;
                let closest = start + axis * t;
                let away = (from - closest)
                    .try_normalize()
                    .or_else(|| axis.perp().try_normalize())
                    .unwrap_or(Vec2::X);
                closest + away * (width / 2.0 + body_radius + margin)
            }
            ImpactRegion::Circle { center, radius } => {
                let away = (from - center).try_normalize().unwrap_or(Vec2::X);
                center + away * (radius + body_radius + margin)
            }
        }
    }
}
