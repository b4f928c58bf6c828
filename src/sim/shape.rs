//! Convex shape geometry for collidable entities
//!
//! Every collidable entity is a convex polygon defined in its own local frame
//! (origin at the entity's top-left corner, nose pointing along +x) and placed
//! in the world by a translation plus a rotation about a pivot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A convex polygon in world space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Vertices in winding order
    pub points: Vec<Vec2>,
}

impl Shape {
    /// Place a local-space outline in the world.
    ///
    /// `origin` is the world position of the local origin, `pivot` is the
    /// local rotation centre and `angle_deg` the clockwise (screen-space)
    /// rotation.
    pub fn placed(local: &[Vec2], origin: Vec2, pivot: Vec2, angle_deg: f32) -> Self {
        let rad = angle_deg.to_radians();
        let (sin, cos) = rad.sin_cos();
        let points = local
            .iter()
            .map(|p| {
                let d = *p - pivot;
                let rotated = Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos);
                origin + pivot + rotated
            })
            .collect();
        Self { points }
    }

    /// Axis-aligned rectangle outline with its corner at the local origin
    pub fn rect_outline(width: f32, height: f32) -> [Vec2; 4] {
        [
            Vec2::new(0.0, 0.0),
            Vec2::new(width, 0.0),
            Vec2::new(width, height),
            Vec2::new(0.0, height),
        ]
    }

    /// Bounding box as (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in &self.points {
            min = min.min(*p);
            max = max.max(*p);
        }
        (min, max)
    }

    /// True when the two polygons share a region of positive area.
    ///
    /// Separating axis test over the edge normals of both polygons; shapes
    /// that only touch along an edge do not count as overlapping.
    pub fn intersects(&self, other: &Shape) -> bool {
        if self.points.len() < 3 || other.points.len() < 3 {
            return false;
        }

        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = other.bounds();
        if a_max.x <= b_min.x || b_max.x <= a_min.x || a_max.y <= b_min.y || b_max.y <= a_min.y {
            return false;
        }

        !has_separating_axis(&self.points, &other.points)
            && !has_separating_axis(&other.points, &self.points)
    }
}

/// Check the edge normals of `edges_of` for an axis that separates the sets
fn has_separating_axis(edges_of: &[Vec2], other: &[Vec2]) -> bool {
    let n = edges_of.len();
    for i in 0..n {
        let edge = edges_of[(i + 1) % n] - edges_of[i];
        let axis = edge.perp();
        if axis.length_squared() < 1e-12 {
            continue; // Degenerate edge
        }
        let (a_lo, a_hi) = project(edges_of, axis);
        let (b_lo, b_hi) = project(other, axis);
        if a_hi <= b_lo || b_hi <= a_lo {
            return true;
        }
    }
    false
}

fn project(points: &[Vec2], axis: Vec2) -> (f32, f32) {
    points
        .iter()
        .map(|p| p.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}
