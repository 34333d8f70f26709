//! TerrainBoundary: closed polygon outline of one terrain piece.
//!
//! Points are stored in local space relative to `origin`. The last two
//! points form the flat floor edge; every other point is part of the
//! carvable top surface.

use crater_core::types::{Aabb, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// A ray intersection with a boundary edge, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryHit {
    pub distance: f32,
    pub point: Vec2,
    /// Unit edge normal facing back toward the ray origin.
    pub normal: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundaryData")]
pub struct TerrainBoundary {
    origin: Vec2,
    points: Vec<Vec2>,
}

/// Serialized form, validated through [`TerrainBoundary::new`].
#[derive(Deserialize)]
struct BoundaryData {
    origin: Vec2,
    points: Vec<Vec2>,
}

impl TryFrom<BoundaryData> for TerrainBoundary {
    type Error = TerrainError;

    fn try_from(data: BoundaryData) -> Result<Self, Self::Error> {
        Self::new(data.origin, data.points)
    }
}

impl TerrainBoundary {
    /// Create a boundary from local-space points.
    pub fn new(origin: Vec2, points: Vec<Vec2>) -> Result<Self, TerrainError> {
        if points.len() < 3 {
            return Err(TerrainError::DegenerateBoundary(points.len()));
        }
        Ok(Self { origin, points })
    }

    /// World position of the local-space origin.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Local-space points.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Replace every point at once. The vertex count must not change.
    pub fn replace_points(&mut self, points: Vec<Vec2>) -> Result<(), TerrainError> {
        if points.len() != self.points.len() {
            return Err(TerrainError::VertexCountMismatch {
                expected: self.points.len(),
                actual: points.len(),
            });
        }
        self.points = points;
        Ok(())
    }

    /// Number of leading points that belong to the carvable top surface.
    pub fn top_surface_len(&self) -> usize {
        self.points.len() - 2
    }

    /// Lowest Y of the floor edge (local space). Carving never goes below it.
    pub fn floor_reference(&self) -> f32 {
        let n = self.points.len();
        self.points[n - 2].y.min(self.points[n - 1].y)
    }

    pub fn to_local(&self, world: Vec2) -> Vec2 {
        world - self.origin
    }

    pub fn to_world(&self, local: Vec2) -> Vec2 {
        local + self.origin
    }

    /// Local-space bounds of the outline.
    pub fn local_bounds(&self) -> Aabb {
        Aabb::from_points(self.points.iter().copied())
            .unwrap_or_else(|| Aabb::new(Vec2::ZERO, Vec2::ZERO))
    }

    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds().translated(self.origin)
    }

    /// Closed-loop edges in local space.
    fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Even-odd point-in-polygon test (world space).
    pub fn contains(&self, world: Vec2) -> bool {
        let p = self.to_local(world);
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Nearest point on the outline to `world` (world space).
    pub fn closest_point(&self, world: Vec2) -> Vec2 {
        let p = self.to_local(world);
        let mut best = self.points[0];
        let mut best_dist_sq = f32::INFINITY;
        for (a, b) in self.edges() {
            let candidate = closest_on_segment(a, b, p);
            let d = candidate.distance_squared(p);
            if d < best_dist_sq {
                best_dist_sq = d;
                best = candidate;
            }
        }
        self.to_world(best)
    }

    /// Whether a circle touches the outline or lies inside it.
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        if self.contains(center) {
            return true;
        }
        self.closest_point(center).distance_squared(center) <= radius * radius
    }

    /// First edge crossed by a ray, if within `max_distance`.
    pub fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<BoundaryHit> {
        let dir = direction.try_normalize()?;
        let o = self.to_local(origin);
        let mut best: Option<BoundaryHit> = None;

        for (a, b) in self.edges() {
            let edge = b - a;
            let denom = dir.perp_dot(edge);
            if denom.abs() < f32::EPSILON {
                continue;
            }
            let ao = a - o;
            let t = ao.perp_dot(edge) / denom;
            let u = ao.perp_dot(dir) / denom;
            if t < 0.0 || t > max_distance || !(0.0..=1.0).contains(&u) {
                continue;
            }
            if best.is_some_and(|hit| hit.distance <= t) {
                continue;
            }
            let mut normal = edge.perp().normalize_or_zero();
            if normal.dot(dir) > 0.0 {
                normal = -normal;
            }
            best = Some(BoundaryHit {
                distance: t,
                point: self.to_world(o + dir * t),
                normal,
            });
        }
        best
    }
}

/// Closest point to `p` on segment from `a` to `b`.
pub fn closest_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}
