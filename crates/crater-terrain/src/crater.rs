//! Parabolic crater profile and polygon/mesh vertex displacement.
//!
//! A crater of radius `r` and depth `d` centered at local `cx` lowers a
//! surface vertex at `x` by `d * (1 - t²)` with `t = (x - cx) / r`,
//! never below `floor + FLOOR_SAFETY_MARGIN`.

use crater_core::constants::FLOOR_SAFETY_MARGIN;
use crater_core::types::Vec2;

use crate::piece::TerrainPiece;

/// Vertices moved by one carve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CraterStats {
    pub boundary_vertices: usize,
    pub mesh_vertices: usize,
}

impl CraterStats {
    pub fn changed(&self) -> bool {
        self.boundary_vertices > 0
    }
}

/// Depth of the parabolic profile at horizontal offset `dx` (signed).
pub fn parabolic_depression(dx: f32, radius: f32, depth: f32) -> f32 {
    if radius <= 0.0 || depth <= 0.0 {
        return 0.0;
    }
    let t = (dx / radius).clamp(-1.0, 1.0);
    depth * (1.0 - t * t)
}

/// New height for a surface vertex, or `None` if it should not move.
///
/// Vertices farther than `radius` horizontally are untouched, and the
/// result is only returned when strictly lower than `old_y`.
pub fn carved_height(
    old_y: f32,
    dx: f32,
    radius: f32,
    depth: f32,
    floor_limit: f32,
) -> Option<f32> {
    if dx.abs() > radius {
        return None;
    }
    let new_y = (old_y - parabolic_depression(dx, radius, depth)).max(floor_limit);
    (new_y < old_y).then_some(new_y)
}

/// Carve a crater into a polygon piece and its mesh.
///
/// `center` is in world space. The boundary is only rewritten when at
/// least one top-surface vertex moves; the mesh follows with the same
/// profile and has its bounds marked stale.
pub fn carve_piece(piece: &mut TerrainPiece, center: Vec2, radius: f32, depth: f32) -> CraterStats {
    let local_center = piece.boundary.to_local(center);
    let floor_limit = piece.boundary.floor_reference() + FLOOR_SAFETY_MARGIN;
    let top_len = piece.boundary.top_surface_len();

    let mut points = piece.boundary.points().to_vec();
    let mut stats = CraterStats::default();
    for p in points.iter_mut().take(top_len) {
        if let Some(y) = carved_height(p.y, p.x - local_center.x, radius, depth, floor_limit) {
            p.y = y;
            stats.boundary_vertices += 1;
        }
    }

    if !stats.changed() {
        return stats;
    }
    if piece.boundary.replace_points(points).is_err() {
        // Vertex count is preserved above; nothing was written.
        return CraterStats::default();
    }

    if let Some(mesh) = piece.mesh.as_mut() {
        for v in mesh.top_row_mut() {
            if let Some(y) = carved_height(v.y, v.x - local_center.x, radius, depth, floor_limit) {
                v.y = y;
                stats.mesh_vertices += 1;
            }
        }
        mesh.mark_bounds_stale();
    }

    stats
}
