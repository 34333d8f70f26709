use crater_core::constants::{SURFACE_CONTACT_TOLERANCE, SURFACE_SNAP_SEARCH_FACTOR};
use crater_core::enums::CarveOutcome;
use crater_core::types::{LayerMask, Vec2};
use crater_terrain::carve_piece;

use super::{CarveError, CarveRequest, CarveStrategy, TerrainServices};
use crate::ports::TerrainWorld;

/// Carves polygon terrain pieces and their render meshes.
#[derive(Debug)]
pub struct PolygonStrategy {
    /// Nearest-surface search radius as a multiple of the crater radius.
    pub snap_search_factor: f32,
    /// Points closer than this to a surface are not moved.
    pub contact_tolerance: f32,
}

impl Default for PolygonStrategy {
    fn default() -> Self {
        Self {
            snap_search_factor: SURFACE_SNAP_SEARCH_FACTOR,
            contact_tolerance: SURFACE_CONTACT_TOLERANCE,
        }
    }
}

impl PolygonStrategy {
    /// Move `point` onto the nearest terrain surface within the search
    /// radius, unless it is already in contact.
    pub fn snap_to_surface(&self, world: &dyn TerrainWorld, point: Vec2, radius: f32) -> Vec2 {
        let search = radius * self.snap_search_factor;
        let nearest = world
            .overlap_circle(point, search, LayerMask::ALL)
            .iter()
            .filter(|c| c.is_terrain)
            .map(|c| world.closest_point(c, point))
            .min_by(|a, b| a.distance_squared(point).total_cmp(&b.distance_squared(point)));

        match nearest {
            Some(surface) if surface.distance(point) > self.contact_tolerance => surface,
            _ => point,
        }
    }
}

impl CarveStrategy for PolygonStrategy {
    fn name(&self) -> &'static str {
        "polygon"
    }

    fn carve(
        &mut self,
        terrain: &mut TerrainServices<'_>,
        request: &CarveRequest,
    ) -> Result<CarveOutcome, CarveError> {
        let world = &mut *terrain.world;
        let center = self.snap_to_surface(world, request.center, request.radius);

        let pieces: Vec<_> = world
            .overlap_circle(center, request.radius, LayerMask::ALL)
            .into_iter()
            .filter(|c| c.is_terrain)
            .map(|c| c.entity)
            .collect();

        let mut changed = false;
        for entity in pieces {
            let Some(piece) = world.terrain_piece_mut(entity) else {
                continue;
            };
            let stats = carve_piece(piece, center, request.radius, request.depth);
            tracing::trace!(
                entity = entity.0,
                boundary = stats.boundary_vertices,
                mesh = stats.mesh_vertices,
                "carved terrain piece"
            );
            changed |= stats.changed();
        }

        if !changed {
            return Ok(CarveOutcome::NotApplicable);
        }
        world.sync_transforms();
        Ok(CarveOutcome::Applied)
    }
}
