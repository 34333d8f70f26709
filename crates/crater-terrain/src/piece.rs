//! TerrainPiece: one polygon terrain collider and its optional render mesh.

use crater_core::types::Aabb;
use serde::{Deserialize, Serialize};

use crate::boundary::TerrainBoundary;
use crate::mesh::TerrainMesh;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainPiece {
    pub boundary: TerrainBoundary,
    /// Render mesh sharing the boundary's local space.
    pub mesh: Option<TerrainMesh>,
    /// World bounds last published to the physics broadphase.
    collider_bounds: Aabb,
}

impl TerrainPiece {
    pub fn new(boundary: TerrainBoundary, mesh: Option<TerrainMesh>) -> Self {
        let collider_bounds = boundary.world_bounds();
        Self {
            boundary,
            mesh,
            collider_bounds,
        }
    }

    /// Bounds as the physics world currently sees them.
    pub fn collider_bounds(&self) -> Aabb {
        self.collider_bounds
    }

    /// Publish the boundary's current bounds to the broadphase.
    /// Returns true if they changed.
    pub fn sync_collider(&mut self) -> bool {
        let fresh = self.boundary.world_bounds();
        let changed = fresh != self.collider_bounds;
        self.collider_bounds = fresh;
        changed
    }
}
