//! TerrainMesh: render strip that follows a terrain boundary.
//!
//! Vertices are laid out top row first, then bottom row, one column per
//! pair. Carving displaces only the top row, so the layout is checked when
//! the mesh is built rather than assumed when it is carved.

use crater_core::types::{Aabb, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MeshData")]
pub struct TerrainMesh {
    /// Local-space vertices: `[top_0..top_n, bottom_0..bottom_n]`.
    vertices: Vec<Vec2>,
    columns: usize,
    bounds: Aabb,
    bounds_stale: bool,
}

/// Serialized form. Bounds are recomputed, so only the vertices are read.
#[derive(Deserialize)]
struct MeshData {
    vertices: Vec<Vec2>,
    columns: usize,
}

impl TryFrom<MeshData> for TerrainMesh {
    type Error = TerrainError;

    fn try_from(data: MeshData) -> Result<Self, Self::Error> {
        let MeshData {
            mut vertices,
            columns,
        } = data;
        if columns.checked_mul(2) != Some(vertices.len()) {
            return Err(TerrainError::MeshRowMismatch {
                top: columns,
                bottom: vertices.len().saturating_sub(columns),
            });
        }
        let bottom = vertices.split_off(columns);
        Self::from_rows(vertices, bottom)
    }
}

impl TerrainMesh {
    /// Build a strip from matching top and bottom rows.
    ///
    /// Rejects rows of different length, empty rows, and any column whose
    /// top vertex sits below its bottom vertex.
    pub fn from_rows(top: Vec<Vec2>, bottom: Vec<Vec2>) -> Result<Self, TerrainError> {
        if top.is_empty() || top.len() != bottom.len() {
            return Err(TerrainError::MeshRowMismatch {
                top: top.len(),
                bottom: bottom.len(),
            });
        }
        if let Some(index) = top.iter().zip(&bottom).position(|(t, b)| t.y < b.y) {
            return Err(TerrainError::MeshRowOrder { index });
        }

        let columns = top.len();
        let mut vertices = top;
        vertices.extend(bottom);
        let bounds = compute_bounds(&vertices);
        Ok(Self {
            vertices,
            columns,
            bounds,
            bounds_stale: false,
        })
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn top_row(&self) -> &[Vec2] {
        &self.vertices[..self.columns]
    }

    pub fn top_row_mut(&mut self) -> &mut [Vec2] {
        &mut self.vertices[..self.columns]
    }

    pub fn bottom_row(&self) -> &[Vec2] {
        &self.vertices[self.columns..]
    }

    /// Flag the cached bounds for recomputation after vertices moved.
    pub fn mark_bounds_stale(&mut self) {
        self.bounds_stale = true;
    }

    pub fn bounds_stale(&self) -> bool {
        self.bounds_stale
    }

    /// Current bounds, recomputed if stale.
    pub fn bounds(&mut self) -> Aabb {
        if self.bounds_stale {
            self.bounds = compute_bounds(&self.vertices);
            self.bounds_stale = false;
        }
        self.bounds
    }
}

fn compute_bounds(vertices: &[Vec2]) -> Aabb {
    Aabb::from_points(vertices.iter().copied()).unwrap_or_else(|| Aabb::new(Vec2::ZERO, Vec2::ZERO))
}
