//! Terrain construction and mutation errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerrainError {
    #[error("terrain boundary needs at least 3 points, got {0}")]
    DegenerateBoundary(usize),

    #[error("vertex count changed from {expected} to {actual}")]
    VertexCountMismatch { expected: usize, actual: usize },

    #[error("mesh rows must be non-empty and equal length (top {top}, bottom {bottom})")]
    MeshRowMismatch { top: usize, bottom: usize },

    #[error("mesh top row vertex {index} lies below its bottom row vertex")]
    MeshRowOrder { index: usize },

    #[error("heightfield needs a positive cell width and at least 2 columns")]
    InvalidHeightfield,

    #[error("heightfield terrain is not initialized")]
    NotInitialized,

    #[error("x={x} is outside the heightfield extent [{min}, {max}]")]
    OutOfBounds { x: f32, min: f32, max: f32 },
}
