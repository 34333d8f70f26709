//! Terrain system for the crater simulation.
//!
//! Polygon terrain outlines with their render meshes, column
//! heightfields, and the parabolic crater profile shared by both.

pub use crater_core as core;

pub mod boundary;
pub mod crater;
pub mod error;
pub mod heightfield;
pub mod mesh;
pub mod piece;

// Re-export key types for convenience.
pub use boundary::TerrainBoundary;
pub use crater::{carve_piece, CraterStats};
pub use error::TerrainError;
pub use heightfield::{Heightfield, HeightfieldHeader, HeightfieldService};
pub use mesh::TerrainMesh;
pub use piece::TerrainPiece;
