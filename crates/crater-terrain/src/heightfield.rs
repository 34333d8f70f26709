//! Heightfield: rasterized side-view terrain as one surface height per column.

use crater_core::constants::FLOOR_SAFETY_MARGIN;
use crater_core::types::Vec2;
use serde::{Deserialize, Serialize};

use crate::crater::carved_height;
use crate::error::TerrainError;

/// Runtime terrain-data service able to carve craters into its own storage.
pub trait HeightfieldService {
    /// Carve a crater centered at `center`. Depth is the service's own policy.
    fn carve_crater_at(&mut self, center: Vec2, radius: f32) -> Result<(), TerrainError>;
}

/// Heightfield layout metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightfieldHeader {
    /// World X of column 0.
    pub origin_x: f32,
    /// Horizontal spacing between columns (world units).
    pub cell_width: f32,
    /// Lowest height carving may reach, before the safety margin.
    pub floor: f32,
}

impl HeightfieldHeader {
    /// World X of the last column, given a column count.
    pub fn max_x(&self, columns: usize) -> f32 {
        self.origin_x + (columns.saturating_sub(1)) as f32 * self.cell_width
    }
}

/// Column heightfield with interpolated height queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "HeightfieldData")]
pub struct Heightfield {
    pub header: HeightfieldHeader,
    /// Surface height of each column, west to east.
    heights: Vec<f32>,
    /// Crater depth as a fraction of the carve radius.
    depth_ratio: f32,
    /// Runtime data loaded and ready for mutation.
    initialized: bool,
}

/// Serialized form, validated through [`Heightfield::new`].
#[derive(Deserialize)]
struct HeightfieldData {
    header: HeightfieldHeader,
    heights: Vec<f32>,
    depth_ratio: f32,
    initialized: bool,
}

impl TryFrom<HeightfieldData> for Heightfield {
    type Error = TerrainError;

    fn try_from(data: HeightfieldData) -> Result<Self, Self::Error> {
        let mut field = Self::new(data.header, data.heights, data.depth_ratio)?;
        field.initialized = data.initialized;
        Ok(field)
    }
}

impl Heightfield {
    /// Create an initialized heightfield from pre-loaded column heights.
    pub fn new(
        header: HeightfieldHeader,
        heights: Vec<f32>,
        depth_ratio: f32,
    ) -> Result<Self, TerrainError> {
        if heights.len() < 2 || !header.cell_width.is_finite() || header.cell_width <= 0.0 {
            return Err(TerrainError::InvalidHeightfield);
        }
        Ok(Self {
            header,
            heights,
            depth_ratio: depth_ratio.max(0.0),
            initialized: true,
        })
    }

    /// Same as [`Heightfield::new`] but not yet accepting carves.
    pub fn pending(
        header: HeightfieldHeader,
        heights: Vec<f32>,
        depth_ratio: f32,
    ) -> Result<Self, TerrainError> {
        let mut field = Self::new(header, heights, depth_ratio)?;
        field.initialized = false;
        Ok(field)
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn depth_ratio(&self) -> f32 {
        self.depth_ratio
    }

    /// Crater depth as a fraction of the carve radius. Negative values clamp to 0.
    pub fn set_depth_ratio(&mut self, depth_ratio: f32) {
        self.depth_ratio = depth_ratio.max(0.0);
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// World X of a column.
    pub fn column_x(&self, column: usize) -> f32 {
        self.header.origin_x + column as f32 * self.header.cell_width
    }

    /// Horizontal extent covered by the columns.
    pub fn extent(&self) -> (f32, f32) {
        (self.header.origin_x, self.header.max_x(self.heights.len()))
    }

    /// Fractional column index for a world X, or None outside the extent.
    fn world_to_column(&self, x: f32) -> Option<f32> {
        let col = (x - self.header.origin_x) / self.header.cell_width;
        if col < 0.0 || col > (self.heights.len() - 1) as f32 {
            return None;
        }
        Some(col)
    }

    /// Surface height at world X with linear interpolation.
    pub fn height_at(&self, x: f32) -> Option<f32> {
        let col = self.world_to_column(x)?;
        let c0 = col.floor() as usize;
        let c1 = (c0 + 1).min(self.heights.len() - 1);
        let frac = col - c0 as f32;
        Some(self.heights[c0] * (1.0 - frac) + self.heights[c1] * frac)
    }

    /// Upward unit surface normal at world X.
    pub fn normal_at(&self, x: f32) -> Option<Vec2> {
        let col = self.world_to_column(x)?;
        let c0 = (col.floor() as usize).min(self.heights.len() - 2);
        let rise = self.heights[c0 + 1] - self.heights[c0];
        Some(Vec2::new(-rise, self.header.cell_width).normalize())
    }
}

impl HeightfieldService for Heightfield {
    fn carve_crater_at(&mut self, center: Vec2, radius: f32) -> Result<(), TerrainError> {
        if !self.initialized {
            return Err(TerrainError::NotInitialized);
        }
        let (min, max) = self.extent();
        if center.x + radius < min || center.x - radius > max {
            return Err(TerrainError::OutOfBounds {
                x: center.x,
                min,
                max,
            });
        }

        let depth = radius * self.depth_ratio;
        let floor_limit = self.header.floor + FLOOR_SAFETY_MARGIN;
        let origin_x = self.header.origin_x;
        let cell_width = self.header.cell_width;
        let mut moved = 0usize;
        for (i, h) in self.heights.iter_mut().enumerate() {
            let dx = origin_x + i as f32 * cell_width - center.x;
            if let Some(y) = carved_height(*h, dx, radius, depth, floor_limit) {
                *h = y;
                moved += 1;
            }
        }
        tracing::trace!(moved, x = center.x, radius, "heightfield crater");
        Ok(())
    }
}
