//! Terrain crater carving with ordered fallback strategies.
//!
//! Strategies run in order until one reports `Applied`. A failing
//! strategy is skipped with a warning logged once per carver, so a match
//! without a heightfield does not warn on every explosion.

mod heightfield;
mod polygon;

use std::collections::HashSet;

use crater_core::enums::CarveOutcome;
use crater_core::types::Vec2;
use crater_terrain::{HeightfieldService, TerrainError};
use thiserror::Error;

use crate::ports::TerrainWorld;

pub use heightfield::HeightfieldStrategy;
pub use polygon::PolygonStrategy;

/// Crater to carve, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarveRequest {
    pub center: Vec2,
    pub radius: f32,
    pub depth: f32,
}

#[derive(Debug, Error)]
pub enum CarveError {
    #[error("heightfield service unavailable")]
    ServiceUnavailable,
    #[error(transparent)]
    Terrain(#[from] TerrainError),
}

/// Terrain handles a strategy may use for one carve.
pub struct TerrainServices<'a> {
    pub world: &'a mut dyn TerrainWorld,
    pub heightfield: Option<&'a mut dyn HeightfieldService>,
}

pub trait CarveStrategy {
    /// Stable name used for the warned-once bookkeeping.
    fn name(&self) -> &'static str;

    fn carve(
        &mut self,
        terrain: &mut TerrainServices<'_>,
        request: &CarveRequest,
    ) -> Result<CarveOutcome, CarveError>;
}

/// Carves craters by trying each strategy in order.
pub struct TerrainCraterCarver {
    strategies: Vec<Box<dyn CarveStrategy>>,
    warned: HashSet<&'static str>,
}

impl Default for TerrainCraterCarver {
    /// Heightfield first, polygon terrain as fallback.
    fn default() -> Self {
        Self::new(vec![
            Box::new(HeightfieldStrategy),
            Box::new(PolygonStrategy::default()),
        ])
    }
}

impl TerrainCraterCarver {
    pub fn new(strategies: Vec<Box<dyn CarveStrategy>>) -> Self {
        Self {
            strategies,
            warned: HashSet::new(),
        }
    }

    /// Carve one crater. Never fails: errors fall through to the next
    /// strategy, and running out of strategies is `NotApplicable`.
    pub fn carve(
        &mut self,
        terrain: &mut TerrainServices<'_>,
        request: &CarveRequest,
    ) -> CarveOutcome {
        if request.radius <= 0.0 || request.depth <= 0.0 {
            return CarveOutcome::NotApplicable;
        }

        for strategy in self.strategies.iter_mut() {
            match strategy.carve(terrain, request) {
                Ok(CarveOutcome::Applied) => return CarveOutcome::Applied,
                Ok(CarveOutcome::NotApplicable) => {}
                Err(err) => {
                    if self.warned.insert(strategy.name()) {
                        tracing::warn!(
                            strategy = strategy.name(),
                            error = %err,
                            "crater strategy failed, falling back"
                        );
                    }
                }
            }
        }
        CarveOutcome::NotApplicable
    }

    /// Whether `strategy` has already logged its failure warning.
    pub fn has_warned(&self, strategy: &str) -> bool {
        self.warned.contains(strategy)
    }

    /// Forget warnings, e.g. when a new session starts.
    pub fn reset_warnings(&mut self) {
        self.warned.clear();
    }
}
