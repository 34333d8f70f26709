//! Simulation layer for the crater combat game.
//!
//! Resolves explosions against a world reached through ports, carves
//! craters with ordered fallback strategies, and runs the hecs-backed
//! reference arena at a fixed tick rate.

pub mod arena;
pub mod carving;
pub mod engine;
pub mod ports;
pub mod resolver;
pub mod systems;
pub mod trigger;
pub mod world_setup;

pub use crater_core as core;
pub use engine::MatchEngine;

#[cfg(test)]
mod tests;
