//! Projectile lifecycle for the crater simulation.
//!
//! Implements the thrown-explosive state machine, slope-aware resting
//! physics, and per-kind explosive profiles.

pub mod fsm;
pub mod profiles;
pub mod resting;

pub use crater_core as core;
