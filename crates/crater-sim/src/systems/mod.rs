//! ECS systems that operate on the arena each tick.
//!
//! Systems are plain functions over the hecs world (or the arena when they
//! need spatial queries). They do not own state; all state lives in
//! components.

pub mod cleanup;
pub mod contacts;
pub mod movement;
pub mod projectile;
