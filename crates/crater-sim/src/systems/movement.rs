//! Rigid body integration.
//!
//! velocity += (gravity * gravity_scale + force / mass) * dt, then
//! position += velocity * dt. Accumulated forces are cleared.

use hecs::World;

use crater_core::components::{Body, Transform};
use crater_core::types::Vec2;

/// Integrate every entity with a Transform and Body.
pub fn run(world: &mut World, gravity: Vec2, dt: f32) {
    for (_entity, (transform, body)) in world.query_mut::<(&mut Transform, &mut Body)>() {
        let mut acceleration = gravity * body.gravity_scale;
        if body.mass > 0.0 {
            acceleration += body.pending_force / body.mass;
        }
        body.velocity += acceleration * dt;
        transform.position += body.velocity * dt;
        body.pending_force = Vec2::ZERO;
    }
}
