//! Cleanup system: removes entities whose grace period has run out.

use hecs::{Entity, World};

use crater_core::components::Expiring;

/// Count down `Expiring` entities and despawn those already at zero.
/// Uses a caller-owned buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, expiring) in world.query_mut::<&mut Expiring>() {
        if expiring.ticks_remaining == 0 {
            despawn_buffer.push(entity);
        } else {
            expiring.ticks_remaining -= 1;
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
