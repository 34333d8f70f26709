//! Projectile lifecycle system.
//!
//! Bridges the pure FSM in `crater_projectile::fsm` to the ECS: feeds it
//! terrain contacts and timers, applies spin while flying and resting
//! physics once landed, and reports which projectiles fire or leave.

use std::collections::HashSet;

use hecs::Entity;

use crater_core::components::{Body, Projectile, Transform};
use crater_core::config::GrenadeTuning;
use crater_core::enums::{ProjectilePhase, Termination};
use crater_core::events::MatchEvent;
use crater_core::types::{LayerMask, Vec2};
use crater_projectile::fsm::{self, ProjectileContext};
use crater_projectile::resting::{resting_step, RestingParams};

use crate::arena::{entity_key, Arena};
use crate::ports::SpatialQuery;
use crate::systems::contacts::TerrainContact;

/// What the engine must do after the lifecycle pass.
#[derive(Debug, Default)]
pub struct LifecycleOutcome {
    /// Fuse ran out; detonate at the current position.
    pub detonate: Vec<Entity>,
    /// Duds and forced removals, despawned without effects.
    pub remove: Vec<Entity>,
}

/// Run the lifecycle for every projectile.
pub fn run(
    arena: &mut Arena,
    tuning: &GrenadeTuning,
    gravity: Vec2,
    dt: f32,
    contacts: &[TerrainContact],
    forced: &HashSet<Entity>,
    events: &mut Vec<MatchEvent>,
) -> LifecycleOutcome {
    let mut outcome = LifecycleOutcome::default();
    let mut landed = Vec::new();

    for (entity, (projectile, transform, body)) in arena
        .world_mut()
        .query_mut::<(&mut Projectile, &mut Transform, &Body)>()
    {
        let ctx = ProjectileContext {
            phase: projectile.phase,
            flight_secs: projectile.flight_secs,
            fuse_secs: projectile.fuse_secs,
            terrain_contact: contacts.iter().find(|c| c.entity == entity).map(|c| c.point),
            forced_removal: forced.contains(&entity),
        };
        let update = fsm::evaluate(&ctx, tuning, dt);

        projectile.phase = update.new_phase;
        projectile.flight_secs = update.flight_secs;
        projectile.fuse_secs = update.fuse_secs;

        if let Some(point) = update.landing_point {
            projectile.landing_point = Some(point);
            tracing::debug!(entity = ?entity, x = point.x, y = point.y, "projectile landed");
            events.push(MatchEvent::ProjectileLanded {
                entity: entity_key(entity),
                point,
            });
        }

        if let Some(termination) = update.termination {
            projectile.termination = Some(termination);
            tracing::debug!(entity = ?entity, ?termination, "projectile finished");
            events.push(MatchEvent::ProjectileFinished {
                entity: entity_key(entity),
                termination,
            });
            match termination {
                Termination::Detonated => outcome.detonate.push(entity),
                Termination::TimedOut | Termination::ForcedRemoval => outcome.remove.push(entity),
            }
            continue;
        }

        match projectile.phase {
            // Spin is only driven directly while airborne; physics owns
            // orientation after landing.
            ProjectilePhase::Flying => transform.rotation += projectile.spin * dt,
            ProjectilePhase::Landed => {
                landed.push((entity, transform.position, body.velocity, body.mass))
            }
            ProjectilePhase::Exploded => {}
        }
    }

    for (entity, position, velocity, mass) in landed {
        let Some(ground) = arena
            .raycast_all(position, -Vec2::Y, tuning.probe_distance, LayerMask::ALL)
            .into_iter()
            .find(|hit| hit.collider.is_terrain)
        else {
            continue;
        };
        // Counter force must match the mass movement divides by.
        let params = RestingParams {
            gravity,
            mass,
            max_walkable_slope_deg: tuning.max_walkable_slope_deg,
            damping: tuning.rest_damping,
            dt,
            speed_epsilon: tuning.rest_speed_epsilon,
        };
        let Some(step) = resting_step(velocity, ground.normal, &params) else {
            continue;
        };
        if let Ok(mut body) = arena.world().get::<&mut Body>(entity) {
            body.velocity = step.velocity;
            body.pending_force += step.counter_force;
        }
    }

    outcome
}
