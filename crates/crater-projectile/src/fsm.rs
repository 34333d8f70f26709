//! Projectile lifecycle finite state machine.
//!
//! Pure functions that compute phase transitions and timers for a thrown
//! explosive. Operates on plain data with no ECS dependency.
//!
//! Flying → Landed → Exploded. A projectile that never lands is removed
//! as a dud after its max flight time; forced removal ends it from any
//! phase without side effects.

use crater_core::config::GrenadeTuning;
use crater_core::enums::{ProjectilePhase, Termination};
use crater_core::types::Vec2;

/// Input to the FSM for a single projectile.
#[derive(Debug, Clone, Copy)]
pub struct ProjectileContext {
    pub phase: ProjectilePhase,
    pub flight_secs: f32,
    pub fuse_secs: f32,
    /// First terrain contact point reported this tick. Non-terrain
    /// contacts must not be passed in.
    pub terrain_contact: Option<Vec2>,
    pub forced_removal: bool,
}

/// Output from the FSM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileUpdate {
    pub new_phase: ProjectilePhase,
    pub phase_changed: bool,
    pub flight_secs: f32,
    pub fuse_secs: f32,
    /// Set on the tick the projectile lands.
    pub landing_point: Option<Vec2>,
    /// Set on the tick the projectile reaches `Exploded`.
    pub termination: Option<Termination>,
}

impl ProjectileUpdate {
    /// Whether this update fires the explosion.
    pub fn detonates(&self) -> bool {
        self.termination == Some(Termination::Detonated)
    }
}

/// Evaluate the FSM for one projectile over a tick of `dt` seconds.
pub fn evaluate(ctx: &ProjectileContext, tuning: &GrenadeTuning, dt: f32) -> ProjectileUpdate {
    let no_change = ProjectileUpdate {
        new_phase: ctx.phase,
        phase_changed: false,
        flight_secs: ctx.flight_secs,
        fuse_secs: ctx.fuse_secs,
        landing_point: None,
        termination: None,
    };

    match ctx.phase {
        // Terminal state
        ProjectilePhase::Exploded => no_change,
        _ if ctx.forced_removal => terminate(no_change, Termination::ForcedRemoval),
        ProjectilePhase::Flying => evaluate_flying(ctx, tuning, dt, no_change),
        ProjectilePhase::Landed => evaluate_landed(ctx, tuning, dt, no_change),
    }
}

fn evaluate_flying(
    ctx: &ProjectileContext,
    tuning: &GrenadeTuning,
    dt: f32,
    no_change: ProjectileUpdate,
) -> ProjectileUpdate {
    let flight_secs = ctx.flight_secs + dt;

    // Landing wins over a timeout on the same tick.
    if let Some(point) = ctx.terrain_contact {
        return ProjectileUpdate {
            new_phase: ProjectilePhase::Landed,
            phase_changed: true,
            flight_secs,
            fuse_secs: 0.0,
            landing_point: Some(point),
            termination: None,
        };
    }

    if flight_secs >= tuning.max_flight_secs {
        return terminate(
            ProjectileUpdate {
                flight_secs,
                ..no_change
            },
            Termination::TimedOut,
        );
    }

    ProjectileUpdate {
        flight_secs,
        ..no_change
    }
}

fn evaluate_landed(
    ctx: &ProjectileContext,
    tuning: &GrenadeTuning,
    dt: f32,
    no_change: ProjectileUpdate,
) -> ProjectileUpdate {
    let fuse_secs = ctx.fuse_secs + dt;
    let update = ProjectileUpdate {
        fuse_secs,
        ..no_change
    };

    if fuse_secs >= tuning.fuse_secs {
        return terminate(update, Termination::Detonated);
    }
    update
}

fn terminate(update: ProjectileUpdate, termination: Termination) -> ProjectileUpdate {
    ProjectileUpdate {
        new_phase: ProjectilePhase::Exploded,
        phase_changed: true,
        termination: Some(termination),
        ..update
    }
}
