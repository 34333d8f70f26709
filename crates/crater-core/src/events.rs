//! Events emitted by the simulation for presentation and game-flow layers.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EntityKey, Vec2};

/// One entity affected by a blast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitReport {
    pub entity: EntityKey,
    /// Normalized distance from the blast center, in [0, 1].
    pub falloff_t: f32,
    /// Damage dealt, 0 if the entity has no health or damage was disabled.
    pub damage: u32,
    /// Impulse applied, zero if the entity has no body or knockback was disabled.
    pub impulse: Vec2,
}

/// Request for the presentation layer to show an explosion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxEvent {
    pub kind: ExplosiveKind,
    pub point: Vec2,
    pub diameter: f32,
    pub layer: SortingLayer,
    /// False when the basic fallback effect was spawned instead of a prefab.
    pub prefab: bool,
}

/// Simulation events produced during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchEvent {
    /// A grenade touched terrain for the first time.
    ProjectileLanded { entity: EntityKey, point: Vec2 },
    /// A projectile reached its terminal phase.
    ProjectileFinished {
        entity: EntityKey,
        termination: Termination,
    },
    /// An explosion resolved.
    Detonated {
        kind: ExplosiveKind,
        point: Vec2,
        radius: f32,
        depth: f32,
        gameplay_enabled: bool,
        hits: Vec<HitReport>,
        carve: Option<CarveOutcome>,
    },
    /// A visual effect was spawned.
    Effect(FxEvent),
}
