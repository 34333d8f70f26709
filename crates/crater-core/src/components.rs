//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{LayerMask, Vec2};

/// World-space placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Orientation in radians, counter-clockwise.
    pub rotation: f32,
}

/// Rigid body state integrated by the physics substrate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    pub velocity: Vec2,
    pub mass: f32,
    /// Multiplier on world gravity. 0 for kinematic actors.
    pub gravity_scale: f32,
    /// Forces accumulated this tick, cleared after integration.
    pub pending_force: Vec2,
}

/// Hit points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: u32,
    pub max: u32,
    /// Source of the most recent damage instance.
    pub last_source: Option<DamageSource>,
}

/// Collision volume shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
    /// Outline taken from the entity's terrain piece.
    Boundary,
}

/// Collision volume attached to an entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    pub layer: LayerMask,
    pub is_trigger: bool,
}

/// Marks the hero whose collision height scales explosions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hero;

/// An explosive instance: grenade or death burst.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosive {
    pub kind: ExplosiveKind,
    /// Radius as a multiple of the reference height.
    pub radius_multiplier: f32,
    /// Crater depth as a multiple of the reference height.
    pub depth_multiplier: f32,
    /// Resolved blast radius (world units), set at detonation.
    pub radius: f32,
    /// Resolved crater depth (world units), set at detonation.
    pub crater_depth: f32,
    pub damage_cap: f32,
    pub knockback_cap: f32,
    /// Scales damage, in [0, 1].
    pub damage_multiplier: f32,
    /// Scales knockback, in [0, 1].
    pub knockback_multiplier: f32,
    /// Which colliders the blast may affect.
    pub target_mask: LayerMask,
    /// When false only the visual plays; damage and crater happened elsewhere.
    pub gameplay_enabled: bool,
    /// Set once the explosion has fired. Further detonations are no-ops.
    pub detonated: bool,
}

/// Thrown projectile lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub phase: ProjectilePhase,
    /// Seconds spent in the air since the throw.
    pub flight_secs: f32,
    /// Seconds since landing. Detonates when it reaches the fuse duration.
    pub fuse_secs: f32,
    /// Constant spin while flying (radians per second).
    pub spin: f32,
    /// Where the projectile first touched terrain.
    pub landing_point: Option<Vec2>,
    pub termination: Option<Termination>,
}

/// Entity scheduled for removal after a grace period.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Expiring {
    pub ticks_remaining: u32,
}
