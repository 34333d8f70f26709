//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Origin of a damage instance, forwarded to health capabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSource {
    #[default]
    Generic,
    GrenadeExplosion,
    HeroDeathExplosion,
    Fall,
    AutoGun,
    ClawGun,
}

/// Which kind of explosive produced a blast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplosiveKind {
    /// Thrown, fused grenade.
    #[default]
    Grenade,
    /// Weaker secondary burst when a hero dies.
    HeroDeathBurst,
}

/// Projectile lifecycle phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectilePhase {
    /// Ballistic flight, spin applied directly to orientation.
    #[default]
    Flying,
    /// Touched terrain; fuse counting, slope-aware resting physics active.
    Landed,
    /// Terminal. See [`Termination`] for how it got here.
    Exploded,
}

/// Why a projectile reached its terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Fuse elapsed after landing; the explosion fired.
    Detonated,
    /// Max flight lifetime elapsed without landing. Removed as a dud.
    TimedOut,
    /// Removed from outside (match reset, despawn command). No effects.
    ForcedRemoval,
}

/// Result of a crater carve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarveOutcome {
    /// Terrain geometry was modified.
    Applied,
    /// Nothing to carve (no terrain nearby, or nothing would move).
    NotApplicable,
}

/// Render sorting layer for spawned effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortingLayer {
    Background,
    Terrain,
    #[default]
    Effects,
    Foreground,
}
