//! Commands sent to the match engine from game flow and presentation.
//!
//! Commands are queued and processed at the start of the next tick.

use serde::{Deserialize, Serialize};

use crate::enums::ExplosiveKind;
use crate::types::{EntityKey, Vec2};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchCommand {
    /// Spawn a grenade in flight.
    ThrowGrenade { position: Vec2, velocity: Vec2 },
    /// A hero died; detonate its death burst at its current position.
    HeroDied { entity: EntityKey },
    /// Replay an explosion resolved elsewhere. Visual only.
    EchoExplosion { point: Vec2, kind: ExplosiveKind },
    /// Remove a projectile without detonating it.
    ForceRemove { entity: EntityKey },
    /// Remove every projectile and restart the match clock.
    ResetMatch,
}
