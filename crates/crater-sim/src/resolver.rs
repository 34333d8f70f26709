//! Explosion resolver: area damage and knockback for one blast.
//!
//! Damage is flat inside the radius. Knockback falls off linearly with
//! distance from the center.

use std::collections::HashSet;

use crater_core::components::Explosive;
use crater_core::enums::DamageSource;
use crater_core::events::HitReport;
use crater_core::types::{clamp01, EntityKey, LayerMask, Vec2};

use crate::ports::{ActorAccess, HealthCapability, SpatialQuery, VelocityCapability};

/// One blast to resolve.
#[derive(Debug, Clone, Copy)]
pub struct Blast {
    pub center: Vec2,
    pub radius: f32,
    /// Damage cap already scaled by the damage multiplier.
    pub damage: f32,
    /// Knockback cap already scaled by the knockback multiplier.
    pub knockback: f32,
    pub mask: LayerMask,
    pub source: DamageSource,
    /// Entity that never receives its own blast.
    pub exclude: Option<EntityKey>,
}

impl Blast {
    /// Blast for a resolved explosive. `explosive.radius` must already be set.
    pub fn from_explosive(explosive: &Explosive, center: Vec2, source: DamageSource) -> Self {
        Self {
            center,
            radius: explosive.radius,
            damage: explosive.damage_cap * explosive.damage_multiplier,
            knockback: explosive.knockback_cap * explosive.knockback_multiplier,
            mask: explosive.target_mask,
            source,
            exclude: None,
        }
    }

    pub fn excluding(mut self, entity: EntityKey) -> Self {
        self.exclude = Some(entity);
        self
    }

    /// Whole damage points dealt to every candidate.
    pub fn damage_amount(&self) -> u32 {
        let rounded = self.damage.round();
        if rounded.is_nan() || rounded <= 0.0 {
            0
        } else {
            rounded as u32
        }
    }
}

/// Normalized distance in [0, 1]. 1 at or beyond the radius.
pub fn falloff_t(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 1.0;
    }
    clamp01(distance / radius)
}

/// Knockback scale: 1 at the center, 0 at the radius.
pub fn falloff_factor(distance: f32, radius: f32) -> f32 {
    1.0 - falloff_t(distance, radius)
}

/// Apply a blast to every candidate collider in range.
///
/// Queries first, then mutates through the capability ports. Returns one
/// report per entity that received damage or an impulse.
pub fn resolve<W>(world: &mut W, blast: &Blast) -> Vec<HitReport>
where
    W: SpatialQuery + ActorAccess + ?Sized,
{
    let damage = blast.damage_amount();
    if damage == 0 && blast.knockback <= 0.0 {
        return Vec::new();
    }

    let candidates = world.overlap_circle(blast.center, blast.radius, blast.mask);
    let mut seen = HashSet::new();
    let mut reports = Vec::new();

    for candidate in candidates {
        if candidate.is_trigger || blast.exclude == Some(candidate.entity) {
            continue;
        }
        if !seen.insert(candidate.entity) {
            continue;
        }

        let offset = candidate.center() - blast.center;
        let t = falloff_t(offset.length(), blast.radius);

        let mut dealt = 0;
        if damage > 0 {
            let source = blast.source;
            let mut hit = |health: &mut dyn HealthCapability| health.take_damage(damage, source);
            let applied = world.with_health(candidate.entity, &mut hit);
            if applied {
                dealt = damage;
            }
        }

        let mut impulse = Vec2::ZERO;
        let magnitude = blast.knockback * (1.0 - t);
        if magnitude > 0.0 {
            let push = offset.try_normalize().unwrap_or(Vec2::Y) * magnitude;
            let mut push_body = |body: &mut dyn VelocityCapability| body.add_impulse(push);
            let applied = world.with_velocity(candidate.entity, &mut push_body);
            if applied {
                impulse = push;
            }
        }

        if dealt > 0 || impulse != Vec2::ZERO {
            reports.push(HitReport {
                entity: candidate.entity,
                falloff_t: t,
                damage: dealt,
                impulse,
            });
        }
    }

    reports
}
