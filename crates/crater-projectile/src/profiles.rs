//! Explosive-kind behavioral profiles.
//!
//! Consolidates the per-kind parameters that are not designer tuning.

use crater_core::components::Explosive;
use crater_core::config::ExplosionTuning;
use crater_core::enums::{DamageSource, ExplosiveKind};

/// Fixed behavior for an explosive kind.
pub struct ExplosiveProfile {
    /// Damage source reported to health capabilities.
    pub damage_source: DamageSource,
    /// Key of the rich effect prefab, if the presentation layer has one.
    pub effect_prefab: &'static str,
}

/// Get the behavioral profile for a given kind.
pub fn get_profile(kind: ExplosiveKind) -> ExplosiveProfile {
    match kind {
        ExplosiveKind::Grenade => ExplosiveProfile {
            damage_source: DamageSource::GrenadeExplosion,
            effect_prefab: "fx/grenade_explosion",
        },
        ExplosiveKind::HeroDeathBurst => ExplosiveProfile {
            damage_source: DamageSource::HeroDeathExplosion,
            effect_prefab: "fx/hero_death_burst",
        },
    }
}

/// Build an undetonated explosive from its tuning.
pub fn make_explosive(
    kind: ExplosiveKind,
    tuning: &ExplosionTuning,
    gameplay_enabled: bool,
) -> Explosive {
    Explosive {
        kind,
        radius_multiplier: tuning.radius_multiplier,
        depth_multiplier: tuning.depth_multiplier,
        radius: 0.0,
        crater_depth: 0.0,
        damage_cap: tuning.damage_cap,
        knockback_cap: tuning.knockback_cap,
        damage_multiplier: tuning.damage_multiplier,
        knockback_multiplier: tuning.knockback_multiplier,
        target_mask: tuning.target_mask,
        gameplay_enabled,
        detonated: false,
    }
}
