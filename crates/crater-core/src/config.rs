//! Designer-tunable match configuration.
//!
//! Every section defaults to a playable value, so a JSON file only needs
//! to name the fields it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, GRAVITY};
use crate::enums::{ExplosiveKind, SortingLayer};
use crate::error::ConfigError;
use crate::types::{EntityKey, LayerMask, Vec2};

/// Flight, landing and resting behaviour of thrown grenades.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrenadeTuning {
    /// Seconds after landing before detonation.
    pub fuse_secs: f32,
    /// Seconds of flight without landing before the grenade is removed as a dud.
    pub max_flight_secs: f32,
    /// Spin applied to orientation while flying (degrees per second).
    pub spin_deg_per_sec: f32,
    /// Collision radius (world units).
    pub collision_radius: f32,
    pub mass: f32,
    /// Steepest slope (degrees) on which a landed grenade settles.
    pub max_walkable_slope_deg: f32,
    /// Tangential damping rate on walkable ground (per second).
    pub rest_damping: f32,
    /// Length of the downward ground probe below the grenade center.
    pub probe_distance: f32,
    /// Below this speed the resting physics is skipped.
    pub rest_speed_epsilon: f32,
}

impl Default for GrenadeTuning {
    fn default() -> Self {
        Self {
            fuse_secs: defaults::FUSE_SECS,
            max_flight_secs: defaults::MAX_FLIGHT_SECS,
            spin_deg_per_sec: defaults::SPIN_DEG_PER_SEC,
            collision_radius: defaults::GRENADE_RADIUS,
            mass: defaults::GRENADE_MASS,
            max_walkable_slope_deg: defaults::MAX_WALKABLE_SLOPE_DEG,
            rest_damping: defaults::REST_DAMPING,
            probe_distance: defaults::PROBE_DISTANCE,
            rest_speed_epsilon: defaults::REST_SPEED_EPSILON,
        }
    }
}

/// Size and strength of one explosive kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionTuning {
    /// Blast radius as a multiple of the reference height.
    pub radius_multiplier: f32,
    /// Crater depth as a multiple of the reference height.
    pub depth_multiplier: f32,
    pub damage_cap: f32,
    pub knockback_cap: f32,
    /// In [0, 1]. Scales damage for weaker secondary explosions.
    pub damage_multiplier: f32,
    /// In [0, 1]. Scales knockback for weaker secondary explosions.
    pub knockback_multiplier: f32,
    /// Colliders the blast may affect.
    pub target_mask: LayerMask,
    pub sorting_layer: SortingLayer,
}

impl Default for ExplosionTuning {
    fn default() -> Self {
        Self::grenade()
    }
}

impl ExplosionTuning {
    pub fn grenade() -> Self {
        Self {
            radius_multiplier: defaults::GRENADE_RADIUS_MULTIPLIER,
            depth_multiplier: defaults::GRENADE_DEPTH_MULTIPLIER,
            damage_cap: defaults::GRENADE_DAMAGE_CAP,
            knockback_cap: defaults::GRENADE_KNOCKBACK_CAP,
            damage_multiplier: 1.0,
            knockback_multiplier: 1.0,
            target_mask: LayerMask::ALL,
            sorting_layer: SortingLayer::Effects,
        }
    }

    pub fn hero_death_burst() -> Self {
        Self {
            radius_multiplier: defaults::DEATH_BURST_RADIUS_MULTIPLIER,
            depth_multiplier: defaults::DEATH_BURST_DEPTH_MULTIPLIER,
            damage_cap: defaults::GRENADE_DAMAGE_CAP,
            knockback_cap: defaults::GRENADE_KNOCKBACK_CAP,
            damage_multiplier: defaults::DEATH_BURST_DAMAGE_MULTIPLIER,
            knockback_multiplier: defaults::DEATH_BURST_KNOCKBACK_MULTIPLIER,
            target_mask: LayerMask::ALL,
            sorting_layer: SortingLayer::Foreground,
        }
    }
}

/// Where explosion sizing takes its reference height from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ReferenceHeight {
    /// The designated hero's collision bounds.
    #[default]
    Hero,
    /// A specific entity's collision bounds.
    Entity(EntityKey),
    /// Fixed override in world units.
    Fixed(f32),
}

/// Top-level configuration for one match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub gravity: Vec2,
    pub grenade: GrenadeTuning,
    pub grenade_explosion: ExplosionTuning,
    pub death_burst: ExplosionTuning,
    pub reference_height: ReferenceHeight,
    /// Heightfield crater depth as a fraction of the carve radius.
    pub heightfield_depth_ratio: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::from(GRAVITY),
            grenade: GrenadeTuning::default(),
            grenade_explosion: ExplosionTuning::grenade(),
            death_burst: ExplosionTuning::hero_death_burst(),
            reference_height: ReferenceHeight::default(),
            heightfield_depth_ratio: defaults::HEIGHTFIELD_DEPTH_RATIO,
        }
    }
}

impl MatchConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Tuning for the given explosive kind.
    pub fn explosion(&self, kind: ExplosiveKind) -> &ExplosionTuning {
        match kind {
            ExplosiveKind::Grenade => &self.grenade_explosion,
            ExplosiveKind::HeroDeathBurst => &self.death_burst,
        }
    }

    /// Reject values that would make the simulation meaningless.
    ///
    /// Detonation-time sizing still clamps, so this only guards file input.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.grenade;
        positive("grenade.fuse_secs", g.fuse_secs)?;
        positive("grenade.max_flight_secs", g.max_flight_secs)?;
        positive("grenade.collision_radius", g.collision_radius)?;
        positive("grenade.mass", g.mass)?;
        non_negative("grenade.rest_damping", g.rest_damping)?;
        positive("grenade.probe_distance", g.probe_distance)?;
        non_negative("grenade.rest_speed_epsilon", g.rest_speed_epsilon)?;
        if !(0.0..=90.0).contains(&g.max_walkable_slope_deg) {
            return Err(ConfigError::OutOfRange {
                field: "grenade.max_walkable_slope_deg".to_string(),
                expected: "within [0, 90]",
                value: g.max_walkable_slope_deg,
            });
        }

        for (prefix, tuning) in [
            ("grenade_explosion", &self.grenade_explosion),
            ("death_burst", &self.death_burst),
        ] {
            validate_explosion(prefix, tuning)?;
        }

        if let ReferenceHeight::Fixed(h) = self.reference_height {
            positive("reference_height", h)?;
        }
        non_negative("heightfield_depth_ratio", self.heightfield_depth_ratio)?;
        Ok(())
    }
}

fn validate_explosion(prefix: &str, tuning: &ExplosionTuning) -> Result<(), ConfigError> {
    non_negative(&format!("{prefix}.damage_cap"), tuning.damage_cap)?;
    non_negative(&format!("{prefix}.knockback_cap"), tuning.knockback_cap)?;
    unit_interval(&format!("{prefix}.damage_multiplier"), tuning.damage_multiplier)?;
    unit_interval(&format!("{prefix}.knockback_multiplier"), tuning.knockback_multiplier)?;
    Ok(())
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            expected: "> 0",
            value,
        })
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            expected: ">= 0",
            value,
        })
    }
}

fn unit_interval(field: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: field.to_string(),
            expected: "within [0, 1]",
            value,
        })
    }
}
