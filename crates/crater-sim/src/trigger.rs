//! ExplosionTrigger: sizes an explosion and runs damage, crater and visuals.
//!
//! Built per detonation from borrowed handles, so nothing here is looked
//! up globally and the session state (carver warnings) outlives it.

use crater_core::components::Explosive;
use crater_core::constants::{
    DEFAULT_REFERENCE_HEIGHT, MIN_BLAST_RADIUS, MIN_CRATER_DEPTH, MIN_SIZE_MULTIPLIER,
};
use crater_core::enums::{CarveOutcome, ExplosiveKind, SortingLayer};
use crater_core::events::{FxEvent, HitReport, MatchEvent};
use crater_core::types::{EntityKey, Vec2};
use crater_projectile::profiles::get_profile;
use crater_terrain::HeightfieldService;
use serde::{Deserialize, Serialize};

use crate::carving::{CarveRequest, TerrainCraterCarver, TerrainServices};
use crate::ports::{spawn_effect, EffectSpawner, GameWorld};
use crate::resolver::{resolve, Blast};

/// What one detonation did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetonationReport {
    pub kind: ExplosiveKind,
    pub point: Vec2,
    pub radius: f32,
    pub depth: f32,
    pub gameplay_enabled: bool,
    pub hits: Vec<HitReport>,
    /// `None` when gameplay was disabled and no carve was attempted.
    pub carve: Option<CarveOutcome>,
    pub effect: FxEvent,
}

impl DetonationReport {
    pub fn to_event(&self) -> MatchEvent {
        MatchEvent::Detonated {
            kind: self.kind,
            point: self.point,
            radius: self.radius,
            depth: self.depth,
            gameplay_enabled: self.gameplay_enabled,
            hits: self.hits.clone(),
            carve: self.carve,
        }
    }
}

/// Reference height, or the default when unusable.
pub fn sanitize_reference_height(height: f32) -> f32 {
    if height.is_finite() && height > 0.0 {
        height
    } else {
        DEFAULT_REFERENCE_HEIGHT
    }
}

/// Blast radius for a reference height.
pub fn blast_radius(reference_height: f32, radius_multiplier: f32) -> f32 {
    (reference_height * radius_multiplier.max(MIN_SIZE_MULTIPLIER)).max(MIN_BLAST_RADIUS)
}

/// Crater depth for a reference height.
pub fn crater_depth(reference_height: f32, depth_multiplier: f32) -> f32 {
    (reference_height * depth_multiplier.max(MIN_SIZE_MULTIPLIER)).max(MIN_CRATER_DEPTH)
}

pub struct ExplosionTrigger<'a> {
    world: &'a mut dyn GameWorld,
    heightfield: Option<&'a mut dyn HeightfieldService>,
    carver: &'a mut TerrainCraterCarver,
    effects: &'a mut dyn EffectSpawner,
    layer: SortingLayer,
    exclude: Option<EntityKey>,
}

impl<'a> ExplosionTrigger<'a> {
    pub fn new(
        world: &'a mut dyn GameWorld,
        heightfield: Option<&'a mut dyn HeightfieldService>,
        carver: &'a mut TerrainCraterCarver,
        effects: &'a mut dyn EffectSpawner,
    ) -> Self {
        Self {
            world,
            heightfield,
            carver,
            effects,
            layer: SortingLayer::default(),
            exclude: None,
        }
    }

    /// Sorting layer for the fallback effect.
    pub fn on_layer(mut self, layer: SortingLayer) -> Self {
        self.layer = layer;
        self
    }

    /// Entity that must not be hit by its own blast.
    pub fn excluding(mut self, entity: EntityKey) -> Self {
        self.exclude = Some(entity);
        self
    }

    /// Fire `explosive` at `point`. Returns `None` if it already fired.
    ///
    /// Damage and knockback are resolved before the crater is carved, and
    /// the visual is spawned last.
    pub fn detonate(
        &mut self,
        explosive: &mut Explosive,
        point: Vec2,
        reference_height: f32,
    ) -> Option<DetonationReport> {
        if explosive.detonated {
            return None;
        }
        explosive.detonated = true;

        let height = sanitize_reference_height(reference_height);
        explosive.radius = blast_radius(height, explosive.radius_multiplier);
        explosive.crater_depth = crater_depth(height, explosive.depth_multiplier);

        let mut hits = Vec::new();
        let mut carve = None;
        if explosive.gameplay_enabled {
            let profile = get_profile(explosive.kind);
            let mut blast = Blast::from_explosive(explosive, point, profile.damage_source);
            if let Some(entity) = self.exclude {
                blast = blast.excluding(entity);
            }
            hits = resolve(&mut *self.world, &blast);

            let request = CarveRequest {
                center: point,
                radius: explosive.radius,
                depth: explosive.crater_depth,
            };
            let heightfield: Option<&mut dyn HeightfieldService> = match self.heightfield.as_mut() {
                Some(service) => Some(&mut **service),
                None => None,
            };
            let mut services = TerrainServices {
                world: self.world.as_terrain_world(),
                heightfield,
            };
            carve = Some(self.carver.carve(&mut services, &request));
        }

        let effect = spawn_effect(
            &mut *self.effects,
            explosive.kind,
            point,
            explosive.radius * 2.0,
            self.layer,
        );

        tracing::debug!(
            kind = ?explosive.kind,
            x = point.x,
            y = point.y,
            radius = explosive.radius,
            depth = explosive.crater_depth,
            hits = hits.len(),
            carve = ?carve,
            gameplay = explosive.gameplay_enabled,
            "explosion detonated"
        );

        Some(DetonationReport {
            kind: explosive.kind,
            point,
            radius: explosive.radius,
            depth: explosive.crater_depth,
            gameplay_enabled: explosive.gameplay_enabled,
            hits,
            carve,
            effect,
        })
    }
}
