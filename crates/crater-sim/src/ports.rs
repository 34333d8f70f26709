//! Seams between the explosion logic and the world it acts on.
//!
//! The resolver, carver and trigger only see these traits. `Arena`
//! implements all of them on top of hecs; tests may substitute their own.

use crater_core::components::{Body, Health};
use crater_core::enums::{DamageSource, ExplosiveKind, SortingLayer};
use crater_core::events::FxEvent;
use crater_core::types::{Aabb, EntityKey, LayerMask, Vec2};
use crater_projectile::profiles::get_profile;
use crater_terrain::TerrainPiece;

/// A collider found by a spatial query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderRef {
    pub entity: EntityKey,
    /// World bounds as the physics broadphase sees them.
    pub bounds: Aabb,
    pub layer: LayerMask,
    pub is_trigger: bool,
    /// Backed by a terrain piece.
    pub is_terrain: bool,
}

impl ColliderRef {
    pub fn center(&self) -> Vec2 {
        self.bounds.center()
    }
}

/// A ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub collider: ColliderRef,
    pub point: Vec2,
    /// Unit surface normal facing the ray origin.
    pub normal: Vec2,
    pub distance: f32,
}

/// Read-only physics queries plus transform resynchronisation.
pub trait SpatialQuery {
    /// Colliders touching the circle whose layer intersects `mask`.
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<ColliderRef>;

    /// Colliders touching the axis-aligned box of full `size` around `center`.
    fn overlap_box(&self, center: Vec2, size: Vec2, mask: LayerMask) -> Vec<ColliderRef>;

    /// Every hit along the ray, nearest first.
    fn raycast_all(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: LayerMask)
        -> Vec<Hit>;

    /// Nearest hit along the ray.
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<Hit> {
        self.raycast_all(origin, direction, max_distance, mask)
            .into_iter()
            .next()
    }

    /// Closest point on (or in) the collider's shape to `point`.
    fn closest_point(&self, collider: &ColliderRef, point: Vec2) -> Vec2;

    /// Collision bounds of an entity, if it has a collider.
    fn bounds_of(&self, entity: EntityKey) -> Option<Aabb>;

    /// Push modified terrain geometry to the physics broadphase.
    fn sync_transforms(&mut self);
}

pub trait HealthCapability {
    fn take_damage(&mut self, amount: u32, source: DamageSource);
}

pub trait VelocityCapability {
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    fn mass(&self) -> f32;
    fn set_mass(&mut self, mass: f32);
    /// Instantaneous change of momentum.
    fn add_impulse(&mut self, impulse: Vec2);
}

impl HealthCapability for Health {
    fn take_damage(&mut self, amount: u32, source: DamageSource) {
        self.current = self.current.saturating_sub(amount);
        self.last_source = Some(source);
    }
}

impl VelocityCapability for Body {
    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
    }

    fn add_impulse(&mut self, impulse: Vec2) {
        if self.mass > 0.0 {
            self.velocity += impulse / self.mass;
        }
    }
}

/// Capability lookup by entity. Each call returns false when the entity
/// lacks the capability, in which case `f` is not called.
pub trait ActorAccess {
    fn with_health(
        &mut self,
        entity: EntityKey,
        f: &mut dyn FnMut(&mut dyn HealthCapability),
    ) -> bool;
    fn with_velocity(&mut self, entity: EntityKey, f: &mut dyn FnMut(&mut dyn VelocityCapability))
        -> bool;
}

/// Mutable access to the geometry behind terrain colliders.
pub trait TerrainAccess {
    fn terrain_piece_mut(&mut self, entity: EntityKey) -> Option<&mut TerrainPiece>;
}

/// What crater carving needs from the world.
pub trait TerrainWorld: SpatialQuery + TerrainAccess {}

impl<T: SpatialQuery + TerrainAccess + ?Sized> TerrainWorld for T {}

/// Everything a detonation touches.
pub trait GameWorld: TerrainWorld + ActorAccess {
    fn as_terrain_world(&mut self) -> &mut dyn TerrainWorld;
}

impl<T: SpatialQuery + TerrainAccess + ActorAccess> GameWorld for T {
    fn as_terrain_world(&mut self) -> &mut dyn TerrainWorld {
        self
    }
}

/// Presentation hook for explosion visuals.
pub trait EffectSpawner {
    /// Spawn the rich prefab registered under `prefab`. Returns false if
    /// the presentation layer has no such prefab.
    fn spawn_prefab(
        &mut self,
        _prefab: &str,
        _kind: ExplosiveKind,
        _point: Vec2,
        _diameter: f32,
    ) -> bool {
        false
    }

    /// Basic fallback effect.
    fn spawn_basic(&mut self, kind: ExplosiveKind, point: Vec2, diameter: f32, layer: SortingLayer);
}

/// Spawn the profile prefab for `kind`, falling back to the basic effect.
pub fn spawn_effect(
    effects: &mut dyn EffectSpawner,
    kind: ExplosiveKind,
    point: Vec2,
    diameter: f32,
    layer: SortingLayer,
) -> FxEvent {
    let prefab = effects.spawn_prefab(get_profile(kind).effect_prefab, kind, point, diameter);
    if !prefab {
        effects.spawn_basic(kind, point, diameter, layer);
    }
    FxEvent {
        kind,
        point,
        diameter,
        layer,
        prefab,
    }
}

/// Effect sink that records what was spawned.
#[derive(Debug, Default)]
pub struct FxLog {
    events: Vec<FxEvent>,
    prefabs: Vec<String>,
}

impl FxLog {
    /// A log that reports rich prefabs for the given prefab keys.
    pub fn with_prefabs<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            events: Vec::new(),
            prefabs: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn events(&self) -> &[FxEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<FxEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EffectSpawner for FxLog {
    fn spawn_prefab(
        &mut self,
        prefab: &str,
        kind: ExplosiveKind,
        point: Vec2,
        diameter: f32,
    ) -> bool {
        if !self.prefabs.iter().any(|key| key == prefab) {
            return false;
        }
        self.events.push(FxEvent {
            kind,
            point,
            diameter,
            layer: SortingLayer::Effects,
            prefab: true,
        });
        true
    }

    fn spawn_basic(
        &mut self,
        kind: ExplosiveKind,
        point: Vec2,
        diameter: f32,
        layer: SortingLayer,
    ) {
        self.events.push(FxEvent {
            kind,
            point,
            diameter,
            layer,
            prefab: false,
        });
    }
}
