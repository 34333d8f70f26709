//! Arena: the hecs world behind every port.
//!
//! Holds actors, projectiles and terrain pieces as hecs entities and
//! answers spatial queries against their colliders. Terrain pieces are
//! queried against their live outline, but their broadphase bounds only
//! refresh on `sync_transforms`.

use hecs::{Entity, World};

use crater_core::components::{Body, Collider, ColliderShape, Health, Transform};
use crater_core::types::{Aabb, EntityKey, LayerMask, Vec2};
use crater_terrain::TerrainPiece;

use crate::ports::{
    ActorAccess, ColliderRef, HealthCapability, Hit, SpatialQuery, TerrainAccess,
    VelocityCapability,
};

/// Convert a hecs entity to a port key.
pub fn entity_key(entity: Entity) -> EntityKey {
    EntityKey(entity.to_bits().get())
}

/// Convert a port key back to a hecs entity.
pub fn key_entity(key: EntityKey) -> Option<Entity> {
    Entity::from_bits(key.0)
}

#[derive(Default)]
pub struct Arena {
    world: World,
}

impl Arena {
    pub fn new(world: World) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Broadphase bounds of a collider.
    fn collider_bounds(
        transform: &Transform,
        collider: &Collider,
        piece: Option<&TerrainPiece>,
    ) -> Option<Aabb> {
        match collider.shape {
            ColliderShape::Circle { radius } => Some(Aabb::from_center_half_extents(
                transform.position,
                Vec2::splat(radius),
            )),
            ColliderShape::Box { half_extents } => {
                Some(Aabb::from_center_half_extents(transform.position, half_extents))
            }
            ColliderShape::Boundary => piece.map(TerrainPiece::collider_bounds),
        }
    }

    /// Visit every collider whose layer intersects `mask`, keeping what `f` returns.
    fn scan<T>(
        &self,
        mask: LayerMask,
        mut f: impl FnMut(ColliderRef, &Transform, &Collider, Option<&TerrainPiece>) -> Option<T>,
    ) -> Vec<T> {
        let mut query = self
            .world
            .query::<(&Transform, &Collider, Option<&TerrainPiece>)>();
        let mut out = Vec::new();
        for (entity, (transform, collider, piece)) in query.iter() {
            if !collider.layer.intersects(mask) {
                continue;
            }
            let Some(bounds) = Self::collider_bounds(transform, collider, piece) else {
                continue;
            };
            let reference = ColliderRef {
                entity: entity_key(entity),
                bounds,
                layer: collider.layer,
                is_trigger: collider.is_trigger,
                is_terrain: piece.is_some(),
            };
            if let Some(value) = f(reference, transform, collider, piece) {
                out.push(value);
            }
        }
        out
    }
}

fn overlaps_circle(
    transform: &Transform,
    collider: &Collider,
    piece: Option<&TerrainPiece>,
    bounds: &Aabb,
    center: Vec2,
    radius: f32,
) -> bool {
    match collider.shape {
        ColliderShape::Circle { radius: r } => {
            transform.position.distance_squared(center) <= (r + radius) * (r + radius)
        }
        ColliderShape::Box { .. } => bounds.overlaps_circle(center, radius),
        ColliderShape::Boundary => piece.is_some_and(|p| {
            bounds.overlaps_circle(center, radius) && p.boundary.overlaps_circle(center, radius)
        }),
    }
}

/// Ray against a circle. Returns (distance, normal).
fn ray_circle(origin: Vec2, dir: Vec2, center: Vec2, radius: f32) -> Option<(f32, Vec2)> {
    let m = origin - center;
    let b = m.dot(dir);
    let c = m.length_squared() - radius * radius;
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()).max(0.0);
    let normal = (origin + dir * t - center).try_normalize().unwrap_or(-dir);
    Some((t, normal))
}

/// Ray against an axis-aligned box (slab method). Returns (distance, normal).
fn ray_aabb(origin: Vec2, dir: Vec2, aabb: &Aabb) -> Option<(f32, Vec2)> {
    let mut t_min = 0.0_f32;
    let mut t_max = f32::INFINITY;
    let mut normal = -dir;

    for axis in 0..2 {
        let (o, d, lo, hi) = (origin[axis], dir[axis], aabb.min[axis], aabb.max[axis]);
        if d.abs() < f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (mut t0, mut t1) = ((lo - o) * inv, (hi - o) * inv);
        let mut sign = -1.0;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            sign = 1.0;
        }
        if t0 > t_min {
            t_min = t0;
            normal = Vec2::ZERO;
            normal[axis] = sign;
        }
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }
    Some((t_min, normal))
}

impl SpatialQuery for Arena {
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Vec<ColliderRef> {
        self.scan(mask, |r, t, c, p| {
            overlaps_circle(t, c, p, &r.bounds, center, radius).then_some(r)
        })
    }

    fn overlap_box(&self, center: Vec2, size: Vec2, mask: LayerMask) -> Vec<ColliderRef> {
        let query = Aabb::from_center_half_extents(center, size * 0.5);
        self.scan(mask, |r, t, c, _| {
            let hit = match c.shape {
                ColliderShape::Circle { radius } => query.overlaps_circle(t.position, radius),
                _ => query.intersects(&r.bounds),
            };
            hit.then_some(r)
        })
    }

    fn raycast_all(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<Hit> {
        let Some(dir) = direction.try_normalize() else {
            return Vec::new();
        };

        let mut hits = self.scan(mask, |collider, transform, c, piece| {
            let (distance, normal) = match c.shape {
                ColliderShape::Circle { radius } => {
                    ray_circle(origin, dir, transform.position, radius)?
                }
                ColliderShape::Box { .. } => ray_aabb(origin, dir, &collider.bounds)?,
                ColliderShape::Boundary => {
                    let hit = piece?.boundary.raycast(origin, dir, max_distance)?;
                    (hit.distance, hit.normal)
                }
            };
            (distance <= max_distance).then_some(Hit {
                collider,
                point: origin + dir * distance,
                normal,
                distance,
            })
        });

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn closest_point(&self, collider: &ColliderRef, point: Vec2) -> Vec2 {
        let Some(entity) = key_entity(collider.entity) else {
            return collider.bounds.closest_point(point);
        };
        if let Ok(piece) = self.world.get::<&TerrainPiece>(entity) {
            return piece.boundary.closest_point(point);
        }
        match self.world.get::<&Collider>(entity).map(|c| c.shape) {
            Ok(ColliderShape::Circle { radius }) => {
                let center = collider.center();
                center + (point - center).clamp_length_max(radius)
            }
            _ => collider.bounds.closest_point(point),
        }
    }

    fn bounds_of(&self, entity: EntityKey) -> Option<Aabb> {
        let entity = key_entity(entity)?;
        let transform = *self.world.get::<&Transform>(entity).ok()?;
        let collider = *self.world.get::<&Collider>(entity).ok()?;
        let piece = self.world.get::<&TerrainPiece>(entity).ok();
        Self::collider_bounds(&transform, &collider, piece.as_deref())
    }

    fn sync_transforms(&mut self) {
        for (_entity, piece) in self.world.query_mut::<&mut TerrainPiece>() {
            piece.sync_collider();
        }
    }
}

impl ActorAccess for Arena {
    fn with_health(
        &mut self,
        entity: EntityKey,
        f: &mut dyn FnMut(&mut dyn HealthCapability),
    ) -> bool {
        let Some(entity) = key_entity(entity) else {
            return false;
        };
        match self.world.get::<&mut Health>(entity) {
            Ok(mut health) => {
                f(&mut *health);
                true
            }
            Err(_) => false,
        }
    }

    fn with_velocity(
        &mut self,
        entity: EntityKey,
        f: &mut dyn FnMut(&mut dyn VelocityCapability),
    ) -> bool {
        let Some(entity) = key_entity(entity) else {
            return false;
        };
        match self.world.get::<&mut Body>(entity) {
            Ok(mut body) => {
                f(&mut *body);
                true
            }
            Err(_) => false,
        }
    }
}

impl TerrainAccess for Arena {
    fn terrain_piece_mut(&mut self, entity: EntityKey) -> Option<&mut TerrainPiece> {
        let entity = key_entity(entity)?;
        self.world.query_one_mut::<&mut TerrainPiece>(entity).ok()
    }
}
