//! Terrain contact resolution for circular bodies.
//!
//! Pushes circles out of terrain outlines and removes the velocity
//! component that points into the surface. Only terrain contacts are
//! reported; body-body contacts are not resolved.

use hecs::{Entity, World};

use crater_core::components::{Body, Collider, ColliderShape, Transform};
use crater_core::types::Vec2;
use crater_terrain::TerrainPiece;

/// A circle touching a terrain outline this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainContact {
    pub entity: Entity,
    /// Nearest point on the terrain surface.
    pub point: Vec2,
    /// Unit normal pointing out of the terrain.
    pub normal: Vec2,
}

/// Deepest push-out for a circle against one outline, if touching.
fn penetration(piece: &TerrainPiece, center: Vec2, radius: f32) -> Option<(Vec2, Vec2, f32)> {
    let surface = piece.boundary.closest_point(center);
    let offset = center - surface;
    let distance = offset.length();

    if piece.boundary.contains(center) {
        let normal = (-offset).try_normalize().unwrap_or(Vec2::Y);
        return Some((surface, normal, distance + radius));
    }
    if distance < radius {
        let normal = offset.try_normalize().unwrap_or(Vec2::Y);
        return Some((surface, normal, radius - distance));
    }
    None
}

/// Resolve terrain contacts for every circular body.
pub fn run(world: &mut World) -> Vec<TerrainContact> {
    let circles: Vec<(Entity, Vec2, f32)> = world
        .query::<(&Transform, &Collider, &Body)>()
        .iter()
        .filter(|(_, (_, collider, _))| !collider.is_trigger)
        .filter_map(|(entity, (transform, collider, _))| match collider.shape {
            ColliderShape::Circle { radius } => Some((entity, transform.position, radius)),
            _ => None,
        })
        .collect();

    let mut contacts = Vec::new();
    {
        let mut pieces = world.query::<&TerrainPiece>();
        let pieces: Vec<&TerrainPiece> = pieces.iter().map(|(_, piece)| piece).collect();
        for (entity, center, radius) in circles {
            let deepest = pieces
                .iter()
                .filter_map(|piece| penetration(piece, center, radius))
                .max_by(|a, b| a.2.total_cmp(&b.2));
            if let Some((point, normal, depth)) = deepest {
                contacts.push((entity, point, normal, depth));
            }
        }
    }

    contacts
        .into_iter()
        .filter_map(|(entity, point, normal, depth)| {
            let (transform, body) = world
                .query_one_mut::<(&mut Transform, &mut Body)>(entity)
                .ok()?;
            transform.position += normal * depth;
            let into_surface = body.velocity.dot(normal);
            if into_surface < 0.0 {
                body.velocity -= normal * into_surface;
            }
            Some(TerrainContact {
                entity,
                point,
                normal,
            })
        })
        .collect()
}
