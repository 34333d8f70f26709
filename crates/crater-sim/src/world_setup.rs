//! Entity spawn factories for setting up an arena.
//!
//! Creates terrain pieces, heroes, enemies and grenades with appropriate
//! component bundles.

use hecs::{Entity, World};

use crater_core::components::*;
use crater_core::config::{ExplosionTuning, GrenadeTuning};
use crater_core::enums::ExplosiveKind;
use crater_core::types::{LayerMask, Vec2};
use crater_projectile::profiles::make_explosive;
use crater_terrain::{TerrainBoundary, TerrainError, TerrainMesh, TerrainPiece};

use crate::arena::Arena;

/// Build a ground piece from a local-space surface polyline.
///
/// The outline is the surface left to right followed by the two floor
/// corners, right then left. The mesh pairs every surface vertex with one
/// on the floor directly below it.
pub fn ground_piece(
    origin: Vec2,
    surface: &[Vec2],
    floor_y: f32,
) -> Result<TerrainPiece, TerrainError> {
    let (Some(first), Some(last)) = (surface.first(), surface.last()) else {
        return Err(TerrainError::DegenerateBoundary(0));
    };

    let mut outline = surface.to_vec();
    outline.push(Vec2::new(last.x, floor_y));
    outline.push(Vec2::new(first.x, floor_y));
    let boundary = TerrainBoundary::new(origin, outline)?;

    let bottom = surface.iter().map(|p| Vec2::new(p.x, floor_y)).collect();
    let mesh = TerrainMesh::from_rows(surface.to_vec(), bottom)?;

    Ok(TerrainPiece::new(boundary, Some(mesh)))
}

/// Flat ground from `x_min` to `x_max` at height `surface_y`, with
/// `columns` evenly spaced surface vertices.
pub fn flat_ground(
    x_min: f32,
    x_max: f32,
    columns: usize,
    surface_y: f32,
    floor_y: f32,
) -> Result<TerrainPiece, TerrainError> {
    sloped_ground(x_min, x_max, columns, surface_y, surface_y, floor_y)
}

/// Straight ramp from (`x_min`, `y_left`) to (`x_max`, `y_right`).
pub fn sloped_ground(
    x_min: f32,
    x_max: f32,
    columns: usize,
    y_left: f32,
    y_right: f32,
    floor_y: f32,
) -> Result<TerrainPiece, TerrainError> {
    let columns = columns.max(2);
    let surface: Vec<Vec2> = (0..columns)
        .map(|i| {
            let t = i as f32 / (columns - 1) as f32;
            Vec2::new(x_min + (x_max - x_min) * t, y_left + (y_right - y_left) * t)
        })
        .collect();
    ground_piece(Vec2::ZERO, &surface, floor_y)
}

/// Spawn a terrain piece with a boundary collider.
pub fn spawn_terrain(world: &mut World, piece: TerrainPiece) -> Entity {
    let transform = Transform {
        position: piece.boundary.origin(),
        rotation: 0.0,
    };
    let collider = Collider {
        shape: ColliderShape::Boundary,
        layer: LayerMask::TERRAIN,
        is_trigger: false,
    };
    world.spawn((transform, collider, piece))
}

/// Spawn the hero: a kinematic box whose height scales explosions.
pub fn spawn_hero(
    world: &mut World,
    position: Vec2,
    half_extents: Vec2,
    hit_points: u32,
) -> Entity {
    world.spawn((
        Hero,
        Transform {
            position,
            rotation: 0.0,
        },
        Collider {
            shape: ColliderShape::Box { half_extents },
            layer: LayerMask::HERO,
            is_trigger: false,
        },
        Health {
            current: hit_points,
            max: hit_points,
            last_source: None,
        },
        Body {
            velocity: Vec2::ZERO,
            mass: 1.0,
            gravity_scale: 0.0,
            pending_force: Vec2::ZERO,
        },
    ))
}

/// Spawn a kinematic enemy box.
pub fn spawn_enemy(
    world: &mut World,
    position: Vec2,
    half_extents: Vec2,
    hit_points: u32,
) -> Entity {
    world.spawn((
        Transform {
            position,
            rotation: 0.0,
        },
        Collider {
            shape: ColliderShape::Box { half_extents },
            layer: LayerMask::ENEMY,
            is_trigger: false,
        },
        Health {
            current: hit_points,
            max: hit_points,
            last_source: None,
        },
        Body {
            velocity: Vec2::ZERO,
            mass: 1.0,
            gravity_scale: 0.0,
            pending_force: Vec2::ZERO,
        },
    ))
}

/// Spawn a thrown grenade in flight.
pub fn spawn_grenade(
    world: &mut World,
    tuning: &GrenadeTuning,
    explosion: &ExplosionTuning,
    position: Vec2,
    velocity: Vec2,
) -> Entity {
    world.spawn((
        Transform {
            position,
            rotation: 0.0,
        },
        Body {
            velocity,
            mass: tuning.mass,
            gravity_scale: 1.0,
            pending_force: Vec2::ZERO,
        },
        Collider {
            shape: ColliderShape::Circle {
                radius: tuning.collision_radius,
            },
            layer: LayerMask::PROJECTILE,
            is_trigger: false,
        },
        Projectile {
            phase: Default::default(),
            flight_secs: 0.0,
            fuse_secs: 0.0,
            spin: tuning.spin_deg_per_sec.to_radians(),
            landing_point: None,
            termination: None,
        },
        make_explosive(ExplosiveKind::Grenade, explosion, true),
    ))
}

/// A small demo arena: flat ground with a steep hill, one hero and two
/// enemies standing on the ground.
pub fn demo_arena() -> Result<Arena, TerrainError> {
    let mut world = World::new();

    spawn_terrain(&mut world, flat_ground(-20.0, 20.0, 81, 0.0, -3.0)?);
    spawn_terrain(&mut world, sloped_ground(20.0, 26.0, 13, 0.0, 6.0, -3.0)?);

    spawn_hero(&mut world, Vec2::new(-6.0, 1.0), Vec2::new(0.4, 1.0), 100);
    spawn_enemy(&mut world, Vec2::new(4.0, 0.75), Vec2::new(0.4, 0.75), 60);
    spawn_enemy(&mut world, Vec2::new(9.0, 0.75), Vec2::new(0.4, 0.75), 60);

    Ok(Arena::new(world))
}
