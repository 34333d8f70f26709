use std::collections::HashMap;

use hecs::{Entity, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crater_core::commands::MatchCommand;
use crater_core::components::*;
use crater_core::config::{ExplosionTuning, MatchConfig, ReferenceHeight};
use crater_core::enums::*;
use crater_core::events::MatchEvent;
use crater_core::types::{Aabb, EntityKey, LayerMask, Vec2};
use crater_projectile::profiles::make_explosive;
use crater_terrain::{Heightfield, HeightfieldHeader, HeightfieldService, TerrainError, TerrainPiece};

use crate::arena::{entity_key, Arena};
use crate::carving::{CarveRequest, TerrainCraterCarver, TerrainServices};
use crate::engine::MatchEngine;
use crate::ports::*;
use crate::resolver::{falloff_factor, falloff_t, resolve, Blast};
use crate::trigger::{blast_radius, crater_depth, ExplosionTrigger};
use crate::world_setup;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Flat ground from x = 0 to 10 at y = 0, one surface vertex per unit.
fn ground_arena() -> (Arena, Entity) {
    let mut world = World::new();
    let piece = world_setup::flat_ground(0.0, 10.0, 11, 0.0, -3.0).unwrap();
    let terrain = world_setup::spawn_terrain(&mut world, piece);
    (Arena::new(world), terrain)
}

fn surface_y(arena: &Arena, terrain: Entity, x: f32) -> f32 {
    let piece = arena.world().get::<&TerrainPiece>(terrain).unwrap();
    let p = piece.boundary.points()[..piece.boundary.top_surface_len()]
        .iter()
        .find(|p| (p.x - x).abs() < 1e-4)
        .copied()
        .unwrap();
    p.y
}

fn top_points(arena: &Arena, terrain: Entity) -> Vec<Vec2> {
    let piece = arena.world().get::<&TerrainPiece>(terrain).unwrap();
    piece.boundary.points().to_vec()
}

fn health_of(arena: &Arena, entity: Entity) -> u32 {
    arena.world().get::<&Health>(entity).unwrap().current
}

fn velocity_of(arena: &Arena, entity: Entity) -> Vec2 {
    arena.world().get::<&Body>(entity).unwrap().velocity
}

fn grenade_blast(center: Vec2, radius: f32) -> Blast {
    let tuning = ExplosionTuning::grenade();
    Blast {
        center,
        radius,
        damage: tuning.damage_cap * tuning.damage_multiplier,
        knockback: tuning.knockback_cap * tuning.knockback_multiplier,
        mask: LayerMask::ALL,
        source: DamageSource::GrenadeExplosion,
        exclude: None,
    }
}

/// Spatial world with a fixed candidate list, for resolver tests.
#[derive(Default)]
struct FakeWorld {
    candidates: Vec<ColliderRef>,
    health: HashMap<EntityKey, Health>,
    bodies: HashMap<EntityKey, Body>,
    sync_calls: usize,
}

impl FakeWorld {
    fn add(&mut self, key: u64, center: Vec2, health: bool, body: bool) -> EntityKey {
        let entity = EntityKey(key);
        self.candidates.push(ColliderRef {
            entity,
            bounds: Aabb::from_center_half_extents(center, Vec2::splat(0.5)),
            layer: LayerMask::ENEMY,
            is_trigger: false,
            is_terrain: false,
        });
        if health {
            self.health.insert(
                entity,
                Health {
                    current: 100,
                    max: 100,
                    last_source: None,
                },
            );
        }
        if body {
            self.bodies.insert(
                entity,
                Body {
                    velocity: Vec2::ZERO,
                    mass: 1.0,
                    gravity_scale: 0.0,
                    pending_force: Vec2::ZERO,
                },
            );
        }
        entity
    }
}

impl SpatialQuery for FakeWorld {
    fn overlap_circle(&self, _center: Vec2, _radius: f32, mask: LayerMask) -> Vec<ColliderRef> {
        self.candidates
            .iter()
            .filter(|c| c.layer.intersects(mask))
            .copied()
            .collect()
    }

    fn overlap_box(&self, center: Vec2, size: Vec2, mask: LayerMask) -> Vec<ColliderRef> {
        self.overlap_circle(center, size.length() * 0.5, mask)
    }

    fn raycast_all(&self, _origin: Vec2, _direction: Vec2, _max: f32, _mask: LayerMask) -> Vec<Hit> {
        Vec::new()
    }

    fn closest_point(&self, collider: &ColliderRef, point: Vec2) -> Vec2 {
        collider.bounds.closest_point(point)
    }

    fn bounds_of(&self, entity: EntityKey) -> Option<Aabb> {
        self.candidates
            .iter()
            .find(|c| c.entity == entity)
            .map(|c| c.bounds)
    }

    fn sync_transforms(&mut self) {
        self.sync_calls += 1;
    }
}

impl ActorAccess for FakeWorld {
    fn with_health(&mut self, entity: EntityKey, f: &mut dyn FnMut(&mut dyn HealthCapability)) -> bool {
        match self.health.get_mut(&entity) {
            Some(health) => {
                f(health);
                true
            }
            None => false,
        }
    }

    fn with_velocity(&mut self, entity: EntityKey, f: &mut dyn FnMut(&mut dyn VelocityCapability)) -> bool {
        match self.bodies.get_mut(&entity) {
            Some(body) => {
                f(body);
                true
            }
            None => false,
        }
    }
}

impl TerrainAccess for FakeWorld {
    fn terrain_piece_mut(&mut self, _entity: EntityKey) -> Option<&mut TerrainPiece> {
        None
    }
}

/// Heightfield service that always fails.
#[derive(Default)]
struct FailingHeightfield {
    calls: usize,
}

impl HeightfieldService for FailingHeightfield {
    fn carve_crater_at(&mut self, center: Vec2, _radius: f32) -> Result<(), TerrainError> {
        self.calls += 1;
        Err(TerrainError::OutOfBounds {
            x: center.x,
            min: 100.0,
            max: 200.0,
        })
    }
}

fn flat_heightfield() -> Heightfield {
    let header = HeightfieldHeader {
        origin_x: 0.0,
        cell_width: 1.0,
        floor: -3.0,
    };
    Heightfield::new(header, vec![0.0; 11], 0.5).unwrap()
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

#[test]
fn test_falloff_endpoints_and_monotonic() {
    let radius = 4.0;
    assert!((falloff_factor(0.0, radius) - 1.0).abs() < 1e-6);
    assert!(falloff_factor(radius, radius).abs() < 1e-6);
    assert!(falloff_factor(radius * 3.0, radius).abs() < 1e-6);

    let mut last = f32::INFINITY;
    for i in 0..=100 {
        let d = radius * 1.2 * i as f32 / 100.0;
        let f = falloff_factor(d, radius);
        assert!((0.0..=1.0).contains(&f));
        assert!(f <= last + 1e-6, "falloff increased at d={d}");
        last = f;
    }
    assert_eq!(falloff_t(1.0, 0.0), 1.0);
}

#[test]
fn test_damage_is_flat_but_knockback_attenuates() {
    let mut world = FakeWorld::default();
    let near = world.add(1, Vec2::new(0.5, 0.0), true, true);
    let far = world.add(2, Vec2::new(6.5, 0.0), true, true);

    let reports = resolve(&mut world, &grenade_blast(Vec2::ZERO, 7.0));
    assert_eq!(reports.len(), 2);

    // Flat damage: both take the full cap regardless of distance.
    assert_eq!(world.health[&near].current, 50);
    assert_eq!(world.health[&far].current, 50);
    assert_eq!(world.health[&near].last_source, Some(DamageSource::GrenadeExplosion));

    let near_push = world.bodies[&near].velocity;
    let far_push = world.bodies[&far].velocity;
    assert!(near_push.x > far_push.x, "knockback must fall off with distance");
    assert!(far_push.x > 0.0, "pushed away from the center");
    assert!((near_push.x - 12.0 * (1.0 - 0.5 / 7.0)).abs() < 1e-4);
}

#[test]
fn test_each_entity_hit_once_per_pass() {
    let mut world = FakeWorld::default();
    let entity = world.add(1, Vec2::new(1.0, 0.0), true, false);
    // Second collider on the same entity.
    let duplicate = world.candidates[0];
    world.candidates.push(duplicate);

    let reports = resolve(&mut world, &grenade_blast(Vec2::ZERO, 5.0));
    assert_eq!(reports.len(), 1);
    assert_eq!(world.health[&entity].current, 50);
}

#[test]
fn test_capabilities_are_independent() {
    let mut world = FakeWorld::default();
    let health_only = world.add(1, Vec2::new(1.0, 0.0), true, false);
    let body_only = world.add(2, Vec2::new(-1.0, 0.0), false, true);
    world.add(3, Vec2::new(0.0, 1.0), false, false);

    let reports = resolve(&mut world, &grenade_blast(Vec2::ZERO, 5.0));
    assert_eq!(reports.len(), 2);
    assert_eq!(world.health[&health_only].current, 50);
    assert!(world.bodies[&body_only].velocity.x < 0.0);

    let health_report = reports.iter().find(|r| r.entity == health_only).unwrap();
    assert_eq!(health_report.impulse, Vec2::ZERO);
    let body_report = reports.iter().find(|r| r.entity == body_only).unwrap();
    assert_eq!(body_report.damage, 0);
}

#[test]
fn test_zero_multipliers_apply_nothing() {
    let mut world = FakeWorld::default();
    let entity = world.add(1, Vec2::new(1.0, 0.0), true, true);

    let mut blast = grenade_blast(Vec2::ZERO, 5.0);
    blast.damage = 0.0;
    blast.knockback = 0.0;
    let reports = resolve(&mut world, &blast);

    assert!(reports.is_empty());
    assert_eq!(world.health[&entity].current, 100);
    assert_eq!(world.bodies[&entity].velocity, Vec2::ZERO);
}

#[test]
fn test_no_candidates_is_noop() {
    let mut world = FakeWorld::default();
    assert!(resolve(&mut world, &grenade_blast(Vec2::ZERO, 5.0)).is_empty());
}

#[test]
fn test_candidate_at_center_is_pushed_up() {
    let mut world = FakeWorld::default();
    let entity = world.add(1, Vec2::ZERO, false, true);
    resolve(&mut world, &grenade_blast(Vec2::ZERO, 5.0));
    let v = world.bodies[&entity].velocity;
    assert!(v.x.abs() < 1e-6);
    assert!((v.y - 12.0).abs() < 1e-4);
}

#[test]
fn test_arena_resolver_skips_triggers_excluded_and_masked() {
    let mut world = World::new();
    let enemy = world_setup::spawn_enemy(&mut world, Vec2::new(1.0, 0.5), Vec2::splat(0.5), 100);
    let hero = world_setup::spawn_hero(&mut world, Vec2::new(-1.0, 1.0), Vec2::new(0.4, 1.0), 100);
    let sensor = world.spawn((
        Transform {
            position: Vec2::new(0.0, 0.5),
            rotation: 0.0,
        },
        Collider {
            shape: ColliderShape::Circle { radius: 1.0 },
            layer: LayerMask::ENEMY,
            is_trigger: true,
        },
        Health {
            current: 100,
            max: 100,
            last_source: None,
        },
    ));
    let mut arena = Arena::new(world);

    let blast = grenade_blast(Vec2::ZERO, 5.0).excluding(entity_key(hero));
    resolve(&mut arena, &blast);
    assert_eq!(health_of(&arena, enemy), 50);
    assert_eq!(health_of(&arena, hero), 100, "excluded entity is skipped");
    assert_eq!(health_of(&arena, sensor), 100, "triggers are skipped");

    let mut blast = grenade_blast(Vec2::ZERO, 5.0);
    blast.mask = LayerMask::HERO;
    resolve(&mut arena, &blast);
    assert_eq!(health_of(&arena, enemy), 50, "masked out");
    assert_eq!(health_of(&arena, hero), 50);
}

#[test]
fn test_damage_rounds_scaled_cap() {
    let mut blast = grenade_blast(Vec2::ZERO, 1.0);
    blast.damage = 50.0 * 0.33;
    assert_eq!(blast.damage_amount(), 17);
    blast.damage = -3.0;
    assert_eq!(blast.damage_amount(), 0);
}

// ---------------------------------------------------------------------------
// Crater carving
// ---------------------------------------------------------------------------

#[test]
fn test_polygon_crater_scenario() {
    let (mut arena, terrain) = ground_arena();
    let mut carver = TerrainCraterCarver::default();
    let request = CarveRequest {
        center: Vec2::new(5.0, 0.0),
        radius: 2.0,
        depth: 1.0,
    };

    let mut services = TerrainServices {
        world: &mut arena,
        heightfield: None,
    };
    let outcome = carver.carve(&mut services, &request);
    assert_eq!(outcome, CarveOutcome::Applied);

    assert!((surface_y(&arena, terrain, 5.0) + 1.0).abs() < 1e-5);
    assert!((surface_y(&arena, terrain, 4.0) + 0.75).abs() < 1e-5);
    assert!((surface_y(&arena, terrain, 6.0) + 0.75).abs() < 1e-5);
    assert_eq!(surface_y(&arena, terrain, 3.0), 0.0);
    assert_eq!(surface_y(&arena, terrain, 7.0), 0.0);

    let piece = arena.world().get::<&TerrainPiece>(terrain).unwrap();
    let mesh = piece.mesh.as_ref().unwrap();
    assert!((mesh.top_row()[5].y + 1.0).abs() < 1e-5, "mesh follows the boundary");
    assert!(mesh.bounds_stale());
    assert_eq!(piece.collider_bounds(), piece.boundary.world_bounds());
}

#[test]
fn test_missing_heightfield_falls_back_and_warns_once() {
    let (mut arena, terrain) = ground_arena();
    let mut carver = TerrainCraterCarver::default();
    assert!(!carver.has_warned("heightfield"));

    for x in [3.0, 7.0] {
        let mut services = TerrainServices {
            world: &mut arena,
            heightfield: None,
        };
        let request = CarveRequest {
            center: Vec2::new(x, 0.0),
            radius: 1.5,
            depth: 0.5,
        };
        assert_eq!(carver.carve(&mut services, &request), CarveOutcome::Applied);
    }

    assert!(carver.has_warned("heightfield"));
    assert!(!carver.has_warned("polygon"));
    assert!(surface_y(&arena, terrain, 3.0) < 0.0);
    assert!(surface_y(&arena, terrain, 7.0) < 0.0);
}

#[test]
fn test_failing_heightfield_falls_back_to_polygon() {
    let (mut arena, terrain) = ground_arena();
    let mut carver = TerrainCraterCarver::default();
    let mut service = FailingHeightfield::default();
    let request = CarveRequest {
        center: Vec2::new(5.0, 0.0),
        radius: 2.0,
        depth: 1.0,
    };

    for _ in 0..3 {
        let mut services = TerrainServices {
            world: &mut arena,
            heightfield: Some(&mut service),
        };
        carver.carve(&mut services, &request);
    }

    // Tried on every carve, never retried within one.
    assert_eq!(service.calls, 3);
    assert!(carver.has_warned("heightfield"));
    // Floor clamp holds after repeated craters.
    assert!(surface_y(&arena, terrain, 5.0) >= -3.0 + 0.05 - 1e-5);
}

#[test]
fn test_heightfield_success_skips_polygon() {
    let (mut arena, terrain) = ground_arena();
    let before = top_points(&arena, terrain);
    let mut carver = TerrainCraterCarver::default();
    let mut field = flat_heightfield();

    let mut services = TerrainServices {
        world: &mut arena,
        heightfield: Some(&mut field),
    };
    let request = CarveRequest {
        center: Vec2::new(5.0, 0.0),
        radius: 2.0,
        depth: 1.0,
    };
    assert_eq!(carver.carve(&mut services, &request), CarveOutcome::Applied);

    assert!((field.heights()[5] + 1.0).abs() < 1e-5);
    assert_eq!(top_points(&arena, terrain), before);
    assert!(!carver.has_warned("heightfield"));
}

#[test]
fn test_uninitialized_heightfield_falls_back() {
    let (mut arena, terrain) = ground_arena();
    let mut carver = TerrainCraterCarver::default();
    let mut field = Heightfield::pending(
        HeightfieldHeader {
            origin_x: 0.0,
            cell_width: 1.0,
            floor: -3.0,
        },
        vec![0.0; 11],
        0.5,
    )
    .unwrap();

    let mut services = TerrainServices {
        world: &mut arena,
        heightfield: Some(&mut field),
    };
    let request = CarveRequest {
        center: Vec2::new(5.0, 0.0),
        radius: 2.0,
        depth: 1.0,
    };
    assert_eq!(carver.carve(&mut services, &request), CarveOutcome::Applied);
    assert!(field.heights().iter().all(|h| *h == 0.0));
    assert!(surface_y(&arena, terrain, 5.0) < 0.0);
}

#[test]
fn test_detonation_above_ground_snaps_to_surface() {
    let (mut arena, terrain) = ground_arena();
    let mut carver = TerrainCraterCarver::default();
    let mut services = TerrainServices {
        world: &mut arena,
        heightfield: None,
    };
    let request = CarveRequest {
        center: Vec2::new(5.0, 0.5),
        radius: 2.0,
        depth: 1.0,
    };
    assert_eq!(carver.carve(&mut services, &request), CarveOutcome::Applied);
    assert!((surface_y(&arena, terrain, 5.0) + 1.0).abs() < 1e-5);
}

#[test]
fn test_no_terrain_in_reach_is_not_applicable() {
    let (mut arena, terrain) = ground_arena();
    let before = top_points(&arena, terrain);
    let mut carver = TerrainCraterCarver::default();
    let mut services = TerrainServices {
        world: &mut arena,
        heightfield: None,
    };
    let request = CarveRequest {
        center: Vec2::new(5.0, 10.0),
        radius: 2.0,
        depth: 1.0,
    };
    assert_eq!(carver.carve(&mut services, &request), CarveOutcome::NotApplicable);
    assert_eq!(top_points(&arena, terrain), before, "bit-identical outline");
}

#[test]
fn test_carve_without_terrain_does_not_resync() {
    let mut world = FakeWorld::default();
    world.add(1, Vec2::ZERO, true, true);
    let mut carver = TerrainCraterCarver::default();
    let mut services = TerrainServices {
        world: &mut world,
        heightfield: None,
    };
    let request = CarveRequest {
        center: Vec2::ZERO,
        radius: 2.0,
        depth: 1.0,
    };
    assert_eq!(carver.carve(&mut services, &request), CarveOutcome::NotApplicable);
    assert_eq!(world.sync_calls, 0);
}

#[test]
fn test_random_craters_respect_floor_and_locality() {
    let (mut arena, terrain) = ground_arena();
    let mut carver = TerrainCraterCarver::default();
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    for _ in 0..40 {
        let request = CarveRequest {
            center: Vec2::new(rng.gen_range(1.0..9.0), rng.gen_range(-1.0..0.5)),
            radius: rng.gen_range(0.5..3.0),
            depth: rng.gen_range(0.1..6.0),
        };
        let before = top_points(&arena, terrain);
        let mut services = TerrainServices {
            world: &mut arena,
            heightfield: None,
        };
        carver.carve(&mut services, &request);
        let after = top_points(&arena, terrain);

        for (old, new) in before.iter().zip(&after) {
            assert_eq!(old.x, new.x, "carving never moves x");
            assert!(new.y <= old.y, "carving never raises terrain");
            if new.y < old.y {
                assert!(new.y >= -3.0 + 0.05 - 1e-5, "below floor margin: {}", new.y);
            }
        }
    }
}

#[test]
fn test_detonation_report_serializes() {
    let (mut arena, _) = ground_arena();
    let mut carver = TerrainCraterCarver::default();
    let mut fx = FxLog::default();
    let mut explosive = make_explosive(ExplosiveKind::Grenade, &ExplosionTuning::grenade(), true);

    let report = ExplosionTrigger::new(&mut arena, None, &mut carver, &mut fx)
        .detonate(&mut explosive, Vec2::new(5.0, 0.0), 1.0)
        .unwrap();
    let json = serde_json::to_string(&report.to_event()).unwrap();
    assert!(json.contains("\"type\":\"Detonated\""));
    assert!(json.contains("\"carve\":\"Applied\""));
}

// ---------------------------------------------------------------------------
// Trigger
// ---------------------------------------------------------------------------

#[test]
fn test_sizing_clamps() {
    assert!((blast_radius(2.0, 3.5) - 7.0).abs() < 1e-6);
    assert!((crater_depth(2.0, 0.5) - 1.0).abs() < 1e-6);
    assert_eq!(blast_radius(1.0, 0.0), 0.25);
    assert_eq!(crater_depth(1.0, -1.0), 0.05);
    assert!((blast_radius(100.0, 0.0) - 1.0).abs() < 1e-6, "multiplier floor 0.01");
}

#[test]
fn test_detonation_applies_damage_then_crater_then_effect() {
    let (mut arena, terrain) = ground_arena();
    let enemy = world_setup::spawn_enemy(arena.world_mut(), Vec2::new(6.0, 0.75), Vec2::new(0.4, 0.75), 80);
    let mut carver = TerrainCraterCarver::default();
    let mut fx = FxLog::default();
    let mut explosive = make_explosive(ExplosiveKind::Grenade, &ExplosionTuning::grenade(), true);

    let report = ExplosionTrigger::new(&mut arena, None, &mut carver, &mut fx)
        .detonate(&mut explosive, Vec2::new(5.0, 0.15), 2.0)
        .expect("first detonation fires");

    assert!((report.radius - 7.0).abs() < 1e-5);
    assert!((report.depth - 1.0).abs() < 1e-5);
    assert_eq!(report.carve, Some(CarveOutcome::Applied));
    assert_eq!(report.hits.len(), 1);
    assert_eq!(health_of(&arena, enemy), 30);
    assert!(surface_y(&arena, terrain, 5.0) < -0.9);

    assert_eq!(fx.events().len(), 1);
    let effect = fx.events()[0];
    assert!(!effect.prefab);
    assert!((effect.diameter - 14.0).abs() < 1e-5);
    assert_eq!(report.effect, effect);
}

#[test]
fn test_double_detonation_applies_once() {
    let (mut arena, terrain) = ground_arena();
    let enemy = world_setup::spawn_enemy(arena.world_mut(), Vec2::new(5.0, 0.75), Vec2::new(0.4, 0.75), 100);
    let mut carver = TerrainCraterCarver::default();
    let mut fx = FxLog::default();
    let mut explosive = make_explosive(ExplosiveKind::Grenade, &ExplosionTuning::grenade(), true);

    let mut trigger = ExplosionTrigger::new(&mut arena, None, &mut carver, &mut fx);
    assert!(trigger.detonate(&mut explosive, Vec2::new(5.0, 0.0), 1.0).is_some());
    assert!(trigger.detonate(&mut explosive, Vec2::new(5.0, 0.0), 1.0).is_none());
    drop(trigger);

    assert!(explosive.detonated);
    assert_eq!(health_of(&arena, enemy), 50);
    assert_eq!(fx.events().len(), 1);
    let once = surface_y(&arena, terrain, 5.0);
    assert!((once + 0.5).abs() < 1e-5, "one crater of depth 0.5, got {once}");
}

#[test]
fn test_cosmetic_detonation_only_spawns_effect() {
    let (mut arena, terrain) = ground_arena();
    let enemy = world_setup::spawn_enemy(arena.world_mut(), Vec2::new(5.0, 0.75), Vec2::new(0.4, 0.75), 100);
    let before = top_points(&arena, terrain);
    let mut carver = TerrainCraterCarver::default();
    let mut fx = FxLog::default();
    let mut explosive = make_explosive(ExplosiveKind::Grenade, &ExplosionTuning::grenade(), false);

    let report = ExplosionTrigger::new(&mut arena, None, &mut carver, &mut fx)
        .on_layer(SortingLayer::Foreground)
        .detonate(&mut explosive, Vec2::new(5.0, 0.0), 1.0)
        .unwrap();

    assert!(report.hits.is_empty());
    assert_eq!(report.carve, None);
    assert_eq!(health_of(&arena, enemy), 100);
    assert_eq!(velocity_of(&arena, enemy), Vec2::ZERO);
    assert_eq!(top_points(&arena, terrain), before);
    assert_eq!(fx.events().len(), 1);
    assert_eq!(fx.events()[0].layer, SortingLayer::Foreground);
    assert!(!carver.has_warned("heightfield"), "no carve attempted");
}

#[test]
fn test_prefab_replaces_basic_effect() {
    let (mut arena, _) = ground_arena();
    let mut carver = TerrainCraterCarver::default();
    let mut fx = FxLog::with_prefabs(["fx/grenade_explosion"]);
    let mut explosive = make_explosive(ExplosiveKind::Grenade, &ExplosionTuning::grenade(), true);

    ExplosionTrigger::new(&mut arena, None, &mut carver, &mut fx)
        .detonate(&mut explosive, Vec2::new(5.0, 0.0), 1.0)
        .unwrap();

    assert_eq!(fx.events().len(), 1);
    assert!(fx.events()[0].prefab);
}

#[test]
fn test_prefab_is_looked_up_by_profile_key() {
    let mut fx = FxLog::with_prefabs(["fx/hero_death_burst"]);

    let burst = spawn_effect(
        &mut fx,
        ExplosiveKind::HeroDeathBurst,
        Vec2::ZERO,
        8.0,
        SortingLayer::Effects,
    );
    let grenade = spawn_effect(
        &mut fx,
        ExplosiveKind::Grenade,
        Vec2::ZERO,
        14.0,
        SortingLayer::Foreground,
    );

    assert!(burst.prefab);
    assert!(!grenade.prefab, "no prefab registered under the grenade key");
    assert_eq!(fx.events()[1].layer, SortingLayer::Foreground);
}

#[test]
fn test_bad_reference_height_uses_default() {
    let (mut arena, _) = ground_arena();
    let mut carver = TerrainCraterCarver::default();
    let mut fx = FxLog::default();
    let mut explosive = make_explosive(ExplosiveKind::Grenade, &ExplosionTuning::grenade(), false);

    let report = ExplosionTrigger::new(&mut arena, None, &mut carver, &mut fx)
        .detonate(&mut explosive, Vec2::ZERO, f32::NAN)
        .unwrap();
    assert!((report.radius - 3.5).abs() < 1e-6);
}

// ---------------------------------------------------------------------------
// Engine scenarios
// ---------------------------------------------------------------------------

fn engine_with_ground() -> (MatchEngine, Entity, Entity, Entity) {
    let mut world = World::new();
    let piece = world_setup::flat_ground(-20.0, 20.0, 81, 0.0, -3.0).unwrap();
    let terrain = world_setup::spawn_terrain(&mut world, piece);
    let hero = world_setup::spawn_hero(&mut world, Vec2::new(-15.0, 1.0), Vec2::new(0.4, 1.0), 100);
    let enemy = world_setup::spawn_enemy(&mut world, Vec2::new(4.0, 0.75), Vec2::new(0.4, 0.75), 60);
    let engine = MatchEngine::new(MatchConfig::default(), Arena::new(world));
    (engine, terrain, hero, enemy)
}

fn run_until<F: FnMut(&MatchEvent) -> bool>(engine: &mut MatchEngine, max_ticks: usize, mut pred: F) -> Vec<MatchEvent> {
    let mut all = Vec::new();
    for _ in 0..max_ticks {
        let events = engine.tick();
        let done = events.iter().any(&mut pred);
        all.extend(events);
        if done {
            break;
        }
    }
    all
}

#[test]
fn test_reference_height_from_hero_bounds() {
    let (engine, ..) = engine_with_ground();
    assert!((engine.reference_height() - 2.0).abs() < 1e-6);
    assert!((blast_radius(engine.reference_height(), 3.5) - 7.0).abs() < 1e-6);
}

#[test]
fn test_reference_height_fixed_and_fallback() {
    let config = MatchConfig {
        reference_height: ReferenceHeight::Fixed(1.5),
        ..MatchConfig::default()
    };
    let engine = MatchEngine::new(config, Arena::default());
    assert!((engine.reference_height() - 1.5).abs() < 1e-6);

    let engine = MatchEngine::new(MatchConfig::default(), Arena::default());
    assert_eq!(engine.reference_height(), 1.0, "no hero resolves to the default");
}

#[test]
fn test_grenade_lands_rolls_and_detonates_at_current_position() {
    let (mut engine, terrain, _hero, enemy) = engine_with_ground();
    let grenade = engine.throw_grenade(Vec2::new(0.0, 2.0), Vec2::new(1.0, 0.0));

    let events = run_until(&mut engine, 600, |e| matches!(e, MatchEvent::Detonated { .. }));

    let landing = events
        .iter()
        .find_map(|e| match e {
            MatchEvent::ProjectileLanded { entity, point } if *entity == grenade => Some(*point),
            _ => None,
        })
        .expect("grenade lands");
    assert!(landing.y.abs() < 1e-3, "landed on the surface: {landing:?}");

    let (point, radius, carve, hits) = events
        .iter()
        .find_map(|e| match e {
            MatchEvent::Detonated {
                point,
                radius,
                carve,
                hits,
                ..
            } => Some((*point, *radius, *carve, hits.clone())),
            _ => None,
        })
        .expect("grenade detonates");

    assert!(point.x > landing.x + 0.05, "rolled before detonating: {landing:?} -> {point:?}");
    assert!((radius - 7.0).abs() < 1e-5);
    assert_eq!(carve, Some(CarveOutcome::Applied));
    assert!(hits.iter().any(|h| h.entity == entity_key(enemy)));
    assert_eq!(health_of(engine.arena(), enemy), 10);
    assert!(events.iter().any(|e| matches!(
        e,
        MatchEvent::ProjectileFinished {
            termination: Termination::Detonated,
            ..
        }
    )));
    assert!(events.iter().any(|e| matches!(e, MatchEvent::Effect(fx) if !fx.prefab)));

    let piece = engine.arena().world().get::<&TerrainPiece>(terrain).unwrap();
    let deepest = piece.boundary.points()[..piece.boundary.top_surface_len()]
        .iter()
        .map(|p| p.y)
        .fold(f32::INFINITY, f32::min);
    assert!(deepest < -0.9, "crater carved, deepest {deepest}");
    drop(piece);

    // One tick of grace, then the projectile is gone.
    let grenade_entity = crate::arena::key_entity(grenade).unwrap();
    assert!(engine.arena().world().contains(grenade_entity));
    engine.tick();
    engine.tick();
    assert!(!engine.arena().world().contains(grenade_entity));
}

#[test]
fn test_grenade_spins_only_in_flight() {
    let (mut engine, ..) = engine_with_ground();
    let grenade = engine.throw_grenade(Vec2::new(0.0, 1.0), Vec2::ZERO);
    let entity = crate::arena::key_entity(grenade).unwrap();

    engine.tick();
    let rotation = engine.arena().world().get::<&Transform>(entity).unwrap().rotation;
    assert!(rotation > 0.0);

    run_until(&mut engine, 120, |e| matches!(e, MatchEvent::ProjectileLanded { .. }));
    let landed = engine.arena().world().get::<&Transform>(entity).unwrap().rotation;
    for _ in 0..10 {
        engine.tick();
    }
    let later = engine.arena().world().get::<&Transform>(entity).unwrap().rotation;
    assert_eq!(landed, later);
}

#[test]
fn test_grenade_settles_on_walkable_slope() {
    let mut world = World::new();
    let rise = 20.0 * 10f32.to_radians().tan();
    let piece = world_setup::sloped_ground(0.0, 20.0, 41, 0.0, rise, -3.0).unwrap();
    world_setup::spawn_terrain(&mut world, piece);
    let mut engine = MatchEngine::new(MatchConfig::default(), Arena::new(world));

    let start_y = rise * 0.5 + 0.4;
    let grenade = engine.throw_grenade(Vec2::new(10.0, start_y), Vec2::ZERO);
    let entity = crate::arena::key_entity(grenade).unwrap();
    run_until(&mut engine, 120, |e| matches!(e, MatchEvent::ProjectileLanded { .. }));

    let landed_x = engine.arena().world().get::<&Transform>(entity).unwrap().position.x;
    for _ in 0..120 {
        engine.tick();
    }
    let later_x = engine.arena().world().get::<&Transform>(entity).unwrap().position.x;
    assert!((later_x - landed_x).abs() < 0.2, "crept {} on a walkable slope", later_x - landed_x);
}

#[test]
fn test_heavy_grenade_settles_on_walkable_slope() {
    let mut world = World::new();
    let rise = 20.0 * 10f32.to_radians().tan();
    let piece = world_setup::sloped_ground(0.0, 20.0, 41, 0.0, rise, -3.0).unwrap();
    world_setup::spawn_terrain(&mut world, piece);
    let mut engine = MatchEngine::new(MatchConfig::default(), Arena::new(world));
    assert!((engine.config().grenade.mass - 4.0).abs() > 1.0);

    let grenade = engine.throw_grenade(Vec2::new(10.0, rise * 0.5 + 0.4), Vec2::ZERO);
    let entity = crate::arena::key_entity(grenade).unwrap();
    engine
        .arena_mut()
        .world_mut()
        .get::<&mut Body>(entity)
        .unwrap()
        .set_mass(4.0);
    run_until(&mut engine, 120, |e| matches!(e, MatchEvent::ProjectileLanded { .. }));

    let landed_x = engine.arena().world().get::<&Transform>(entity).unwrap().position.x;
    for _ in 0..120 {
        engine.tick();
    }
    let later_x = engine.arena().world().get::<&Transform>(entity).unwrap().position.x;
    assert!((later_x - landed_x).abs() < 0.2, "crept {} with a heavier body", later_x - landed_x);
}

#[test]
fn test_grenade_slides_down_steep_slope() {
    let mut world = World::new();
    let piece = world_setup::sloped_ground(0.0, 10.0, 21, 0.0, 10.0, -3.0).unwrap();
    world_setup::spawn_terrain(&mut world, piece);
    let mut engine = MatchEngine::new(MatchConfig::default(), Arena::new(world));

    let grenade = engine.throw_grenade(Vec2::new(7.0, 7.5), Vec2::ZERO);
    let entity = crate::arena::key_entity(grenade).unwrap();
    run_until(&mut engine, 120, |e| matches!(e, MatchEvent::ProjectileLanded { .. }));

    let landed = engine.arena().world().get::<&Transform>(entity).unwrap().position;
    for _ in 0..30 {
        engine.tick();
    }
    let later = engine.arena().world().get::<&Transform>(entity).unwrap().position;
    assert!(later.x < landed.x - 0.2, "slid from {landed:?} to {later:?}");
    assert!(later.y < landed.y);
}

#[test]
fn test_grenade_that_never_lands_is_a_dud() {
    let mut engine = MatchEngine::new(MatchConfig::default(), Arena::default());
    let grenade = engine.throw_grenade(Vec2::ZERO, Vec2::new(3.0, 5.0));

    let events = run_until(&mut engine, 1000, |e| matches!(e, MatchEvent::ProjectileFinished { .. }));
    assert!(events.iter().any(|e| *e
        == MatchEvent::ProjectileFinished {
            entity: grenade,
            termination: Termination::TimedOut,
        }));
    assert!(!events.iter().any(|e| matches!(e, MatchEvent::Detonated { .. })));
    assert!(!engine
        .arena()
        .world()
        .contains(crate::arena::key_entity(grenade).unwrap()));
}

#[test]
fn test_force_remove_has_no_side_effects() {
    let (mut engine, terrain, _hero, enemy) = engine_with_ground();
    let before = top_points(engine.arena(), terrain);
    let grenade = engine.throw_grenade(Vec2::new(4.0, 0.5), Vec2::ZERO);
    run_until(&mut engine, 60, |e| matches!(e, MatchEvent::ProjectileLanded { .. }));

    engine.queue_command(MatchCommand::ForceRemove { entity: grenade });
    let mut events = engine.tick();
    for _ in 0..300 {
        events.extend(engine.tick());
    }

    assert!(events.contains(&MatchEvent::ProjectileFinished {
        entity: grenade,
        termination: Termination::ForcedRemoval,
    }));
    assert!(!events.iter().any(|e| matches!(e, MatchEvent::Detonated { .. } | MatchEvent::Effect(_))));
    assert_eq!(health_of(engine.arena(), enemy), 60);
    assert_eq!(top_points(engine.arena(), terrain), before);
}

#[test]
fn test_echo_explosion_is_visual_only() {
    let (mut engine, terrain, _hero, enemy) = engine_with_ground();
    let before = top_points(engine.arena(), terrain);

    engine.queue_command(MatchCommand::EchoExplosion {
        point: Vec2::new(4.0, 0.0),
        kind: ExplosiveKind::Grenade,
    });
    let events = engine.tick();

    assert!(events.iter().any(|e| matches!(
        e,
        MatchEvent::Detonated {
            gameplay_enabled: false,
            carve: None,
            ..
        }
    )));
    assert!(events.iter().any(|e| matches!(e, MatchEvent::Effect(_))));
    assert_eq!(health_of(engine.arena(), enemy), 60);
    assert_eq!(top_points(engine.arena(), terrain), before);
}

#[test]
fn test_hero_death_burst_is_weaker_and_spares_the_hero() {
    let mut world = World::new();
    let piece = world_setup::flat_ground(-20.0, 20.0, 81, 0.0, -3.0).unwrap();
    world_setup::spawn_terrain(&mut world, piece);
    let hero = world_setup::spawn_hero(&mut world, Vec2::new(0.0, 1.0), Vec2::new(0.4, 1.0), 100);
    let enemy = world_setup::spawn_enemy(&mut world, Vec2::new(2.0, 0.75), Vec2::new(0.4, 0.75), 60);
    let mut engine = MatchEngine::new(MatchConfig::default(), Arena::new(world));

    engine.queue_command(MatchCommand::HeroDied {
        entity: entity_key(hero),
    });
    let events = engine.tick();

    let (kind, radius) = events
        .iter()
        .find_map(|e| match e {
            MatchEvent::Detonated { kind, radius, .. } => Some((*kind, *radius)),
            _ => None,
        })
        .expect("death burst detonates");
    assert_eq!(kind, ExplosiveKind::HeroDeathBurst);
    assert!((radius - 4.0).abs() < 1e-5);
    assert_eq!(health_of(engine.arena(), enemy), 35);
    assert_eq!(health_of(engine.arena(), hero), 100);
}

#[test]
fn test_reset_match_removes_projectiles() {
    let (mut engine, ..) = engine_with_ground();
    let a = engine.throw_grenade(Vec2::new(-2.0, 3.0), Vec2::ZERO);
    let b = engine.throw_grenade(Vec2::new(2.0, 3.0), Vec2::ZERO);
    for _ in 0..5 {
        engine.tick();
    }

    engine.queue_command(MatchCommand::ResetMatch);
    let events = engine.tick();

    for key in [a, b] {
        assert!(events.contains(&MatchEvent::ProjectileFinished {
            entity: key,
            termination: Termination::ForcedRemoval,
        }));
        assert!(!engine
            .arena()
            .world()
            .contains(crate::arena::key_entity(key).unwrap()));
    }
    assert_eq!(engine.time().tick, 1);
}

#[test]
fn test_reset_match_rearms_carve_warnings() {
    let (mut engine, _terrain, hero, _enemy) = engine_with_ground();
    engine.queue_command(MatchCommand::HeroDied {
        entity: entity_key(hero),
    });
    engine.tick();
    assert!(engine.carver().has_warned("heightfield"));

    engine.queue_command(MatchCommand::ResetMatch);
    engine.tick();
    assert!(!engine.carver().has_warned("heightfield"));
}

#[test]
fn test_engine_with_heightfield_carves_it_first() {
    let (engine, terrain, ..) = engine_with_ground();
    let header = HeightfieldHeader {
        origin_x: -20.0,
        cell_width: 0.5,
        floor: -3.0,
    };
    // Built flat-carving; the engine applies the configured ratio.
    let field = Heightfield::new(header, vec![0.0; 81], 0.0).unwrap();
    let mut engine = engine.with_heightfield(field);
    let ratio = engine.config().heightfield_depth_ratio;
    assert!(ratio > 0.0);
    assert_eq!(engine.heightfield().unwrap().depth_ratio(), ratio);
    let before = top_points(engine.arena(), terrain);

    engine.throw_grenade(Vec2::new(0.0, 0.5), Vec2::ZERO);
    let events = run_until(&mut engine, 400, |e| matches!(e, MatchEvent::Detonated { .. }));
    assert!(events.iter().any(|e| matches!(
        e,
        MatchEvent::Detonated {
            carve: Some(CarveOutcome::Applied),
            ..
        }
    )));
    assert!(engine.heightfield().unwrap().heights().iter().any(|h| *h < 0.0));
    assert_eq!(top_points(engine.arena(), terrain), before);
    assert!(!engine.carver().has_warned("heightfield"));
}
