//! Match engine: owns the arena and runs one combat match.
//!
//! `MatchEngine` processes queued commands, runs the systems in a fixed
//! order each tick and returns the events they produced. The crater
//! carver lives here so its warned-once state spans the whole session.

use std::collections::{HashSet, VecDeque};

use hecs::Entity;

use crater_core::commands::MatchCommand;
use crater_core::components::{Explosive, Expiring, Hero, Projectile, Transform};
use crater_core::config::{MatchConfig, ReferenceHeight};
use crater_core::constants::{DEFAULT_REFERENCE_HEIGHT, DESTROY_GRACE_TICKS};
use crater_core::enums::{ExplosiveKind, ProjectilePhase, Termination};
use crater_core::events::MatchEvent;
use crater_core::types::{EntityKey, SimTime, Vec2};
use crater_projectile::profiles::make_explosive;
use crater_terrain::{Heightfield, HeightfieldService};

use crate::arena::{entity_key, key_entity, Arena};
use crate::carving::TerrainCraterCarver;
use crate::ports::{FxLog, SpatialQuery};
use crate::systems;
use crate::trigger::{sanitize_reference_height, ExplosionTrigger};
use crate::world_setup;

/// The match engine. Owns the arena and all per-session state.
pub struct MatchEngine {
    arena: Arena,
    heightfield: Option<Heightfield>,
    carver: TerrainCraterCarver,
    config: MatchConfig,
    time: SimTime,
    command_queue: VecDeque<MatchCommand>,
    forced: HashSet<Entity>,
    despawn_buffer: Vec<Entity>,
    fx: FxLog,
    events: Vec<MatchEvent>,
}

impl MatchEngine {
    /// Create an engine over an already populated arena.
    pub fn new(config: MatchConfig, arena: Arena) -> Self {
        tracing::info!("match started");
        Self {
            arena,
            heightfield: None,
            carver: TerrainCraterCarver::default(),
            config,
            time: SimTime::default(),
            command_queue: VecDeque::new(),
            forced: HashSet::new(),
            despawn_buffer: Vec::new(),
            fx: FxLog::default(),
            events: Vec::new(),
        }
    }

    /// Attach a heightfield; craters then go to it before polygon terrain.
    /// Its crater depth ratio comes from the match config.
    pub fn with_heightfield(mut self, mut heightfield: Heightfield) -> Self {
        heightfield.set_depth_ratio(self.config.heightfield_depth_ratio);
        self.heightfield = Some(heightfield);
        self
    }

    /// Replace the effect sink, e.g. to report rich prefabs.
    pub fn with_effects(mut self, fx: FxLog) -> Self {
        self.fx = fx;
        self
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: MatchCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = MatchCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the match by one tick and return the events it produced.
    pub fn tick(&mut self) -> Vec<MatchEvent> {
        self.process_commands();
        self.run_systems();
        self.time.advance();
        std::mem::take(&mut self.events)
    }

    /// Spawn a grenade in flight right away.
    pub fn throw_grenade(&mut self, position: Vec2, velocity: Vec2) -> EntityKey {
        let entity = world_setup::spawn_grenade(
            self.arena.world_mut(),
            &self.config.grenade,
            &self.config.grenade_explosion,
            position,
            velocity,
        );
        tracing::debug!(?entity, x = position.x, y = position.y, "grenade thrown");
        entity_key(entity)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn heightfield(&self) -> Option<&Heightfield> {
        self.heightfield.as_ref()
    }

    pub fn carver(&self) -> &TerrainCraterCarver {
        &self.carver
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: MatchCommand) {
        match command {
            MatchCommand::ThrowGrenade { position, velocity } => {
                self.throw_grenade(position, velocity);
            }
            MatchCommand::HeroDied { entity } => {
                let Some(position) = self.position_of(entity) else {
                    tracing::debug!(?entity, "dead hero has no position, no death burst");
                    return;
                };
                let mut explosive =
                    make_explosive(ExplosiveKind::HeroDeathBurst, &self.config.death_burst, true);
                self.fire(&mut explosive, position, Some(entity));
            }
            MatchCommand::EchoExplosion { point, kind } => {
                let mut explosive = make_explosive(kind, self.config.explosion(kind), false);
                self.fire(&mut explosive, point, None);
            }
            MatchCommand::ForceRemove { entity } => {
                if let Some(entity) = key_entity(entity) {
                    self.forced.insert(entity);
                }
            }
            MatchCommand::ResetMatch => self.reset(),
        }
    }

    /// Remove every projectile without effects, restart the clock and let
    /// carve fallbacks warn again. Terrain and actors are kept.
    fn reset(&mut self) {
        let projectiles: Vec<(Entity, ProjectilePhase)> = self
            .arena
            .world()
            .query::<&Projectile>()
            .iter()
            .map(|(entity, projectile)| (entity, projectile.phase))
            .collect();

        for (entity, phase) in projectiles {
            if phase != ProjectilePhase::Exploded {
                self.events.push(MatchEvent::ProjectileFinished {
                    entity: entity_key(entity),
                    termination: Termination::ForcedRemoval,
                });
            }
            let _ = self.arena.world_mut().despawn(entity);
        }

        self.forced.clear();
        self.carver.reset_warnings();
        self.time = SimTime::default();
        tracing::info!("match reset");
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let dt = self.time.dt();
        // 1. Integrate forces and gravity
        systems::movement::run(self.arena.world_mut(), self.config.gravity, dt);
        // 2. Terrain contacts
        let contacts = systems::contacts::run(self.arena.world_mut());
        // 3. Projectile lifecycle (landing, spin, resting, fuse)
        let forced = std::mem::take(&mut self.forced);
        let outcome = systems::projectile::run(
            &mut self.arena,
            &self.config.grenade,
            self.config.gravity,
            dt,
            &contacts,
            &forced,
            &mut self.events,
        );
        // 4. Detonations, one at a time
        for entity in outcome.detonate {
            self.detonate_projectile(entity);
        }
        // 5. Duds and forced removals leave immediately
        for entity in outcome.remove {
            let _ = self.arena.world_mut().despawn(entity);
        }
        // 6. Cleanup (grace periods)
        systems::cleanup::run(self.arena.world_mut(), &mut self.despawn_buffer);
    }

    /// Detonate a projectile at its current position and schedule removal.
    fn detonate_projectile(&mut self, entity: Entity) {
        let world = self.arena.world();
        let Ok(position) = world.get::<&Transform>(entity).map(|t| t.position) else {
            return;
        };
        let Ok(mut explosive) = world.get::<&Explosive>(entity).map(|e| (*e).clone()) else {
            return;
        };

        self.fire(&mut explosive, position, Some(entity_key(entity)));

        let world = self.arena.world_mut();
        if let Ok(mut stored) = world.get::<&mut Explosive>(entity) {
            *stored = explosive;
        }
        let _ = world.insert_one(
            entity,
            Expiring {
                ticks_remaining: DESTROY_GRACE_TICKS,
            },
        );
    }

    /// Build a trigger over the session's handles and fire `explosive`.
    fn fire(&mut self, explosive: &mut Explosive, point: Vec2, exclude: Option<EntityKey>) {
        let reference_height = self.reference_height();
        let layer = self.config.explosion(explosive.kind).sorting_layer;
        let heightfield = self
            .heightfield
            .as_mut()
            .map(|h| h as &mut dyn HeightfieldService);

        let mut trigger =
            ExplosionTrigger::new(&mut self.arena, heightfield, &mut self.carver, &mut self.fx)
                .on_layer(layer);
        if let Some(entity) = exclude {
            trigger = trigger.excluding(entity);
        }

        if let Some(report) = trigger.detonate(explosive, point, reference_height) {
            self.events.push(report.to_event());
        }
        self.events
            .extend(self.fx.drain().into_iter().map(MatchEvent::Effect));
    }

    /// Height that scales explosion size, from the configured source.
    pub fn reference_height(&self) -> f32 {
        let entity = match self.config.reference_height {
            ReferenceHeight::Fixed(height) => return sanitize_reference_height(height),
            ReferenceHeight::Entity(key) => Some(key),
            ReferenceHeight::Hero => self
                .arena
                .world()
                .query::<&Hero>()
                .iter()
                .next()
                .map(|(entity, _)| entity_key(entity)),
        };
        entity
            .and_then(|key| self.arena.bounds_of(key))
            .map(|bounds| sanitize_reference_height(bounds.height()))
            .unwrap_or(DEFAULT_REFERENCE_HEIGHT)
    }

    fn position_of(&self, key: EntityKey) -> Option<Vec2> {
        let entity = key_entity(key)?;
        let position = self.arena.world().get::<&Transform>(entity).ok()?.position;
        Some(position)
    }
}
