//! The `Game` struct: world construction, system ordering, and the tick.

use bevy_ecs::event::EventRegistry;
use bevy_ecs::schedule::IntoScheduleConfigs;
use bevy_ecs::{entity::Entity, schedule::Schedule, world::World};
use glam::Vec2;

use crate::ability::{enemy_ability_system, AbilityRuntime};
use crate::arena::Arena;
use crate::config::Roster;
use crate::constants::PLAYER_MAX_HEALTH;
use crate::error::{GameError, GameResult};
use crate::events::{
    AbilityActivated, AbilityEnded, DamageEvent, DeathEvent, GateEvent, ProjectileRequest,
    SightEvent, SpawnRequest, SpawnedEvent, StateChanged, WaveEvent,
};
use crate::pool::{PoolId, Pools};
use crate::sequence::{sequence_system, Sequencer};
use crate::systems::projectile::projectile_prefab;
use crate::systems::{
    agent_system, attack_range_system, behavior_system, damage_system, damager_system,
    dash_system, game_over_system, gate_system, healthbar_system, locomotion_system, music_system,
    player_ability_system, player_control_system, projectile_fire_system, projectile_system,
    sight_system, spawn_area_system, spawn_explosion_trap, spawn_fire_trap, spawn_turret,
    trap_system, turret_system, AnimationState, Capabilities, Collider, CollisionLayer, DeltaTime,
    EntityKind, Feedbacks, GameState, Gate, Health, InputState, MusicDirector, PlayerControlled,
    SpawnArea, Spawner, TracingFeedback, Transform,
};

/// The simulation: a `World` plus the fixed system order, ticked once per
/// frame. All state lives in the world; dropping the `Game` (or calling
/// [`Game::teardown`]) ends the session, and nothing persists past it.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
    pub player: Entity,
    turret_projectiles: PoolId,
}

impl Game {
    pub fn new(layout: &[&str]) -> GameResult<Game> {
        let mut world = World::default();
        let mut schedule = Schedule::default();

        EventRegistry::register_event::<GameError>(&mut world);
        EventRegistry::register_event::<SightEvent>(&mut world);
        EventRegistry::register_event::<StateChanged>(&mut world);
        EventRegistry::register_event::<DamageEvent>(&mut world);
        EventRegistry::register_event::<DeathEvent>(&mut world);
        EventRegistry::register_event::<SpawnedEvent>(&mut world);
        EventRegistry::register_event::<AbilityActivated>(&mut world);
        EventRegistry::register_event::<AbilityEnded>(&mut world);
        EventRegistry::register_event::<WaveEvent>(&mut world);
        EventRegistry::register_event::<GateEvent>(&mut world);
        EventRegistry::register_event::<SpawnRequest>(&mut world);
        EventRegistry::register_event::<ProjectileRequest>(&mut world);

        let arena = Arena::parse(layout)?;
        let player_start = arena.player_start();
        let roster = Roster::default();

        let mut pools = Pools::default();
        let (spawner, turret_projectiles) = {
            let mut commands = world.commands();
            let spawner = Spawner::setup(&roster, &mut pools, &mut commands);
            let turret_projectiles =
                pools.create("turret-shot", 5, projectile_prefab(), &mut commands);
            (spawner, turret_projectiles)
        };
        world.flush();

        let player = world
            .spawn((
                PlayerControlled,
                EntityKind::Player,
                Transform::at(player_start),
                Capabilities::all(),
                AnimationState::default(),
                Health::new(PLAYER_MAX_HEALTH),
                Collider { radius: 0.4 },
                CollisionLayer::PLAYER,
                AbilityRuntime::default(),
            ))
            .id();
        let music_channel = world.spawn_empty().id();

        world.insert_resource(arena);
        world.insert_resource(roster);
        world.insert_resource(pools);
        world.insert_resource(spawner);
        world.insert_resource(Sequencer::default());
        world.insert_resource(GameState::default());
        world.insert_resource(InputState::default());
        world.insert_resource(DeltaTime {
            seconds: 0.0,
            ticks: 0,
        });
        world.insert_resource(MusicDirector::new(music_channel));
        world.insert_resource(Feedbacks(Box::new(TracingFeedback)));

        schedule.add_systems(
            (
                (
                    player_control_system,
                    player_ability_system,
                    sequence_system,
                    sight_system,
                    attack_range_system,
                    behavior_system,
                )
                    .chain(),
                (
                    locomotion_system,
                    agent_system,
                    dash_system,
                    enemy_ability_system,
                    turret_system,
                    trap_system,
                )
                    .chain(),
                (
                    damager_system,
                    projectile_fire_system,
                    projectile_system,
                    damage_system,
                    healthbar_system,
                )
                    .chain(),
                (
                    spawn_area_system,
                    gate_system,
                    music_system,
                    game_over_system,
                    bevy_ecs::event::event_update_system,
                )
                    .chain(),
            )
                .chain(),
        );

        Ok(Game {
            world,
            schedule,
            player,
            turret_projectiles,
        })
    }

    /// Adds a spawn area; wave areas usually pair with [`Game::add_gate`].
    pub fn add_spawn_area(&mut self, area: SpawnArea) -> Entity {
        self.world.spawn(area).id()
    }

    /// Adds a barrier observing `area`'s gate signal.
    pub fn add_gate(&mut self, area: Entity, position: Vec2) -> Entity {
        self.world
            .spawn((Transform::at(position), Gate { area, open: true }))
            .id()
    }

    pub fn add_turret(&mut self, position: Vec2) -> Entity {
        spawn_turret(&mut self.world, position, self.turret_projectiles)
    }

    pub fn add_fire_trap(&mut self, position: Vec2) -> Entity {
        spawn_fire_trap(&mut self.world, position)
    }

    pub fn add_explosion_trap(&mut self, position: Vec2) -> Entity {
        spawn_explosion_trap(&mut self.world, position)
    }

    /// Ticks the simulation once.
    ///
    /// Returns true when the session asked to wind down (game over handled,
    /// pools torn down).
    pub fn tick(&mut self, dt: f32) -> bool {
        self.world.insert_resource(DeltaTime {
            seconds: dt,
            ticks: 1,
        });
        self.schedule.run(&mut self.world);
        self.world
            .get_resource::<GameState>()
            .map(|state| state.exit)
            .unwrap_or(true)
    }

    /// Destroys every pooled instance. Outstanding entity ids are invalid
    /// afterwards.
    pub fn teardown(&mut self) {
        if let Some(mut pools) = self.world.remove_resource::<Pools>() {
            pools.teardown(&mut self.world);
        }
    }
}
