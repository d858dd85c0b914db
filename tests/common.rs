#![allow(dead_code)]

use bevy_ecs::{
    entity::Entity,
    event::{Event, Events, EventWriter},
    system::{Commands, Res, ResMut, RunSystemOnce},
    world::World,
};
use glam::Vec2;
use smallvec::smallvec;

use ruin::ability::AbilityRuntime;
use ruin::arena::Arena;
use ruin::config::Roster;
use ruin::error::{GameError, GameResult};
use ruin::events::{
    AbilityActivated, AbilityEnded, DamageEvent, DeathEvent, GateEvent, ProjectileRequest,
    SightEvent, SpawnRequest, SpawnedEvent, StateChanged, WaveEvent,
};
use ruin::pool::Pools;
use ruin::sequence::Sequencer;
use ruin::systems::{
    AnimationState, AttackSense, Behavior, Capabilities, Collider, CollisionLayer, Damager,
    DeltaTime, EnemyState, EnemyType, EntityKind, Feedbacks, GameState, Health, InputState,
    MusicDirector, NavAgent, Patrol, PlayerControlled, Sight, Spawner, TracingFeedback, Transform,
};

/// Open test arena with one inner wall segment (row 4, columns 7-8) for
/// occlusion tests.
pub const TEST_ROWS: [&str; 10] = [
    "################",
    "#P.............#",
    "#..............#",
    "#..............#",
    "#......##......#",
    "#..............#",
    "#..............#",
    "#..............#",
    "#..............#",
    "################",
];

/// Creates a basic test world with the resources the behavior systems need.
pub fn create_test_world() -> World {
    let mut world = World::new();

    world.insert_resource(Events::<GameError>::default());
    world.insert_resource(Events::<SightEvent>::default());
    world.insert_resource(Events::<StateChanged>::default());
    world.insert_resource(Events::<DamageEvent>::default());
    world.insert_resource(Events::<DeathEvent>::default());
    world.insert_resource(Events::<SpawnedEvent>::default());
    world.insert_resource(Events::<AbilityActivated>::default());
    world.insert_resource(Events::<AbilityEnded>::default());
    world.insert_resource(Events::<WaveEvent>::default());
    world.insert_resource(Events::<GateEvent>::default());
    world.insert_resource(Events::<SpawnRequest>::default());
    world.insert_resource(Events::<ProjectileRequest>::default());

    world.insert_resource(create_test_arena());
    world.insert_resource(Roster::default());
    world.insert_resource(Pools::default());
    world.insert_resource(Sequencer::default());
    world.insert_resource(GameState::default());
    world.insert_resource(InputState::default());
    world.insert_resource(DeltaTime {
        seconds: 1.0 / 60.0,
        ticks: 1,
    });
    world.insert_resource(Feedbacks(Box::new(TracingFeedback)));

    let music_channel = world.spawn_empty().id();
    world.insert_resource(MusicDirector::new(music_channel));

    world
}

pub fn create_test_arena() -> Arena {
    Arena::parse(&TEST_ROWS).expect("Failed to parse test arena")
}

/// Creates the per-type pools and the `Spawner` resource.
pub fn setup_spawner(world: &mut World) {
    let roster = Roster::default();
    let spawner = world.resource_scope(|world, mut pools: bevy_ecs::world::Mut<Pools>| {
        let mut commands = world.commands();
        Spawner::setup(&roster, &mut pools, &mut commands)
    });
    world.flush();
    world.insert_resource(spawner);
}

/// Spawns a controllable test player entity.
pub fn spawn_test_player(world: &mut World, position: Vec2) -> Entity {
    world
        .spawn((
            PlayerControlled,
            EntityKind::Player,
            Transform::at(position),
            Capabilities::all(),
            AnimationState::default(),
            Health::new(5),
            Collider { radius: 0.4 },
            CollisionLayer::PLAYER,
            AbilityRuntime::default(),
        ))
        .id()
}

/// Spawns an unpooled test enemy with the brute's tuning.
pub fn spawn_test_enemy(world: &mut World, position: Vec2) -> Entity {
    world
        .spawn((
            (
                Transform::at(position),
                EntityKind::Enemy,
                EnemyType(0),
                Capabilities::all(),
                AnimationState::default(),
                NavAgent::new(2.0, 4.0, 1.0),
                Sight::new(10.0, 90.0),
                AttackSense::new(6.0),
                Behavior::new(EnemyState::Patrol),
                Patrol::new(smallvec![position], 4.0, 0.1),
            ),
            (
                AbilityRuntime::default(),
                Health::new(5),
                Collider { radius: 0.5 },
                CollisionLayer::ENEMY,
                Damager::new(2, 1.2),
            ),
        ))
        .id()
}

/// Spawns an enemy through the real `Spawner` (pooled). Requires
/// [`setup_spawner`] to have run.
pub fn spawn_pooled_enemy(world: &mut World, type_index: usize, position: Vec2) -> GameResult<Entity> {
    world
        .run_system_once(
            move |spawner: Res<Spawner>,
                  mut pools: ResMut<Pools>,
                  roster: Res<Roster>,
                  arena: Res<Arena>,
                  mut commands: Commands,
                  mut state_events: EventWriter<StateChanged>,
                  mut spawned_events: EventWriter<SpawnedEvent>| {
                spawner.spawn_enemy(
                    type_index,
                    position,
                    &mut pools,
                    &roster,
                    &arena,
                    &mut commands,
                    &mut state_events,
                    &mut spawned_events,
                )
            },
        )
        .expect("Spawn system should run")
}

pub fn send_damage(world: &mut World, target: Entity, amount: i32) {
    let mut events = world.resource_mut::<Events<DamageEvent>>();
    events.send(DamageEvent { target, amount });
}

pub fn set_delta(world: &mut World, seconds: f32) {
    world.insert_resource(DeltaTime { seconds, ticks: 1 });
}

/// Drains and returns all pending events of one kind.
pub fn drain_events<E: Event>(world: &mut World) -> Vec<E> {
    world.resource_mut::<Events<E>>().drain().collect()
}
