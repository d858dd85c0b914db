//! Enemy spawning: typed pools, burst areas, wave areas and their gates.

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::{EventReader, EventWriter},
    query::With,
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, error, info};

use crate::ability::AbilityRuntime;
use crate::arena::Arena;
use crate::config::Roster;
use crate::constants::{ENEMY_POOL_SIZE, PATROL_IDLE_SECS, SPAWN_TOLERANCE, WAYPOINT_RADIUS};
use crate::error::{GameError, GameResult, SpawnError};
use crate::events::{DeathEvent, GateEvent, SpawnRequest, SpawnedEvent, StateChanged, WaveEvent};
use crate::pool::{Dormant, PoolId, PooledBy, Pools, Prefab};
use crate::sequence::{Effect, Sequence, SequenceHandle, Sequencer, Wait};
use crate::systems::behavior::{Behavior, EnemyState, Patrol};
use crate::systems::components::{
    AnimationState, Capabilities, Collider, CollisionLayer, Damager, EntityKind, EnemyType,
    Feedbacks, FeedbackCue, GameState, NavAgent, PlayerControlled, RangedAttack, Transform,
};
use crate::systems::health::Health;
use crate::systems::perception::{AttackSense, Sight};
use crate::systems::projectile::projectile_prefab;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnMethod {
    RoundRobin,
    Random,
}

/// Template constructor for a dormant enemy instance of one roster type.
fn enemy_prefab(config: crate::config::EnemyConfig, type_index: usize) -> Prefab {
    Box::new(move |commands, pool_id| {
        commands
            .spawn((
                (
                    Transform::at(Vec2::ZERO),
                    EntityKind::Enemy,
                    EnemyType(type_index),
                    Capabilities::all(),
                    AnimationState::default(),
                    NavAgent::new(config.patrol_speed, config.chase_speed, config.stopping_distance),
                    Sight::new(config.sight_range, config.field_of_view),
                    AttackSense::new(config.attack.attack_range),
                    Behavior::new(config.default_state),
                    Patrol::new(SmallVec::new(), PATROL_IDLE_SECS, config.update_interval),
                ),
                (
                    AbilityRuntime::default(),
                    Health::new(config.max_health),
                    Collider {
                        radius: config.collider_radius,
                    },
                    CollisionLayer::ENEMY,
                    Damager::new(config.ability.damage, config.attack.damager_radius),
                    PooledBy(pool_id),
                    Dormant,
                ),
            ))
            .id()
    })
}

/// Owns one entity pool per roster enemy type, plus the projectile pool of
/// each ranged type.
#[derive(bevy_ecs::resource::Resource)]
pub struct Spawner {
    enemy_pools: Vec<PoolId>,
    projectile_pools: Vec<Option<PoolId>>,
}

impl Spawner {
    /// Creates the per-type pools. Ranged types without a projectile
    /// configuration get no projectile pool; that misconfiguration is
    /// reported once here and again if the type ever tries to shoot.
    pub fn setup(roster: &Roster, pools: &mut Pools, commands: &mut Commands) -> Spawner {
        let mut enemy_pools = Vec::with_capacity(roster.enemies.len());
        let mut projectile_pools = Vec::with_capacity(roster.enemies.len());
        for (type_index, config) in roster.enemies.iter().enumerate() {
            enemy_pools.push(pools.create(
                config.name,
                ENEMY_POOL_SIZE,
                enemy_prefab(*config, type_index),
                commands,
            ));
            let ranged = config.ability.payload.behavior().is_ranged();
            let projectile_pool = match (ranged, config.attack.projectile) {
                (true, Some(projectile)) => {
                    let size = (projectile.lifetime_secs / config.attack.attack_rate).ceil() as usize;
                    Some(pools.create("projectile", size.max(1), projectile_prefab(), commands))
                }
                (true, None) => {
                    error!(enemy = config.name, "Ranged ability has no projectile configuration");
                    None
                }
                (false, _) => None,
            };
            projectile_pools.push(projectile_pool);
        }
        Spawner {
            enemy_pools,
            projectile_pools,
        }
    }

    /// Acquires an instance of `type_index`, applies the type's
    /// configuration and places it on the surface near `position`.
    ///
    /// On placement failure the instance goes straight back to its pool and
    /// the caller receives no entity; the spawn is aborted, not retried.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_enemy(
        &self,
        type_index: usize,
        position: Vec2,
        pools: &mut Pools,
        roster: &Roster,
        arena: &Arena,
        commands: &mut Commands,
        state_events: &mut EventWriter<StateChanged>,
        spawned_events: &mut EventWriter<SpawnedEvent>,
    ) -> GameResult<Entity> {
        let config = roster
            .enemies
            .get(type_index)
            .ok_or(crate::error::ConfigError::UnknownEnemyType(type_index))?;
        let pool_id = self.enemy_pools[type_index];
        let entity = pools.acquire(pool_id, commands);

        let Some(point) = arena.sample_position(position, SPAWN_TOLERANCE) else {
            pools.release(pool_id, entity, commands);
            return Err(SpawnError::placement(position, SPAWN_TOLERANCE).into());
        };

        // Patrol ring: random offsets validated against the surface, with
        // the spawn point itself as the fallback for failed samples.
        let mut rng = rand::rng();
        let mut waypoints: SmallVec<[Vec2; 4]> = SmallVec::new();
        for _ in 0..config.waypoints {
            let offset = Vec2::from_angle(rng.random_range(0.0..std::f32::consts::TAU))
                * (rng.random_range(0.0f32..1.0).sqrt() * WAYPOINT_RADIUS);
            match arena.sample_position(point + offset, WAYPOINT_RADIUS) {
                Some(waypoint) => waypoints.push(waypoint),
                None => {
                    error!(enemy = config.name, "No valid waypoint position");
                    waypoints.push(point);
                }
            }
        }

        commands.entity(entity).insert((
            Transform::at(point),
            Health::new(config.max_health),
            NavAgent::new(config.patrol_speed, config.chase_speed, config.stopping_distance),
            Sight::new(config.sight_range, config.field_of_view),
            AttackSense::new(config.attack.attack_range),
            Behavior::new(config.default_state),
            Patrol::new(waypoints, PATROL_IDLE_SECS, config.update_interval),
            AbilityRuntime::default(),
            Capabilities::all(),
            AnimationState::default(),
            Damager::new(config.ability.damage, config.attack.damager_radius),
        ));

        if config.ability.payload.behavior().is_ranged() {
            match (config.attack.projectile, self.projectile_pools[type_index]) {
                (Some(projectile), Some(pool)) => {
                    commands.entity(entity).insert(RangedAttack {
                        pool,
                        speed: projectile.speed,
                        lifetime: projectile.lifetime_secs,
                        muzzle_offset: projectile.muzzle_offset,
                        damage: config.ability.damage,
                    });
                }
                _ => {
                    error!(enemy = config.name, "Skipping ranged wiring, no projectile configuration");
                    commands.entity(entity).remove::<RangedAttack>();
                }
            }
        }

        // Kick the behavior loop off from the configured default state.
        state_events.write(StateChanged {
            entity,
            old: EnemyState::Default,
            new: config.default_state,
        });
        spawned_events.write(SpawnedEvent { entity });
        debug!(enemy = config.name, ?entity, x = point.x, y = point.y, "Spawned");
        Ok(entity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnMode {
    /// Spawn a fixed count with a fixed inter-spawn delay, then retire.
    Burst { count: u32, delay: f32 },
    /// Spawn waves gated behind clearing the previous one.
    Waves {
        waves: u32,
        per_wave: u32,
        delay: f32,
        between: f32,
    },
}

/// A trigger region that starts spawning when the player steps inside.
#[derive(Component, Debug)]
pub struct SpawnArea {
    pub min: Vec2,
    pub max: Vec2,
    /// Roster type indices this area draws from.
    pub types: SmallVec<[usize; 4]>,
    pub method: SpawnMethod,
    pub mode: SpawnMode,
    /// Fixed spawn point; random positions inside the bounds otherwise.
    pub spawn_point: Option<Vec2>,
    pub started: bool,
    pub spawned: u32,
    pub pacing: Option<SequenceHandle>,
}

impl SpawnArea {
    pub fn new(min: Vec2, max: Vec2, types: SmallVec<[usize; 4]>, method: SpawnMethod, mode: SpawnMode) -> Self {
        SpawnArea {
            min,
            max,
            types,
            method,
            mode,
            spawn_point: None,
            started: false,
            spawned: 0,
            pacing: None,
        }
    }

    fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    fn random_position(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(
            rng.random_range(self.min.x..=self.max.x),
            rng.random_range(self.min.y..=self.max.y),
        )
    }
}

/// Wave bookkeeping: which spawned members are still alive. Death events
/// are matched against the member set, so the "listener" dies with the
/// wave and nothing global needs unsubscribing.
#[derive(Component, Debug, Default)]
pub struct WaveState {
    pub current: u32,
    pub members: Vec<Entity>,
}

/// A barrier observing one spawn area's gate signal.
#[derive(Component, Debug, Clone, Copy)]
pub struct Gate {
    pub area: Entity,
    pub open: bool,
}

fn pacing_sequence(count: u32, delay: f32, lead_in_secs: Option<f32>) -> Sequence {
    let mut sequence = Sequence::new();
    if let Some(secs) = lead_in_secs {
        sequence = sequence.step(Effect::Feedback(FeedbackCue::WaveIncoming), Wait::Seconds(secs));
    }
    for _ in 0..count {
        sequence = sequence.step(Effect::RequestSpawn, Wait::Seconds(delay));
    }
    sequence
}

/// Runs burst and wave areas: trigger detection, spawn-request handling,
/// death accounting, wave advancement and completion signalling.
#[allow(clippy::too_many_arguments)]
#[allow(clippy::type_complexity)]
pub fn spawn_area_system(
    mut commands: Commands,
    mut pools: ResMut<Pools>,
    mut sequencer: ResMut<Sequencer>,
    roster: Res<Roster>,
    arena: Res<Arena>,
    spawner: Res<Spawner>,
    mut game_state: ResMut<GameState>,
    player: Query<&Transform, With<PlayerControlled>>,
    mut areas: Query<(Entity, &mut SpawnArea, Option<&mut WaveState>)>,
    mut requests: EventReader<SpawnRequest>,
    mut deaths: EventReader<DeathEvent>,
    mut writers: (
        EventWriter<StateChanged>,
        EventWriter<SpawnedEvent>,
        EventWriter<WaveEvent>,
        EventWriter<GateEvent>,
        EventWriter<GameError>,
    ),
) {
    let (state_events, spawned_events, wave_events, gate_events, errors) = &mut writers;

    // Trigger areas the player stepped into.
    if let Ok(player_transform) = player.single() {
        for (entity, mut area, _) in areas.iter_mut() {
            if area.started || !area.contains(player_transform.position) {
                continue;
            }
            area.started = true;
            match area.mode {
                SpawnMode::Burst { count, delay } => {
                    info!(area = ?entity, count, "Burst spawn triggered");
                    area.pacing = Some(sequencer.run(entity, pacing_sequence(count, delay, None)));
                }
                SpawnMode::Waves { per_wave, delay, .. } => {
                    info!(area = ?entity, "Wave spawn triggered, closing gate");
                    gate_events.write(GateEvent {
                        area: entity,
                        open: false,
                    });
                    wave_events.write(WaveEvent::Started {
                        area: entity,
                        wave: 1,
                    });
                    commands.entity(entity).insert(WaveState {
                        current: 1,
                        members: Vec::new(),
                    });
                    area.pacing = Some(sequencer.run(entity, pacing_sequence(per_wave, delay, None)));
                }
            }
        }
    }

    // Place one enemy per pacing request.
    let mut rng = rand::rng();
    for request in requests.read() {
        let Ok((_, mut area, wave)) = areas.get_mut(request.area) else {
            continue;
        };
        if area.types.is_empty() {
            continue;
        }
        let pick = match area.method {
            SpawnMethod::RoundRobin => area.types[area.spawned as usize % area.types.len()],
            SpawnMethod::Random => area.types[rng.random_range(0..area.types.len())],
        };
        let position = area.spawn_point.unwrap_or_else(|| area.random_position(&mut rng));
        match spawner.spawn_enemy(
            pick,
            position,
            &mut pools,
            &roster,
            &arena,
            &mut commands,
            state_events,
            spawned_events,
        ) {
            Ok(entity) => {
                area.spawned += 1;
                if let Some(mut wave) = wave {
                    wave.members.push(entity);
                }
            }
            Err(error) => {
                error!(%error, "Spawn aborted");
                errors.write(error);
            }
        }
    }

    // Death accounting for wave membership.
    for death in deaths.read() {
        for (_, _, wave) in areas.iter_mut() {
            if let Some(mut wave) = wave {
                wave.members.retain(|member| *member != death.entity);
            }
        }
    }

    // Advancement and completion.
    let mut any_wave_active = false;
    for (entity, mut area, wave) in areas.iter_mut() {
        if !area.started {
            continue;
        }
        let pacing_done = area.pacing.is_none_or(|handle| !sequencer.is_running(handle));
        match (area.mode, wave) {
            (SpawnMode::Burst { .. }, _) => {
                if pacing_done {
                    debug!(area = ?entity, "Burst finished, retiring area");
                    commands.entity(entity).despawn();
                }
            }
            (
                SpawnMode::Waves {
                    waves,
                    per_wave,
                    delay,
                    between,
                },
                Some(mut wave),
            ) => {
                if !pacing_done || !wave.members.is_empty() {
                    any_wave_active = true;
                    continue;
                }
                wave_events.write(WaveEvent::Cleared {
                    area: entity,
                    wave: wave.current,
                });
                info!(area = ?entity, wave = wave.current, "Wave cleared");
                wave.current += 1;
                if wave.current > waves {
                    wave_events.write(WaveEvent::Completed { area: entity });
                    gate_events.write(GateEvent {
                        area: entity,
                        open: true,
                    });
                    info!(area = ?entity, "All waves complete, opening gate");
                    commands.entity(entity).despawn();
                } else {
                    wave_events.write(WaveEvent::Started {
                        area: entity,
                        wave: wave.current,
                    });
                    area.pacing =
                        Some(sequencer.run(entity, pacing_sequence(per_wave, delay, Some(between))));
                    any_wave_active = true;
                }
            }
            (SpawnMode::Waves { .. }, None) => {}
        }
    }
    game_state.combat = any_wave_active;
}

/// Applies gate signals to their barriers.
pub fn gate_system(
    mut events: EventReader<GateEvent>,
    feedbacks: Res<Feedbacks>,
    mut gates: Query<(&mut Gate, &Transform)>,
) {
    for event in events.read() {
        for (mut gate, transform) in gates.iter_mut() {
            if gate.area != event.area || gate.open == event.open {
                continue;
            }
            gate.open = event.open;
            let cue = if event.open {
                FeedbackCue::GateOpen
            } else {
                FeedbackCue::GateClose
            };
            feedbacks.play(cue, Some(transform.position));
            info!(open = event.open, "Gate changed");
        }
    }
}
