//! The timed-sequence runner.
//!
//! Ability scripts, trap cycles, death delays, audio fades and spawn pacing
//! are all expressed as data-described sequences of (effect, wait) steps,
//! interpreted by a single scheduler system once per tick. Sequences are
//! cooperative: effects apply atomically and suspension happens only at the
//! explicit wait boundary each step declares.
//!
//! `cancel` stops a sequence at its next suspension boundary and executes
//! no further steps. Cancellation does not restore any capabilities the
//! sequence disabled; that is the canceller's responsibility (the ability
//! reset path runs the same restore steps natural completion would have).

use bevy_ecs::{
    entity::Entity,
    event::EventWriter,
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use tracing::{debug, trace, warn};

use crate::ability::AbilityRuntime;
use crate::arena::Arena;
use crate::constants::WARP_TOLERANCE;
use crate::error::{ConfigError, GameError, SpawnError};
use crate::events::{DeathEvent, ProjectileRequest, SpawnRequest, StateChanged};
use crate::pool::{PooledBy, Pools};
use crate::systems::audio::{MusicDirector, MusicTrack};
use crate::systems::behavior::{Behavior, EnemyState};
use crate::systems::components::{
    AnimationState, Capabilities, Dash, Damager, Dead, DeltaTime, Feedbacks, FeedbackCue, NavAgent,
    RangedAttack, Transform,
};

/// A single mutation applied by a sequence step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Enable capability flags on the owner.
    Enable(Capabilities),
    /// Disable capability flags on the owner.
    Disable(Capabilities),
    /// Snap the owner's facing toward its tracked sight target.
    FaceTarget,
    /// Begin a fixed-velocity displacement along the owner's current
    /// facing; the direction is locked here and not re-read while moving.
    StartDash { speed: f32, distance: f32 },
    /// Open or close the owner's contact hit volume.
    SetDamager(bool),
    /// Write an animation flag on the owner.
    Anim(AnimCue),
    /// Fire-and-forget presentation cue at the owner's position.
    Feedback(FeedbackCue),
    /// Request one pooled projectile from the owner's ranged attack wiring.
    FireProjectile,
    /// Re-place the owner onto the walkable surface, handing it to Chase on
    /// success and back to its default behavior on failure.
    WarpToSurface,
    /// Route the owner's behavior machine through a transition request.
    SetBehavior(EnemyState),
    /// Notify death listeners that the owner's death delay elapsed.
    NotifyDeath,
    /// Return the owner to its pool, running the release-side reset.
    ReturnToPool,
    /// Null the owner's outstanding ability handle. Every ability sequence
    /// must end with this so a non-null handle reliably means "in flight".
    ClearAbilityHandle,
    /// Ask the owning spawn area to place one enemy now.
    RequestSpawn,
    /// Retarget a music track's volume; the audio system integrates it.
    MusicTarget { track: MusicTrack, volume: f32, fade_secs: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimCue {
    Blend(f32),
    Dashing(bool),
    Fatigued(bool),
}

/// Where a step suspends after its effect applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wait {
    /// No suspension; the next step applies in the same tick.
    Instant,
    Seconds(f32),
    NextTick,
    Until(Condition),
}

/// Conditions a sequence can suspend on. Evaluated once per tick starting
/// the tick after the step's effect applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The owner's displacement component has run out and been removed.
    DashComplete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub effect: Effect,
    pub wait: Wait,
}

/// An ordered list of steps, built once and handed to [`Sequencer::run`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    steps: Vec<Step>,
}

impl Sequence {
    pub fn new() -> Self {
        Sequence::default()
    }

    pub fn step(mut self, effect: Effect, wait: Wait) -> Self {
        self.steps.push(Step { effect, wait });
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Identifies one running sequence. Stale handles (finished or cancelled
/// sequences) are detected by generation and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequenceHandle {
    index: usize,
    generation: u64,
}

#[derive(Debug)]
enum Progress {
    /// The step at `cursor` has not applied its effect yet.
    Apply,
    Waiting { remaining: f32 },
    WaitingTick,
    WaitingUntil(Condition),
}

#[derive(Debug)]
struct RunningSequence {
    owner: Entity,
    generation: u64,
    steps: Vec<Step>,
    cursor: usize,
    progress: Progress,
}

/// Owns every in-flight sequence. Mutated only from the single simulation
/// thread.
#[derive(Resource, Default)]
pub struct Sequencer {
    slots: Vec<Option<RunningSequence>>,
    next_generation: u64,
}

impl Sequencer {
    /// Starts a sequence on behalf of `owner` and returns its handle.
    /// Interpretation begins on the next run of the sequence system.
    pub fn run(&mut self, owner: Entity, sequence: Sequence) -> SequenceHandle {
        self.next_generation += 1;
        let running = RunningSequence {
            owner,
            generation: self.next_generation,
            steps: sequence.steps,
            cursor: 0,
            progress: Progress::Apply,
        };
        let index = match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(running);
                index
            }
            None => {
                self.slots.push(Some(running));
                self.slots.len() - 1
            }
        };
        trace!(?owner, index, generation = self.next_generation, "Sequence started");
        SequenceHandle {
            index,
            generation: self.next_generation,
        }
    }

    /// Stops a sequence at its next suspension boundary; no further effects
    /// run. Stale handles are ignored.
    pub fn cancel(&mut self, handle: SequenceHandle) {
        if let Some(slot) = self.slots.get_mut(handle.index) {
            if slot.as_ref().is_some_and(|r| r.generation == handle.generation) {
                trace!(index = handle.index, generation = handle.generation, "Sequence cancelled");
                *slot = None;
            }
        }
    }

    pub fn is_running(&self, handle: SequenceHandle) -> bool {
        self.slots
            .get(handle.index)
            .is_some_and(|slot| slot.as_ref().is_some_and(|r| r.generation == handle.generation))
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

/// Interprets every running sequence once per tick.
///
/// Effects mutate the owner through the queries below; requests that other
/// systems consume (spawns, projectiles, deaths) go out as events, so the
/// schedule order decides when they land. A sequence whose owner has been
/// despawned is dropped silently.
#[allow(clippy::too_many_arguments)]
#[allow(clippy::type_complexity)]
pub fn sequence_system(
    mut sequencer: ResMut<Sequencer>,
    dt: Res<DeltaTime>,
    arena: Res<Arena>,
    mut pools: ResMut<Pools>,
    mut music: ResMut<MusicDirector>,
    feedbacks: Res<Feedbacks>,
    mut commands: Commands,
    liveness: Query<Entity>,
    mut bodies: Query<(&mut Transform, &mut Capabilities, &mut AnimationState)>,
    mut agents: Query<&mut NavAgent>,
    mut damagers: Query<&mut Damager>,
    mut behaviors: Query<&mut Behavior>,
    mut runtimes: Query<&mut AbilityRuntime>,
    aux: (Query<&crate::systems::perception::Sight>, Query<&RangedAttack>, Query<&PooledBy>, Query<&Dash>),
    mut writers: (
        EventWriter<SpawnRequest>,
        EventWriter<ProjectileRequest>,
        EventWriter<DeathEvent>,
        EventWriter<StateChanged>,
        EventWriter<GameError>,
    ),
) {
    let mut slots = std::mem::take(&mut sequencer.slots);
    let mut cancelled: Vec<SequenceHandle> = Vec::new();

    for index in 0..slots.len() {
        let Some(running) = slots[index].as_mut() else {
            continue;
        };
        if liveness.get(running.owner).is_err() {
            debug!(owner = ?running.owner, "Dropping sequence whose owner is gone");
            slots[index] = None;
            continue;
        }

        let mut finished = false;
        loop {
            match &mut running.progress {
                Progress::Apply => {
                    let Some(step) = running.steps.get(running.cursor).copied() else {
                        finished = true;
                        break;
                    };
                    let handle = SequenceHandle {
                        index,
                        generation: running.generation,
                    };
                    apply_effect(
                        step.effect,
                        running.owner,
                        handle,
                        &arena,
                        &mut pools,
                        &mut music,
                        &feedbacks,
                        &mut commands,
                        &mut bodies,
                        &mut agents,
                        &mut damagers,
                        &mut behaviors,
                        &mut runtimes,
                        &aux,
                        &mut writers,
                        &mut cancelled,
                    );
                    match step.wait {
                        Wait::Instant => {
                            running.cursor += 1;
                            if running.cursor >= running.steps.len() {
                                finished = true;
                                break;
                            }
                        }
                        Wait::Seconds(seconds) if seconds <= 0.0 => {
                            running.cursor += 1;
                            if running.cursor >= running.steps.len() {
                                finished = true;
                                break;
                            }
                        }
                        Wait::Seconds(seconds) => {
                            running.progress = Progress::Waiting { remaining: seconds };
                            break;
                        }
                        Wait::NextTick => {
                            running.progress = Progress::WaitingTick;
                            break;
                        }
                        Wait::Until(condition) => {
                            running.progress = Progress::WaitingUntil(condition);
                            break;
                        }
                    }
                }
                Progress::Waiting { remaining } => {
                    *remaining -= dt.seconds;
                    if *remaining > 0.0 {
                        break;
                    }
                    running.cursor += 1;
                    running.progress = Progress::Apply;
                    if running.cursor >= running.steps.len() {
                        finished = true;
                        break;
                    }
                }
                Progress::WaitingTick => {
                    running.cursor += 1;
                    running.progress = Progress::Apply;
                    if running.cursor >= running.steps.len() {
                        finished = true;
                        break;
                    }
                }
                Progress::WaitingUntil(condition) => {
                    let satisfied = match condition {
                        Condition::DashComplete => aux.3.get(running.owner).is_err(),
                    };
                    if !satisfied {
                        break;
                    }
                    running.cursor += 1;
                    running.progress = Progress::Apply;
                    if running.cursor >= running.steps.len() {
                        finished = true;
                        break;
                    }
                }
            }
        }

        if finished {
            trace!(owner = ?running.owner, index, "Sequence finished");
            slots[index] = None;
        }
    }

    for handle in cancelled {
        if let Some(slot) = slots.get_mut(handle.index) {
            if slot.as_ref().is_some_and(|r| r.generation == handle.generation) {
                *slot = None;
            }
        }
    }

    sequencer.slots = slots;
}

#[allow(clippy::too_many_arguments)]
#[allow(clippy::type_complexity)]
fn apply_effect(
    effect: Effect,
    owner: Entity,
    handle: SequenceHandle,
    arena: &Arena,
    pools: &mut Pools,
    music: &mut MusicDirector,
    feedbacks: &Feedbacks,
    commands: &mut Commands,
    bodies: &mut Query<(&mut Transform, &mut Capabilities, &mut AnimationState)>,
    agents: &mut Query<&mut NavAgent>,
    damagers: &mut Query<&mut Damager>,
    behaviors: &mut Query<&mut Behavior>,
    runtimes: &mut Query<&mut AbilityRuntime>,
    aux: &(Query<&crate::systems::perception::Sight>, Query<&RangedAttack>, Query<&PooledBy>, Query<&Dash>),
    writers: &mut (
        EventWriter<SpawnRequest>,
        EventWriter<ProjectileRequest>,
        EventWriter<DeathEvent>,
        EventWriter<StateChanged>,
        EventWriter<GameError>,
    ),
    cancelled: &mut Vec<SequenceHandle>,
) {
    let (sights, ranged, pooled, _) = aux;
    let (spawn_requests, projectile_requests, death_events, state_events, errors) = writers;

    match effect {
        Effect::Enable(flags) => {
            if let Ok((_, mut caps, _)) = bodies.get_mut(owner) {
                caps.insert(flags);
            }
        }
        Effect::Disable(flags) => {
            if let Ok((_, mut caps, _)) = bodies.get_mut(owner) {
                caps.remove(flags);
            }
        }
        Effect::FaceTarget => {
            let target_position = sights
                .get(owner)
                .ok()
                .and_then(|sight| sight.target)
                .and_then(|target| bodies.get_mut(target).ok().map(|(t, _, _)| t.position));
            if let (Some(point), Ok((mut transform, _, _))) = (target_position, bodies.get_mut(owner)) {
                transform.look_at(point);
            }
        }
        Effect::StartDash { speed, distance } => {
            if let Ok((transform, _, _)) = bodies.get_mut(owner) {
                commands.entity(owner).insert(Dash {
                    direction: transform.facing,
                    speed,
                    remaining: distance / speed,
                });
            }
        }
        Effect::SetDamager(enabled) => {
            if let Ok(mut damager) = damagers.get_mut(owner) {
                damager.enabled = enabled;
                if enabled {
                    damager.spent = false;
                }
            }
        }
        Effect::Anim(cue) => {
            if let Ok((_, _, mut anim)) = bodies.get_mut(owner) {
                match cue {
                    AnimCue::Blend(blend) => anim.blend = blend,
                    AnimCue::Dashing(dashing) => anim.dashing = dashing,
                    AnimCue::Fatigued(fatigued) => anim.fatigued = fatigued,
                }
            }
        }
        Effect::Feedback(cue) => {
            let position = bodies.get_mut(owner).ok().map(|(t, _, _)| t.position);
            feedbacks.play(cue, position);
        }
        Effect::FireProjectile => {
            let Ok(attack) = ranged.get(owner) else {
                warn!(?owner, "Shot requested without ranged attack wiring");
                errors.write(ConfigError::MissingProjectile("shoot").into());
                return;
            };
            if let Ok((transform, _, _)) = bodies.get_mut(owner) {
                projectile_requests.write(ProjectileRequest {
                    shooter: owner,
                    pool: attack.pool,
                    origin: transform.position + transform.facing * attack.muzzle_offset,
                    direction: transform.facing,
                    speed: attack.speed,
                    damage: attack.damage,
                    lifetime: attack.lifetime,
                });
            }
        }
        Effect::WarpToSurface => {
            let Ok((mut transform, _, _)) = bodies.get_mut(owner) else {
                return;
            };
            let position = transform.position;
            let landed = arena.sample_position(position, WARP_TOLERANCE);
            if let Some(point) = landed {
                transform.position = point;
            } else {
                warn!(?owner, x = position.x, y = position.y, "No surface to warp back onto");
                errors.write(SpawnError::placement(position, WARP_TOLERANCE).into());
            }
            if let Ok(mut agent) = agents.get_mut(owner) {
                agent.stop();
            }
            if let Ok(mut behavior) = behaviors.get_mut(owner) {
                let to = if landed.is_some() {
                    EnemyState::Chase
                } else {
                    EnemyState::Default
                };
                if let Some((old, new)) = behavior.request(to) {
                    state_events.write(StateChanged { entity: owner, old, new });
                }
            }
        }
        Effect::SetBehavior(state) => {
            if let Ok(mut behavior) = behaviors.get_mut(owner) {
                if let Some((old, new)) = behavior.request(state) {
                    state_events.write(StateChanged { entity: owner, old, new });
                }
                if new_state_suspends_agent(behavior.state) {
                    if let Ok(mut agent) = agents.get_mut(owner) {
                        agent.stop();
                    }
                }
            }
        }
        Effect::NotifyDeath => {
            death_events.write(DeathEvent { entity: owner });
        }
        Effect::ReturnToPool => {
            let Ok(pooled_by) = pooled.get(owner) else {
                warn!(?owner, "Pool return requested for an unpooled entity; despawning");
                commands.entity(owner).despawn();
                return;
            };
            // Release-side reset: restore everything the entity's sequences
            // may have suspended, silently put behavior back to its default,
            // then hand the instance to the pool.
            if let Ok(mut runtime) = runtimes.get_mut(owner) {
                if let Some(in_flight) = runtime.reset() {
                    cancelled.push(in_flight);
                }
            }
            if let Ok((_, mut caps, mut anim)) = bodies.get_mut(owner) {
                caps.insert(Capabilities::all());
                *anim = AnimationState::default();
            }
            if let Ok(mut damager) = damagers.get_mut(owner) {
                damager.enabled = false;
            }
            if let Ok(mut agent) = agents.get_mut(owner) {
                agent.stop();
            }
            if let Ok(mut behavior) = behaviors.get_mut(owner) {
                behavior.state = behavior.default_state;
            }
            commands.entity(owner).remove::<(Dead, Dash)>();
            pools.release(pooled_by.0, owner, commands);
        }
        Effect::ClearAbilityHandle => {
            if let Ok(mut runtime) = runtimes.get_mut(owner) {
                if runtime.sequence == Some(handle) {
                    runtime.sequence = None;
                }
            }
        }
        Effect::RequestSpawn => {
            spawn_requests.write(SpawnRequest { area: owner });
        }
        Effect::MusicTarget { track, volume, fade_secs } => {
            music.set_target(track, volume, fade_secs);
        }
    }
}

fn new_state_suspends_agent(state: EnemyState) -> bool {
    state == EnemyState::UsingAbility
}
