//! The enemy behavior state machine and its locomotion loops.

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::{EventReader, EventWriter},
    query::{With, Without},
    system::{Query, Res},
};
use glam::Vec2;
use smallvec::SmallVec;
use strum_macros::Display;
use tracing::debug;

use crate::events::{SightEvent, StateChanged};
use crate::pool::Dormant;
use crate::systems::components::{
    AnimationState, Capabilities, Dead, DeltaTime, NavAgent, PlayerControlled, Transform,
};

/// High-level locomotion mode of an enemy.
///
/// `Default` is an alias resolved against the enemy's configured default
/// state; it is never stored as the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EnemyState {
    Default,
    Idle,
    Patrol,
    Chase,
    UsingAbility,
}

/// Per-enemy behavior state machine.
#[derive(Component, Debug, Clone, Copy)]
pub struct Behavior {
    pub default_state: EnemyState,
    pub state: EnemyState,
}

impl Behavior {
    pub fn new(default_state: EnemyState) -> Self {
        Behavior {
            default_state,
            state: default_state,
        }
    }

    /// Requests a transition, resolving `Default` to the configured default.
    ///
    /// Returns the `(old, new)` pair when the state actually changed, and
    /// `None` for same-state requests: re-entry never restarts the
    /// underlying behavior loop.
    pub fn request(&mut self, to: EnemyState) -> Option<(EnemyState, EnemyState)> {
        let target = if to == EnemyState::Default {
            self.default_state
        } else {
            to
        };
        if self.state == target {
            return None;
        }
        let old = std::mem::replace(&mut self.state, target);
        Some((old, target))
    }
}

/// Patrol ring and polling timers for an enemy's locomotion loops.
///
/// Waypoints are computed once at spawn by sampling random offsets against
/// the walkable surface; the ring wraps at the end of the list.
#[derive(Component, Debug, Clone)]
pub struct Patrol {
    pub waypoints: SmallVec<[Vec2; 4]>,
    pub index: usize,
    pub idle_remaining: f32,
    pub idle_secs: f32,
    /// Chase retargeting countdown; refilled from `update_interval`.
    pub poll_remaining: f32,
    pub update_interval: f32,
}

impl Patrol {
    pub fn new(waypoints: SmallVec<[Vec2; 4]>, idle_secs: f32, update_interval: f32) -> Self {
        Patrol {
            waypoints,
            index: 0,
            idle_remaining: 0.0,
            idle_secs,
            poll_remaining: 0.0,
            update_interval,
        }
    }

    fn current_waypoint(&self) -> Option<Vec2> {
        self.waypoints.get(self.index).copied()
    }

    fn advance(&mut self) {
        self.index += 1;
        if self.index >= self.waypoints.len() {
            self.index = 0;
        }
    }
}

/// Applies sight edges to the behavior state machine.
///
/// Gaining sight chases, losing sight falls back to the configured default;
/// both are suppressed while an ability owns the entity. Dead enemies are
/// filtered out entirely, so their state stays frozen.
pub fn behavior_system(
    mut sight_events: EventReader<SightEvent>,
    mut state_events: EventWriter<StateChanged>,
    mut enemies: Query<&mut Behavior, (Without<Dormant>, Without<Dead>)>,
) {
    for event in sight_events.read() {
        let Ok(mut behavior) = enemies.get_mut(event.enemy) else {
            continue;
        };
        if behavior.state == EnemyState::UsingAbility {
            continue;
        }
        let to = if event.gained {
            EnemyState::Chase
        } else {
            EnemyState::Default
        };
        if let Some((old, new)) = behavior.request(to) {
            debug!(enemy = ?event.enemy, %old, %new, gained = event.gained, "Sight changed behavior");
            state_events.write(StateChanged {
                entity: event.enemy,
                old,
                new,
            });
        }
    }
}

/// Drives the per-state locomotion loops: waypoint patrol with idle pauses,
/// and chase with fixed-interval retargeting of the agent's destination.
#[allow(clippy::type_complexity)]
pub fn locomotion_system(
    dt: Res<DeltaTime>,
    mut state_events: EventReader<StateChanged>,
    player: Query<&Transform, With<PlayerControlled>>,
    mut enemies: Query<
        (
            Entity,
            &Transform,
            &Behavior,
            &mut NavAgent,
            &mut Patrol,
            &mut AnimationState,
            &Capabilities,
        ),
        (Without<Dormant>, Without<Dead>, Without<PlayerControlled>),
    >,
) {
    // Entering a locomotion state resets its timers so stale idle or poll
    // countdowns from a previous visit cannot leak in.
    for event in state_events.read() {
        if let Ok((_, _, _, mut agent, mut patrol, _, _)) = enemies.get_mut(event.entity) {
            match event.new {
                EnemyState::Patrol => {
                    patrol.idle_remaining = 0.0;
                    patrol.poll_remaining = 0.0;
                    // Forget any chase destination from the previous state.
                    agent.stop();
                }
                EnemyState::Chase => patrol.poll_remaining = 0.0,
                _ => {}
            }
        }
    }

    for (_entity, transform, behavior, mut agent, mut patrol, mut anim, caps) in enemies.iter_mut() {
        if !caps.contains(Capabilities::LOCOMOTION) {
            continue;
        }
        match behavior.state {
            EnemyState::Patrol => {
                agent.speed = agent.patrol_speed;
                if patrol.idle_remaining > 0.0 {
                    patrol.idle_remaining -= dt.seconds;
                    if patrol.idle_remaining <= 0.0 {
                        patrol.advance();
                        if let Some(waypoint) = patrol.current_waypoint() {
                            anim.blend = 1.0;
                            agent.set_destination(waypoint);
                        }
                    }
                    continue;
                }
                if agent.destination.is_none() {
                    if let Some(waypoint) = patrol.current_waypoint() {
                        anim.blend = 1.0;
                        agent.set_destination(waypoint);
                    }
                    continue;
                }
                if agent.arrived(transform.position) {
                    agent.stop();
                    anim.blend = 0.0;
                    patrol.idle_remaining = patrol.idle_secs;
                }
            }
            EnemyState::Chase => {
                agent.speed = agent.chase_speed;
                anim.blend = 1.0;
                patrol.poll_remaining -= dt.seconds;
                if patrol.poll_remaining <= 0.0 {
                    patrol.poll_remaining = patrol.update_interval;
                    if let Ok(target) = player.single() {
                        agent.set_destination(target.position);
                    }
                }
            }
            EnemyState::Idle | EnemyState::Default => {
                if !agent.stopped {
                    agent.stop();
                }
                anim.blend = 0.0;
            }
            EnemyState::UsingAbility => {}
        }
    }
}
