//! The damage/health ledger and the death flow.

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventReader,
    system::{Commands, Query, Res, ResMut},
};
use tracing::{debug, info};

use crate::constants::{DEATH_DELAY_SECS, HEALTHBAR_SECS};
use crate::events::DamageEvent;
use crate::pool::{Dormant, Pools};
use crate::sequence::{Effect, Sequence, Sequencer, Wait};
use crate::systems::components::{
    Capabilities, Damager, Dead, DeltaTime, EntityKind, Feedbacks, FeedbackCue, GameState,
    NavAgent, Transform,
};

/// Clamped integer health. Mutated only through [`Health::apply_damage`];
/// death is decided by the caller inspecting the result.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Health { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Subtracts damage, clamping the floor at zero.
    pub fn apply_damage(&mut self, amount: i32) {
        self.current = (self.current - amount).clamp(0, self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }
}

/// Cosmetic show-on-damage window for the entity's health bar.
#[derive(Component, Debug, Clone, Copy)]
pub struct HealthbarVisible {
    pub remaining: f32,
}

/// The timed tail of the death flow: death cue, fixed delay, listener
/// notification, then the pool gets the instance back.
fn death_sequence() -> Sequence {
    Sequence::new()
        .step(Effect::Feedback(FeedbackCue::Death), Wait::Seconds(DEATH_DELAY_SECS))
        .step(Effect::NotifyDeath, Wait::Instant)
        .step(Effect::ReturnToPool, Wait::Instant)
}

/// Applies queued damage and starts death flows at zero health.
///
/// Death is one-directional and fires exactly once: further damage to an
/// entity already at zero is dropped before it can re-trigger anything.
#[allow(clippy::type_complexity)]
pub fn damage_system(
    mut damage_events: EventReader<DamageEvent>,
    mut game_state: ResMut<GameState>,
    mut sequencer: ResMut<Sequencer>,
    feedbacks: Res<Feedbacks>,
    mut commands: Commands,
    mut targets: Query<
        (
            Entity,
            &mut Health,
            &EntityKind,
            &Transform,
            &mut Capabilities,
            Option<&mut NavAgent>,
            Option<&mut Damager>,
        ),
        bevy_ecs::query::Without<Dormant>,
    >,
) {
    for event in damage_events.read() {
        let Ok((entity, mut health, kind, transform, mut caps, agent, damager)) =
            targets.get_mut(event.target)
        else {
            continue;
        };
        if health.is_dead() {
            continue;
        }

        health.apply_damage(event.amount);
        feedbacks.play(FeedbackCue::TakeDamage, Some(transform.position));
        if *kind != EntityKind::Player {
            // Best-effort cosmetic; starts even on the killing blow.
            commands.entity(entity).insert(HealthbarVisible {
                remaining: HEALTHBAR_SECS,
            });
        }

        if !health.is_dead() {
            debug!(?entity, ?kind, remaining = health.current(), "Damage applied");
            continue;
        }

        match kind {
            EntityKind::Player => {
                info!("Player died, game over");
                game_state.game_over = true;
            }
            EntityKind::Enemy => {
                // Fixed disable order: stop the agent's movement first, then
                // the hit volumes, then suspend behavior and perception.
                if let Some(mut agent) = agent {
                    agent.stop();
                }
                caps.remove(Capabilities::LOCOMOTION);
                if let Some(mut damager) = damager {
                    damager.enabled = false;
                }
                caps.remove(Capabilities::HITBOX | Capabilities::PERCEPTION);
                commands.entity(entity).insert(Dead);
                sequencer.run(entity, death_sequence());
                debug!(?entity, "Enemy death sequence started");
            }
            EntityKind::Turret | EntityKind::Trap => {
                // Stationary fixtures are scene-owned, not pooled; they go
                // down immediately and stay down.
                feedbacks.play(FeedbackCue::Death, Some(transform.position));
                commands.entity(entity).despawn();
            }
            EntityKind::Projectile => {}
        }
    }
}

/// Ticks the show-on-damage window down and hides the bar again.
pub fn healthbar_system(
    dt: Res<DeltaTime>,
    mut commands: Commands,
    mut bars: Query<(Entity, &mut HealthbarVisible)>,
) {
    for (entity, mut bar) in bars.iter_mut() {
        bar.remaining -= dt.seconds;
        if bar.remaining <= 0.0 {
            commands.entity(entity).remove::<HealthbarVisible>();
        }
    }
}

/// Latches game over: plays the cue, tears down every pool, and asks the
/// session loop to wind down.
pub fn game_over_system(
    mut game_state: ResMut<GameState>,
    mut pools: ResMut<Pools>,
    feedbacks: Res<Feedbacks>,
    mut commands: Commands,
) {
    if game_state.game_over && !game_state.exit {
        feedbacks.play(FeedbackCue::GameOver, None);
        pools.teardown_deferred(&mut commands);
        game_state.exit = true;
    }
}
