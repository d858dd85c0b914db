//! The ability state machine.
//!
//! Every ability cycles Ready → Active → Cooldown → Ready. The trigger is
//! ability-specific: the player dash reads the dash input signal, enemy
//! abilities read the level-triggered attack-range signal. Entering Active
//! hands the payload's sequence to the timed-sequence runner; the
//! outstanding-handle guard makes re-activation while in flight a no-op.

pub mod charge;
pub mod crush;
pub mod dash;
pub mod shoot;

pub use charge::ChargeAbility;
pub use crush::CrushAbility;
pub use dash::DashAbility;
pub use shoot::ShootAbility;

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventWriter,
    query::Without,
    system::{Query, Res, ResMut},
};
use tracing::debug;

use crate::events::{AbilityActivated, AbilityEnded};
use crate::pool::Dormant;
use crate::sequence::{Sequence, SequenceHandle, Sequencer};
use crate::systems::components::{AnimationState, Capabilities, Dead, DeltaTime, EnemyType, PlayerControlled};
use crate::systems::perception::AttackSense;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AbilityPhase {
    #[default]
    Ready,
    Active,
    Cooldown,
}

/// Per-entity mutable ability state. Created when the entity is activated
/// and reset when it returns to its pool.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct AbilityRuntime {
    pub phase: AbilityPhase,
    /// Time left in the current Active or Cooldown phase.
    pub remaining: f32,
    /// Handle of the in-flight payload sequence. Non-null reliably means
    /// "in flight": every payload sequence self-clears it as its last step.
    pub sequence: Option<SequenceHandle>,
}

impl AbilityRuntime {
    /// Force-reset: phase back to Ready, handing any in-flight sequence
    /// handle to the caller for cancellation. Safe to call when nothing is
    /// in flight.
    pub fn reset(&mut self) -> Option<SequenceHandle> {
        self.phase = AbilityPhase::Ready;
        self.remaining = 0.0;
        self.sequence.take()
    }
}

/// Immutable per-ability configuration, shared read-only across every
/// entity using the ability type.
#[derive(Debug, Clone, Copy)]
pub struct AbilityDescriptor {
    pub name: &'static str,
    pub cooldown_secs: f32,
    pub active_secs: f32,
    pub damage: i32,
    pub payload: AbilityPayload,
}

/// The concrete ability kinds, selected by configuration data.
#[derive(Debug, Clone, Copy)]
pub enum AbilityPayload {
    Dash(DashAbility),
    Charge(ChargeAbility),
    Crush(CrushAbility),
    Shoot(ShootAbility),
}

impl AbilityPayload {
    pub fn behavior(&self) -> &dyn AbilityBehavior {
        match self {
            AbilityPayload::Dash(ability) => ability,
            AbilityPayload::Charge(ability) => ability,
            AbilityPayload::Crush(ability) => ability,
            AbilityPayload::Shoot(ability) => ability,
        }
    }
}

/// Capability interface every payload implements.
pub trait AbilityBehavior {
    /// Builds the payload's timed sequence. The sequence owns restoring
    /// whatever capabilities it suspends, and must end by clearing the
    /// owner's ability handle.
    fn sequence(&self, descriptor: &AbilityDescriptor) -> Sequence;

    /// Invoked when the active window elapses and the cooldown begins.
    fn begin_cooldown(&self, caps: &mut Capabilities, anim: &mut AnimationState) {
        let _ = (caps, anim);
    }

    /// Ranged payloads need projectile wiring resolved at spawn time.
    fn is_ranged(&self) -> bool {
        false
    }
}

/// Advances one runtime through its phase cycle given this tick's trigger
/// signal. Returns the started sequence when the gate fired.
pub fn tick_phase(
    runtime: &mut AbilityRuntime,
    descriptor: &AbilityDescriptor,
    triggered: bool,
    dt: f32,
) -> PhaseStep {
    match runtime.phase {
        AbilityPhase::Ready => {
            if triggered {
                runtime.phase = AbilityPhase::Active;
                runtime.remaining = descriptor.active_secs;
                // Idempotence against re-activation while a previous
                // sequence is still in flight: the gate advances, the
                // payload does not restart.
                if runtime.sequence.is_none() {
                    return PhaseStep::Activate;
                }
            }
            PhaseStep::None
        }
        AbilityPhase::Active => {
            if runtime.remaining > 0.0 {
                runtime.remaining -= dt;
                PhaseStep::None
            } else {
                runtime.phase = AbilityPhase::Cooldown;
                runtime.remaining = descriptor.cooldown_secs;
                PhaseStep::BeginCooldown
            }
        }
        AbilityPhase::Cooldown => {
            if runtime.remaining > 0.0 {
                runtime.remaining -= dt;
            } else {
                runtime.phase = AbilityPhase::Ready;
            }
            PhaseStep::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStep {
    None,
    /// The gate fired and the payload sequence should start.
    Activate,
    /// The active window elapsed; the payload's cooldown hook runs.
    BeginCooldown,
}

/// The enemy ability gate: triggers off the level-triggered attack-range
/// signal and runs each enemy's configured payload.
#[allow(clippy::type_complexity)]
pub fn enemy_ability_system(
    dt: Res<DeltaTime>,
    roster: Res<crate::config::Roster>,
    mut sequencer: ResMut<Sequencer>,
    mut activated: EventWriter<AbilityActivated>,
    mut ended: EventWriter<AbilityEnded>,
    mut enemies: Query<
        (Entity, &EnemyType, &mut AbilityRuntime, &AttackSense),
        (Without<Dormant>, Without<Dead>, Without<PlayerControlled>),
    >,
) {
    for (entity, enemy_type, mut runtime, sense) in enemies.iter_mut() {
        let Some(config) = roster.enemies.get(enemy_type.0) else {
            continue;
        };
        let descriptor = &config.ability;
        match tick_phase(&mut runtime, descriptor, sense.in_range, dt.seconds) {
            PhaseStep::Activate => {
                let sequence = descriptor.payload.behavior().sequence(descriptor);
                runtime.sequence = Some(sequencer.run(entity, sequence));
                debug!(?entity, ability = descriptor.name, "Ability activated");
                activated.write(AbilityActivated { entity });
            }
            PhaseStep::BeginCooldown => {
                ended.write(AbilityEnded { entity });
            }
            PhaseStep::None => {}
        }
    }
}
