//! The enemy charge: anticipation, then a linear dash toward the target's
//! last known position, then a fatigue window before everything the
//! sequence suspended is restored and the enemy rejoins the chase.

use crate::ability::{AbilityBehavior, AbilityDescriptor};
use crate::sequence::{AnimCue, Condition, Effect, Sequence, Wait};
use crate::systems::behavior::EnemyState;
use crate::systems::components::{Capabilities, FeedbackCue};

#[derive(Debug, Clone, Copy)]
pub struct ChargeAbility {
    pub speed: f32,
    pub distance: f32,
    pub anticipation_secs: f32,
    pub fatigue_secs: f32,
}

impl AbilityBehavior for ChargeAbility {
    fn sequence(&self, _descriptor: &AbilityDescriptor) -> Sequence {
        Sequence::new()
            .step(Effect::Disable(Capabilities::all()), Wait::Instant)
            .step(Effect::SetBehavior(EnemyState::UsingAbility), Wait::Instant)
            .step(Effect::FaceTarget, Wait::Instant)
            .step(Effect::Anim(AnimCue::Blend(0.0)), Wait::Instant)
            .step(
                Effect::Feedback(FeedbackCue::AbilityWindup),
                Wait::Seconds(self.anticipation_secs),
            )
            .step(Effect::SetDamager(true), Wait::Instant)
            .step(
                Effect::StartDash {
                    speed: self.speed,
                    distance: self.distance,
                },
                Wait::Until(Condition::DashComplete),
            )
            .step(Effect::SetDamager(false), Wait::Instant)
            .step(Effect::Anim(AnimCue::Fatigued(true)), Wait::Seconds(self.fatigue_secs))
            .step(Effect::Anim(AnimCue::Fatigued(false)), Wait::Instant)
            .step(Effect::Enable(Capabilities::all()), Wait::Instant)
            .step(Effect::WarpToSurface, Wait::Instant)
            .step(Effect::ClearAbilityHandle, Wait::Instant)
    }
}
