//! The enemy shoot: locomotion suspended, an anticipation delay, then a
//! discrete projectile request aimed at the target's last known position,
//! then a reload delay before the enemy can move again.

use crate::ability::{AbilityBehavior, AbilityDescriptor};
use crate::sequence::{AnimCue, Effect, Sequence, Wait};
use crate::systems::behavior::EnemyState;
use crate::systems::components::{Capabilities, FeedbackCue};

#[derive(Debug, Clone, Copy)]
pub struct ShootAbility {
    pub anticipation_secs: f32,
    pub reload_secs: f32,
}

impl AbilityBehavior for ShootAbility {
    fn sequence(&self, _descriptor: &AbilityDescriptor) -> Sequence {
        Sequence::new()
            .step(Effect::Disable(Capabilities::LOCOMOTION), Wait::Instant)
            .step(Effect::SetBehavior(EnemyState::UsingAbility), Wait::Instant)
            .step(Effect::FaceTarget, Wait::Instant)
            .step(Effect::Anim(AnimCue::Blend(0.0)), Wait::Seconds(self.anticipation_secs))
            .step(Effect::FireProjectile, Wait::Instant)
            .step(Effect::Feedback(FeedbackCue::ProjectileFired), Wait::Seconds(self.reload_secs))
            .step(Effect::Enable(Capabilities::LOCOMOTION), Wait::Instant)
            .step(Effect::WarpToSurface, Wait::Instant)
            .step(Effect::ClearAbilityHandle, Wait::Instant)
    }

    fn is_ranged(&self) -> bool {
        true
    }
}
