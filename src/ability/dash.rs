//! The player dash.
//!
//! Locomotion is suspended for the dash, the entity is displaced along its
//! facing at a fixed velocity for a distance-derived duration, and
//! locomotion comes back when the cooldown begins.

use crate::ability::{AbilityBehavior, AbilityDescriptor};
use crate::sequence::{AnimCue, Condition, Effect, Sequence, Wait};
use crate::systems::components::{AnimationState, Capabilities, FeedbackCue};

#[derive(Debug, Clone, Copy)]
pub struct DashAbility {
    pub velocity: f32,
    pub max_distance: f32,
}

impl AbilityBehavior for DashAbility {
    fn sequence(&self, _descriptor: &AbilityDescriptor) -> Sequence {
        Sequence::new()
            .step(Effect::Disable(Capabilities::LOCOMOTION), Wait::Instant)
            .step(Effect::Anim(AnimCue::Dashing(true)), Wait::Instant)
            .step(Effect::Feedback(FeedbackCue::AbilityWindup), Wait::Instant)
            .step(
                Effect::StartDash {
                    speed: self.velocity,
                    distance: self.max_distance,
                },
                Wait::Until(Condition::DashComplete),
            )
            .step(Effect::ClearAbilityHandle, Wait::Instant)
    }

    fn begin_cooldown(&self, caps: &mut Capabilities, anim: &mut AnimationState) {
        caps.insert(Capabilities::LOCOMOTION);
        anim.dashing = false;
    }
}
