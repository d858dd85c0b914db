//! The enemy crush: the same disable/restore envelope as the charge but
//! with no displacement. An anticipation-less strike with a brief hit
//! window, a fixed active duration, then the fatigue delay.

use crate::ability::{AbilityBehavior, AbilityDescriptor};
use crate::constants::DAMAGER_WINDOW_SECS;
use crate::sequence::{AnimCue, Effect, Sequence, Wait};
use crate::systems::behavior::EnemyState;
use crate::systems::components::{Capabilities, FeedbackCue};

#[derive(Debug, Clone, Copy)]
pub struct CrushAbility {
    pub strike_secs: f32,
    pub fatigue_secs: f32,
}

impl AbilityBehavior for CrushAbility {
    fn sequence(&self, _descriptor: &AbilityDescriptor) -> Sequence {
        let follow_through = (self.strike_secs - DAMAGER_WINDOW_SECS).max(0.0);
        Sequence::new()
            .step(Effect::Disable(Capabilities::all()), Wait::Instant)
            .step(Effect::SetBehavior(EnemyState::UsingAbility), Wait::Instant)
            .step(Effect::FaceTarget, Wait::Instant)
            .step(Effect::Anim(AnimCue::Blend(0.0)), Wait::Instant)
            .step(Effect::Feedback(FeedbackCue::AbilityStrike), Wait::Instant)
            .step(Effect::SetDamager(true), Wait::Seconds(DAMAGER_WINDOW_SECS))
            .step(Effect::SetDamager(false), Wait::Seconds(follow_through))
            .step(Effect::Anim(AnimCue::Fatigued(true)), Wait::Seconds(self.fatigue_secs))
            .step(Effect::Anim(AnimCue::Fatigued(false)), Wait::Instant)
            .step(Effect::Enable(Capabilities::all()), Wait::Instant)
            .step(Effect::WarpToSurface, Wait::Instant)
            .step(Effect::ClearAbilityHandle, Wait::Instant)
    }
}
