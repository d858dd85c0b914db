//! Player control: movement from the input capability and the dash holder.

use bevy_ecs::{
    entity::Entity,
    event::EventWriter,
    query::With,
    system::{Query, Res, ResMut},
};
use tracing::debug;

use crate::ability::{tick_phase, AbilityRuntime, PhaseStep};
use crate::arena::Arena;
use crate::config::Roster;
use crate::constants::PLAYER_MOVE_SPEED;
use crate::events::{AbilityActivated, AbilityEnded};
use crate::sequence::Sequencer;
use crate::systems::components::{
    AnimationState, Capabilities, DeltaTime, GameState, InputState, PlayerControlled, Transform,
};

/// Moves the player along the input axis, clamped to walkable cells.
#[allow(clippy::type_complexity)]
pub fn player_control_system(
    dt: Res<DeltaTime>,
    input: Res<InputState>,
    arena: Res<Arena>,
    game_state: Res<GameState>,
    mut player: Query<(&mut Transform, &Capabilities, &mut AnimationState), With<PlayerControlled>>,
) {
    if game_state.game_over {
        return;
    }
    let Ok((mut transform, caps, mut anim)) = player.single_mut() else {
        return;
    };
    if !caps.contains(Capabilities::LOCOMOTION) {
        return;
    }
    let axis = input.move_axis;
    if axis.length_squared() <= f32::EPSILON {
        anim.blend = 0.0;
        return;
    }
    let direction = axis.normalize();
    let next = transform.position + direction * PLAYER_MOVE_SPEED * dt.seconds;
    if arena.is_walkable(Arena::cell_at(next)) {
        transform.position = next;
    }
    transform.facing = direction;
    anim.blend = 1.0;
}

/// The player's ability holder: the dash triggers off the pressed signal
/// and cycles Ready/Active/Cooldown like any other ability.
#[allow(clippy::type_complexity)]
pub fn player_ability_system(
    dt: Res<DeltaTime>,
    input: Res<InputState>,
    roster: Res<Roster>,
    mut sequencer: ResMut<Sequencer>,
    mut activated: EventWriter<AbilityActivated>,
    mut ended: EventWriter<AbilityEnded>,
    mut player: Query<
        (Entity, &mut AbilityRuntime, &mut Capabilities, &mut AnimationState),
        With<PlayerControlled>,
    >,
) {
    let Ok((entity, mut runtime, mut caps, mut anim)) = player.single_mut() else {
        return;
    };
    let descriptor = &roster.player_ability;
    match tick_phase(&mut runtime, descriptor, input.dash_pressed, dt.seconds) {
        PhaseStep::Activate => {
            let sequence = descriptor.payload.behavior().sequence(descriptor);
            runtime.sequence = Some(sequencer.run(entity, sequence));
            debug!(ability = descriptor.name, "Player ability activated");
            activated.write(AbilityActivated { entity });
        }
        PhaseStep::BeginCooldown => {
            descriptor.payload.behavior().begin_cooldown(&mut caps, &mut anim);
            ended.write(AbilityEnded { entity });
        }
        PhaseStep::None => {}
    }
}
