use bevy_ecs::system::RunSystemOnce;
use glam::Vec2;
use speculoos::prelude::*;

use ruin::sequence::{sequence_system, AnimCue, Condition, Effect, Sequence, Wait};
use ruin::sequence::Sequencer;
use ruin::systems::{dash_system, AnimationState, Capabilities, Dash, Transform};

mod common;

fn run_sequences(world: &mut bevy_ecs::world::World) {
    world
        .run_system_once(sequence_system)
        .expect("System should run successfully");
}

#[test]
fn test_instant_steps_apply_in_order_within_one_tick() {
    let mut world = common::create_test_world();
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(5.5, 5.5));

    let sequence = Sequence::new()
        .step(Effect::Disable(Capabilities::LOCOMOTION), Wait::Instant)
        .step(Effect::Anim(AnimCue::Fatigued(true)), Wait::Instant);
    world.resource_mut::<Sequencer>().run(enemy, sequence);

    run_sequences(&mut world);

    let caps = world.get::<Capabilities>(enemy).unwrap();
    assert_that(&caps.contains(Capabilities::LOCOMOTION)).is_false();
    assert_that(&world.get::<AnimationState>(enemy).unwrap().fatigued).is_true();
    assert_that(&world.resource::<Sequencer>().active_count()).is_equal_to(0);
}

#[test]
fn test_seconds_wait_suspends_between_steps() {
    let mut world = common::create_test_world();
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(5.5, 5.5));
    common::set_delta(&mut world, 1.0 / 60.0);

    let sequence = Sequence::new()
        .step(Effect::Disable(Capabilities::LOCOMOTION), Wait::Seconds(0.04))
        .step(Effect::Enable(Capabilities::LOCOMOTION), Wait::Instant);
    world.resource_mut::<Sequencer>().run(enemy, sequence);

    run_sequences(&mut world);
    let caps = *world.get::<Capabilities>(enemy).unwrap();
    assert_that(&caps.contains(Capabilities::LOCOMOTION)).is_false();
    assert_that(&world.resource::<Sequencer>().active_count()).is_equal_to(1);

    // 0.04s at 60Hz: three more ticks to drain the wait, then the second
    // step applies in the same tick its wait elapses.
    for _ in 0..3 {
        run_sequences(&mut world);
    }
    let caps = *world.get::<Capabilities>(enemy).unwrap();
    assert_that(&caps.contains(Capabilities::LOCOMOTION)).is_true();
    assert_that(&world.resource::<Sequencer>().active_count()).is_equal_to(0);
}

#[test]
fn test_cancel_stops_without_restoring() {
    let mut world = common::create_test_world();
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(5.5, 5.5));

    let sequence = Sequence::new()
        .step(Effect::Disable(Capabilities::LOCOMOTION), Wait::Seconds(10.0))
        .step(Effect::Enable(Capabilities::LOCOMOTION), Wait::Instant);
    let handle = world.resource_mut::<Sequencer>().run(enemy, sequence);

    run_sequences(&mut world);
    world.resource_mut::<Sequencer>().cancel(handle);
    for _ in 0..5 {
        run_sequences(&mut world);
    }

    // Cancellation halts effect application but restores nothing; the
    // restore is the canceller's responsibility.
    let caps = *world.get::<Capabilities>(enemy).unwrap();
    assert_that(&caps.contains(Capabilities::LOCOMOTION)).is_false();
    assert_that(&world.resource::<Sequencer>().is_running(handle)).is_false();
}

#[test]
fn test_dash_displacement_follows_locked_direction() {
    let mut world = common::create_test_world();
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(3.5, 5.5));
    common::set_delta(&mut world, 1.0 / 60.0);
    let start = world.get::<Transform>(enemy).unwrap().position;

    // distance / speed = 8 / 15 ≈ 0.533s of displacement.
    let sequence = Sequence::new().step(
        Effect::StartDash {
            speed: 15.0,
            distance: 8.0,
        },
        Wait::Until(Condition::DashComplete),
    );
    world.resource_mut::<Sequencer>().run(enemy, sequence);

    let mut ticks = 0;
    while world.resource::<Sequencer>().active_count() > 0 && ticks < 120 {
        run_sequences(&mut world);
        world
            .run_system_once(dash_system)
            .expect("System should run successfully");
        // Turning mid-dash must not bend the displacement.
        world.get_mut::<Transform>(enemy).unwrap().facing = Vec2::NEG_Y;
        ticks += 1;
    }

    assert_that(&(ticks < 120)).is_true();
    assert_that(&world.get::<Dash>(enemy).is_none()).is_true();
    let displacement = world.get::<Transform>(enemy).unwrap().position - start;
    assert_that(&(displacement - Vec2::new(8.0, 0.0)).length()).is_less_than(1e-3);
}

#[test]
fn test_sequence_of_despawned_owner_is_dropped() {
    let mut world = common::create_test_world();
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(5.5, 5.5));

    let sequence = Sequence::new().step(Effect::Feedback(ruin::systems::FeedbackCue::Death), Wait::Seconds(10.0));
    let handle = world.resource_mut::<Sequencer>().run(enemy, sequence);

    world.despawn(enemy);
    run_sequences(&mut world);

    assert_that(&world.resource::<Sequencer>().is_running(handle)).is_false();
}

#[test]
fn test_stale_handles_do_not_touch_reused_slots() {
    let mut world = common::create_test_world();
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(5.5, 5.5));

    let first = world.resource_mut::<Sequencer>().run(
        enemy,
        Sequence::new().step(Effect::Anim(AnimCue::Blend(1.0)), Wait::Seconds(10.0)),
    );
    world.resource_mut::<Sequencer>().cancel(first);

    // The slot is reused; the stale handle must not cancel the new run.
    let second = world.resource_mut::<Sequencer>().run(
        enemy,
        Sequence::new().step(Effect::Anim(AnimCue::Blend(0.0)), Wait::Seconds(10.0)),
    );
    world.resource_mut::<Sequencer>().cancel(first);

    assert_that(&world.resource::<Sequencer>().is_running(first)).is_false();
    assert_that(&world.resource::<Sequencer>().is_running(second)).is_true();
}
