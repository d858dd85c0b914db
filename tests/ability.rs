use bevy_ecs::system::RunSystemOnce;
use glam::Vec2;
use speculoos::prelude::*;

use ruin::ability::{enemy_ability_system, tick_phase, AbilityPhase, AbilityRuntime, PhaseStep};
use ruin::config::Roster;
use ruin::events::{AbilityActivated, AbilityEnded};
use ruin::sequence::{sequence_system, Sequencer};
use ruin::systems::{player_ability_system, AttackSense, Capabilities, InputState};

mod common;

#[test]
fn test_gate_only_fires_from_ready() {
    let roster = Roster::default();
    let descriptor = &roster.enemies[0].ability;
    let mut runtime = AbilityRuntime::default();

    // Ready + trigger fires the gate.
    assert_that(&tick_phase(&mut runtime, descriptor, true, 0.1)).is_equal_to(PhaseStep::Activate);
    assert_that(&runtime.phase).is_equal_to(AbilityPhase::Active);

    // Triggering while Active or Cooldown changes nothing.
    let before = runtime;
    let step = tick_phase(&mut runtime, descriptor, true, 0.01);
    assert_that(&step).is_equal_to(PhaseStep::None);
    assert_that(&runtime.phase).is_equal_to(before.phase);

    runtime.phase = AbilityPhase::Cooldown;
    runtime.remaining = 1.0;
    let step = tick_phase(&mut runtime, descriptor, true, 0.01);
    assert_that(&step).is_equal_to(PhaseStep::None);
    assert_that(&runtime.phase).is_equal_to(AbilityPhase::Cooldown);
}

#[test]
fn test_activation_while_in_flight_starts_no_second_sequence() {
    let mut world = common::create_test_world();
    let _player = common::spawn_test_player(&mut world, Vec2::new(2.5, 2.5));
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(8.5, 5.5));
    world.get_mut::<AttackSense>(enemy).unwrap().in_range = true;

    world
        .run_system_once(enemy_ability_system)
        .expect("System should run successfully");

    let runtime = *world.get::<AbilityRuntime>(enemy).unwrap();
    assert_that(&runtime.phase).is_equal_to(AbilityPhase::Active);
    assert_that(&runtime.sequence.is_some()).is_true();
    assert_that(&world.resource::<Sequencer>().active_count()).is_equal_to(1);
    assert_that(&common::drain_events::<AbilityActivated>(&mut world).len()).is_equal_to(1);

    // Force the gate open again while the payload sequence is still in
    // flight: the handle guard must keep a second one from starting.
    world.get_mut::<AbilityRuntime>(enemy).unwrap().phase = AbilityPhase::Ready;
    world
        .run_system_once(enemy_ability_system)
        .expect("System should run successfully");

    assert_that(&world.resource::<Sequencer>().active_count()).is_equal_to(1);
    assert_that(&common::drain_events::<AbilityActivated>(&mut world).len()).is_equal_to(0);
}

#[test]
fn test_active_window_elapses_into_cooldown() {
    let mut world = common::create_test_world();
    let _player = common::spawn_test_player(&mut world, Vec2::new(2.5, 2.5));
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(8.5, 5.5));
    world.get_mut::<AttackSense>(enemy).unwrap().in_range = true;

    world
        .run_system_once(enemy_ability_system)
        .expect("System should run successfully");
    world.get_mut::<AbilityRuntime>(enemy).unwrap().remaining = 0.0;
    world
        .run_system_once(enemy_ability_system)
        .expect("System should run successfully");

    let runtime = *world.get::<AbilityRuntime>(enemy).unwrap();
    assert_that(&runtime.phase).is_equal_to(AbilityPhase::Cooldown);
    assert_that(&common::drain_events::<AbilityEnded>(&mut world).len()).is_equal_to(1);
}

#[test]
fn test_reset_is_safe_with_nothing_in_flight() {
    let mut runtime = AbilityRuntime::default();
    assert_that(&runtime.reset().is_none()).is_true();
    assert_that(&runtime.phase).is_equal_to(AbilityPhase::Ready);
}

#[test]
fn test_player_dash_restores_locomotion_on_cooldown_begin() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world, Vec2::new(2.5, 2.5));
    world.resource_mut::<InputState>().dash_pressed = true;

    world
        .run_system_once(player_ability_system)
        .expect("System should run successfully");
    world
        .run_system_once(sequence_system)
        .expect("System should run successfully");

    // The dash suspended locomotion while it is in flight.
    let caps = *world.get::<Capabilities>(player).unwrap();
    assert_that(&caps.contains(Capabilities::LOCOMOTION)).is_false();

    // Cooldown-begin restores it.
    world.resource_mut::<InputState>().dash_pressed = false;
    world.get_mut::<AbilityRuntime>(player).unwrap().remaining = 0.0;
    world
        .run_system_once(player_ability_system)
        .expect("System should run successfully");

    let caps = *world.get::<Capabilities>(player).unwrap();
    assert_that(&caps.contains(Capabilities::LOCOMOTION)).is_true();
    let runtime = *world.get::<AbilityRuntime>(player).unwrap();
    assert_that(&runtime.phase).is_equal_to(AbilityPhase::Cooldown);
}
