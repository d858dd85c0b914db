use bevy_ecs::system::RunSystemOnce;
use glam::Vec2;
use speculoos::prelude::*;

use ruin::events::SightEvent;
use ruin::systems::{attack_range_system, sight_system, AttackSense, Capabilities, Sight, Transform};

mod common;

fn run_sight(world: &mut bevy_ecs::world::World) {
    world
        .run_system_once(sight_system)
        .expect("System should run successfully");
}

#[test]
fn test_clear_line_gains_sight_once() {
    let mut world = common::create_test_world();
    let _player = common::spawn_test_player(&mut world, Vec2::new(11.5, 2.5));
    // Facing +X by default, player due east, nothing in between.
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(5.5, 2.5));

    run_sight(&mut world);

    let sight = world.get::<Sight>(enemy).unwrap();
    assert_that(&sight.seen).is_true();
    assert_that(&sight.recheck.is_none()).is_true();
    let events = common::drain_events::<SightEvent>(&mut world);
    assert_that(&events.len()).is_equal_to(1);
    assert_that(&events[0].gained).is_true();

    // Still visible next tick: edge-triggered, no duplicate event.
    run_sight(&mut world);
    assert_that(&common::drain_events::<SightEvent>(&mut world).len()).is_equal_to(0);
}

#[test]
fn test_occluded_target_is_tracked_and_rechecked() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world, Vec2::new(11.5, 4.5));
    // The wall segment at row 4 sits between them.
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(5.5, 4.5));

    run_sight(&mut world);

    let sight = world.get::<Sight>(enemy).unwrap();
    assert_that(&sight.seen).is_false();
    assert_that(&sight.target.is_some()).is_true();
    assert_that(&sight.recheck.is_some()).is_true();
    assert_that(&common::drain_events::<SightEvent>(&mut world).len()).is_equal_to(0);

    // Step out of cover; the next recheck tick picks the target up.
    world.get_mut::<Transform>(player).unwrap().position = Vec2::new(11.5, 8.5);
    common::set_delta(&mut world, 0.1);
    run_sight(&mut world);

    let sight = world.get::<Sight>(enemy).unwrap();
    assert_that(&sight.seen).is_true();
    assert_that(&sight.recheck.is_none()).is_true();
    let events = common::drain_events::<SightEvent>(&mut world);
    assert_that(&events.len()).is_equal_to(1);
    assert_that(&events[0].gained).is_true();
}

#[test]
fn test_volume_exit_forces_lose_sight_and_cancels_recheck() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world, Vec2::new(7.5, 2.5));
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(2.5, 2.5));

    run_sight(&mut world);
    assert_that(&world.get::<Sight>(enemy).unwrap().seen).is_true();
    common::drain_events::<SightEvent>(&mut world);

    // Leave the detection volume entirely.
    world.get_mut::<Transform>(player).unwrap().position = Vec2::new(13.5, 8.5);
    run_sight(&mut world);

    let sight = world.get::<Sight>(enemy).unwrap();
    assert_that(&sight.seen).is_false();
    assert_that(&sight.target.is_none()).is_true();
    assert_that(&sight.recheck.is_none()).is_true();
    let events = common::drain_events::<SightEvent>(&mut world);
    assert_that(&events.len()).is_equal_to(1);
    assert_that(&events[0].gained).is_false();
}

#[test]
fn test_suspended_perception_sees_nothing() {
    let mut world = common::create_test_world();
    let _player = common::spawn_test_player(&mut world, Vec2::new(11.5, 2.5));
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(5.5, 2.5));
    world
        .get_mut::<Capabilities>(enemy)
        .unwrap()
        .remove(Capabilities::PERCEPTION);

    run_sight(&mut world);

    assert_that(&world.get::<Sight>(enemy).unwrap().seen).is_false();
    assert_that(&common::drain_events::<SightEvent>(&mut world).len()).is_equal_to(0);
}

#[test]
fn test_attack_range_is_a_level_signal_gated_on_sight() {
    let mut world = common::create_test_world();
    let player = common::spawn_test_player(&mut world, Vec2::new(8.5, 2.5));
    let enemy = common::spawn_test_enemy(&mut world, Vec2::new(5.5, 2.5));

    // In range but not yet seen: no signal.
    world
        .run_system_once(attack_range_system)
        .expect("System should run successfully");
    assert_that(&world.get::<AttackSense>(enemy).unwrap().in_range).is_false();

    run_sight(&mut world);
    world
        .run_system_once(attack_range_system)
        .expect("System should run successfully");
    assert_that(&world.get::<AttackSense>(enemy).unwrap().in_range).is_true();

    // The signal is level-triggered: it drops as soon as the target moves
    // out of the attack radius.
    world.get_mut::<Transform>(player).unwrap().position = Vec2::new(14.5, 2.5);
    world
        .run_system_once(attack_range_system)
        .expect("System should run successfully");
    assert_that(&world.get::<AttackSense>(enemy).unwrap().in_range).is_false();
}
