use glam::Vec2;
use speculoos::prelude::*;

use ruin::ability::{AbilityPhase, AbilityRuntime};
use ruin::constants::ENEMY_POOL_SIZE;
use ruin::pool::{Dormant, Pools};
use ruin::systems::{Behavior, Capabilities, EnemyState, EnemyType, Health, Patrol, RangedAttack};

mod common;

#[test]
fn test_spawn_applies_the_type_configuration() {
    let mut world = common::create_test_world();
    common::setup_spawner(&mut world);
    common::spawn_test_player(&mut world, Vec2::new(1.5, 1.5));

    let enemy = common::spawn_pooled_enemy(&mut world, 0, Vec2::new(8.5, 5.5))
        .expect("Spawn should succeed");

    let health = world.get::<Health>(enemy).unwrap();
    assert_that(&health.current()).is_equal_to(health.max());

    assert_that(&world.get::<Behavior>(enemy).unwrap().state).is_equal_to(EnemyState::Patrol);
    assert_that(&world.get::<Patrol>(enemy).unwrap().waypoints.len()).is_equal_to(4);
    assert_that(&world.get::<EnemyType>(enemy).unwrap().0).is_equal_to(0);
    assert_that(&world.get::<AbilityRuntime>(enemy).unwrap().phase).is_equal_to(AbilityPhase::Ready);
    assert_that(&*world.get::<Capabilities>(enemy).unwrap()).is_equal_to(Capabilities::all());
    assert_that(&world.get::<Dormant>(enemy).is_none()).is_true();

    let pools = world.resource::<Pools>();
    assert_that(&pools.get(0).in_use()).is_equal_to(1);
}

#[test]
fn test_placement_failure_aborts_without_leaking() {
    let mut world = common::create_test_world();
    common::setup_spawner(&mut world);
    common::spawn_test_player(&mut world, Vec2::new(1.5, 1.5));

    let result = common::spawn_pooled_enemy(&mut world, 0, Vec2::new(-20.0, -20.0));
    assert_that(&result.is_err()).is_true();

    // The acquired instance went straight back to its pool.
    let pools = world.resource::<Pools>();
    assert_that(&pools.get(0).available()).is_equal_to(ENEMY_POOL_SIZE);
    assert_that(&pools.get(0).in_use()).is_equal_to(0);
}

#[test]
fn test_ranged_type_gets_projectile_wiring() {
    let mut world = common::create_test_world();
    common::setup_spawner(&mut world);
    common::spawn_test_player(&mut world, Vec2::new(1.5, 1.5));

    let gunner = common::spawn_pooled_enemy(&mut world, 2, Vec2::new(8.5, 5.5))
        .expect("Spawn should succeed");
    assert_that(&world.get::<RangedAttack>(gunner).is_some()).is_true();

    let brute = common::spawn_pooled_enemy(&mut world, 0, Vec2::new(10.5, 5.5))
        .expect("Spawn should succeed");
    assert_that(&world.get::<RangedAttack>(brute).is_none()).is_true();
}

#[test]
fn test_unknown_type_is_a_configuration_error() {
    let mut world = common::create_test_world();
    common::setup_spawner(&mut world);
    common::spawn_test_player(&mut world, Vec2::new(1.5, 1.5));

    let result = common::spawn_pooled_enemy(&mut world, 99, Vec2::new(8.5, 5.5));
    assert_that(&result.is_err()).is_true();
}
