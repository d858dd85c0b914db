use glam::Vec2;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

use ruin::ability::{AbilityPhase, AbilityRuntime};
use ruin::constants::ENEMY_POOL_SIZE;
use ruin::game::Game;
use ruin::pool::{Dormant, Pools};
use ruin::systems::{Behavior, Capabilities, Dead, EnemyState, Health};

mod common;

const DT: f32 = 1.0 / 60.0;

fn tick_n(game: &mut Game, ticks: u32) {
    for _ in 0..ticks {
        game.tick(DT);
    }
}

/// Far corner relative to the player start; outside every sight range.
const QUIET_SPOT: Vec2 = Vec2::new(12.5, 7.5);

#[test]
fn test_damage_clamps_then_death_recycles_exactly_once() {
    let mut game = Game::new(&common::TEST_ROWS).expect("Game should build");
    let enemy = common::spawn_pooled_enemy(&mut game.world, 0, QUIET_SPOT)
        .expect("Spawn should succeed");

    common::send_damage(&mut game.world, enemy, 3);
    game.tick(DT);
    let health = *game.world.get::<Health>(enemy).unwrap();
    assert_that(&health.current()).is_equal_to(2);
    assert_that(&health.is_dead()).is_false();

    common::send_damage(&mut game.world, enemy, 5);
    game.tick(DT);
    let health = *game.world.get::<Health>(enemy).unwrap();
    assert_that(&health.current()).is_equal_to(0);
    assert_that(&game.world.get::<Dead>(enemy).is_some()).is_true();
    let caps = *game.world.get::<Capabilities>(enemy).unwrap();
    assert_that(&caps.contains(Capabilities::LOCOMOTION)).is_false();

    // More damage while dead must not start a second death flow.
    common::send_damage(&mut game.world, enemy, 4);

    // After the fixed death delay the instance reappears in the pool.
    tick_n(&mut game, 70);
    assert_that(&game.world.get::<Dormant>(enemy).is_some()).is_true();
    let pools = game.world.resource::<Pools>();
    assert_that(&pools.get(0).available()).is_equal_to(ENEMY_POOL_SIZE);
    assert_that(&pools.get(0).in_use()).is_equal_to(0);
}

#[test]
fn test_pool_round_trip_fully_resets_the_enemy() {
    let mut game = Game::new(&common::TEST_ROWS).expect("Game should build");
    let enemy = common::spawn_pooled_enemy(&mut game.world, 0, QUIET_SPOT)
        .expect("Spawn should succeed");

    common::send_damage(&mut game.world, enemy, 999);
    tick_n(&mut game, 70);
    assert_that(&game.world.get::<Dormant>(enemy).is_some()).is_true();

    let reborn = common::spawn_pooled_enemy(&mut game.world, 0, QUIET_SPOT)
        .expect("Respawn should succeed");

    assert_eq!(*game.world.get::<Health>(reborn).unwrap(), Health::new(5));
    let runtime = *game.world.get::<AbilityRuntime>(reborn).unwrap();
    assert_that(&runtime.phase).is_equal_to(AbilityPhase::Ready);
    assert_that(&runtime.sequence.is_none()).is_true();
    assert_that(&*game.world.get::<Capabilities>(reborn).unwrap()).is_equal_to(Capabilities::all());
    assert_that(&game.world.get::<Behavior>(reborn).unwrap().state).is_equal_to(EnemyState::Patrol);
    assert_that(&game.world.get::<Dead>(reborn).is_none()).is_true();
    assert_that(&game.world.get::<Dormant>(reborn).is_none()).is_true();
}

#[test]
fn test_player_death_latches_game_over() {
    let mut game = Game::new(&common::TEST_ROWS).expect("Game should build");
    let player = game.player;

    common::send_damage(&mut game.world, player, 99);
    let wound_down = game.tick(DT);

    assert_that(&wound_down).is_true();
    let health = *game.world.get::<Health>(player).unwrap();
    assert_that(&health.current()).is_equal_to(0);
}
