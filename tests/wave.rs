use glam::Vec2;
use smallvec::smallvec;
use speculoos::prelude::*;

use ruin::game::Game;
use ruin::pool::Pools;
use ruin::systems::{Gate, Health, SpawnArea, SpawnMethod, SpawnMode, WaveState};

mod common;

const DT: f32 = 1.0 / 60.0;

fn tick_until(game: &mut Game, max_ticks: u32, mut done: impl FnMut(&mut Game) -> bool) -> bool {
    for _ in 0..max_ticks {
        game.tick(DT);
        if done(game) {
            return true;
        }
    }
    false
}

fn wave_area(spawn_point: Vec2) -> SpawnArea {
    let mut area = SpawnArea::new(
        Vec2::new(0.0, 0.0),
        Vec2::new(4.0, 4.0),
        smallvec![1],
        SpawnMethod::RoundRobin,
        SpawnMode::Waves {
            waves: 2,
            per_wave: 3,
            delay: 0.05,
            between: 0.1,
        },
    );
    area.spawn_point = Some(spawn_point);
    area
}

#[test]
fn test_two_waves_then_completion_opens_the_gate() {
    let mut game = Game::new(&common::TEST_ROWS).expect("Game should build");
    // Keep the player standing through the whole fight.
    game.world.entity_mut(game.player).insert(Health::new(1000));

    let area = game.add_spawn_area(wave_area(Vec2::new(12.5, 7.5)));
    let gate = game.add_gate(area, Vec2::new(14.5, 5.5));

    // The player starts inside the trigger: the first tick closes the gate.
    game.tick(DT);
    assert_that(&game.world.get::<Gate>(gate).unwrap().open).is_false();

    // Wave 1 fills up.
    let spawned = tick_until(&mut game, 120, |game| {
        game.world
            .get::<WaveState>(area)
            .is_some_and(|wave| wave.current == 1 && wave.members.len() == 3)
    });
    assert_that(&spawned).is_true();

    // Killing all of wave 1 advances to wave 2 after the configured delay.
    let members = game.world.get::<WaveState>(area).unwrap().members.clone();
    for member in members {
        common::send_damage(&mut game.world, member, 999);
    }
    let advanced = tick_until(&mut game, 300, |game| {
        game.world
            .get::<WaveState>(area)
            .is_some_and(|wave| wave.current == 2 && wave.members.len() == 3)
    });
    assert_that(&advanced).is_true();
    assert_that(&game.world.get::<Gate>(gate).unwrap().open).is_false();

    // Clearing wave 2 completes the area and opens the gate.
    let members = game.world.get::<WaveState>(area).unwrap().members.clone();
    for member in members {
        common::send_damage(&mut game.world, member, 999);
    }
    let completed = tick_until(&mut game, 300, |game| {
        game.world.get::<SpawnArea>(area).is_none()
    });
    assert_that(&completed).is_true();
    assert_that(&game.world.get::<Gate>(gate).unwrap().open).is_true();
}

#[test]
fn test_burst_area_spawns_its_count_and_retires() {
    let mut game = Game::new(&common::TEST_ROWS).expect("Game should build");
    game.world.entity_mut(game.player).insert(Health::new(1000));

    let mut area = SpawnArea::new(
        Vec2::new(0.0, 0.0),
        Vec2::new(4.0, 4.0),
        smallvec![1],
        SpawnMethod::Random,
        SpawnMode::Burst {
            count: 2,
            delay: 0.05,
        },
    );
    area.spawn_point = Some(Vec2::new(12.5, 7.5));
    let area = game.add_spawn_area(area);

    let retired = tick_until(&mut game, 120, |game| {
        game.world.get::<SpawnArea>(area).is_none()
    });
    assert_that(&retired).is_true();

    // Both spawns are out in the world, drawn from the crusher pool.
    let pools = game.world.resource::<Pools>();
    assert_that(&pools.get(1).in_use()).is_equal_to(2);
}
