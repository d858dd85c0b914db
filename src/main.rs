//! Headless demo: a scripted player walks the arena, triggering the burst
//! and wave areas, the turret and the traps, while the core logs lifecycle
//! events. Pass `--turbo` to skip real-time frame pacing.

use std::time::Instant;

use anyhow::Result;
use glam::Vec2;
use smallvec::smallvec;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use ruin::constants::{LOOP_TIME, RAW_ARENA};
use ruin::formatter::{advance_tick, CustomFormatter};
use ruin::game::Game;
use ruin::systems::{InputState, SpawnArea, SpawnMethod, SpawnMode, Transform};

const MAX_TICKS: u32 = 1800;

fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .event_format(CustomFormatter)
        .finish()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber)?;

    let turbo = std::env::args().any(|arg| arg == "--turbo");

    let mut game = Game::new(&RAW_ARENA)?;

    game.add_spawn_area(SpawnArea::new(
        Vec2::new(8.0, 5.0),
        Vec2::new(13.0, 8.0),
        smallvec![0, 1],
        SpawnMethod::Random,
        SpawnMode::Burst { count: 4, delay: 0.5 },
    ));
    let wave_area = game.add_spawn_area(SpawnArea::new(
        Vec2::new(16.0, 9.0),
        Vec2::new(22.0, 14.0),
        smallvec![0, 2],
        SpawnMethod::RoundRobin,
        SpawnMode::Waves {
            waves: 2,
            per_wave: 3,
            delay: 0.5,
            between: 1.0,
        },
    ));
    game.add_gate(wave_area, Vec2::new(22.5, 11.5));
    game.add_turret(Vec2::new(20.5, 2.5));
    game.add_fire_trap(Vec2::new(4.5, 13.5));
    game.add_explosion_trap(Vec2::new(12.5, 5.5));

    info!("Arena ready, walking the route");

    // The scripted route: down the west corridor, through the burst area,
    // into the wave arena, then toward the gate.
    let route = [
        Vec2::new(2.5, 8.5),
        Vec2::new(10.5, 8.5),
        Vec2::new(10.5, 6.5),
        Vec2::new(18.5, 11.5),
        Vec2::new(20.5, 13.5),
    ];
    let mut leg = 0usize;
    let dt = LOOP_TIME.as_secs_f32();

    for tick in 0..MAX_TICKS {
        let frame_start = Instant::now();

        let position = game
            .world
            .get::<Transform>(game.player)
            .map(|transform| transform.position)
            .unwrap_or_default();
        if let Some(&target) = route.get(leg) {
            if position.distance(target) < 0.6 {
                leg += 1;
            }
        }
        let axis = route.get(leg).map(|&target| target - position).unwrap_or(Vec2::ZERO);
        {
            let mut input = game.world.resource_mut::<InputState>();
            input.move_axis = axis;
            input.dash_pressed = tick % 240 == 120;
        }

        advance_tick();
        if game.tick(dt) {
            info!("Session wound down");
            break;
        }

        if !turbo {
            spin_sleep::sleep(LOOP_TIME.saturating_sub(frame_start.elapsed()));
        }
    }

    game.teardown();
    info!("Demo finished");
    Ok(())
}
