//! This module contains all the tuning constants used by the behavior core.

use std::time::Duration;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// The size of each arena cell, in world units.
pub const CELL_SIZE: f32 = 1.0;

/// How far a requested spawn position may be corrected onto the walkable surface.
pub const SPAWN_TOLERANCE: f32 = 2.0;
/// How far an entity may be corrected back onto the surface after an ability displaced it.
pub const WARP_TOLERANCE: f32 = 1.0;

/// Interval between line-of-sight rechecks while a tracked target is not yet visible.
pub const SIGHT_RECHECK_INTERVAL: f32 = 0.1;

/// How long an enemy lingers at a patrol waypoint before moving on.
pub const PATROL_IDLE_SECS: f32 = 4.0;
/// Radius of the random offsets sampled around the spawn point for patrol waypoints.
pub const WAYPOINT_RADIUS: f32 = 6.0;

/// Delay between reaching zero health and the entity being returned to its pool.
pub const DEATH_DELAY_SECS: f32 = 1.0;
/// How long the health bar stays visible after taking a hit.
pub const HEALTHBAR_SECS: f32 = 2.0;
/// Length of the hit-volume window opened by melee strikes.
pub const DAMAGER_WINDOW_SECS: f32 = 0.2;

pub const PLAYER_MAX_HEALTH: i32 = 5;
pub const PLAYER_MOVE_SPEED: f32 = 4.5;

/// Crossfade time between the exploration and combat tracks.
pub const MUSIC_FADE_SECS: f32 = 1.0;

/// Initial population of each enemy pool.
pub const ENEMY_POOL_SIZE: usize = 5;

/// The raw layout of the demo arena, as rows of characters.
///
/// `#` is a wall (blocks movement and line of sight), `.` is open floor,
/// `P` is the player start position.
pub const RAW_ARENA: [&str; 16] = [
    "########################",
    "#......................#",
    "#.P....####......##....#",
    "#......####......##....#",
    "#......####............#",
    "#.............##.......#",
    "#..####.......##.......#",
    "#..####.......##.......#",
    "#......................#",
    "#......................#",
    "#...##......####.......#",
    "#...##......####.......#",
    "#...........####.......#",
    "#......................#",
    "#......................#",
    "########################",
];
