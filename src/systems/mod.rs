//! Per-frame behavior systems and their components.

pub mod audio;
pub mod behavior;
pub mod components;
pub mod health;
pub mod movement;
pub mod perception;
pub mod player;
pub mod projectile;
pub mod spawn;
pub mod traps;

pub use audio::{music_system, MusicDirector, MusicTrack};
pub use behavior::{behavior_system, locomotion_system, Behavior, EnemyState, Patrol};
pub use components::*;
pub use health::{damage_system, game_over_system, healthbar_system, Health, HealthbarVisible};
pub use movement::{agent_system, dash_system};
pub use perception::{attack_range_system, sight_system, AttackSense, Sight};
pub use player::{player_ability_system, player_control_system};
pub use projectile::{projectile_fire_system, projectile_system, Projectile};
pub use spawn::{
    gate_system, spawn_area_system, Gate, SpawnArea, SpawnMethod, SpawnMode, Spawner, WaveState,
};
pub use traps::{
    damager_system, spawn_explosion_trap, spawn_fire_trap, spawn_turret, trap_system,
    turret_system, ExplosionTrap, FireTrap, Turret,
};
