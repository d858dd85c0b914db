//! Enemy, attack and ability configuration data.
//!
//! These are the authoring-time templates applied to pooled instances at
//! spawn. Everything here is immutable once the session starts and shared
//! read-only between every entity of the same type.

use bevy_ecs::resource::Resource;

use crate::ability::{
    AbilityDescriptor, AbilityPayload, ChargeAbility, CrushAbility, DashAbility, ShootAbility,
};
use crate::systems::behavior::EnemyState;

/// How a ranged attack's shots fly.
#[derive(Debug, Clone, Copy)]
pub struct ProjectileConfig {
    pub speed: f32,
    pub lifetime_secs: f32,
    pub muzzle_offset: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct AttackConfig {
    /// Radius of the level-triggered attack-range check.
    pub attack_range: f32,
    /// Minimum time between ranged shots; also sizes the projectile pool.
    pub attack_rate: f32,
    /// Radius of the contact hit volume melee strikes open.
    pub damager_radius: f32,
    /// Required when the enemy's ability is ranged.
    pub projectile: Option<ProjectileConfig>,
}

#[derive(Debug, Clone, Copy)]
pub struct EnemyConfig {
    pub name: &'static str,
    pub max_health: i32,
    pub default_state: EnemyState,
    /// Number of patrol waypoints sampled at spawn (2..=4).
    pub waypoints: usize,
    pub sight_range: f32,
    pub field_of_view: f32,
    /// Interval for chase retargeting and patrol polling.
    pub update_interval: f32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub stopping_distance: f32,
    pub collider_radius: f32,
    pub ability: AbilityDescriptor,
    pub attack: AttackConfig,
}

/// Session-wide configuration: the enemy types spawners can draw from and
/// the player's own ability.
#[derive(Resource)]
pub struct Roster {
    pub enemies: Vec<EnemyConfig>,
    pub player_ability: AbilityDescriptor,
}

impl Default for Roster {
    fn default() -> Self {
        Roster {
            enemies: default_enemies(),
            player_ability: AbilityDescriptor {
                name: "dash",
                cooldown_secs: 1.5,
                active_secs: 0.4,
                damage: 0,
                payload: AbilityPayload::Dash(DashAbility {
                    velocity: 12.0,
                    max_distance: 5.0,
                }),
            },
        }
    }
}

fn default_enemies() -> Vec<EnemyConfig> {
    vec![
        EnemyConfig {
            name: "brute",
            max_health: 5,
            default_state: EnemyState::Patrol,
            waypoints: 4,
            sight_range: 10.0,
            field_of_view: 90.0,
            update_interval: 0.1,
            patrol_speed: 2.0,
            chase_speed: 4.0,
            stopping_distance: 1.0,
            collider_radius: 0.5,
            ability: AbilityDescriptor {
                name: "charge",
                cooldown_secs: 4.0,
                active_secs: 1.5,
                damage: 2,
                payload: AbilityPayload::Charge(ChargeAbility {
                    speed: 15.0,
                    distance: 8.0,
                    anticipation_secs: 1.0,
                    fatigue_secs: 4.0,
                }),
            },
            attack: AttackConfig {
                attack_range: 6.0,
                attack_rate: 1.5,
                damager_radius: 1.2,
                projectile: None,
            },
        },
        EnemyConfig {
            name: "crusher",
            max_health: 7,
            default_state: EnemyState::Patrol,
            waypoints: 3,
            sight_range: 8.0,
            field_of_view: 120.0,
            update_interval: 0.1,
            patrol_speed: 2.0,
            chase_speed: 3.5,
            stopping_distance: 1.0,
            collider_radius: 0.6,
            ability: AbilityDescriptor {
                name: "crush",
                cooldown_secs: 3.0,
                active_secs: 1.0,
                damage: 3,
                payload: AbilityPayload::Crush(CrushAbility {
                    strike_secs: 1.0,
                    fatigue_secs: 4.0,
                }),
            },
            attack: AttackConfig {
                attack_range: 2.0,
                attack_rate: 1.5,
                damager_radius: 1.5,
                projectile: None,
            },
        },
        EnemyConfig {
            name: "gunner",
            max_health: 3,
            default_state: EnemyState::Idle,
            waypoints: 2,
            sight_range: 12.0,
            field_of_view: 70.0,
            update_interval: 0.1,
            patrol_speed: 2.0,
            chase_speed: 3.0,
            stopping_distance: 4.0,
            collider_radius: 0.5,
            ability: AbilityDescriptor {
                name: "shoot",
                cooldown_secs: 2.0,
                active_secs: 2.0,
                damage: 1,
                payload: AbilityPayload::Shoot(ShootAbility {
                    anticipation_secs: 1.0,
                    reload_secs: 1.0,
                }),
            },
            attack: AttackConfig {
                attack_range: 8.0,
                attack_rate: 1.0,
                damager_radius: 0.0,
                projectile: Some(ProjectileConfig {
                    speed: 6.0,
                    lifetime_secs: 5.0,
                    muzzle_offset: 0.6,
                }),
            },
        },
    ]
}
