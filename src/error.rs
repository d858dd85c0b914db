//! Centralized error types for the behavior core.
//!
//! This module defines all error types used throughout the crate,
//! providing a consistent error handling approach. No error here is fatal
//! to the simulation: failures degrade to a logged, skipped action.

use bevy_ecs::event::Event;
use glam::Vec2;

/// Main error type for the behavior core.
///
/// This is the primary error type that should be used in public APIs.
/// It derives `Event` so systems can report failures through the event bus
/// without interrupting the tick loop.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Spawn error: {0}")]
    Spawn(#[from] SpawnError),

    #[error("Arena error: {0}")]
    Arena(#[from] ArenaError),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Errors caused by incomplete or contradictory entity configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Ranged ability on '{0}' has no projectile configuration")]
    MissingProjectile(&'static str),

    #[error("Unknown enemy type index: {0}")]
    UnknownEnemyType(usize),
}

/// Errors raised while placing entities into the world.
#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    #[error("No walkable surface within {tolerance} units of ({x:.2}, {y:.2})")]
    Placement { x: f32, y: f32, tolerance: f32 },
}

impl SpawnError {
    pub fn placement(position: Vec2, tolerance: f32) -> Self {
        SpawnError::Placement {
            x: position.x,
            y: position.y,
            tolerance,
        }
    }
}

/// Errors related to the arena layout.
#[derive(thiserror::Error, Debug)]
pub enum ArenaError {
    #[error("Unknown character in arena layout: {0:?}")]
    UnknownCharacter(char),

    #[error("Arena layout rows have inconsistent widths")]
    RaggedRows,

    #[error("Arena layout has no player start position")]
    MissingPlayerStart,
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
