//! Real-time behavior core for an arena action game: per-frame scheduling
//! of timed abilities, enemy perception and movement state machines, and
//! pooled spawn-heavy gameplay.

pub mod ability;
pub mod arena;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod formatter;
pub mod game;
pub mod pool;
pub mod sequence;
pub mod systems;
