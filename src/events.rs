//! Event types exposed by the behavior core, one type per event kind.
//!
//! All lifecycle notifications are edge-triggered and carry only the
//! identity collaborators need. Subscribers read them through
//! `EventReader` parameters; nothing here is a global broadcast field.

use bevy_ecs::{entity::Entity, event::Event};

use crate::systems::behavior::EnemyState;

/// An enemy gained or lost sight of its tracked target.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SightEvent {
    pub enemy: Entity,
    pub target: Entity,
    pub gained: bool,
}

/// An enemy's behavior state machine moved between states.
///
/// Same-state transitions are filtered out before this is emitted.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChanged {
    pub entity: Entity,
    pub old: EnemyState,
    pub new: EnemyState,
}

/// Damage to apply to a target. The single entry point into the health
/// ledger, callable by any collision collaborator holding the target.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageEvent {
    pub target: Entity,
    pub amount: i32,
}

/// An entity finished its death delay and is about to be recycled.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeathEvent {
    pub entity: Entity,
}

/// An entity was configured and released into the world.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnedEvent {
    pub entity: Entity,
}

/// An ability left the Ready phase and its payload sequence was started.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbilityActivated {
    pub entity: Entity,
}

/// An ability's active window elapsed and its cooldown began.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbilityEnded {
    pub entity: Entity,
}

/// Progress notifications from a wave spawn area.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaveEvent {
    Started { area: Entity, wave: u32 },
    Cleared { area: Entity, wave: u32 },
    Completed { area: Entity },
}

/// A spawn area asked its gate to open or close.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GateEvent {
    pub area: Entity,
    pub open: bool,
}

/// Internal: a pacing sequence asks its spawn area to place one enemy now.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    pub area: Entity,
}

/// Internal: a shooter asks the projectile layer for one pooled projectile.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct ProjectileRequest {
    pub shooter: Entity,
    pub pool: crate::pool::PoolId,
    pub origin: glam::Vec2,
    pub direction: glam::Vec2,
    pub speed: f32,
    pub damage: i32,
    pub lifetime: f32,
}
