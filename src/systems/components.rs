//! Shared components and resources used across the behavior systems.

use bevy_ecs::{component::Component, resource::Resource};
use bitflags::bitflags;
use glam::Vec2;
use strum_macros::Display;

/// A tag component for the entity controlled by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// A tag component denoting the broad kind of entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    Projectile,
    Turret,
    Trap,
}

/// World-space position and facing of an entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec2,
    pub facing: Vec2,
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Transform {
            position,
            facing: Vec2::X,
        }
    }

    /// Snaps facing toward a point. Keeps the previous facing when the
    /// point coincides with the entity's position.
    pub fn look_at(&mut self, point: Vec2) {
        let to = point - self.position;
        if to.length_squared() > f32::EPSILON {
            self.facing = to.normalize();
        }
    }
}

bitflags! {
    /// Capabilities an entity currently has enabled. Ability sequences
    /// suspend these on activation and must restore them on completion;
    /// the ability reset path restores them when a sequence is interrupted.
    #[derive(Component, Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Capabilities: u8 {
        const LOCOMOTION = 1 << 0;
        const PERCEPTION = 1 << 1;
        const HITBOX = 1 << 2;
    }
}

/// Marker for entities that have reached zero health and are running their
/// death sequence. While present, behavior and perception are frozen.
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct Dead;

/// Path-following agent over the arena's walkable surface.
#[derive(Component, Debug, Clone)]
pub struct NavAgent {
    pub destination: Option<Vec2>,
    pub path: Vec<Vec2>,
    /// Destination the current path was planned for; a differing
    /// destination forces a replan.
    pub planned_for: Option<Vec2>,
    pub speed: f32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub stopping_distance: f32,
    pub stopped: bool,
}

impl NavAgent {
    pub fn new(patrol_speed: f32, chase_speed: f32, stopping_distance: f32) -> Self {
        NavAgent {
            destination: None,
            path: Vec::new(),
            planned_for: None,
            speed: patrol_speed,
            patrol_speed,
            chase_speed,
            stopping_distance,
            stopped: true,
        }
    }

    pub fn set_destination(&mut self, point: Vec2) {
        self.destination = Some(point);
        self.stopped = false;
    }

    /// Halts the agent and forgets its destination.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.destination = None;
        self.path.clear();
        self.planned_for = None;
    }

    pub fn arrived(&self, position: Vec2) -> bool {
        self.destination
            .is_some_and(|destination| position.distance(destination) <= self.stopping_distance)
    }
}

/// A fixed-velocity displacement locked to the direction captured when the
/// dash began. Removed by the movement system once `remaining` elapses.
#[derive(Component, Debug, Clone, Copy)]
pub struct Dash {
    pub direction: Vec2,
    pub speed: f32,
    pub remaining: f32,
}

/// Animation flags timed sequences mutate. Presentation reads these;
/// nothing in the core depends on them.
#[derive(Component, Debug, Default, Clone, Copy, PartialEq)]
pub struct AnimationState {
    /// Locomotion blend weight: 0 = idle, 1 = moving.
    pub blend: f32,
    pub dashing: bool,
    pub fatigued: bool,
}

bitflags! {
    #[derive(Component, Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct CollisionLayer: u8 {
        const PLAYER = 1 << 0;
        const ENEMY = 1 << 1;
        const PROJECTILE = 1 << 2;
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Collider {
    pub radius: f32,
}

/// A contact hit volume briefly enabled by ability and trap sequences.
/// Applies its damage at most once per enable window.
#[derive(Component, Debug, Clone, Copy)]
pub struct Damager {
    pub damage: i32,
    pub radius: f32,
    pub enabled: bool,
    pub spent: bool,
}

impl Damager {
    pub fn new(damage: i32, radius: f32) -> Self {
        Damager {
            damage,
            radius,
            enabled: false,
            spent: false,
        }
    }
}

/// Index of the enemy type in the roster that configured this entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyType(pub usize);

/// Ranged attack wiring resolved at spawn time: which projectile pool to
/// draw from and how the shots fly. Absent when the enemy's ability is not
/// ranged, or when its projectile configuration was missing.
#[derive(Component, Debug, Clone, Copy)]
pub struct RangedAttack {
    pub pool: crate::pool::PoolId,
    pub speed: f32,
    pub lifetime: f32,
    /// Forward offset along facing from which shots leave the shooter.
    pub muzzle_offset: f32,
    pub damage: i32,
}

#[derive(Resource, Debug, Clone, Copy)]
pub struct DeltaTime {
    pub seconds: f32,
    pub ticks: u32,
}

/// Input-state queries, fed by the platform layer each frame.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct InputState {
    pub move_axis: Vec2,
    pub dash_pressed: bool,
}

/// Process-scoped session context, created with the `Game` and torn down
/// with it.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct GameState {
    pub game_over: bool,
    /// Set while any wave area is mid-fight; drives the music director.
    pub combat: bool,
    pub exit: bool,
}

/// Fire-and-forget presentation cues the core raises for collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FeedbackCue {
    AbilityWindup,
    AbilityStrike,
    TakeDamage,
    Death,
    ProjectileFired,
    FlameJet,
    Explosion,
    GateOpen,
    GateClose,
    WaveIncoming,
    GameOver,
}

/// Presentation playback collaborator. Implementations must tolerate being
/// called at any point in the tick and must not reach back into the core.
pub trait FeedbackPlayer: Send + Sync {
    fn play(&self, cue: FeedbackCue, position: Option<Vec2>);
}

#[derive(Resource)]
pub struct Feedbacks(pub Box<dyn FeedbackPlayer>);

impl Feedbacks {
    pub fn play(&self, cue: FeedbackCue, position: Option<Vec2>) {
        self.0.play(cue, position);
    }
}

/// Default playback: structured log lines, useful headless and in tests.
pub struct TracingFeedback;

impl FeedbackPlayer for TracingFeedback {
    fn play(&self, cue: FeedbackCue, position: Option<Vec2>) {
        match position {
            Some(at) => tracing::debug!(%cue, x = at.x, y = at.y, "Feedback"),
            None => tracing::debug!(%cue, "Feedback"),
        }
    }
}
