//! Sight and attack-range sensing.
//!
//! Sight is edge-triggered: gaining sight fires once, with periodic
//! line-of-sight rechecks at a fixed interval only while a tracked target
//! is not yet visible, and leaving the detection volume forces a
//! lose-sight edge and cancels the outstanding recheck. Attack range is a
//! purely geometric sphere check ANDed with current visibility, re-raised
//! every tick as a level signal for the ability gate.

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventWriter,
    query::{With, Without},
    system::{Query, Res},
};
use tracing::debug;

use crate::arena::Arena;
use crate::constants::SIGHT_RECHECK_INTERVAL;
use crate::events::SightEvent;
use crate::pool::Dormant;
use crate::systems::components::{Capabilities, Dead, DeltaTime, PlayerControlled, Transform};

/// Per-enemy sight state. `target` is the candidate currently inside the
/// detection volume; `recheck` is the running check, present only while
/// the candidate is tracked but not yet seen.
#[derive(Component, Debug, Clone, Copy)]
pub struct Sight {
    pub range: f32,
    pub fov_degrees: f32,
    pub target: Option<Entity>,
    pub seen: bool,
    pub recheck: Option<f32>,
}

impl Sight {
    pub fn new(range: f32, fov_degrees: f32) -> Self {
        Sight {
            range,
            fov_degrees,
            target: None,
            seen: false,
            recheck: None,
        }
    }
}

/// Level-triggered attack-range signal consumed by the enemy ability gate.
#[derive(Component, Debug, Clone, Copy)]
pub struct AttackSense {
    pub range: f32,
    pub in_range: bool,
}

impl AttackSense {
    pub fn new(range: f32) -> Self {
        AttackSense {
            range,
            in_range: false,
        }
    }
}

fn visible(arena: &Arena, observer: &Transform, sight: &Sight, target_position: glam::Vec2) -> bool {
    let to_target = target_position - observer.position;
    if to_target.length_squared() <= f32::EPSILON {
        return true;
    }
    let angle = observer.facing.angle_to(to_target.normalize()).abs().to_degrees();
    if angle >= sight.fov_degrees / 2.0 {
        return false;
    }
    !arena.line_blocked(observer.position, target_position)
}

/// Tracks detection-volume enter/exit edges and raises gain/lose-sight.
#[allow(clippy::type_complexity)]
pub fn sight_system(
    dt: Res<DeltaTime>,
    arena: Res<Arena>,
    player: Query<(Entity, &Transform), With<PlayerControlled>>,
    mut enemies: Query<
        (Entity, &Transform, &mut Sight, &Capabilities),
        (Without<Dormant>, Without<Dead>, Without<PlayerControlled>),
    >,
    mut events: EventWriter<SightEvent>,
) {
    let Ok((candidate, candidate_transform)) = player.single() else {
        return;
    };
    let candidate_position = candidate_transform.position;

    for (enemy, transform, mut sight, caps) in enemies.iter_mut() {
        if !caps.contains(Capabilities::PERCEPTION) {
            continue;
        }
        let inside = transform.position.distance(candidate_position) <= sight.range;

        if inside && sight.target.is_none() {
            // Candidate entered the detection volume: check immediately and
            // begin rechecking until visible.
            sight.target = Some(candidate);
            if visible(&arena, transform, &sight, candidate_position) {
                sight.seen = true;
                sight.recheck = None;
                debug!(?enemy, "Gained sight");
                events.write(SightEvent {
                    enemy,
                    target: candidate,
                    gained: true,
                });
            } else {
                sight.recheck = Some(SIGHT_RECHECK_INTERVAL);
            }
        } else if inside {
            if !sight.seen {
                if let Some(remaining) = sight.recheck.as_mut() {
                    *remaining -= dt.seconds;
                    if *remaining <= 0.0 {
                        if visible(&arena, transform, &sight, candidate_position) {
                            sight.seen = true;
                            sight.recheck = None;
                            debug!(?enemy, "Gained sight");
                            events.write(SightEvent {
                                enemy,
                                target: candidate,
                                gained: true,
                            });
                        } else {
                            sight.recheck = Some(SIGHT_RECHECK_INTERVAL);
                        }
                    }
                }
            }
        } else if let Some(target) = sight.target.take() {
            // Candidate left the volume: force the lose-sight edge and
            // cancel the outstanding recheck.
            sight.recheck = None;
            if sight.seen {
                sight.seen = false;
                debug!(?enemy, "Lost sight");
                events.write(SightEvent {
                    enemy,
                    target,
                    gained: false,
                });
            }
        }
    }
}

/// Re-evaluates the attack-range signal every tick.
#[allow(clippy::type_complexity)]
pub fn attack_range_system(
    player: Query<&Transform, With<PlayerControlled>>,
    mut enemies: Query<
        (&Transform, &Sight, &mut AttackSense, &Capabilities),
        (Without<Dormant>, Without<Dead>, Without<PlayerControlled>),
    >,
) {
    let Ok(candidate) = player.single() else {
        return;
    };
    for (transform, sight, mut sense, caps) in enemies.iter_mut() {
        if !caps.contains(Capabilities::HITBOX) {
            sense.in_range = false;
            continue;
        }
        sense.in_range =
            sight.seen && transform.position.distance(candidate.position) <= sense.range;
    }
}
