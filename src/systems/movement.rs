//! Agent path-following and dash displacement integration.

use bevy_ecs::{
    entity::Entity,
    query::Without,
    system::{Commands, Query, Res},
};
use tracing::trace;

use crate::arena::Arena;
use crate::pool::Dormant;
use crate::systems::components::{Capabilities, Dash, Dead, DeltaTime, NavAgent, Transform};

/// Moves agents along arena paths toward their destinations.
///
/// Paths are (re)planned whenever the destination changes; chase
/// retargeting therefore replans at the chase polling interval. Agents
/// whose locomotion capability is suspended hold position.
#[allow(clippy::type_complexity)]
pub fn agent_system(
    dt: Res<DeltaTime>,
    arena: Res<Arena>,
    mut agents: Query<
        (&mut Transform, &mut NavAgent, &Capabilities),
        (Without<Dormant>, Without<Dead>),
    >,
) {
    for (mut transform, mut agent, caps) in agents.iter_mut() {
        if agent.stopped || !caps.contains(Capabilities::LOCOMOTION) {
            continue;
        }
        let Some(destination) = agent.destination else {
            continue;
        };

        if agent.planned_for != Some(destination) {
            agent.path = arena
                .find_path(transform.position, destination)
                .unwrap_or_default();
            agent.planned_for = Some(destination);
            if agent.path.is_empty() {
                trace!(x = destination.x, y = destination.y, "No path to destination");
            }
        }

        let mut travel = agent.speed * dt.seconds;
        while travel > 0.0 {
            let Some(&corner) = agent.path.first() else {
                break;
            };
            let to_corner = corner - transform.position;
            let distance = to_corner.length();
            if distance <= travel {
                transform.position = corner;
                travel -= distance;
                agent.path.remove(0);
            } else {
                let direction = to_corner / distance;
                transform.position += direction * travel;
                transform.facing = direction;
                travel = 0.0;
            }
        }
        if agent.path.is_empty() && agent.arrived(transform.position) {
            agent.destination = None;
            agent.planned_for = None;
        }
    }
}

/// Integrates fixed-velocity dash displacements.
///
/// The travelled step is clamped to the remaining time so the total
/// displacement equals speed × duration along the direction that was
/// captured when the dash began. A wall ends the dash early: dashing
/// entities collide like everything else does.
pub fn dash_system(
    dt: Res<DeltaTime>,
    arena: Res<Arena>,
    mut commands: Commands,
    mut dashes: Query<(Entity, &mut Transform, &mut Dash), Without<Dormant>>,
) {
    for (entity, mut transform, mut dash) in dashes.iter_mut() {
        let step = dt.seconds.min(dash.remaining);
        let next = transform.position + dash.direction * dash.speed * step;
        if arena.is_walkable(Arena::cell_at(next)) {
            transform.position = next;
            dash.remaining -= step;
        } else {
            dash.remaining = 0.0;
        }
        if dash.remaining <= 0.0 {
            commands.entity(entity).remove::<Dash>();
        }
    }
}
