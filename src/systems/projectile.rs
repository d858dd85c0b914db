//! Pooled projectiles: straight-line motion, impact damage, and automatic
//! return to the pool after a fixed lifetime.

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::{EventReader, EventWriter},
    query::{With, Without},
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use tracing::trace;

use crate::arena::Arena;
use crate::events::{DamageEvent, ProjectileRequest};
use crate::pool::{Dormant, PooledBy, Pools, Prefab};
use crate::systems::components::{
    Collider, CollisionLayer, DeltaTime, EntityKind, PlayerControlled, Transform,
};

#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile {
    pub velocity: Vec2,
    pub damage: i32,
    pub remaining: f32,
}

/// Template constructor for a dormant projectile instance.
pub fn projectile_prefab() -> Prefab {
    Box::new(move |commands, pool_id| {
        commands
            .spawn((
                Transform::at(Vec2::ZERO),
                EntityKind::Projectile,
                Projectile {
                    velocity: Vec2::ZERO,
                    damage: 0,
                    remaining: 0.0,
                },
                Collider { radius: 0.2 },
                CollisionLayer::PROJECTILE,
                PooledBy(pool_id),
                Dormant,
            ))
            .id()
    })
}

/// Serves projectile requests from pooled instances.
pub fn projectile_fire_system(
    mut requests: EventReader<ProjectileRequest>,
    mut pools: ResMut<Pools>,
    mut commands: Commands,
) {
    for request in requests.read() {
        let entity = pools.acquire(request.pool, &mut commands);
        commands.entity(entity).insert((
            Transform {
                position: request.origin,
                facing: request.direction,
            },
            Projectile {
                velocity: request.direction * request.speed,
                damage: request.damage,
                remaining: request.lifetime,
            },
        ));
        trace!(shooter = ?request.shooter, projectile = ?entity, "Projectile fired");
    }
}

/// Flies projectiles and recycles them on impact, wall hit, or expiry.
#[allow(clippy::type_complexity)]
pub fn projectile_system(
    dt: Res<DeltaTime>,
    arena: Res<Arena>,
    mut pools: ResMut<Pools>,
    mut commands: Commands,
    mut damage_events: EventWriter<DamageEvent>,
    player: Query<(Entity, &Transform, &Collider), With<PlayerControlled>>,
    mut projectiles: Query<
        (Entity, &mut Transform, &mut Projectile, &Collider, &PooledBy),
        (Without<Dormant>, Without<PlayerControlled>),
    >,
) {
    let target = player.single().ok();
    for (entity, mut transform, mut projectile, collider, pooled_by) in projectiles.iter_mut() {
        transform.position += projectile.velocity * dt.seconds;
        projectile.remaining -= dt.seconds;

        let expired = projectile.remaining <= 0.0;
        let hit_wall = !arena.is_walkable(Arena::cell_at(transform.position));
        let hit_target = target.is_some_and(|(_, player_transform, player_collider)| {
            transform.position.distance(player_transform.position)
                <= collider.radius + player_collider.radius
        });

        if hit_target {
            if let Some((player_entity, _, _)) = target {
                damage_events.write(DamageEvent {
                    target: player_entity,
                    amount: projectile.damage,
                });
            }
        }
        if expired || hit_wall || hit_target {
            pools.release(pooled_by.0, entity, &mut commands);
        }
    }
}
