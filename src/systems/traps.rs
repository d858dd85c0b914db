//! Stationary enemies: turrets and traps.
//!
//! These are scene-owned fixtures rather than pooled spawns. The turret is
//! damageable and shoots from its own projectile pool; the traps run their
//! strike cycles on the timed-sequence runner and hurt through the same
//! contact damagers melee abilities use.

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::EventWriter,
    query::{With, Without},
    system::{Query, Res, ResMut},
    world::World,
};
use glam::Vec2;
use tracing::debug;

use crate::events::{DamageEvent, ProjectileRequest};
use crate::pool::{Dormant, PoolId};
use crate::sequence::{Effect, Sequence, SequenceHandle, Sequencer, Wait};
use crate::systems::components::{
    AnimationState, Capabilities, Collider, CollisionLayer, Damager, Dead, DeltaTime, EntityKind,
    FeedbackCue, PlayerControlled, RangedAttack, Transform,
};
use crate::systems::health::Health;

const TURRET_SIGHT_RANGE: f32 = 10.0;
const TURRET_ATTACK_RANGE: f32 = 8.0;
const TURRET_ATTACK_RATE: f32 = 1.0;
const TURRET_HEALTH: i32 = 5;
const TURRET_DAMAGE: i32 = 1;
const TURRET_SHOT_SPEED: f32 = 6.0;
const TURRET_SHOT_LIFETIME: f32 = 5.0;

const FIRE_TRAP_RANGE: f32 = 10.0;
const FIRE_TRAP_INTERVAL: f32 = 1.0;
const FIRE_TRAP_JETS: u32 = 4;
const FIRE_TRAP_DAMAGE: i32 = 1;
const FIRE_TRAP_ARMING_SECS: f32 = 0.8;
const FIRE_TRAP_WINDOW_SECS: f32 = 1.0;

const EXPLOSION_RADIUS: f32 = 5.0;
const EXPLOSION_COOLDOWN_SECS: f32 = 5.0;
const EXPLOSION_DAMAGE: i32 = 2;
const EXPLOSION_ARMING_SECS: f32 = 0.8;
const EXPLOSION_WINDOW_SECS: f32 = 0.1;

/// A fixed emplacement with separate sight and attack radii. Plain sphere
/// checks, no field of view or occlusion.
#[derive(Component, Debug, Clone, Copy)]
pub struct Turret {
    pub sight_range: f32,
    pub attack_range: f32,
    pub rate: f32,
    pub cooldown: f32,
}

/// Cycles through flame jets while the player is near; each jet activation
/// is a runner sequence with an arming delay before the hit window.
#[derive(Component, Debug, Clone, Copy)]
pub struct FireTrap {
    pub range: f32,
    pub interval: f32,
    pub jets: u32,
    pub jet: u32,
    pub timer: f32,
    pub sequence: Option<SequenceHandle>,
}

/// Proximity mine: explodes when the player gets close, then re-arms after
/// its cooldown (which lives inside the sequence).
#[derive(Component, Debug, Clone, Copy)]
pub struct ExplosionTrap {
    pub radius: f32,
    pub sequence: Option<SequenceHandle>,
}

pub fn spawn_turret(world: &mut World, position: Vec2, projectile_pool: PoolId) -> Entity {
    world
        .spawn((
            Transform::at(position),
            EntityKind::Turret,
            Turret {
                sight_range: TURRET_SIGHT_RANGE,
                attack_range: TURRET_ATTACK_RANGE,
                rate: TURRET_ATTACK_RATE,
                cooldown: 0.0,
            },
            RangedAttack {
                pool: projectile_pool,
                speed: TURRET_SHOT_SPEED,
                lifetime: TURRET_SHOT_LIFETIME,
                muzzle_offset: 0.6,
                damage: TURRET_DAMAGE,
            },
            Health::new(TURRET_HEALTH),
            Capabilities::all(),
            AnimationState::default(),
            Collider { radius: 0.6 },
            CollisionLayer::ENEMY,
        ))
        .id()
}

pub fn spawn_fire_trap(world: &mut World, position: Vec2) -> Entity {
    world
        .spawn((
            Transform::at(position),
            EntityKind::Trap,
            FireTrap {
                range: FIRE_TRAP_RANGE,
                interval: FIRE_TRAP_INTERVAL,
                jets: FIRE_TRAP_JETS,
                jet: 0,
                timer: 0.0,
                sequence: None,
            },
            Damager::new(FIRE_TRAP_DAMAGE, 1.0),
            Capabilities::all(),
            AnimationState::default(),
        ))
        .id()
}

pub fn spawn_explosion_trap(world: &mut World, position: Vec2) -> Entity {
    world
        .spawn((
            Transform::at(position),
            EntityKind::Trap,
            ExplosionTrap {
                radius: EXPLOSION_RADIUS,
                sequence: None,
            },
            Damager::new(EXPLOSION_DAMAGE, 2.0),
            Capabilities::all(),
            AnimationState::default(),
        ))
        .id()
}

fn flame_jet_sequence() -> Sequence {
    Sequence::new()
        .step(Effect::Feedback(FeedbackCue::FlameJet), Wait::Seconds(FIRE_TRAP_ARMING_SECS))
        .step(Effect::SetDamager(true), Wait::Seconds(FIRE_TRAP_WINDOW_SECS))
        .step(Effect::SetDamager(false), Wait::Instant)
}

fn explosion_sequence() -> Sequence {
    Sequence::new()
        .step(Effect::Feedback(FeedbackCue::Explosion), Wait::Seconds(EXPLOSION_ARMING_SECS))
        .step(Effect::SetDamager(true), Wait::Seconds(EXPLOSION_WINDOW_SECS))
        .step(Effect::SetDamager(false), Wait::Seconds(EXPLOSION_COOLDOWN_SECS))
}

/// Aims and fires turrets while the player is inside both radii.
#[allow(clippy::type_complexity)]
pub fn turret_system(
    dt: Res<DeltaTime>,
    player: Query<&Transform, With<PlayerControlled>>,
    mut turrets: Query<
        (Entity, &mut Transform, &mut Turret, &RangedAttack, &mut AnimationState),
        (Without<Dormant>, Without<Dead>, Without<PlayerControlled>),
    >,
    mut requests: EventWriter<ProjectileRequest>,
) {
    let Ok(target) = player.single() else {
        return;
    };
    for (entity, mut transform, mut turret, attack, mut anim) in turrets.iter_mut() {
        let distance = transform.position.distance(target.position);
        let in_sight = distance <= turret.sight_range;
        let in_attack = distance <= turret.attack_range;
        anim.blend = if in_sight { 1.0 } else { 0.0 };

        turret.cooldown -= dt.seconds;
        if in_sight && in_attack && turret.cooldown <= 0.0 {
            transform.look_at(target.position);
            requests.write(ProjectileRequest {
                shooter: entity,
                pool: attack.pool,
                origin: transform.position + transform.facing * attack.muzzle_offset,
                direction: transform.facing,
                speed: attack.speed,
                damage: attack.damage,
                lifetime: attack.lifetime,
            });
            turret.cooldown = turret.rate;
            debug!(turret = ?entity, "Turret fired");
        }
    }
}

/// Runs the fire and explosion trap cycles.
#[allow(clippy::type_complexity)]
pub fn trap_system(
    dt: Res<DeltaTime>,
    mut sequencer: ResMut<Sequencer>,
    player: Query<&Transform, With<PlayerControlled>>,
    mut fire_traps: Query<(Entity, &Transform, &mut FireTrap), (Without<Dormant>, Without<Dead>)>,
    mut explosion_traps: Query<
        (Entity, &Transform, &mut ExplosionTrap),
        (Without<Dormant>, Without<Dead>),
    >,
) {
    let Ok(target) = player.single() else {
        return;
    };

    for (entity, transform, mut trap) in fire_traps.iter_mut() {
        let nearby = transform.position.distance(target.position) <= trap.range;
        if !nearby {
            trap.timer = 0.0;
            trap.jet = 0;
            continue;
        }
        trap.timer += dt.seconds;
        if trap.timer >= trap.interval {
            trap.timer = 0.0;
            trap.jet = (trap.jet + 1) % trap.jets.max(1);
        }
        let busy = trap.sequence.is_some_and(|handle| sequencer.is_running(handle));
        if !busy {
            trap.sequence = Some(sequencer.run(entity, flame_jet_sequence()));
        }
    }

    for (entity, transform, mut trap) in explosion_traps.iter_mut() {
        let detected = transform.position.distance(target.position) <= trap.radius;
        let busy = trap.sequence.is_some_and(|handle| sequencer.is_running(handle));
        if detected && !busy {
            trap.sequence = Some(sequencer.run(entity, explosion_sequence()));
        }
    }
}

/// Applies contact damage from enabled hit volumes, once per window.
#[allow(clippy::type_complexity)]
pub fn damager_system(
    player: Query<(Entity, &Transform, &Collider), With<PlayerControlled>>,
    mut damagers: Query<
        (&Transform, &mut Damager),
        (Without<Dormant>, Without<Dead>, Without<PlayerControlled>),
    >,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let Ok((player_entity, target, player_collider)) = player.single() else {
        return;
    };
    for (transform, mut damager) in damagers.iter_mut() {
        if !damager.enabled || damager.spent {
            continue;
        }
        if transform.position.distance(target.position) <= damager.radius + player_collider.radius {
            damager.spent = true;
            damage_events.write(DamageEvent {
                target: player_entity,
                amount: damager.damage,
            });
        }
    }
}
