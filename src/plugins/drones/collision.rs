//! Drone contact resolution.
//!
//! Reads `CollisionStart` from physics and applies gameplay effects: drones
//! that touch the player push and hurt it, then either die or fall back;
//! drones touched by a laser take damage. Destroyed drones are only marked
//! `PendingReturn` here; the commit system recycles them.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::behavior::start_fallback;
use super::components::{Drone, DroneActivity, DroneBrain, DroneHealth, DroneMode};
use super::follower::PathFollower;
use crate::common::{layers::Layer, tunables::Tunables};
use crate::plugins::arena::AttackArea;
use crate::plugins::player::{Knockback, PlayerHealth};

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
fn targets(ev: &CollisionStart) -> (CollisionTarget, CollisionTarget) {
    (
        CollisionTarget {
            collider: ev.collider1,
            body: ev.body1,
        },
        CollisionTarget {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

#[inline]
fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}

/// Which contact a drone made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Contact {
    Target(Entity),
    Laser,
}

pub fn process_drone_collisions(
    tunables: Res<Tunables>,
    area: Option<Res<AttackArea>>,
    mut started: MessageReader<CollisionStart>,
    q_is_drone: Query<(), With<Drone>>,
    q_layers: Query<&CollisionLayers>,
    q_positions: Query<&Transform, Without<Drone>>,
    mut q_players: Query<(Option<&mut PlayerHealth>, Option<&mut Knockback>), Without<Drone>>,
    mut q_drones: Query<
        (
            &Transform,
            &mut DroneHealth,
            &mut DroneBrain,
            &mut DroneMode,
            &mut PathFollower,
            &mut DroneActivity,
        ),
        With<Drone>,
    >,
    // Per-tick dedupe of (drone, other collider) pairs
    mut seen: Local<HashSet<(Entity, Entity)>>,
) {
    seen.clear();
    let area = area.as_deref();

    for ev in started.read() {
        let (t1, t2) = targets(ev);

        let d1 = q_is_drone.contains(t1.collider);
        let d2 = q_is_drone.contains(t2.collider);
        if d1 && d2 {
            trace!("Drone {:?} brushed drone {:?}", t1.collider, t2.collider);
            continue;
        }
        if !d1 && !d2 {
            continue;
        }
        let (drone_side, other_side) = if d1 { (t1, t2) } else { (t2, t1) };
        let drone = drone_side.collider;

        let Ok(other_layers) = q_layers.get(other_side.collider) else {
            continue;
        };
        let contact = if is_in_layer(other_layers, Layer::Player) {
            Contact::Target(other_side.gameplay_owner())
        } else if is_in_layer(other_layers, Layer::Laser) {
            Contact::Laser
        } else {
            continue;
        };

        if !seen.insert((drone, other_side.collider)) {
            continue;
        }

        let Ok((tf, mut health, mut brain, mut mode, mut follower, mut activity)) = q_drones.get_mut(drone) else {
            continue;
        };
        if *activity != DroneActivity::Active {
            continue;
        }

        match contact {
            Contact::Target(player) => {
                let drone_pos = tf.translation;
                let direction = q_positions
                    .get(player)
                    .map(|ptf| (ptf.translation - drone_pos).truncate().normalize_or_zero())
                    .unwrap_or(Vec2::ZERO);

                if let Ok((hp, kb)) = q_players.get_mut(player) {
                    if let Some(mut kb) = kb {
                        kb.push(direction * tunables.knockback_speed);
                    }
                    if let Some(mut hp) = hp {
                        hp.take_damage(tunables.drone_contact_damage);
                        debug!("Drone {drone:?} hit {player:?}; player health {}", hp.current);
                    }
                }

                brain.force_direction = direction;
                if health.apply_damage(tunables.collision_self_damage) {
                    info!("Drone {drone:?} destroyed on impact");
                    follower.cancel();
                    *activity = DroneActivity::PendingReturn;
                } else {
                    start_fallback(drone_pos, &mut brain, &mut mode, &mut follower, area, &tunables);
                }
            }
            Contact::Laser => {
                if health.apply_damage(tunables.laser_damage) {
                    info!("Drone {drone:?} destroyed by laser");
                    follower.cancel();
                    *activity = DroneActivity::PendingReturn;
                } else {
                    debug!("Drone {drone:?} hit by laser; health {}", health.hp);
                }
            }
        }
    }
}
