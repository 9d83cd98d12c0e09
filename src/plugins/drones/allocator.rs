//! Spawn consumer: activate drones from the pool.
//!
//! # Fail-fast invariants
//! - The pool free list contains only pooled drone entities.
//! - Therefore, an entity popped from the pool must match the drone query.
//!
//! A violation is a bug and panics via `expect()`.
//!
//! A freshly activated drone locks onto the player if one exists; the radius
//! search only covers drones that start without a target.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{
    AssignedPoints, DroneActivity, DroneBrain, DroneHealth, DroneMode, DroneTarget, PooledDrone, TargetSearch,
};
use super::follower::PathFollower;
use super::messages::{DroneSpawned, SpawnDroneRequest};
use super::pool::{DronePool, active_drone_layers, pooled_drone};
use crate::common::tunables::Tunables;
use crate::plugins::player::Player;

pub fn allocate_drones_from_pool(
    mut commands: Commands,
    mut pool: ResMut<DronePool>,
    tunables: Res<Tunables>,
    mut requests: MessageReader<SpawnDroneRequest>,
    mut spawned: MessageWriter<DroneSpawned>,
    q_players: Query<Entity, With<Player>>,
    mut q: Query<
        (
            &mut DroneActivity,
            &mut DroneHealth,
            &mut DroneMode,
            &mut DroneBrain,
            &mut TargetSearch,
            &mut DroneTarget,
            &mut AssignedPoints,
            &mut PathFollower,
            &mut Transform,
            &mut Visibility,
            &mut CollisionLayers,
        ),
        With<PooledDrone>,
    >,
) {
    for req in requests.read() {
        let points = AssignedPoints(Some((req.spawn_point, req.regroup_point)));
        let initial_target = DroneTarget(q_players.iter().next());
        if initial_target.0.is_none() {
            debug!("No player to target yet; drone will search");
        }

        let drone = match pool.pop_free() {
            Some(e) => {
                let (
                    mut activity,
                    mut health,
                    mut mode,
                    mut brain,
                    mut search,
                    mut target,
                    mut assigned,
                    mut follower,
                    mut tf,
                    mut vis,
                    mut layers,
                ) = q.get_mut(e).expect("DronePool contained an entity missing pooled drone components");

                *activity = DroneActivity::Active;
                health.hp = tunables.drone_health;
                *mode = DroneMode::Idle;
                *brain = DroneBrain::new(req.pattern);
                *search = TargetSearch::default();
                *target = initial_target;
                *assigned = points;
                // Keeps the generation counter moving so completions from a
                // previous life stay stale.
                follower.cancel();
                tf.translation = req.position;
                *vis = Visibility::Visible;
                *layers = active_drone_layers();
                e
            }
            None => {
                debug!("Drone pool empty; growing past capacity {}", pool.capacity());
                commands
                    .spawn(pooled_drone(&tunables))
                    .insert((
                        DroneActivity::Active,
                        DroneBrain::new(req.pattern),
                        initial_target,
                        points,
                        Transform::from_translation(req.position),
                        Visibility::Visible,
                        active_drone_layers(),
                    ))
                    .id()
            }
        };

        trace!("Activated drone {drone:?} at {}", req.position);
        spawned.write(DroneSpawned {
            drone,
            spawn_point: req.spawn_point,
            regroup_point: req.regroup_point,
        });
    }
}
