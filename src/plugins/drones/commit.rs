//! Return commit: recycle destroyed drones into the pool.
//!
//! Owns the inactive invariants. An inactive drone is hidden, follows no
//! path, holds no points and collides with nothing.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{AssignedPoints, DroneActivity, DroneMode, DroneTarget, PooledDrone};
use super::follower::PathFollower;
use super::messages::DroneDestroyed;
use super::pool::{DronePool, inactive_drone_layers};

pub fn return_to_pool_commit(
    mut pool: ResMut<DronePool>,
    mut destroyed: MessageWriter<DroneDestroyed>,
    mut q: Query<
        (
            Entity,
            &mut DroneActivity,
            &mut DroneMode,
            &mut DroneTarget,
            &mut PathFollower,
            &mut AssignedPoints,
            &mut Visibility,
            &mut CollisionLayers,
        ),
        With<PooledDrone>,
    >,
) {
    for (e, mut activity, mut mode, mut target, mut follower, mut points, mut vis, mut layers) in &mut q {
        if *activity != DroneActivity::PendingReturn {
            continue;
        }

        *activity = DroneActivity::Inactive;
        *mode = DroneMode::Idle;
        target.0 = None;
        follower.cancel();
        *vis = Visibility::Hidden;
        *layers = inactive_drone_layers();

        match points.0.take() {
            Some((spawn_point, regroup_point)) => {
                destroyed.write(DroneDestroyed {
                    drone: e,
                    spawn_point,
                    regroup_point,
                });
            }
            None => warn!("Drone {e:?} returned without assigned points"),
        }

        pool.push_free(e);
    }
}
