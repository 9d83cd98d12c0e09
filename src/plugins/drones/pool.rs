//! Drone pool.
//!
//! Drones are pre-spawned inactive and recycled: activation and return only
//! overwrite component values. An inactive drone is hidden and its collision
//! filters are empty, so it never produces collision events.
//!
//! The free list is FIFO. When it runs dry the allocator spawns a fresh drone
//! past capacity, and that drone joins the pool when it is returned.

use std::collections::VecDeque;

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::{
    AssignedPoints, Drone, DroneActivity, DroneBrain, DroneHealth, DroneMode, DroneTarget, PooledDrone,
    TargetSearch,
};
use super::follower::PathFollower;
use crate::common::{layers::Layer, tunables::Tunables};

/// Drone body radius in meters.
pub const DRONE_RADIUS: f32 = 0.5;

#[derive(Resource, Debug)]
pub struct DronePool {
    free: VecDeque<Entity>,
    capacity: usize,
}

impl DronePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            free: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn pop_free(&mut self) -> Option<Entity> {
        self.free.pop_front()
    }

    #[inline]
    pub fn push_free(&mut self, drone: Entity) {
        self.free.push_back(drone);
    }

    fn clear(&mut self) {
        self.free.clear();
    }
}

#[inline]
pub fn active_drone_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Drone, [Layer::Player, Layer::Laser])
}

#[inline]
pub fn inactive_drone_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Drone, [] as [Layer; 0])
}

/// Everything an inactive pooled drone carries.
pub fn pooled_drone(tunables: &Tunables) -> impl Bundle {
    (
        (
            Name::new("Drone(Pooled)"),
            Drone,
            PooledDrone,
            DroneActivity::Inactive,
            DroneHealth { hp: tunables.drone_health },
            DroneMode::Idle,
            DroneBrain::default(),
            TargetSearch::default(),
            DroneTarget::default(),
            AssignedPoints::default(),
            PathFollower::default(),
        ),
        (
            Sprite {
                color: Color::srgb(0.95, 0.35, 0.3),
                custom_size: Some(Vec2::splat(DRONE_RADIUS * 2.0)),
                ..default()
            },
            Transform::default(),
            Visibility::Hidden,
            RigidBody::Kinematic,
            Collider::circle(DRONE_RADIUS),
            Sensor,
            inactive_drone_layers(),
            CollisionEventsEnabled,
        ),
    )
}

/// Pre-spawn `capacity` inactive drones.
pub fn init_drone_pool(mut commands: Commands, mut pool: ResMut<DronePool>, tunables: Res<Tunables>) {
    pool.clear();
    for _ in 0..pool.capacity() {
        let e = commands.spawn(pooled_drone(&tunables)).id();
        pool.push_free(e);
    }
    debug!("Drone pool primed with {} drones", pool.free_len());
}
