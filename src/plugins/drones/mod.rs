//! Drones plugin: pooled enemy drones with attack patterns, separation and
//! area confinement.
//!
//! # Data flow
//! ```text
//! FixedUpdate
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ Allocate  SpawnDroneRequest -> pop pool -> activate -> DroneSpawned  │
//! │                                                                      │
//! │ Simulate  commands (TriggerAttack / RegroupCommand / DespawnDrone)   │
//! │           -> target search -> separation (tick, then timer)          │
//! │           -> defensive dwell -> path step -> PathFinished handling   │
//! │           -> area constraint                                         │
//! └──────────────────────────────────────────────────────────────────────┘
//!                 │
//!                 v
//! FixedPostUpdate
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ (physics emits CollisionStart)                                       │
//! │ Resolve   contact damage / knockback / lasers -> PendingReturn       │
//! │           -> commit: Inactive, push to pool, DroneDestroyed          │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The spawner produces `SpawnDroneRequest`s; the allocator is the single
//! writer of the pool's free list on the way out and the commit on the way
//! back in.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::{state::GameState, tunables::Tunables};

pub mod allocator;
pub mod behavior;
pub mod collision;
pub mod commit;
pub mod components;
pub mod follower;
pub mod messages;
pub mod path;
pub mod pattern;
pub mod pool;
pub mod separation;

pub use components::{
    AssignedPoints, Drone, DroneActivity, DroneBrain, DroneHealth, DroneMode, DroneTarget, PooledDrone,
    TargetSearch,
};
pub use follower::PathFollower;
pub use messages::{
    DespawnDrone, DroneDestroyed, DroneSpawned, PathFinished, RegroupCommand, SpawnDroneRequest, TriggerAttack,
};
pub use pattern::AttackPattern;
pub use pool::DronePool;

/// Ordering anchors for other plugins.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DroneSystems {
    Allocate,
    Simulate,
    Resolve,
}

pub fn plugin(app: &mut App) {
    let (capacity, separation_interval) = app
        .world()
        .get_resource::<Tunables>()
        .map(|t| (t.pool_capacity, t.separation_interval))
        .unwrap_or((10, 0.5));

    app.insert_resource(DronePool::new(capacity))
        .insert_resource(separation::SeparationTimer::new(separation_interval))
        .add_message::<SpawnDroneRequest>()
        .add_message::<DroneSpawned>()
        .add_message::<DroneDestroyed>()
        .add_message::<TriggerAttack>()
        .add_message::<RegroupCommand>()
        .add_message::<DespawnDrone>()
        .add_message::<PathFinished>()
        .add_systems(Startup, pool::init_drone_pool);

    app.configure_sets(
        FixedUpdate,
        (DroneSystems::Allocate, DroneSystems::Simulate)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
    app.configure_sets(
        FixedPostUpdate,
        DroneSystems::Resolve
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedUpdate,
        allocator::allocate_drones_from_pool.in_set(DroneSystems::Allocate),
    );

    app.add_systems(
        FixedUpdate,
        (
            behavior::handle_drone_commands,
            behavior::search_for_target,
            separation::separate_every_tick,
            separation::separate_on_timer,
            behavior::tick_defensive,
            follower::advance_paths,
            behavior::on_path_finished,
            behavior::constrain_to_area,
        )
            .chain()
            .in_set(DroneSystems::Simulate),
    );

    app.add_systems(
        FixedPostUpdate,
        (collision::process_drone_collisions, commit::return_to_pool_commit)
            .chain()
            .in_set(DroneSystems::Resolve),
    );
}

#[cfg(test)]
mod tests;
