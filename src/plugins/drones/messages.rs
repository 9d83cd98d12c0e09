//! Drone messages.
//!
//! Producers write intent; the drone systems are the single consumers.
//! `DroneDestroyed` flows the other way, from the pool commit to whoever
//! tracks fleets (the spawn coordinator).

use bevy::prelude::*;

use super::path::PathPurpose;
use super::pattern::AttackPattern;
use crate::plugins::spawner::PointId;

/// Activate one drone from the pool.
#[derive(Message, Clone, Copy, Debug)]
pub struct SpawnDroneRequest {
    pub pattern: AttackPattern,
    pub position: Vec3,
    pub spawn_point: PointId,
    pub regroup_point: PointId,
}

/// A pooled drone went live.
#[derive(Message, Clone, Copy, Debug)]
pub struct DroneSpawned {
    pub drone: Entity,
    pub spawn_point: PointId,
    pub regroup_point: PointId,
}

/// A drone left play (health depleted or explicitly despawned).
#[derive(Message, Clone, Copy, Debug)]
pub struct DroneDestroyed {
    pub drone: Entity,
    pub spawn_point: PointId,
    pub regroup_point: PointId,
}

/// Resume the attack pattern unless the drone is busy regrouping, defending or patrolling.
#[derive(Message, Clone, Copy, Debug)]
pub struct TriggerAttack {
    pub drone: Entity,
}

/// Suspend attacking and fly back to the regroup point.
#[derive(Message, Clone, Copy, Debug)]
pub struct RegroupCommand {
    pub drone: Entity,
}

/// Remove a drone from play without it being shot down.
#[derive(Message, Clone, Copy, Debug)]
pub struct DespawnDrone {
    pub drone: Entity,
}

/// A path ran to completion. Stale if `generation` no longer matches the follower.
#[derive(Message, Clone, Copy, Debug)]
pub struct PathFinished {
    pub drone: Entity,
    pub generation: u64,
    pub purpose: PathPurpose,
}
