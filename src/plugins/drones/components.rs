//! Drone components.
//!
//! Pooled drones keep every component for their whole life; activation and
//! return only overwrite values, so no archetype moves happen per spawn.

use bevy::prelude::*;

use super::pattern::AttackPattern;
use crate::plugins::spawner::PointId;

#[derive(Component, Debug, Clone, Copy)]
pub struct Drone;

#[derive(Component, Debug, Clone, Copy)]
pub struct PooledDrone;

/// Pool lifecycle.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DroneActivity {
    #[default]
    Inactive,
    Active,
    /// Destroyed this tick; the commit system returns it to the pool.
    PendingReturn,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroneHealth {
    pub hp: i32,
}

impl DroneHealth {
    /// Subtract `amount`; true once health is depleted.
    #[inline]
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        self.hp -= amount;
        self.is_depleted()
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.hp <= 0
    }
}

/// Behaviour state machine.
///
/// ```text
/// Idle --target acquired--> Attacking --target hit--> Defensive
///   Defensive --fallback + dwell--> Patrolling --patrol done--> Attacking
///   any live mode --RegroupCommand--> Returning --arrived--> Attacking
/// ```
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DroneMode {
    /// No target yet.
    #[default]
    Idle,
    Attacking,
    Defensive,
    Patrolling,
    Returning,
}

/// Countdown in seconds that never goes negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Countdown(f32);

impl Countdown {
    #[inline]
    pub fn new(secs: f32) -> Self {
        Self(secs.max(0.0))
    }
    #[inline]
    pub fn get(self) -> f32 {
        self.0
    }
    #[inline]
    pub fn tick_down(&mut self, dt: f32) {
        self.0 = (self.0 - dt).max(0.0);
    }
    #[inline]
    pub fn is_elapsed(self) -> bool {
        self.0 <= 0.0
    }
}

/// Per-drone attack bookkeeping.
#[derive(Component, Debug, Clone)]
pub struct DroneBrain {
    pub pattern: AttackPattern,
    /// Cleared while regrouping; attack requests are ignored until set again.
    pub continue_attacking: bool,
    /// Direction of the last push given to the target.
    pub force_direction: Vec2,
    /// Defensive hold after the fallback move lands.
    pub dwell: Option<Countdown>,
}

impl DroneBrain {
    pub fn new(pattern: AttackPattern) -> Self {
        Self {
            pattern,
            continue_attacking: true,
            force_direction: Vec2::ZERO,
            dwell: None,
        }
    }
}

impl Default for DroneBrain {
    fn default() -> Self {
        Self::new(AttackPattern::default())
    }
}

/// Periodic proximity scan for the target.
///
/// One-shot: once a target is acquired `searching` stays false, even if the
/// target later disappears.
#[derive(Component, Debug, Clone)]
pub struct TargetSearch {
    pub searching: bool,
    pub next_scan: Countdown,
}

impl Default for TargetSearch {
    fn default() -> Self {
        Self {
            searching: true,
            next_scan: Countdown::default(),
        }
    }
}

/// Tracked entity. A despawned target reads as unset.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct DroneTarget(pub Option<Entity>);

/// Spawn and regroup points held while the drone is live.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AssignedPoints(pub Option<(PointId, PointId)>);

impl AssignedPoints {
    #[inline]
    pub fn spawn(&self) -> Option<PointId> {
        self.0.map(|(s, _)| s)
    }

    #[inline]
    pub fn regroup(&self) -> Option<PointId> {
        self.0.map(|(_, r)| r)
    }
}
