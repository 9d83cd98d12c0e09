//! Round bookkeeping: how many drones to spawn, when, and who is still alive.

use bevy::prelude::*;

use super::registry::{PointId, PointKind, SpawnRegistry};
use crate::plugins::drones::AttackPattern;

/// Owns the active drone list and point occupancy.
///
/// Single writer: only the spawner systems mutate this resource. Drone systems
/// read it to resolve their regroup points.
#[derive(Resource, Debug)]
pub struct SpawnCoordinator {
    pub registry: SpawnRegistry,
    round: u32,
    pattern: AttackPattern,
    active: Vec<Entity>,
    pending: u32,
    stagger_remaining: f32,
    spawn_interval: f32,
    auto_start_attack: bool,
    attack_trigger_pending: bool,
}

impl Default for SpawnCoordinator {
    fn default() -> Self {
        Self::new(0.1, false)
    }
}

impl SpawnCoordinator {
    pub fn new(spawn_interval: f32, auto_start_attack: bool) -> Self {
        Self {
            registry: SpawnRegistry::default(),
            round: 0,
            pattern: AttackPattern::default(),
            active: Vec::new(),
            pending: 0,
            stagger_remaining: 0.0,
            spawn_interval: spawn_interval.max(0.0),
            auto_start_attack,
            attack_trigger_pending: false,
        }
    }

    #[inline]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Pattern given to drones spawned from now on.
    #[inline]
    pub fn pattern(&self) -> AttackPattern {
        self.pattern
    }

    #[inline]
    pub fn active(&self) -> &[Entity] {
        &self.active
    }

    #[inline]
    pub fn is_active(&self, drone: Entity) -> bool {
        self.active.contains(&drone)
    }

    /// True while a staggered batch still has drones to spawn.
    #[inline]
    pub fn is_spawning(&self) -> bool {
        self.pending > 0
    }

    /// Begin round `round`: top the field up to `round` drones.
    ///
    /// Returns how many spawns were queued. Requests while a batch is still
    /// spawning are ignored.
    pub fn start_round(&mut self, round: u32) -> u32 {
        if self.is_spawning() {
            debug!("Round {round} ignored: still spawning round {}", self.round);
            return 0;
        }

        self.round = round;
        self.pattern = AttackPattern::select(round, self.pattern);

        let to_spawn = round.saturating_sub(self.active.len() as u32);
        self.pending = to_spawn;
        self.stagger_remaining = 0.0;
        // An empty batch has no last spawn to wait for.
        self.attack_trigger_pending = !self.auto_start_attack || to_spawn == 0;

        let free = self.registry.pool(PointKind::Spawn).free_count();
        info!(
            "Starting round {round}: {to_spawn} drone(s) to spawn with {:?}, {free} spawn point(s) free",
            self.pattern
        );
        if to_spawn as usize > free {
            warn!("Round {round} wants {to_spawn} drone(s) but only {free} spawn point(s) are free");
        }
        to_spawn
    }

    /// Advance the stagger clock and return how many spawns are due now.
    ///
    /// The first spawn of a batch is due immediately, the rest one
    /// `spawn_interval` apart.
    pub fn take_due_spawns(&mut self, dt: f32) -> u32 {
        if self.pending == 0 {
            return 0;
        }

        self.stagger_remaining -= dt;
        let mut due = 0;
        while self.pending > 0 && self.stagger_remaining <= 0.0 {
            due += 1;
            self.pending -= 1;
            if self.spawn_interval <= 0.0 {
                continue;
            }
            self.stagger_remaining += self.spawn_interval;
        }

        if self.pending == 0 && self.auto_start_attack {
            self.attack_trigger_pending = true;
        }
        due
    }

    /// Give back a queued spawn that could not be placed.
    pub fn abandon_pending(&mut self) {
        self.pending = 0;
    }

    /// Consume the once-per-round request to start every drone attacking.
    pub fn take_attack_trigger(&mut self) -> bool {
        std::mem::take(&mut self.attack_trigger_pending)
    }

    pub fn register(&mut self, drone: Entity) {
        if !self.is_active(drone) {
            self.active.push(drone);
        }
    }

    /// Forget a destroyed drone and free its points.
    pub fn on_destroyed(&mut self, drone: Entity, points: &[PointId]) {
        if !self.is_active(drone) {
            warn!("Destroyed drone {drone:?} was not in the active set");
        }
        self.active.retain(|&e| e != drone);
        for &id in points {
            if !self.registry.release(id) {
                warn!("Drone {drone:?} released {id:?} which was not occupied");
            }
        }
    }
}
