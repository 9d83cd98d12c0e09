//! Spawn and regroup point occupancy.
//!
//! Points are identified by index into the arena layout. A drone holds its
//! points only by `PointId`, so freeing a point never needs the drone entity.

use std::fmt;

use bevy::prelude::*;
use rand::Rng;

use crate::common::error::SpawnError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    Spawn,
    Regroup,
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKind::Spawn => f.write_str("spawn"),
            PointKind::Regroup => f.write_str("regroup"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointId {
    pub kind: PointKind,
    pub index: usize,
}

/// Fixed set of points with a boolean occupancy flag each.
#[derive(Debug, Clone, Default)]
pub struct PointPool {
    positions: Vec<Vec3>,
    occupied: Vec<bool>,
}

impl PointPool {
    pub fn new(positions: Vec<Vec3>) -> Self {
        let occupied = vec![false; positions.len()];
        Self { positions, occupied }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.occupied.iter().filter(|o| !**o).count()
    }

    /// Occupy a uniformly chosen free point.
    fn claim(&mut self, kind: PointKind, rng: &mut impl Rng) -> Result<usize, SpawnError> {
        if self.positions.is_empty() {
            return Err(SpawnError::EmptyPointPool { kind });
        }

        let free: Vec<usize> = (0..self.occupied.len()).filter(|&i| !self.occupied[i]).collect();
        if free.is_empty() {
            return Err(SpawnError::NoPointAvailable {
                kind,
                total: self.positions.len(),
            });
        }

        let index = free[rng.gen_range(0..free.len())];
        self.occupied[index] = true;
        Ok(index)
    }
}

/// Occupancy of every spawn and regroup point.
///
/// Invariant: an occupied point belongs to exactly one live drone.
#[derive(Debug, Clone, Default)]
pub struct SpawnRegistry {
    spawn: PointPool,
    regroup: PointPool,
}

impl SpawnRegistry {
    pub fn new(spawn_points: Vec<Vec3>, regroup_points: Vec<Vec3>) -> Self {
        Self {
            spawn: PointPool::new(spawn_points),
            regroup: PointPool::new(regroup_points),
        }
    }

    pub fn pool(&self, kind: PointKind) -> &PointPool {
        match kind {
            PointKind::Spawn => &self.spawn,
            PointKind::Regroup => &self.regroup,
        }
    }

    fn pool_mut(&mut self, kind: PointKind) -> &mut PointPool {
        match kind {
            PointKind::Spawn => &mut self.spawn,
            PointKind::Regroup => &mut self.regroup,
        }
    }

    pub fn claim(&mut self, kind: PointKind, rng: &mut impl Rng) -> Result<PointId, SpawnError> {
        let index = self.pool_mut(kind).claim(kind, rng)?;
        Ok(PointId { kind, index })
    }

    /// Claim one spawn point and one regroup point, or neither.
    pub fn claim_pair(&mut self, rng: &mut impl Rng) -> Result<(PointId, PointId), SpawnError> {
        let spawn = self.claim(PointKind::Spawn, rng)?;
        match self.claim(PointKind::Regroup, rng) {
            Ok(regroup) => Ok((spawn, regroup)),
            Err(e) => {
                self.release(spawn);
                Err(e)
            }
        }
    }

    /// Free a point. Returns false if it was not occupied.
    pub fn release(&mut self, id: PointId) -> bool {
        if !self.is_occupied(id) {
            return false;
        }
        self.pool_mut(id.kind).occupied[id.index] = false;
        true
    }

    pub fn is_occupied(&self, id: PointId) -> bool {
        self.pool(id.kind).occupied.get(id.index).copied().unwrap_or(false)
    }

    pub fn position(&self, id: PointId) -> Option<Vec3> {
        self.pool(id.kind).positions.get(id.index).copied()
    }
}
