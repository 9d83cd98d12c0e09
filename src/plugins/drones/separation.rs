//! Separation: keep sibling drones at least `min_separation` apart.
//!
//! Runs unconditionally every fixed tick and again on a slower repeating
//! timer. Both passes are kept; the second is redundant once the first has run.

use bevy::prelude::*;

use super::components::{Drone, DroneActivity};
use crate::common::tunables::Tunables;

#[derive(Resource, Debug)]
pub struct SeparationTimer(pub Timer);

impl SeparationTimer {
    pub fn new(interval: f32) -> Self {
        Self(Timer::from_seconds(interval.max(0.001), TimerMode::Repeating))
    }
}

/// Push `position` away from every neighbour closer than `min_separation`.
///
/// Pushes accumulate in order, each one measured from the already pushed
/// position, and only act in the movement plane. Coincident drones get no push.
pub fn separate(position: Vec3, others: impl IntoIterator<Item = Vec3>, min_separation: f32) -> Vec3 {
    let mut p = position;
    for other in others {
        let offset = (p - other).truncate();
        let distance = offset.length();
        if distance < min_separation {
            p += (offset.normalize_or_zero() * (min_separation - distance)).extend(0.0);
        }
    }
    p
}

/// Resolve the whole fleet in entity order; later drones see earlier drones'
/// corrected positions.
fn resolve_fleet(
    min_separation: f32,
    q: &mut Query<(&mut Transform, &DroneActivity), With<Drone>>,
) {
    let mut fleet: Vec<Vec3> = q
        .iter()
        .filter(|(_, a)| **a == DroneActivity::Active)
        .map(|(tf, _)| tf.translation)
        .collect();

    if fleet.len() < 2 {
        return;
    }

    for i in 0..fleet.len() {
        let others = fleet
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, p)| *p)
            .collect::<Vec<_>>();
        fleet[i] = separate(fleet[i], others, min_separation);
    }

    let active = q.iter_mut().filter(|(_, a)| **a == DroneActivity::Active);
    for ((mut tf, _), resolved) in active.zip(fleet) {
        if tf.translation != resolved {
            tf.translation = resolved;
        }
    }
}

pub fn separate_every_tick(
    tunables: Res<Tunables>,
    mut q: Query<(&mut Transform, &DroneActivity), With<Drone>>,
) {
    resolve_fleet(tunables.min_separation, &mut q);
}

pub fn separate_on_timer(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    mut timer: ResMut<SeparationTimer>,
    mut q: Query<(&mut Transform, &DroneActivity), With<Drone>>,
) {
    timer.0.tick(time.delta());
    if timer.0.just_finished() {
        resolve_fleet(tunables.min_separation, &mut q);
    }
}
