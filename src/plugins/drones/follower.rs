//! Path following: walk a drone along its current path, one fixed tick at a time.
//!
//! The follower moves the drone by the change in path position each tick
//! rather than teleporting it onto the path, so separation nudges applied
//! earlier in the tick are kept.
//!
//! Cancellation: every `start` or `cancel` bumps `generation`. A completion is
//! reported with the generation it belongs to, and consumers drop completions
//! whose generation is stale, so a superseded path can never fire.

use bevy::prelude::*;

use super::components::{Drone, DroneActivity};
use super::messages::PathFinished;
use super::path::{Path, PathPurpose};
use crate::plugins::arena::{AttackArea, constrain};

#[derive(Debug, Clone)]
struct ActivePath {
    path: Path,
    purpose: PathPurpose,
    /// Drone position when the path was issued. Only the first lap starts here.
    origin: Vec3,
    first_lap: bool,
    elapsed: f32,
    /// Last polyline vertex passed in the current lap.
    vertex: usize,
    /// Path position reported last tick.
    last_sample: Vec3,
}

impl ActivePath {
    /// Polyline walked during the current lap.
    fn polyline(&self) -> Vec<Vec3> {
        let wp = &self.path.waypoints;
        let mut points = Vec::with_capacity(wp.len() + 2);
        if self.first_lap {
            points.push(self.origin);
        }
        points.extend_from_slice(wp);
        if self.path.looping {
            if let Some(&first) = wp.first() {
                points.push(first);
            }
        }
        points
    }
}

/// Outcome of advancing a follower by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Step {
    pub delta: Vec3,
    pub waypoint_changed: bool,
    pub finished: Option<(u64, PathPurpose)>,
}

#[derive(Component, Debug, Clone, Default)]
pub struct PathFollower {
    active: Option<ActivePath>,
    generation: u64,
}

impl PathFollower {
    /// Replace any current path. Returns the new generation.
    pub fn start(&mut self, path: Path, purpose: PathPurpose, origin: Vec3) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.active = Some(ActivePath {
            path,
            purpose,
            origin,
            first_lap: true,
            elapsed: 0.0,
            vertex: 0,
            last_sample: origin,
        });
        self.generation
    }

    /// Stop following; any pending completion becomes stale.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.active = None;
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn is_following(&self) -> bool {
        self.active.is_some()
    }

    pub fn purpose(&self) -> Option<PathPurpose> {
        self.active.as_ref().map(|a| a.purpose)
    }

    pub fn path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| &a.path)
    }

    pub fn advance(&mut self, dt: f32) -> Step {
        let generation = self.generation;
        let Some(active) = self.active.as_mut() else {
            return Step::default();
        };

        let mut step = Step::default();
        let duration = active.path.duration;
        active.elapsed += dt.max(0.0);

        if active.path.looping {
            let lap = duration.max(f32::EPSILON);
            while active.elapsed >= lap {
                // Close the lap on the ring start, then continue on the ring only.
                let points = active.polyline();
                let end = points.last().copied().unwrap_or(active.last_sample);
                step.delta += end - active.last_sample;
                active.last_sample = end;
                active.elapsed -= lap;
                active.first_lap = false;
                active.vertex = 0;
                step.waypoint_changed = true;
            }

            let points = active.polyline();
            let progress = active.path.ease.apply(active.elapsed / lap);
            let (pos, vertex) = sample(&points, progress);
            step.delta += pos - active.last_sample;
            step.waypoint_changed |= vertex > active.vertex;
            active.vertex = vertex;
            active.last_sample = pos;
            return step;
        }

        let t = if duration <= 0.0 { 1.0 } else { (active.elapsed / duration).min(1.0) };
        let points = active.polyline();
        let (pos, vertex) = sample(&points, active.path.ease.apply(t));
        step.delta = pos - active.last_sample;
        step.waypoint_changed = vertex > active.vertex;
        active.vertex = vertex;
        active.last_sample = pos;

        if t >= 1.0 {
            step.finished = Some((generation, active.purpose));
            self.active = None;
        }
        step
    }
}

/// Point at `progress` (0..1) of the polyline's arc length, plus the index of
/// the last vertex reached.
fn sample(points: &[Vec3], progress: f32) -> (Vec3, usize) {
    let Some(&last) = points.last() else {
        return (Vec3::ZERO, 0);
    };
    if points.len() < 2 {
        return (last, 0);
    }

    let total: f32 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if total <= f32::EPSILON {
        return (last, points.len() - 1);
    }

    let mut remaining = progress.clamp(0.0, 1.0) * total;
    for (i, w) in points.windows(2).enumerate() {
        let len = w[0].distance(w[1]);
        if remaining <= len {
            let t = if len > 0.0 { remaining / len } else { 1.0 };
            let reached = if t >= 1.0 { i + 1 } else { i };
            return (w[0].lerp(w[1], t), reached);
        }
        remaining -= len;
    }
    (last, points.len() - 1)
}

/// Step every active drone along its path.
///
/// Passing a waypoint re-clamps the drone into the area; finishing writes
/// `PathFinished`.
pub fn advance_paths(
    time: Res<Time<Fixed>>,
    area: Option<Res<AttackArea>>,
    mut finished: MessageWriter<PathFinished>,
    mut q: Query<(Entity, &mut Transform, &mut PathFollower, &DroneActivity), With<Drone>>,
) {
    let dt = time.delta_secs();
    let area = area.as_deref();

    for (drone, mut tf, mut follower, activity) in &mut q {
        if *activity != DroneActivity::Active || !follower.is_following() {
            continue;
        }

        let step = follower.advance(dt);
        tf.translation += step.delta;
        if step.waypoint_changed {
            tf.translation = constrain(area, tf.translation);
        }

        if let Some((generation, purpose)) = step.finished {
            finished.write(PathFinished { drone, generation, purpose });
        }
    }
}
