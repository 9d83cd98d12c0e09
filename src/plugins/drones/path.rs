//! Path planning: turn an attack pattern (or a manoeuvre) into waypoints.
//!
//! Planners are pure functions of positions, the attack area and tunables.
//! Every endpoint a drone is sent to is clamped into the area; the encirclement
//! ring is the exception, its points stay at the exact radius and the follower
//! clamps the drone as it passes each waypoint instead.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;
use rand::Rng;

use super::pattern::AttackPattern;
use crate::common::tunables::Tunables;
use crate::plugins::arena::{AttackArea, constrain};

/// Easing curve mapping normalized time to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    #[default]
    Linear,
    InOutSine,
    OutQuad,
}

impl Ease {
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::InOutSine => -((PI * t).cos() - 1.0) * 0.5,
            Ease::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// Why a path was issued; decides what happens when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathPurpose {
    Attack,
    Fallback,
    Patrol,
    Regroup,
    Acquire,
}

/// Waypoints walked over `duration` seconds (per lap when looping).
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub waypoints: Vec<Vec3>,
    pub duration: f32,
    pub ease: Ease,
    pub looping: bool,
}

impl Path {
    pub fn once(waypoints: Vec<Vec3>, duration: f32, ease: Ease) -> Self {
        Self { waypoints, duration, ease, looping: false }
    }

    pub fn looped(waypoints: Vec<Vec3>, duration: f32, ease: Ease) -> Self {
        Self { waypoints, duration, ease, looping: true }
    }
}

/// Plan the path for one pass of `pattern`.
pub fn plan(
    pattern: AttackPattern,
    from: Vec3,
    target: Vec3,
    area: Option<&AttackArea>,
    tunables: &Tunables,
) -> Path {
    match pattern {
        AttackPattern::SeekAndDestroy => Path::once(
            vec![from, constrain(area, target)],
            tunables.seek_duration,
            Ease::Linear,
        ),
        AttackPattern::HomingCharge => Path::once(
            vec![from, constrain(area, target)],
            tunables.homing_duration,
            Ease::InOutSine,
        ),
        AttackPattern::CircularEncirclement => Path::looped(
            circle(
                area.map_or(target, |a| target.with_z(a.height)),
                tunables.circle_radius,
                tunables.circle_resolution,
            ),
            tunables.circle_lap_duration,
            Ease::Linear,
        ),
    }
}

/// `resolution` points equally spaced on a circle in the movement plane.
pub fn circle(center: Vec3, radius: f32, resolution: usize) -> Vec<Vec3> {
    (0..resolution)
        .map(|i| {
            let angle = i as f32 * TAU / resolution as f32;
            center + Vec3::new(angle.cos(), angle.sin(), 0.0) * radius
        })
        .collect()
}

/// Short retreat opposite to the direction the drone pushed its target.
pub fn fallback(
    from: Vec3,
    force_direction: Vec2,
    area: Option<&AttackArea>,
    tunables: &Tunables,
) -> Path {
    let back = -force_direction.normalize_or_zero() * tunables.fallback_distance;
    let to = constrain(area, from + back.extend(0.0));
    Path::once(vec![from, to], tunables.fallback_duration, Ease::Linear)
}

/// `patrol_points` uniform random points inside the area.
///
/// Without an area the drone just hovers where it is.
pub fn patrol(
    from: Vec3,
    area: Option<&AttackArea>,
    rng: &mut impl Rng,
    tunables: &Tunables,
) -> Path {
    let waypoints = match area {
        Some(a) => (0..tunables.patrol_points).map(|_| a.random_point(rng)).collect(),
        None => vec![from; tunables.patrol_points.max(1)],
    };
    Path::once(waypoints, tunables.patrol_duration, Ease::Linear)
}

/// Direct move to a (clamped) destination.
pub fn move_to(from: Vec3, to: Vec3, area: Option<&AttackArea>, duration: f32, ease: Ease) -> Path {
    Path::once(vec![from, constrain(area, to)], duration, ease)
}
