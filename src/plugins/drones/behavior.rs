//! Drone behaviour: the state machine that turns commands, path completions and
//! timers into new paths.
//!
//! Timed waits are data (`Countdown`s in components) ticked by the fixed
//! schedule, and every transition that issues a path goes through
//! `PathFollower::start`, which cancels whatever was running before.

use bevy::prelude::*;

use super::components::{
    AssignedPoints, Countdown, Drone, DroneActivity, DroneBrain, DroneMode, DroneTarget, TargetSearch,
};
use super::follower::PathFollower;
use super::messages::{DespawnDrone, PathFinished, RegroupCommand, TriggerAttack};
use super::path::{self, Ease, PathPurpose};
use crate::common::tunables::Tunables;
use crate::plugins::arena::AttackArea;
use crate::plugins::core::DroneRng;
use crate::plugins::player::Player;
use crate::plugins::spawner::SpawnCoordinator;

/// Issue one pass of the drone's attack pattern toward its target.
///
/// The drone only reports `Attacking` when a path was actually started;
/// otherwise it idles.
pub(super) fn execute_attack(
    drone: Entity,
    pos: Vec3,
    target_pos: Option<Vec3>,
    brain: &DroneBrain,
    mode: &mut DroneMode,
    follower: &mut PathFollower,
    area: Option<&AttackArea>,
    tunables: &Tunables,
) {
    if !brain.continue_attacking {
        debug!("Drone {drone:?} has attacking suspended; idling");
        *mode = DroneMode::Idle;
        return;
    }

    let Some(target) = target_pos else {
        warn!("Drone {drone:?} has no target; staying idle");
        *mode = DroneMode::Idle;
        return;
    };

    trace!("Drone {drone:?} executing {:?}", brain.pattern);
    follower.start(path::plan(brain.pattern, pos, target, area, tunables), PathPurpose::Attack, pos);
    *mode = DroneMode::Attacking;
}

/// Back off from the last collision and go defensive.
///
/// A fallback replaces whatever path was running, regroup included, so the
/// drone attacks again once its patrol is over.
pub(super) fn start_fallback(
    pos: Vec3,
    brain: &mut DroneBrain,
    mode: &mut DroneMode,
    follower: &mut PathFollower,
    area: Option<&AttackArea>,
    tunables: &Tunables,
) {
    *mode = DroneMode::Defensive;
    brain.dwell = None;
    brain.continue_attacking = true;
    follower.start(
        path::fallback(pos, brain.force_direction, area, tunables),
        PathPurpose::Fallback,
        pos,
    );
}

fn target_position(target: &DroneTarget, q_targets: &Query<&Transform, Without<Drone>>) -> Option<Vec3> {
    target.0.and_then(|e| q_targets.get(e).ok()).map(|tf| tf.translation)
}

fn regroup_position(points: &AssignedPoints, coordinator: &SpawnCoordinator) -> Option<Vec3> {
    points.regroup().and_then(|id| coordinator.registry.position(id))
}

pub fn handle_drone_commands(
    tunables: Res<Tunables>,
    area: Option<Res<AttackArea>>,
    coordinator: Res<SpawnCoordinator>,
    mut triggers: MessageReader<TriggerAttack>,
    mut regroups: MessageReader<RegroupCommand>,
    mut despawns: MessageReader<DespawnDrone>,
    q_targets: Query<&Transform, Without<Drone>>,
    mut q: Query<
        (
            &Transform,
            &mut DroneBrain,
            &mut DroneMode,
            &mut PathFollower,
            &DroneTarget,
            &AssignedPoints,
            &mut DroneActivity,
        ),
        With<Drone>,
    >,
) {
    let area = area.as_deref();

    for TriggerAttack { drone } in triggers.read() {
        let Ok((tf, mut brain, mut mode, mut follower, target, _, activity)) = q.get_mut(*drone) else {
            continue;
        };
        if *activity != DroneActivity::Active {
            continue;
        }
        if matches!(*mode, DroneMode::Returning | DroneMode::Defensive | DroneMode::Patrolling) {
            continue;
        }

        brain.continue_attacking = true;
        let target_pos = target_position(target, &q_targets);
        execute_attack(*drone, tf.translation, target_pos, &brain, &mut mode, &mut follower, area, &tunables);
    }

    for RegroupCommand { drone } in regroups.read() {
        let Ok((tf, mut brain, mut mode, mut follower, _, points, activity)) = q.get_mut(*drone) else {
            continue;
        };
        if *activity != DroneActivity::Active {
            continue;
        }
        let Some(regroup) = regroup_position(points, &coordinator) else {
            warn!("Drone {drone:?} has no regroup point; ignoring regroup");
            continue;
        };

        debug!("Drone {drone:?} returning to regroup");
        brain.continue_attacking = false;
        brain.dwell = None;
        *mode = DroneMode::Returning;
        let pos = tf.translation;
        follower.start(
            path::move_to(pos, regroup, area, tunables.regroup_duration, Ease::Linear),
            PathPurpose::Regroup,
            pos,
        );
    }

    for DespawnDrone { drone } in despawns.read() {
        let Ok((_, _, _, mut follower, _, _, mut activity)) = q.get_mut(*drone) else {
            continue;
        };
        if *activity == DroneActivity::Active {
            follower.cancel();
            *activity = DroneActivity::PendingReturn;
        }
    }
}

/// Scan for a player every `search_interval` until one is found, then head to
/// the regroup point and start attacking.
///
/// The scan never re-arms once a target has been acquired.
pub fn search_for_target(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    area: Option<Res<AttackArea>>,
    coordinator: Res<SpawnCoordinator>,
    q_players: Query<(Entity, &Transform), (With<Player>, Without<Drone>)>,
    mut q: Query<
        (
            Entity,
            &Transform,
            &mut TargetSearch,
            &mut DroneTarget,
            &mut PathFollower,
            &mut DroneMode,
            &DroneBrain,
            &AssignedPoints,
            &DroneActivity,
        ),
        With<Drone>,
    >,
) {
    let dt = time.delta_secs();
    let area = area.as_deref();
    let radius = tunables.search_radius;

    for (drone, tf, mut search, mut target, mut follower, mut mode, brain, points, activity) in &mut q {
        if *activity != DroneActivity::Active || !search.searching || target.0.is_some() {
            continue;
        }

        search.next_scan.tick_down(dt);
        if !search.next_scan.is_elapsed() {
            continue;
        }
        search.next_scan = Countdown::new(tunables.search_interval);

        let pos = tf.translation;
        let found = q_players
            .iter()
            .find(|(_, ptf)| ptf.translation.truncate().distance(pos.truncate()) <= radius);
        let Some((player, player_tf)) = found else {
            continue;
        };

        info!("Drone {drone:?} acquired target {player:?}");
        target.0 = Some(player);
        search.searching = false;

        match regroup_position(points, &coordinator) {
            Some(regroup) => {
                follower.start(
                    path::move_to(pos, regroup, area, tunables.acquire_duration, Ease::OutQuad),
                    PathPurpose::Acquire,
                    pos,
                );
            }
            None => {
                warn!("Drone {drone:?} has no regroup point; attacking from here");
                execute_attack(
                    drone,
                    pos,
                    Some(player_tf.translation),
                    brain,
                    &mut mode,
                    &mut follower,
                    area,
                    &tunables,
                );
            }
        }
    }
}

/// Count down the defensive hold, then send the drone on patrol.
pub fn tick_defensive(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    area: Option<Res<AttackArea>>,
    mut rng: ResMut<DroneRng>,
    mut q: Query<(Entity, &Transform, &mut DroneBrain, &mut DroneMode, &mut PathFollower, &DroneActivity), With<Drone>>,
) {
    let dt = time.delta_secs();
    let area = area.as_deref();

    for (drone, tf, mut brain, mut mode, mut follower, activity) in &mut q {
        if *activity != DroneActivity::Active || *mode != DroneMode::Defensive {
            continue;
        }
        let Some(dwell) = brain.dwell.as_mut() else {
            continue;
        };

        dwell.tick_down(dt);
        if !dwell.is_elapsed() {
            continue;
        }

        brain.dwell = None;
        *mode = DroneMode::Patrolling;
        debug!("Drone {drone:?} starting patrol");
        let pos = tf.translation;
        follower.start(path::patrol(pos, area, &mut rng.0, &tunables), PathPurpose::Patrol, pos);
    }
}

/// React to paths that ran to completion.
pub fn on_path_finished(
    tunables: Res<Tunables>,
    area: Option<Res<AttackArea>>,
    mut reader: MessageReader<PathFinished>,
    q_targets: Query<&Transform, Without<Drone>>,
    mut q: Query<
        (&Transform, &mut DroneBrain, &mut DroneMode, &mut PathFollower, &DroneTarget, &DroneActivity),
        With<Drone>,
    >,
) {
    let area = area.as_deref();

    for ev in reader.read() {
        let Ok((tf, mut brain, mut mode, mut follower, target, activity)) = q.get_mut(ev.drone) else {
            continue;
        };
        if *activity != DroneActivity::Active || follower.generation() != ev.generation {
            continue;
        }

        let pos = tf.translation;
        let target_pos = target_position(target, &q_targets);

        match ev.purpose {
            PathPurpose::Attack if *mode == DroneMode::Defensive => {
                start_fallback(pos, &mut brain, &mut mode, &mut follower, area, &tunables);
            }
            PathPurpose::Fallback => {
                debug!("Drone {:?} holding defensive position", ev.drone);
                brain.dwell = Some(Countdown::new(tunables.defensive_dwell));
            }
            PathPurpose::Regroup => {
                brain.continue_attacking = true;
                execute_attack(ev.drone, pos, target_pos, &brain, &mut mode, &mut follower, area, &tunables);
            }
            PathPurpose::Patrol => {
                debug!("Drone {:?} patrol complete", ev.drone);
                execute_attack(ev.drone, pos, target_pos, &brain, &mut mode, &mut follower, area, &tunables);
            }
            PathPurpose::Attack | PathPurpose::Acquire => {
                execute_attack(ev.drone, pos, target_pos, &brain, &mut mode, &mut follower, area, &tunables);
            }
        }
    }
}

/// Enforce the area invariant at the end of the tick.
pub fn constrain_to_area(
    area: Option<Res<AttackArea>>,
    mut warned: Local<bool>,
    mut q: Query<(&mut Transform, &DroneActivity), With<Drone>>,
) {
    let Some(area) = area else {
        if !*warned {
            warn!("No AttackArea resource; drones move unconstrained");
            *warned = true;
        }
        return;
    };

    for (mut tf, activity) in &mut q {
        if *activity != DroneActivity::Active {
            continue;
        }
        let clamped = area.clamp(tf.translation);
        if clamped != tf.translation {
            tf.translation = clamped;
        }
    }
}
