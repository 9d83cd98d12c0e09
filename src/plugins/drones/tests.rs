//! Unit tests for the drones module.
//!
//! Pure pieces (patterns, planners, follower, separation) are tested directly;
//! systems run once on a bare `World` holding only the resources they need.

use avian2d::prelude::*;
use bevy::ecs::message::Messages;
use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::common::layers::Layer;
use crate::common::test_utils::{run_system_once, set_fixed_delta};
use crate::common::tunables::Tunables;
use crate::plugins::arena::AttackArea;
use crate::plugins::core::DroneRng;
use crate::plugins::player::{Knockback, Player, PlayerHealth};
use crate::plugins::spawner::{PointId, PointKind, SpawnCoordinator, SpawnRegistry};

use super::components::Countdown;
use super::path::{Ease, Path, PathPurpose};
use super::pool::{active_drone_layers, inactive_drone_layers};

const DT: f32 = 1.0 / 64.0;

fn area() -> AttackArea {
    AttackArea::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0), 1.0)
}

fn at(x: f32, y: f32) -> Vec3 {
    Vec3::new(x, y, 1.0)
}

// -----------------------------------------------------------------------------
// Patterns and easing
// -----------------------------------------------------------------------------

#[test]
fn rounds_map_to_patterns() {
    assert_eq!(AttackPattern::for_round(1), Some(AttackPattern::SeekAndDestroy));
    assert_eq!(AttackPattern::for_round(2), Some(AttackPattern::HomingCharge));
    assert_eq!(AttackPattern::for_round(3), Some(AttackPattern::CircularEncirclement));
    assert_eq!(AttackPattern::for_round(0), None);
    assert_eq!(
        AttackPattern::select(4, AttackPattern::HomingCharge),
        AttackPattern::HomingCharge
    );
}

#[test]
fn eases_hit_endpoints_and_stay_monotonic() {
    for ease in [Ease::Linear, Ease::InOutSine, Ease::OutQuad] {
        assert!(ease.apply(0.0).abs() < 1e-6);
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-6);

        let mut prev = 0.0;
        for i in 1..=100 {
            let y = ease.apply(i as f32 / 100.0);
            assert!(y + 1e-6 >= prev);
            prev = y;
        }
    }
    assert_eq!(Ease::OutQuad.apply(0.5), 0.75);
}

#[test]
fn countdown_never_goes_negative() {
    let mut c = Countdown::new(0.5);
    c.tick_down(0.2);
    assert!(!c.is_elapsed());
    c.tick_down(10.0);
    assert_eq!(c.get(), 0.0);
    assert!(c.is_elapsed());
    assert_eq!(Countdown::new(-1.0).get(), 0.0);
}

#[test]
fn drone_health_depletes_at_zero() {
    let mut hp = DroneHealth { hp: 100 };
    assert!(!hp.apply_damage(50));
    assert!(hp.apply_damage(50));
    assert!(hp.is_depleted());
}

// -----------------------------------------------------------------------------
// Path planning
// -----------------------------------------------------------------------------

#[test]
fn seek_and_homing_run_straight_at_the_target() {
    let t = Tunables::default();
    let a = area();

    let seek = path::plan(AttackPattern::SeekAndDestroy, at(0.0, 0.0), at(3.0, 4.0), Some(&a), &t);
    assert_eq!(seek.waypoints, vec![at(0.0, 0.0), at(3.0, 4.0)]);
    assert_eq!(seek.duration, t.seek_duration);
    assert_eq!(seek.ease, Ease::Linear);
    assert!(!seek.looping);

    let homing = path::plan(AttackPattern::HomingCharge, at(0.0, 0.0), at(3.0, 4.0), Some(&a), &t);
    assert_eq!(homing.duration, t.homing_duration);
    assert_eq!(homing.ease, Ease::InOutSine);
}

#[test]
fn attack_endpoint_is_clamped_into_area() {
    let t = Tunables::default();
    let a = area();
    let p = path::plan(AttackPattern::SeekAndDestroy, at(0.0, 0.0), Vec3::new(50.0, 0.0, 3.0), Some(&a), &t);
    assert_eq!(p.waypoints.last().copied(), Some(at(10.0, 0.0)));

    // Without an area the target is used as-is.
    let free = path::plan(AttackPattern::SeekAndDestroy, at(0.0, 0.0), Vec3::new(50.0, 0.0, 3.0), None, &t);
    assert_eq!(free.waypoints.last().copied(), Some(Vec3::new(50.0, 0.0, 3.0)));
}

#[test]
fn encirclement_ring_has_exact_radius() {
    let t = Tunables::default();
    let target = at(2.0, -1.0);
    let p = path::plan(AttackPattern::CircularEncirclement, at(0.0, 0.0), target, Some(&area()), &t);

    assert!(p.looping);
    assert_eq!(p.waypoints.len(), t.circle_resolution);
    assert_eq!(p.duration, t.circle_lap_duration);
    for w in &p.waypoints {
        assert!((w.distance(target) - t.circle_radius).abs() < 1e-4);
        assert_eq!(w.z, target.z);
    }
}

#[test]
fn fallback_moves_away_from_push_direction() {
    let t = Tunables::default();
    let p = path::fallback(at(0.0, 0.0), Vec2::new(1.0, 0.0), Some(&area()), &t);
    assert_eq!(p.waypoints, vec![at(0.0, 0.0), at(-t.fallback_distance, 0.0)]);
    assert_eq!(p.duration, t.fallback_duration);

    // Against the wall the retreat is clamped.
    let p = path::fallback(at(-9.5, 0.0), Vec2::new(1.0, 0.0), Some(&area()), &t);
    assert_eq!(p.waypoints[1], at(-10.0, 0.0));
}

#[test]
fn patrol_points_stay_inside_area() {
    let t = Tunables::default();
    let a = area();
    let mut rng = StdRng::seed_from_u64(9);

    let p = path::patrol(at(0.0, 0.0), Some(&a), &mut rng, &t);
    assert_eq!(p.waypoints.len(), t.patrol_points);
    assert_eq!(p.duration, t.patrol_duration);
    assert!(p.waypoints.iter().all(|w| a.contains(*w)));

    let hover = path::patrol(at(1.0, 1.0), None, &mut rng, &t);
    assert!(hover.waypoints.iter().all(|w| *w == at(1.0, 1.0)));
}

// -----------------------------------------------------------------------------
// Path follower
// -----------------------------------------------------------------------------

fn run_follower(f: &mut PathFollower, start: Vec3, secs: f32) -> (Vec3, Vec<(u64, PathPurpose)>) {
    let mut pos = start;
    let mut finished = Vec::new();
    let steps = (secs / DT).round() as usize;
    for _ in 0..steps {
        let step = f.advance(DT);
        pos += step.delta;
        finished.extend(step.finished);
    }
    (pos, finished)
}

#[test]
fn follower_reaches_end_and_reports_once() {
    let mut f = PathFollower::default();
    let start = at(0.0, 0.0);
    let generation = f.start(Path::once(vec![start, at(4.0, 0.0)], 1.0, Ease::Linear), PathPurpose::Attack, start);

    let (half, finished) = run_follower(&mut f, start, 0.5);
    assert!((half.x - 2.0).abs() < 1e-3);
    assert!(finished.is_empty());

    let (end, finished) = run_follower(&mut f, half, 1.0);
    assert!(end.distance(at(4.0, 0.0)) < 1e-4);
    assert_eq!(finished, vec![(generation, PathPurpose::Attack)]);
    assert!(!f.is_following());
}

#[test]
fn follower_starts_from_origin_not_first_waypoint() {
    let mut f = PathFollower::default();
    let origin = at(-2.0, 0.0);
    f.start(Path::once(vec![at(0.0, 0.0), at(2.0, 0.0)], 1.0, Ease::Linear), PathPurpose::Patrol, origin);

    let (end, _) = run_follower(&mut f, origin, 1.0);
    assert!(end.distance(at(2.0, 0.0)) < 1e-4);
}

#[test]
fn restart_and_cancel_bump_generation() {
    let mut f = PathFollower::default();
    let g1 = f.start(Path::once(vec![at(1.0, 0.0)], 1.0, Ease::Linear), PathPurpose::Attack, at(0.0, 0.0));
    let g2 = f.start(Path::once(vec![at(2.0, 0.0)], 1.0, Ease::Linear), PathPurpose::Fallback, at(0.0, 0.0));
    assert_ne!(g1, g2);
    assert_eq!(f.purpose(), Some(PathPurpose::Fallback));

    f.cancel();
    assert_ne!(f.generation(), g2);
    assert!(!f.is_following());
    assert_eq!(f.advance(DT), follower::Step::default());
}

#[test]
fn looping_path_circles_forever() {
    let center = at(0.0, 0.0);
    let ring = path::circle(center, 3.0, 12);
    let first = ring[0];
    let mut f = PathFollower::default();
    f.start(Path::looped(ring, 1.0, Ease::Linear), PathPurpose::Attack, center);

    // Lead-in lap, then whole laps on the ring.
    let (pos, finished) = run_follower(&mut f, center, 1.0);
    assert!(pos.distance(first) < 1e-3);
    let (pos, finished2) = run_follower(&mut f, pos, 3.0);
    assert!(pos.distance(first) < 1e-3);
    assert!(finished.is_empty() && finished2.is_empty());
    assert!(f.is_following());

    // Mid-lap the drone sits on the ring.
    let (pos, _) = run_follower(&mut f, pos, 0.25);
    assert!((pos.distance(center) - 3.0).abs() < 0.1);
}

#[test]
fn zero_duration_path_finishes_immediately() {
    let mut f = PathFollower::default();
    f.start(Path::once(vec![at(0.0, 0.0), at(1.0, 0.0)], 0.0, Ease::Linear), PathPurpose::Regroup, at(0.0, 0.0));
    let step = f.advance(DT);
    assert!(step.finished.is_some());
    assert!(step.delta.distance(Vec3::new(1.0, 0.0, 0.0)) < 1e-6);
}

// -----------------------------------------------------------------------------
// Separation
// -----------------------------------------------------------------------------

#[test]
fn separate_pushes_to_min_distance_in_plane() {
    let p = separation::separate(at(1.0, 0.0), [Vec3::new(0.0, 0.0, 5.0)], 2.0);
    assert_eq!(p, at(2.0, 0.0));

    // Far neighbours are ignored.
    let p = separation::separate(at(5.0, 0.0), [at(0.0, 0.0)], 2.0);
    assert_eq!(p, at(5.0, 0.0));
}

#[test]
fn coincident_drones_are_not_pushed() {
    let p = separation::separate(at(1.0, 1.0), [at(1.0, 1.0)], 2.0);
    assert_eq!(p, at(1.0, 1.0));
}

#[test]
fn separation_pushes_accumulate_in_order() {
    // Pushed right by the first neighbour, then away from the second.
    let p = separation::separate(at(0.0, 0.0), [at(-1.0, 0.0), at(2.5, 0.0)], 2.0);
    assert!((p.x - 0.5).abs() < 1e-5);
}

// -----------------------------------------------------------------------------
// System harness
// -----------------------------------------------------------------------------

fn drone_world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(area());
    world.insert_resource(DroneRng::seeded(1));
    world.insert_resource(DronePool::new(4));
    world.insert_resource(separation::SeparationTimer::new(0.5));

    let mut coordinator = SpawnCoordinator::default();
    coordinator.registry = SpawnRegistry::new(vec![at(-5.0, 8.0), at(5.0, 8.0)], vec![at(-4.0, 4.0), at(4.0, 4.0)]);
    world.insert_resource(coordinator);

    world.init_resource::<Messages<SpawnDroneRequest>>();
    world.init_resource::<Messages<DroneSpawned>>();
    world.init_resource::<Messages<DroneDestroyed>>();
    world.init_resource::<Messages<TriggerAttack>>();
    world.init_resource::<Messages<RegroupCommand>>();
    world.init_resource::<Messages<DespawnDrone>>();
    world.init_resource::<Messages<PathFinished>>();
    world.init_resource::<Messages<CollisionStart>>();
    set_fixed_delta(&mut world, DT);
    world
}

const SPAWN_0: PointId = PointId { kind: PointKind::Spawn, index: 0 };
const REGROUP_0: PointId = PointId { kind: PointKind::Regroup, index: 0 };

/// Live drone without physics body; enough for every drone system.
fn spawn_drone(world: &mut World, pos: Vec3, pattern: AttackPattern, target: Option<Entity>) -> Entity {
    world
        .spawn((
            (
                Drone,
                PooledDrone,
                DroneActivity::Active,
                DroneHealth { hp: 100 },
                DroneMode::Idle,
                DroneBrain::new(pattern),
                TargetSearch::default(),
                DroneTarget(target),
                AssignedPoints(Some((SPAWN_0, REGROUP_0))),
                PathFollower::default(),
            ),
            Transform::from_translation(pos),
            Visibility::Visible,
            active_drone_layers(),
        ))
        .id()
}

fn spawn_player(world: &mut World, pos: Vec3) -> Entity {
    world
        .spawn((
            Player,
            PlayerHealth::new(100),
            Knockback::default(),
            Transform::from_translation(pos),
            CollisionLayers::new(Layer::Player, [Layer::Drone]),
        ))
        .id()
}

fn mode(world: &World, drone: Entity) -> DroneMode {
    *world.get::<DroneMode>(drone).unwrap()
}

fn follower(world: &World, drone: Entity) -> &PathFollower {
    world.get::<PathFollower>(drone).unwrap()
}

// -----------------------------------------------------------------------------
// Pool: allocate and commit
// -----------------------------------------------------------------------------

fn spawn_pooled(world: &mut World) -> Entity {
    let e = world
        .spawn((
            (
                Drone,
                PooledDrone,
                DroneActivity::Inactive,
                DroneHealth { hp: 0 },
                DroneMode::Idle,
                DroneBrain::default(),
                TargetSearch::default(),
                DroneTarget::default(),
                AssignedPoints::default(),
                PathFollower::default(),
            ),
            Transform::default(),
            Visibility::Hidden,
            inactive_drone_layers(),
        ))
        .id();
    world.resource_mut::<DronePool>().push_free(e);
    e
}

#[test]
fn allocator_activates_pooled_drone() {
    let mut world = drone_world();
    let pooled = spawn_pooled(&mut world);
    let player = spawn_player(&mut world, at(0.0, -5.0));

    world.write_message(SpawnDroneRequest {
        pattern: AttackPattern::HomingCharge,
        position: at(-5.0, 8.0),
        spawn_point: SPAWN_0,
        regroup_point: REGROUP_0,
    });
    run_system_once(&mut world, allocator::allocate_drones_from_pool);

    assert_eq!(*world.get::<DroneActivity>(pooled).unwrap(), DroneActivity::Active);
    assert_eq!(world.get::<DroneHealth>(pooled).unwrap().hp, 100);
    assert_eq!(world.get::<DroneBrain>(pooled).unwrap().pattern, AttackPattern::HomingCharge);
    assert_eq!(world.get::<Transform>(pooled).unwrap().translation, at(-5.0, 8.0));
    assert_eq!(*world.get::<Visibility>(pooled).unwrap(), Visibility::Visible);
    assert_eq!(*world.get::<CollisionLayers>(pooled).unwrap(), active_drone_layers());
    assert_eq!(world.get::<DroneTarget>(pooled).unwrap().0, Some(player));
    assert_eq!(world.resource::<DronePool>().free_len(), 0);

    let spawned: Vec<_> = world.resource_mut::<Messages<DroneSpawned>>().drain().collect();
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].drone, pooled);
}

#[test]
fn allocator_without_player_leaves_drone_searching() {
    let mut world = drone_world();
    let pooled = spawn_pooled(&mut world);
    world.get_mut::<DroneTarget>(pooled).unwrap().0 = Some(pooled);

    world.write_message(SpawnDroneRequest {
        pattern: AttackPattern::SeekAndDestroy,
        position: at(5.0, 8.0),
        spawn_point: SPAWN_0,
        regroup_point: REGROUP_0,
    });
    run_system_once(&mut world, allocator::allocate_drones_from_pool);

    assert_eq!(world.get::<DroneTarget>(pooled).unwrap().0, None);
    assert!(world.get::<TargetSearch>(pooled).unwrap().searching);
}

#[test]
fn commit_returns_drone_and_reports_its_points() {
    let mut world = drone_world();
    let drone = spawn_drone(&mut world, at(0.0, 0.0), AttackPattern::SeekAndDestroy, None);
    *world.get_mut::<DroneActivity>(drone).unwrap() = DroneActivity::PendingReturn;

    run_system_once(&mut world, commit::return_to_pool_commit);

    assert_eq!(*world.get::<DroneActivity>(drone).unwrap(), DroneActivity::Inactive);
    assert_eq!(*world.get::<Visibility>(drone).unwrap(), Visibility::Hidden);
    assert_eq!(*world.get::<CollisionLayers>(drone).unwrap(), inactive_drone_layers());
    assert!(world.get::<AssignedPoints>(drone).unwrap().0.is_none());
    assert_eq!(world.resource::<DronePool>().free_len(), 1);

    let destroyed: Vec<_> = world.resource_mut::<Messages<DroneDestroyed>>().drain().collect();
    assert_eq!(destroyed.len(), 1);
    assert_eq!((destroyed[0].spawn_point, destroyed[0].regroup_point), (SPAWN_0, REGROUP_0));
}

#[test]
fn commit_ignores_live_drones() {
    let mut world = drone_world();
    spawn_drone(&mut world, at(0.0, 0.0), AttackPattern::SeekAndDestroy, None);
    run_system_once(&mut world, commit::return_to_pool_commit);
    assert_eq!(world.resource::<DronePool>().free_len(), 0);
}

// -----------------------------------------------------------------------------
// Behaviour
// -----------------------------------------------------------------------------

#[test]
fn trigger_attack_starts_pattern_toward_target() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, -5.0));
    let drone = spawn_drone(&mut world, at(0.0, 5.0), AttackPattern::SeekAndDestroy, Some(player));

    world.write_message(TriggerAttack { drone });
    run_system_once(&mut world, behavior::handle_drone_commands);

    assert_eq!(mode(&world, drone), DroneMode::Attacking);
    let f = follower(&world, drone);
    assert_eq!(f.purpose(), Some(PathPurpose::Attack));
    assert_eq!(f.path().unwrap().waypoints.last().copied(), Some(at(0.0, -5.0)));
}

#[test]
fn trigger_attack_without_target_idles() {
    let mut world = drone_world();
    let drone = spawn_drone(&mut world, at(0.0, 5.0), AttackPattern::SeekAndDestroy, None);

    world.write_message(TriggerAttack { drone });
    run_system_once(&mut world, behavior::handle_drone_commands);

    assert_eq!(mode(&world, drone), DroneMode::Idle);
    assert!(!follower(&world, drone).is_following());
}

#[test]
fn regroup_suspends_attack_until_arrival() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, -5.0));
    let drone = spawn_drone(&mut world, at(0.0, 5.0), AttackPattern::SeekAndDestroy, Some(player));

    world.write_message(RegroupCommand { drone });
    run_system_once(&mut world, behavior::handle_drone_commands);

    assert_eq!(mode(&world, drone), DroneMode::Returning);
    assert!(!world.get::<DroneBrain>(drone).unwrap().continue_attacking);
    let f = follower(&world, drone);
    assert_eq!(f.purpose(), Some(PathPurpose::Regroup));
    assert_eq!(f.path().unwrap().waypoints.last().copied(), Some(at(-4.0, 4.0)));

    // Attack requests are ignored while returning.
    let generation = f.generation();
    world.resource_mut::<Messages<RegroupCommand>>().clear();
    world.write_message(TriggerAttack { drone });
    run_system_once(&mut world, behavior::handle_drone_commands);
    assert_eq!(follower(&world, drone).generation(), generation);

    // Arrival resumes attacking.
    world.write_message(PathFinished { drone, generation, purpose: PathPurpose::Regroup });
    run_system_once(&mut world, behavior::on_path_finished);
    assert!(world.get::<DroneBrain>(drone).unwrap().continue_attacking);
    assert_eq!(mode(&world, drone), DroneMode::Attacking);
    assert_eq!(follower(&world, drone).purpose(), Some(PathPurpose::Attack));
}

#[test]
fn stale_completion_is_ignored() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, -5.0));
    let drone = spawn_drone(&mut world, at(0.0, 5.0), AttackPattern::SeekAndDestroy, Some(player));

    world.write_message(TriggerAttack { drone });
    run_system_once(&mut world, behavior::handle_drone_commands);
    let generation = follower(&world, drone).generation();

    world.write_message(PathFinished { drone, generation: generation - 1, purpose: PathPurpose::Fallback });
    run_system_once(&mut world, behavior::on_path_finished);

    assert_eq!(follower(&world, drone).generation(), generation);
    assert!(world.get::<DroneBrain>(drone).unwrap().dwell.is_none());
}

#[test]
fn despawn_marks_drone_for_return() {
    let mut world = drone_world();
    let drone = spawn_drone(&mut world, at(0.0, 5.0), AttackPattern::SeekAndDestroy, None);

    world.write_message(DespawnDrone { drone });
    run_system_once(&mut world, behavior::handle_drone_commands);

    assert_eq!(*world.get::<DroneActivity>(drone).unwrap(), DroneActivity::PendingReturn);
}

#[test]
fn search_acquires_player_in_range_once() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, 0.0));
    let near = spawn_drone(&mut world, at(0.0, 9.0), AttackPattern::SeekAndDestroy, None);
    let far = spawn_drone(&mut world, at(20.0, -10.0), AttackPattern::SeekAndDestroy, None);

    run_system_once(&mut world, behavior::search_for_target);

    assert_eq!(world.get::<DroneTarget>(near).unwrap().0, Some(player));
    assert!(!world.get::<TargetSearch>(near).unwrap().searching);
    let f = follower(&world, near);
    assert_eq!(f.purpose(), Some(PathPurpose::Acquire));
    assert_eq!(f.path().unwrap().ease, Ease::OutQuad);
    assert_eq!(f.path().unwrap().waypoints.last().copied(), Some(at(-4.0, 4.0)));

    assert_eq!(world.get::<DroneTarget>(far).unwrap().0, None);
    assert!(world.get::<TargetSearch>(far).unwrap().searching);
}

#[test]
fn search_waits_for_its_interval() {
    let mut world = drone_world();
    let drone = spawn_drone(&mut world, at(0.0, 9.0), AttackPattern::SeekAndDestroy, None);

    // First scan finds nothing and re-arms the interval.
    run_system_once(&mut world, behavior::search_for_target);
    let player = spawn_player(&mut world, at(0.0, 0.0));
    run_system_once(&mut world, behavior::search_for_target);
    assert_eq!(world.get::<DroneTarget>(drone).unwrap().0, None);

    set_fixed_delta(&mut world, 1.0);
    run_system_once(&mut world, behavior::search_for_target);
    assert_eq!(world.get::<DroneTarget>(drone).unwrap().0, Some(player));
}

#[test]
fn fallback_arrival_dwells_then_patrols() {
    let mut world = drone_world();
    let drone = spawn_drone(&mut world, at(0.0, 0.0), AttackPattern::SeekAndDestroy, None);
    *world.get_mut::<DroneMode>(drone).unwrap() = DroneMode::Defensive;
    let generation = world.get_mut::<PathFollower>(drone).unwrap().start(
        Path::once(vec![at(-2.0, 0.0)], 0.5, Ease::Linear),
        PathPurpose::Fallback,
        at(0.0, 0.0),
    );

    world.write_message(PathFinished { drone, generation, purpose: PathPurpose::Fallback });
    run_system_once(&mut world, behavior::on_path_finished);
    assert!(world.get::<DroneBrain>(drone).unwrap().dwell.is_some());

    set_fixed_delta(&mut world, 1.0);
    run_system_once(&mut world, behavior::tick_defensive);
    assert_eq!(mode(&world, drone), DroneMode::Defensive);

    run_system_once(&mut world, behavior::tick_defensive);
    assert_eq!(mode(&world, drone), DroneMode::Patrolling);
    let f = follower(&world, drone);
    assert_eq!(f.purpose(), Some(PathPurpose::Patrol));
    assert!(f.path().unwrap().waypoints.iter().all(|w| area().contains(*w)));
}

/// Start `purpose` on the drone directly and return its generation.
fn start_path(world: &mut World, drone: Entity, purpose: PathPurpose, to: Vec3) -> u64 {
    let from = world.get::<Transform>(drone).unwrap().translation;
    world
        .get_mut::<PathFollower>(drone)
        .unwrap()
        .start(Path::once(vec![to], 1.0, Ease::Linear), purpose, from)
}

fn finish(world: &mut World, drone: Entity, generation: u64, purpose: PathPurpose) {
    world.resource_mut::<Messages<PathFinished>>().clear();
    world.write_message(PathFinished { drone, generation, purpose });
    run_system_once(world, behavior::on_path_finished);
}

#[test]
fn finished_attack_repeats_the_pattern() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, -5.0));
    let drone = spawn_drone(&mut world, at(0.0, 5.0), AttackPattern::HomingCharge, Some(player));

    world.write_message(TriggerAttack { drone });
    run_system_once(&mut world, behavior::handle_drone_commands);
    let generation = follower(&world, drone).generation();

    finish(&mut world, drone, generation, PathPurpose::Attack);

    assert_eq!(mode(&world, drone), DroneMode::Attacking);
    let f = follower(&world, drone);
    assert_eq!(f.generation(), generation + 1);
    assert_eq!(f.purpose(), Some(PathPurpose::Attack));
    assert_eq!(f.path().unwrap().ease, Ease::InOutSine);
}

#[test]
fn finished_attack_while_defensive_falls_back() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, -5.0));
    let drone = spawn_drone(&mut world, at(0.0, 5.0), AttackPattern::SeekAndDestroy, Some(player));
    let generation = start_path(&mut world, drone, PathPurpose::Attack, at(0.0, -5.0));
    *world.get_mut::<DroneMode>(drone).unwrap() = DroneMode::Defensive;

    finish(&mut world, drone, generation, PathPurpose::Attack);

    assert_eq!(mode(&world, drone), DroneMode::Defensive);
    assert_eq!(follower(&world, drone).purpose(), Some(PathPurpose::Fallback));
}

#[test]
fn finished_acquire_starts_attacking() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, -5.0));
    let drone = spawn_drone(&mut world, at(-4.0, 4.0), AttackPattern::SeekAndDestroy, Some(player));
    let generation = start_path(&mut world, drone, PathPurpose::Acquire, at(-4.0, 4.0));

    finish(&mut world, drone, generation, PathPurpose::Acquire);

    assert_eq!(mode(&world, drone), DroneMode::Attacking);
    let f = follower(&world, drone);
    assert_eq!(f.purpose(), Some(PathPurpose::Attack));
    assert_eq!(f.path().unwrap().waypoints.last().copied(), Some(at(0.0, -5.0)));
}

#[test]
fn finished_patrol_resumes_attacking() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, -5.0));
    let drone = spawn_drone(&mut world, at(0.0, 5.0), AttackPattern::SeekAndDestroy, Some(player));
    *world.get_mut::<DroneMode>(drone).unwrap() = DroneMode::Patrolling;
    let generation = start_path(&mut world, drone, PathPurpose::Patrol, at(3.0, 3.0));

    finish(&mut world, drone, generation, PathPurpose::Patrol);

    assert_eq!(mode(&world, drone), DroneMode::Attacking);
    assert_eq!(follower(&world, drone).purpose(), Some(PathPurpose::Attack));
}

#[test]
fn finished_patrol_without_target_idles() {
    let mut world = drone_world();
    let drone = spawn_drone(&mut world, at(0.0, 5.0), AttackPattern::SeekAndDestroy, None);
    *world.get_mut::<DroneMode>(drone).unwrap() = DroneMode::Patrolling;
    let generation = start_path(&mut world, drone, PathPurpose::Patrol, at(3.0, 3.0));

    finish(&mut world, drone, generation, PathPurpose::Patrol);

    assert_eq!(mode(&world, drone), DroneMode::Idle);
    assert!(!follower(&world, drone).is_following());
}

#[test]
fn contact_during_regroup_still_attacks_after_patrol() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, 0.0));
    let drone = spawn_drone(&mut world, at(0.0, 1.0), AttackPattern::SeekAndDestroy, Some(player));

    world.write_message(RegroupCommand { drone });
    run_system_once(&mut world, behavior::handle_drone_commands);
    assert_eq!(mode(&world, drone), DroneMode::Returning);

    collide(&mut world, drone, player, player);
    run_system_once(&mut world, collision::process_drone_collisions);
    assert_eq!(mode(&world, drone), DroneMode::Defensive);
    assert!(world.get::<DroneBrain>(drone).unwrap().continue_attacking);

    let generation = follower(&world, drone).generation();
    finish(&mut world, drone, generation, PathPurpose::Fallback);

    set_fixed_delta(&mut world, Tunables::default().defensive_dwell + 1.0);
    run_system_once(&mut world, behavior::tick_defensive);
    assert_eq!(mode(&world, drone), DroneMode::Patrolling);

    let generation = follower(&world, drone).generation();
    finish(&mut world, drone, generation, PathPurpose::Patrol);

    assert_eq!(mode(&world, drone), DroneMode::Attacking);
    let f = follower(&world, drone);
    assert!(f.is_following());
    assert_eq!(f.purpose(), Some(PathPurpose::Attack));
}

#[test]
fn constrain_clamps_active_drones_only() {
    let mut world = drone_world();
    let live = spawn_drone(&mut world, Vec3::new(30.0, 0.0, 4.0), AttackPattern::SeekAndDestroy, None);
    let parked = spawn_pooled(&mut world);
    world.get_mut::<Transform>(parked).unwrap().translation = Vec3::new(30.0, 0.0, 0.0);

    run_system_once(&mut world, behavior::constrain_to_area);

    assert_eq!(world.get::<Transform>(live).unwrap().translation, at(10.0, 0.0));
    assert_eq!(world.get::<Transform>(parked).unwrap().translation, Vec3::new(30.0, 0.0, 0.0));
}

#[test]
fn constrain_without_area_leaves_drones_alone() {
    let mut world = drone_world();
    world.remove_resource::<AttackArea>();
    let drone = spawn_drone(&mut world, Vec3::new(30.0, 0.0, 4.0), AttackPattern::SeekAndDestroy, None);

    run_system_once(&mut world, behavior::constrain_to_area);

    assert_eq!(world.get::<Transform>(drone).unwrap().translation, Vec3::new(30.0, 0.0, 4.0));
}

#[test]
fn separation_system_spreads_crowded_drones() {
    let mut world = drone_world();
    let a = spawn_drone(&mut world, at(0.0, 0.0), AttackPattern::SeekAndDestroy, None);
    let b = spawn_drone(&mut world, at(0.5, 0.0), AttackPattern::SeekAndDestroy, None);
    let parked = spawn_pooled(&mut world);
    world.get_mut::<Transform>(parked).unwrap().translation = at(0.2, 0.0);

    run_system_once(&mut world, separation::separate_every_tick);

    let pa = world.get::<Transform>(a).unwrap().translation;
    let pb = world.get::<Transform>(b).unwrap().translation;
    assert!(pa.distance(pb) >= Tunables::default().min_separation - 1e-4);
    assert_eq!(pa.z, 1.0);
    assert_eq!(world.get::<Transform>(parked).unwrap().translation, at(0.2, 0.0));
}

// -----------------------------------------------------------------------------
// Collisions
// -----------------------------------------------------------------------------

fn collide(world: &mut World, drone: Entity, other: Entity, body: Entity) {
    world.write_message(CollisionStart {
        collider1: other,
        collider2: drone,
        body1: Some(body),
        body2: Some(drone),
    });
}

#[test]
fn player_contact_knocks_back_and_drone_falls_back() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, 0.0));
    let drone = spawn_drone(&mut world, at(0.0, 1.0), AttackPattern::SeekAndDestroy, Some(player));
    let t = Tunables::default();

    collide(&mut world, drone, player, player);
    // Duplicate events in the same tick only count once.
    collide(&mut world, drone, player, player);
    run_system_once(&mut world, collision::process_drone_collisions);

    assert_eq!(world.get::<PlayerHealth>(player).unwrap().current, 100 - t.drone_contact_damage);
    let kb = world.get::<Knockback>(player).unwrap().0;
    assert!(kb.distance(Vec2::new(0.0, -t.knockback_speed)) < 1e-4);

    assert_eq!(world.get::<DroneHealth>(drone).unwrap().hp, t.drone_health - t.collision_self_damage);
    assert_eq!(mode(&world, drone), DroneMode::Defensive);
    let f = follower(&world, drone);
    assert_eq!(f.purpose(), Some(PathPurpose::Fallback));
    assert_eq!(f.path().unwrap().waypoints.last().copied(), Some(at(0.0, 1.0 + t.fallback_distance)));
}

#[test]
fn contact_on_low_health_destroys_instead_of_defending() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, 0.0));
    let drone = spawn_drone(&mut world, at(0.0, 1.0), AttackPattern::SeekAndDestroy, Some(player));
    world.get_mut::<DroneHealth>(drone).unwrap().hp = 5;

    collide(&mut world, drone, player, player);
    run_system_once(&mut world, collision::process_drone_collisions);

    assert_eq!(*world.get::<DroneActivity>(drone).unwrap(), DroneActivity::PendingReturn);
    assert_ne!(mode(&world, drone), DroneMode::Defensive);
    assert!(!follower(&world, drone).is_following());
}

#[test]
fn laser_hits_damage_without_going_defensive() {
    let mut world = drone_world();
    let player = spawn_player(&mut world, at(0.0, -5.0));
    let beam = world.spawn(CollisionLayers::new(Layer::Laser, [Layer::Drone])).id();
    let drone = spawn_drone(&mut world, at(0.0, 1.0), AttackPattern::SeekAndDestroy, None);

    collide(&mut world, drone, beam, player);
    run_system_once(&mut world, collision::process_drone_collisions);
    assert_eq!(world.get::<DroneHealth>(drone).unwrap().hp, 50);
    assert_eq!(mode(&world, drone), DroneMode::Idle);
    assert_eq!(world.get::<PlayerHealth>(player).unwrap().current, 100);

    world.resource_mut::<Messages<CollisionStart>>().clear();
    collide(&mut world, drone, beam, player);
    run_system_once(&mut world, collision::process_drone_collisions);
    assert_eq!(*world.get::<DroneActivity>(drone).unwrap(), DroneActivity::PendingReturn);
}
