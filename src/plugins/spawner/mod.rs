//! Spawner plugin: rounds, staggered spawning and point allocation.
//!
//! ```text
//! Update:          keys 1/2/3 -> StartRound
//! FixedUpdate:     StartRound -> SpawnCoordinator::start_round
//!                  due spawns -> claim points -> SpawnDroneRequest
//!                  (drones allocate from the pool)
//!                  DroneSpawned -> active list, then once-per-round TriggerAttack
//! FixedPostUpdate: DroneDestroyed -> free points, drop from active list
//! ```

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::core::DroneRng;
use crate::plugins::drones::{
    DroneDestroyed, DroneSpawned, DroneSystems, SpawnDroneRequest, TriggerAttack,
};

pub mod coordinator;
pub mod registry;

pub use coordinator::SpawnCoordinator;
pub use registry::{PointId, PointKind, PointPool, SpawnRegistry};

/// Request to start a round.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartRound(pub u32);

pub fn plugin(app: &mut App) {
    let (interval, auto_start) = app
        .world()
        .get_resource::<Tunables>()
        .map(|t| (t.spawn_interval, t.auto_start_attack))
        .unwrap_or((0.1, false));

    app.insert_resource(SpawnCoordinator::new(interval, auto_start))
        .add_message::<StartRound>();

    app.add_systems(Update, gather_round_input.run_if(in_state(GameState::InGame)));

    app.add_systems(
        FixedUpdate,
        (start_requested_rounds, spawn_due_drones)
            .chain()
            .before(DroneSystems::Allocate)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedUpdate,
        (register_spawned_drones, trigger_round_attacks)
            .chain()
            .after(DroneSystems::Allocate)
            .before(DroneSystems::Simulate)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        FixedPostUpdate,
        release_destroyed_drones
            .after(DroneSystems::Resolve)
            .run_if(in_state(GameState::InGame)),
    );
}

/// Keys 1, 2 and 3 start the matching round.
fn gather_round_input(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut writer: MessageWriter<StartRound>,
) {
    let Some(keys) = keys else { return; };

    for (key, round) in [(KeyCode::Digit1, 1), (KeyCode::Digit2, 2), (KeyCode::Digit3, 3)] {
        if keys.just_pressed(key) {
            writer.write(StartRound(round));
        }
    }
}

fn start_requested_rounds(
    mut reader: MessageReader<StartRound>,
    mut coordinator: ResMut<SpawnCoordinator>,
) {
    for StartRound(round) in reader.read() {
        coordinator.start_round(*round);
    }
}

/// Claim points for every spawn due this tick and hand the drones to the pool.
pub fn spawn_due_drones(
    time: Res<Time<Fixed>>,
    mut coordinator: ResMut<SpawnCoordinator>,
    mut rng: ResMut<DroneRng>,
    mut writer: MessageWriter<SpawnDroneRequest>,
) {
    let due = coordinator.take_due_spawns(time.delta_secs());

    for _ in 0..due {
        let (spawn, regroup) = match coordinator.registry.claim_pair(&mut rng.0) {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Cannot spawn drone for round {}: {e}", coordinator.round());
                coordinator.abandon_pending();
                break;
            }
        };

        let Some(position) = coordinator.registry.position(spawn) else {
            coordinator.registry.release(spawn);
            coordinator.registry.release(regroup);
            continue;
        };

        writer.write(SpawnDroneRequest {
            pattern: coordinator.pattern(),
            position,
            spawn_point: spawn,
            regroup_point: regroup,
        });
    }
}

fn register_spawned_drones(
    mut reader: MessageReader<DroneSpawned>,
    mut coordinator: ResMut<SpawnCoordinator>,
) {
    for ev in reader.read() {
        coordinator.register(ev.drone);
        debug!("Drone {:?} active ({} total)", ev.drone, coordinator.active().len());
    }
}

/// Once per round, tell every active drone to run its attack pattern.
pub fn trigger_round_attacks(
    mut coordinator: ResMut<SpawnCoordinator>,
    mut writer: MessageWriter<TriggerAttack>,
) {
    if !coordinator.take_attack_trigger() {
        return;
    }

    debug!("Triggering attack patterns for {} drone(s)", coordinator.active().len());
    for &drone in coordinator.active() {
        writer.write(TriggerAttack { drone });
    }
}

pub fn release_destroyed_drones(
    mut reader: MessageReader<DroneDestroyed>,
    mut coordinator: ResMut<SpawnCoordinator>,
) {
    for ev in reader.read() {
        coordinator.on_destroyed(ev.drone, &[ev.spawn_point, ev.regroup_point]);
        info!("Drone {:?} destroyed, {} remaining", ev.drone, coordinator.active().len());
    }
}
