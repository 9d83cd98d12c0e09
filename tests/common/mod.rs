//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `drone_patrol::game::configure_headless` to install gameplay plugins.
//!
//! Time advances by exactly one fixed step per `app.update()`, so each update
//! runs the fixed schedules once (the very first update has zero delta).

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use drone_patrol::common::tunables::Tunables;
use drone_patrol::plugins::core::DroneRng;

pub const FIXED_DT: f32 = 1.0 / 64.0;

pub fn app_headless() -> App {
    app_headless_with(Tunables::default())
}

/// Headless app with custom tunables; plugins size their resources from them.
pub fn app_headless_with(tunables: Tunables) -> App {
    let mut app = App::new();

    // AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(FIXED_DT)));
    app.insert_resource(DroneRng::seeded(7));
    app.insert_resource(tunables);

    drone_patrol::game::configure_headless(&mut app);
    // `App::run` normally does this; plugins such as avian's broad phase
    // finish their setup (e.g. `CollisionDiagnostics`) here.
    app.finish();
    app.cleanup();
    app
}

/// Headless app that has entered the game and run a few ticks.
pub fn app_in_game() -> App {
    let mut app = app_headless();
    tick(&mut app, 3);
    app
}

pub fn tick(app: &mut App, n: usize) {
    for _ in 0..n {
        app.update();
    }
}
