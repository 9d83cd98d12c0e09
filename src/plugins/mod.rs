//! Feature plugins.

use bevy::prelude::*;

pub mod arena;
pub mod core;
pub mod drones;
pub mod lasers;
pub mod physics;
pub mod player;
pub mod spawner;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
///
/// `core` goes first: later plugins size their resources from `Tunables`.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    spawner::plugin(app);
    arena::plugin(app);
    drones::plugin(app);
    player::plugin(app);
    lasers::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}
