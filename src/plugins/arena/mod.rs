//! Arena plugin: publishes the attack area and hands spawn/regroup points to the
//! spawn coordinator when a game starts.
//!
//! A missing `AttackArea` resource is tolerated everywhere: drones then move
//! unconstrained and a warning is logged once.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::plugins::spawner::{SpawnCoordinator, SpawnRegistry};

pub mod area;
pub mod layout;

pub use area::{AttackArea, constrain};
pub use layout::ArenaLayout;

pub fn plugin(app: &mut App) {
    app.init_resource::<ArenaLayout>();
    app.add_systems(OnEnter(GameState::InGame), (apply_layout, spawn_area_marker).chain());
}

fn apply_layout(
    mut commands: Commands,
    layout: Res<ArenaLayout>,
    mut coordinator: ResMut<SpawnCoordinator>,
) {
    let area = layout.attack_area();
    commands.insert_resource(area);
    coordinator.registry = SpawnRegistry::new(layout.spawn_positions(), layout.regroup_positions());

    info!(
        "Arena ready: area {:?}..{:?} at height {}",
        area.min, area.max, area.height
    );
}

/// Flat backdrop showing where drones may fly.
fn spawn_area_marker(mut commands: Commands, layout: Res<ArenaLayout>) {
    let area = layout.attack_area();
    commands.spawn((
        Name::new("AttackArea"),
        Sprite::from_color(Color::srgb(0.12, 0.12, 0.14), area.size()),
        Transform::from_translation(area.center().with_z(0.0)),
        DespawnOnExit(GameState::InGame),
    ));
}
