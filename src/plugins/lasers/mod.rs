//! Lasers plugin: twin beams on the player that damage drones while held.
//!
//! Beams are spawned once as sensor children of the player and switched by
//! overwriting their collision filters and visibility, the same way pooled
//! drones are enabled and disabled.
//!
//! ```text
//! Update:      L pressed/released -> ToggleLasers { active }
//! FixedUpdate: ToggleLasers -> beam filters + visibility
//! ```

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::{layers::Layer, state::GameState};
use crate::plugins::player::Player;

/// Beam length in meters, measured forward (+Y) from the emitter.
pub const BEAM_LENGTH: f32 = 6.0;
pub const BEAM_WIDTH: f32 = 0.15;
/// Lateral offset of each emitter from the player's center.
pub const EMITTER_OFFSET: f32 = 0.25;

#[derive(Component, Debug, Clone, Copy)]
pub struct LaserBeam;

/// Switch both beams on or off.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleLasers {
    pub active: bool,
}

#[inline]
pub fn active_laser_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Laser, [Layer::Drone])
}

#[inline]
pub fn inactive_laser_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Laser, [] as [Layer; 0])
}

pub fn plugin(app: &mut App) {
    app.add_message::<ToggleLasers>()
        .add_systems(
            Update,
            (attach_lasers, gather_laser_input).run_if(in_state(GameState::InGame)),
        )
        .add_systems(FixedUpdate, apply_laser_toggle.run_if(in_state(GameState::InGame)));
}

/// Give every newly spawned player its two beams.
pub fn attach_lasers(mut commands: Commands, q_new: Query<Entity, Added<Player>>) {
    for player in &q_new {
        commands.entity(player).with_children(|parent| {
            for side in [-1.0, 1.0] {
                parent.spawn((
                    Name::new("LaserBeam"),
                    LaserBeam,
                    Sprite {
                        color: Color::srgb(1.0, 0.1, 0.1),
                        custom_size: Some(Vec2::new(BEAM_WIDTH, BEAM_LENGTH)),
                        ..default()
                    },
                    Transform::from_xyz(side * EMITTER_OFFSET, BEAM_LENGTH * 0.5, 0.1),
                    Visibility::Hidden,
                    Collider::rectangle(BEAM_WIDTH, BEAM_LENGTH),
                    Sensor,
                    inactive_laser_layers(),
                ));
            }
        });
    }
}

/// Hold L to fire.
fn gather_laser_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut writer: MessageWriter<ToggleLasers>) {
    let Some(keys) = keys else {
        return;
    };
    if keys.just_pressed(KeyCode::KeyL) {
        writer.write(ToggleLasers { active: true });
    }
    if keys.just_released(KeyCode::KeyL) {
        writer.write(ToggleLasers { active: false });
    }
}

pub fn apply_laser_toggle(
    mut reader: MessageReader<ToggleLasers>,
    mut q_beams: Query<(&mut CollisionLayers, &mut Visibility), With<LaserBeam>>,
) {
    // Only the last toggle of the tick matters.
    let Some(ToggleLasers { active }) = reader.read().last().copied() else {
        return;
    };

    for (mut layers, mut vis) in &mut q_beams {
        if active {
            *layers = active_laser_layers();
            *vis = Visibility::Inherited;
        } else {
            *layers = inactive_laser_layers();
            *vis = Visibility::Hidden;
        }
    }
    debug!("Lasers {}", if active { "on" } else { "off" });
}
