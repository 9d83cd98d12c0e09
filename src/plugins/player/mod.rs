//! Player plugin: the drones' target.
//!
//! Pipeline:
//! - Update: sample input, write PlayerInput resource
//! - FixedUpdate: input axis + knockback -> rigid body velocity, knockback decays
//!
//! The body is dynamic with rotation locked so drone contacts register but
//! never spin it; velocity is overwritten every tick.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};
use crate::plugins::arena::ArenaLayout;

/// Player body radius in meters.
pub const PLAYER_RADIUS: f32 = 0.4;

#[derive(Component)]
pub struct Player;

/// Health clamped to `[0, max]`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHealth {
    pub current: i32,
    pub max: i32,
}

impl PlayerHealth {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount).min(self.max);
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }
}

/// Pending push in m/s; decays back to zero.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Knockback(pub Vec2);

impl Knockback {
    #[inline]
    pub fn push(&mut self, impulse: Vec2) {
        self.0 += impulse;
    }

    /// Exponential decay; snaps to zero once negligible.
    pub fn decay(&mut self, damping: f32, dt: f32) {
        self.0 *= (-damping * dt).exp();
        if self.0.length_squared() < 1e-6 {
            self.0 = Vec2::ZERO;
        }
    }
}

#[derive(Resource, Default, Debug)]
struct PlayerInput {
    move_axis: Vec2,
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(
            Update,
            (gather_input, debug_damage).run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedUpdate,
            (apply_movement, report_defeat).run_if(in_state(GameState::InGame)),
        );
}

fn spawn(mut commands: Commands, tunables: Option<Res<Tunables>>, layout: Option<Res<ArenaLayout>>) {
    let max_health = tunables.map_or(100, |t| t.player_max_health);
    let start = layout.map_or(Vec3::new(0.0, 0.0, 1.0), |l| l.player_start());
    let layers = CollisionLayers::new(Layer::Player, [Layer::Drone]);

    commands.spawn((
        Name::new("Player"),
        Player,
        PlayerHealth::new(max_health),
        Knockback::default(),
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(PLAYER_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_translation(start),
        RigidBody::Dynamic,
        LockedAxes::ROTATION_LOCKED,
        Collider::circle(PLAYER_RADIUS),
        layers,
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::InGame),
    ));
}

fn gather_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<PlayerInput>) {
    let Some(keys) = keys else {
        return;
    };
    let mut axis = Vec2::ZERO;

    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
}

/// H hurts the player, for testing the health readout.
fn debug_damage(keys: Option<Res<ButtonInput<KeyCode>>>, mut q_player: Query<&mut PlayerHealth, With<Player>>) {
    let Some(keys) = keys else {
        return;
    };
    if !keys.just_pressed(KeyCode::KeyH) {
        return;
    }
    for mut health in &mut q_player {
        health.take_damage(10);
        debug!("Player health {}", health.current);
    }
}

fn apply_movement(
    time: Res<Time<Fixed>>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&mut LinearVelocity, &mut Knockback), With<Player>>,
) {
    let Ok((mut vel, mut knockback)) = q_player.single_mut() else {
        return;
    };
    vel.0 = input.move_axis * tunables.player_speed + knockback.0;
    knockback.decay(tunables.knockback_damping, time.delta_secs());
}

fn report_defeat(mut reported: Local<bool>, q_player: Query<&PlayerHealth, (With<Player>, Changed<PlayerHealth>)>) {
    for health in &q_player {
        if health.is_depleted() && !*reported {
            info!("Player defeated");
            *reported = true;
        } else if !health.is_depleted() {
            *reported = false;
        }
    }
}
