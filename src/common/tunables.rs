//! Tunable gameplay constants.
//!
//! World units are meters, durations are seconds.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub player_speed: f32,
    pub player_max_health: i32,
    /// Knockback decay rate (1/s) applied to the player's impulse velocity.
    pub knockback_damping: f32,

    // Drone health and damage
    pub drone_health: i32,
    pub drone_contact_damage: i32,
    pub collision_self_damage: i32,
    pub laser_damage: i32,
    /// Speed (m/s) added to the player along the push direction on contact.
    pub knockback_speed: f32,

    // Drone motion
    pub seek_duration: f32,
    pub homing_duration: f32,
    pub circle_radius: f32,
    pub circle_resolution: usize,
    pub circle_lap_duration: f32,
    pub fallback_distance: f32,
    pub fallback_duration: f32,
    pub defensive_dwell: f32,
    pub patrol_points: usize,
    pub patrol_duration: f32,
    pub regroup_duration: f32,
    pub acquire_duration: f32,

    // Target search
    pub search_radius: f32,
    pub search_interval: f32,

    // Separation
    pub min_separation: f32,
    pub separation_interval: f32,

    // Spawning
    pub spawn_interval: f32,
    pub auto_start_attack: bool,
    pub pool_capacity: usize,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            player_speed: 5.0,
            player_max_health: 100,
            knockback_damping: 6.0,

            drone_health: 100,
            drone_contact_damage: 10,
            collision_self_damage: 10,
            laser_damage: 50,
            knockback_speed: 10.0,

            seek_duration: 1.0,
            homing_duration: 0.5,
            circle_radius: 5.0,
            circle_resolution: 36,
            circle_lap_duration: 5.0,
            fallback_distance: 2.0,
            fallback_duration: 0.5,
            defensive_dwell: 2.0,
            patrol_points: 4,
            patrol_duration: 10.0,
            regroup_duration: 3.0,
            acquire_duration: 1.0,

            search_radius: 10.0,
            search_interval: 1.0,

            min_separation: 2.0,
            separation_interval: 0.5,

            spawn_interval: 0.1,
            auto_start_attack: false,
            pool_capacity: 10,
        }
    }
}
