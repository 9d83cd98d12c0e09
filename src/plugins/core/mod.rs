//! Core plugin: shared resources and global settings.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::common::tunables::Tunables;

/// Random source for point selection and patrol sampling.
///
/// Seed it for reproducible runs.
#[derive(Resource, Debug, Clone)]
pub struct DroneRng(pub StdRng);

impl DroneRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for DroneRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Tunables>();
    app.init_resource::<DroneRng>();
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));
}

#[cfg(test)]
mod tests;
