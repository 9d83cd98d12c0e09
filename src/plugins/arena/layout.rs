//! Arena layout: attack area plus spawn and regroup points, loadable from RON.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::area::AttackArea;
use crate::common::error::ConfigError;

/// Arena description.
///
/// ```ron
/// (
///     area_min: (-12.0, -8.0),
///     area_max: (12.0, 8.0),
///     height: 1.0,
///     spawn_points: [(-10.0, 7.0), (10.0, 7.0)],
///     regroup_points: [(-5.0, 3.0), (5.0, 3.0)],
/// )
/// ```
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaLayout {
    pub area_min: (f32, f32),
    pub area_max: (f32, f32),
    pub height: f32,
    pub spawn_points: Vec<(f32, f32)>,
    pub regroup_points: Vec<(f32, f32)>,
    #[serde(default)]
    pub player_start: (f32, f32),
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self {
            area_min: (-12.0, -8.0),
            area_max: (12.0, 8.0),
            height: 1.0,
            spawn_points: vec![
                (-10.0, 7.0),
                (-6.0, 7.0),
                (-2.0, 7.0),
                (2.0, 7.0),
                (6.0, 7.0),
                (10.0, 7.0),
            ],
            regroup_points: vec![
                (-9.0, 3.0),
                (-5.5, 4.5),
                (-1.5, 3.0),
                (1.5, 4.5),
                (5.5, 3.0),
                (9.0, 4.5),
            ],
            player_start: (0.0, -4.0),
        }
    }
}

impl ArenaLayout {
    pub fn from_ron_str(src: &str) -> Result<Self, ConfigError> {
        let layout: Self = ron::from_str(src)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&src)
    }

    /// Load `path`, falling back to the built-in layout on any failure.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(layout) => {
                info!(
                    "Loaded arena layout {:?}: {} spawn points, {} regroup points",
                    path,
                    layout.spawn_points.len(),
                    layout.regroup_points.len()
                );
                layout
            }
            Err(e) => {
                warn!("Using default arena layout: {e}");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (self.area_min, self.area_max);
        if min.0 > max.0 || min.1 > max.1 {
            return Err(ConfigError::InvertedArea {
                min: [min.0, min.1],
                max: [max.0, max.1],
            });
        }
        Ok(())
    }

    pub fn attack_area(&self) -> AttackArea {
        AttackArea::new(
            Vec2::new(self.area_min.0, self.area_min.1),
            Vec2::new(self.area_max.0, self.area_max.1),
            self.height,
        )
    }

    pub fn spawn_positions(&self) -> Vec<Vec3> {
        self.on_plane(&self.spawn_points)
    }

    pub fn regroup_positions(&self) -> Vec<Vec3> {
        self.on_plane(&self.regroup_points)
    }

    pub fn player_start(&self) -> Vec3 {
        Vec3::new(self.player_start.0, self.player_start.1, self.height)
    }

    fn on_plane(&self, points: &[(f32, f32)]) -> Vec<Vec3> {
        points.iter().map(|&(x, y)| Vec3::new(x, y, self.height)).collect()
    }
}
