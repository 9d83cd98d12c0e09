//! Error types shared across plugins.

use std::path::PathBuf;

use thiserror::Error;

use crate::plugins::spawner::PointKind;

/// Failures when claiming spawn or regroup points.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    /// The arena layout declares no points of this kind.
    #[error("no {kind} points are configured")]
    EmptyPointPool { kind: PointKind },

    /// Every point of this kind is held by a live drone.
    #[error("all {total} {kind} points are occupied")]
    NoPointAvailable { kind: PointKind, total: usize },
}

/// Failures when loading an arena layout file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse arena layout: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("attack area is inverted: min {min:?} exceeds max {max:?}")]
    InvertedArea { min: [f32; 2], max: [f32; 2] },
}
