//! Error types for level loading, physics and the session API.

use std::path::PathBuf;

use crate::physics::BodyHandle;

/// Malformed level definition or invalid simulation settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed level JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level name must not be empty")]
    EmptyName,
    #[error("{field} must be finite")]
    NonFinite { field: String },
    #[error("wall {index} has zero length")]
    ZeroLengthWall { index: usize },
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

/// Failure reported by the physics adapter. Fatal for the running race.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),
    #[error("body {0:?} reached a non-finite position")]
    NonFiniteBody(BodyHandle),
}

/// Rejected editor input. Never surfaced past the editor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditorInputError {
    #[error("nothing within hit distance")]
    NothingInRange,
    #[error("wall of length {0} discarded")]
    DegenerateWall(f32),
    #[error("no wall is being drawn")]
    NotDrawing,
    #[error("pointer pressed while already drawing")]
    AlreadyDrawing,
    #[error("no wall to undo")]
    NothingToUndo,
}

/// Level file could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum LevelIoError {
    #[error("failed to access level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid level file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },
}

/// Umbrella error for the session API.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    LevelIo(#[from] LevelIoError),
}
