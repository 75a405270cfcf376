//! Marble Funnel Core Library
//!
//! Deterministic marble race through a funnel of walls and spinning
//! platforms, plus the level editor that authors those funnels.
//!
//! Physics sits behind [`PhysicsBackend`]; [`RapierWorld`] is the default
//! backend, built on `Rapier2D` with enhanced determinism.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod capture;
pub mod config;
pub mod editor;
pub mod error;
pub mod finish;
pub mod geometry;
pub mod level;
pub mod marble;
pub mod physics;
pub mod race;
pub mod session;

#[cfg(test)]
mod test_utils;

pub use capture::{CaptureReport, CaptureRun, Milestone};
pub use config::{DEFAULT_TIMESTEP, SimulationConfig};
pub use editor::{EditOutcome, EditorCommand, EditorConfig, EditorMode, LevelEditor};
pub use error::{ConfigError, EditorInputError, LevelIoError, SessionError, SolverError};
pub use finish::{FinishBoundary, FinishDetector};
pub use geometry::{Platform, Point2D, Wall};
pub use level::LevelDefinition;
pub use marble::{Color, FinishRank, Marble, MarbleId};
pub use physics::{BodyHandle, PhysicsBackend, PlatformHandle, RapierWorld};
pub use race::{RaceController, RaceOutcome, RaceResults, RaceState, TickReport};
pub use session::{Session, SessionCommand, SessionMode};
