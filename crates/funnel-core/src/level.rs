//! Level definition and its JSON representation.
//!
//! ```json
//! {
//!   "name": "level",
//!   "walls": [{ "start": [50, 200], "end": [370, 500] }],
//!   "platforms": [{ "pos": [280, 350], "length": 50, "angular_velocity": 2.0 }]
//! }
//! ```
//!
//! Missing `walls`/`platforms` arrays load as empty and unknown fields are
//! ignored. Platform angles are runtime state and are never written.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LevelIoError};
use crate::geometry::{MIN_SEGMENT_LENGTH, Platform, Point2D, Wall};

fn default_level_name() -> String {
    "level".to_string()
}

/// Walls and platforms making up one obstacle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    #[serde(default = "default_level_name")]
    pub name: String,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl Default for LevelDefinition {
    fn default() -> Self {
        Self::default_funnel()
    }
}

impl LevelDefinition {
    /// An empty level: marbles simply fall through the field.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            walls: Vec::new(),
            platforms: Vec::new(),
        }
    }

    /// The built-in funnel: a V-shaped channel with a narrow spout, a convex
    /// cap under the drop zone, guard rails and three spinning platforms.
    pub fn default_funnel() -> Self {
        const CENTER_X: f32 = 400.0;
        const TOP_Y: f32 = 200.0;
        const NECK_Y: f32 = 500.0;
        const SPOUT_Y: f32 = 700.0;
        const NECK_HALF_WIDTH: f32 = 30.0;
        const TOP_HALF_WIDTH: f32 = 350.0;
        const CAP_HALF_WIDTH: f32 = 60.0;
        const GUARD_HEIGHT: f32 = 250.0;

        let segments = [
            // Diagonal sides
            ((-TOP_HALF_WIDTH, TOP_Y), (-NECK_HALF_WIDTH, NECK_Y)),
            ((TOP_HALF_WIDTH, TOP_Y), (NECK_HALF_WIDTH, NECK_Y)),
            // Spout
            ((-NECK_HALF_WIDTH, NECK_Y), (-NECK_HALF_WIDTH, SPOUT_Y)),
            ((NECK_HALF_WIDTH, NECK_Y), (NECK_HALF_WIDTH, SPOUT_Y)),
            // Convex cap, marbles roll off both sides
            (
                (-CAP_HALF_WIDTH, TOP_Y + 40.0),
                (-CAP_HALF_WIDTH / 2.0, TOP_Y + 15.0),
            ),
            ((-CAP_HALF_WIDTH / 2.0, TOP_Y + 15.0), (0.0, TOP_Y)),
            ((0.0, TOP_Y), (CAP_HALF_WIDTH / 2.0, TOP_Y + 15.0)),
            (
                (CAP_HALF_WIDTH / 2.0, TOP_Y + 15.0),
                (CAP_HALF_WIDTH, TOP_Y + 40.0),
            ),
            // Guards above the rim
            (
                (-TOP_HALF_WIDTH, TOP_Y - GUARD_HEIGHT),
                (-TOP_HALF_WIDTH, TOP_Y),
            ),
            (
                (TOP_HALF_WIDTH, TOP_Y - GUARD_HEIGHT),
                (TOP_HALF_WIDTH, TOP_Y),
            ),
        ];

        let walls = segments
            .iter()
            .map(|&((x1, y1), (x2, y2))| {
                Wall::new(
                    Point2D::new(CENTER_X + x1, y1),
                    Point2D::new(CENTER_X + x2, y2),
                )
            })
            .collect();

        let platforms = vec![
            Platform::new(Point2D::new(CENTER_X - 120.0, 350.0), 50.0, 2.0),
            Platform::new(Point2D::new(CENTER_X + 120.0, 350.0), 50.0, -2.0),
            Platform::new(Point2D::new(CENTER_X, 420.0), 40.0, 3.0),
        ];

        Self {
            name: "default".to_string(),
            walls,
            platforms,
        }
    }

    /// Parses and validates a level.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Serializes the level as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads and validates a level file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, LevelIoError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| LevelIoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_json(&json).map_err(|source| LevelIoError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            "[level] loaded '{}' from {} ({} walls, {} platforms)",
            level.name,
            path.display(),
            level.walls.len(),
            level.platforms.len()
        );
        Ok(level)
    }

    /// Writes the level to `path`, creating parent directories as needed.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<(), LevelIoError> {
        let path = path.as_ref();
        let io_err = |source| LevelIoError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut json = self.to_json().map_err(|source| LevelIoError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        json.push('\n');

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, json).map_err(io_err)?;
        tracing::info!("[level] saved '{}' to {}", self.name, path.display());
        Ok(())
    }

    /// Checks the name, coordinates and wall lengths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }

        for (index, wall) in self.walls.iter().enumerate() {
            if !wall.start.is_finite() || !wall.end.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: format!("walls[{index}]"),
                });
            }
            if wall.length() < MIN_SEGMENT_LENGTH {
                return Err(ConfigError::ZeroLengthWall { index });
            }
        }

        for (index, platform) in self.platforms.iter().enumerate() {
            if !platform.center.is_finite()
                || !platform.length.is_finite()
                || !platform.angular_velocity.is_finite()
            {
                return Err(ConfigError::NonFinite {
                    field: format!("platforms[{index}]"),
                });
            }
            if platform.length <= 0.0 {
                return Err(ConfigError::InvalidSetting {
                    name: "platforms.length",
                    reason: format!("platform {index} has length {}", platform.length),
                });
            }
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty() && self.platforms.is_empty()
    }
}
