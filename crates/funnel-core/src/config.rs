//! Immutable simulation settings handed to the race controller.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::finish::FinishBoundary;
use crate::geometry::Point2D;

/// Fixed timestep of one tick at 60Hz.
pub const DEFAULT_TIMESTEP: f32 = 1.0 / 60.0;

/// Race, spawn and material settings.
///
/// Every field is optional in JSON; missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub field_width: f32,
    pub field_height: f32,

    pub marble_count: u32,
    pub marble_radius: f32,
    /// Marble radii are scaled by a factor in `[1 - v, 1 + v]`.
    pub radius_variation: f32,

    /// Top-left slot of the spawn grid.
    pub spawn_origin: Point2D,
    pub spawn_columns: u32,
    pub spawn_spacing: f32,
    /// Maximum horizontal offset applied to each spawn slot.
    pub spawn_jitter: f32,
    pub seed: u64,

    /// Downward acceleration in units/s².
    pub gravity: f32,
    pub marble_elasticity: f32,
    pub marble_friction: f32,
    pub wall_elasticity: f32,
    pub wall_friction: f32,
    /// Half-thickness of wall segments.
    pub wall_radius: f32,
    pub platform_elasticity: f32,
    pub platform_friction: f32,
    /// Half-thickness of platform segments.
    pub platform_radius: f32,

    pub timestep: f32,
    /// Simulation speed multiplier applied to `timestep`.
    pub speed: f32,
    /// Tick budget; marbles still in play when it runs out stay unranked.
    pub max_ticks: u64,
    /// Exit boundary. Defaults to a floor one marble radius below the field.
    pub finish_boundary: Option<FinishBoundary>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            field_width: 800.0,
            field_height: 800.0,
            marble_count: 100,
            marble_radius: 6.0,
            radius_variation: 0.2,
            spawn_origin: Point2D::new(330.0, 50.0),
            spawn_columns: 10,
            spawn_spacing: 14.0,
            spawn_jitter: 5.0,
            seed: 42,
            gravity: 600.0,
            marble_elasticity: 1.1,
            marble_friction: 0.3,
            wall_elasticity: 0.5,
            wall_friction: 0.5,
            wall_radius: 5.0,
            platform_elasticity: 0.8,
            platform_friction: 0.5,
            platform_radius: 4.0,
            timestep: DEFAULT_TIMESTEP,
            speed: 1.0,
            max_ticks: 3600,
            finish_boundary: None,
        }
    }
}

impl SimulationConfig {
    /// Parses a config from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Duration of one tick in simulated seconds.
    pub fn dt(&self) -> f32 {
        self.timestep * self.speed
    }

    pub fn boundary(&self) -> FinishBoundary {
        self.finish_boundary.unwrap_or(FinishBoundary::Floor {
            y: self.field_height + self.marble_radius,
        })
    }

    /// Checks the settings the controller relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidSetting {
                    name,
                    reason: format!("must be positive, got {value}"),
                })
            }
        }

        fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidSetting {
                    name,
                    reason: format!("must be zero or positive, got {value}"),
                })
            }
        }

        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("marble_radius", self.marble_radius)?;
        positive("spawn_spacing", self.spawn_spacing)?;
        positive("wall_radius", self.wall_radius)?;
        positive("platform_radius", self.platform_radius)?;
        positive("timestep", self.timestep)?;
        positive("speed", self.speed)?;
        non_negative("spawn_jitter", self.spawn_jitter)?;
        non_negative("gravity", self.gravity)?;
        non_negative("marble_elasticity", self.marble_elasticity)?;
        non_negative("marble_friction", self.marble_friction)?;
        non_negative("wall_elasticity", self.wall_elasticity)?;
        non_negative("wall_friction", self.wall_friction)?;
        non_negative("platform_elasticity", self.platform_elasticity)?;
        non_negative("platform_friction", self.platform_friction)?;

        if !(0.0..1.0).contains(&self.radius_variation) {
            return Err(ConfigError::InvalidSetting {
                name: "radius_variation",
                reason: format!("must be in [0, 1), got {}", self.radius_variation),
            });
        }
        if self.spawn_columns == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "spawn_columns",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.spawn_origin.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "spawn_origin".to_string(),
            });
        }
        if !self.boundary().is_finite() {
            return Err(ConfigError::NonFinite {
                field: "finish_boundary".to_string(),
            });
        }
        Ok(())
    }
}
