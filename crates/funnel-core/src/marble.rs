//! Marble records and deterministic grid spawning.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::geometry::Point2D;
use crate::physics::{BodyHandle, PhysicsBackend};

/// Index of a marble in the population, `0..marble_count`.
pub type MarbleId = u32;

/// 1-based finish position.
pub type FinishRank = u32;

/// RGB color representation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts HSV components in `[0, 1]` to RGB.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::many_single_char_names
    )]
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h = h.rem_euclid(1.0) * 6.0;
        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        let to_byte = |c: f32| (c * 255.0) as u8;
        Self::rgb(to_byte(r), to_byte(g), to_byte(b))
    }

    /// Rainbow color for marble `index` out of `total`.
    #[allow(clippy::cast_precision_loss)]
    pub fn rainbow(index: MarbleId, total: u32) -> Self {
        Self::from_hsv(rainbow_hue(index, total), 0.8, 1.0)
    }
}

#[allow(clippy::cast_precision_loss)]
fn rainbow_hue(index: MarbleId, total: u32) -> f32 {
    if total == 0 {
        0.0
    } else {
        index as f32 / total as f32
    }
}

/// Human-readable name of a hue in `[0, 1]`.
pub fn color_name(hue: f32) -> &'static str {
    const NAMES: [(f32, &str); 14] = [
        (0.00, "Red"),
        (0.05, "Orange"),
        (0.11, "Gold"),
        (0.16, "Yellow"),
        (0.22, "Lime"),
        (0.33, "Green"),
        (0.44, "Teal"),
        (0.50, "Cyan"),
        (0.58, "Sky"),
        (0.66, "Blue"),
        (0.75, "Purple"),
        (0.83, "Magenta"),
        (0.91, "Pink"),
        (1.00, "Red"),
    ];
    NAMES
        .iter()
        .find(|(threshold, _)| hue <= *threshold)
        .map_or("Red", |(_, name)| name)
}

/// A marble taking part in the race.
///
/// The record outlives its physics body so the final standings can be shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marble {
    pub id: MarbleId,
    pub color: Color,
    pub color_name: String,
    pub radius: f32,
    /// Last position read from the physics world.
    pub position: Point2D,
    pub finished: bool,
    pub finish_rank: Option<FinishRank>,
    #[serde(skip)]
    pub body: Option<BodyHandle>,
}

impl Marble {
    /// Marks the marble as finished. Ranks are assigned once.
    pub fn finish(&mut self, rank: FinishRank) {
        debug_assert!(!self.finished, "marble {} finished twice", self.id);
        self.finished = true;
        self.finish_rank = Some(rank);
        self.body = None;
    }

    pub fn is_active(&self) -> bool {
        !self.finished
    }

    /// Display label such as `"Teal #42"`.
    pub fn label(&self) -> String {
        format!("{} #{}", self.color_name, self.id)
    }
}

/// Spawns the marble population on a jittered grid.
///
/// Slot `i` sits at column `i % spawn_columns`, row `i / spawn_columns`.
/// Jitter and radius variation come from a `ChaCha8Rng` seeded from the
/// config, so the same config always produces the same grid.
pub fn spawn_grid<B: PhysicsBackend>(backend: &mut B, config: &SimulationConfig) -> Vec<Marble> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut marbles = Vec::with_capacity(config.marble_count as usize);

    for id in 0..config.marble_count {
        let row = id / config.spawn_columns;
        let col = id % config.spawn_columns;

        let jitter = rng.random_range(-config.spawn_jitter..=config.spawn_jitter);
        let scale = rng.random_range(
            (1.0 - config.radius_variation)..=(1.0 + config.radius_variation),
        );

        #[allow(clippy::cast_precision_loss)]
        let position = Point2D::new(
            config.spawn_origin.x + col as f32 * config.spawn_spacing + jitter,
            config.spawn_origin.y + row as f32 * config.spawn_spacing,
        );
        let radius = config.marble_radius * scale;
        let body = backend.spawn_body(position, radius);

        let hue = rainbow_hue(id, config.marble_count);
        marbles.push(Marble {
            id,
            color: Color::rainbow(id, config.marble_count),
            color_name: color_name(hue).to_string(),
            radius,
            position,
            finished: false,
            finish_rank: None,
            body: Some(body),
        });
    }

    marbles
}
