//! Segment geometry shared by the level, the editor and the physics adapter.

use serde::{Deserialize, Serialize};

/// A point in field coordinates (y grows downward).
///
/// Serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn midpoint(self, other: Self) -> Self {
        Self::new(
            f32::midpoint(self.x, other.x),
            f32::midpoint(self.y, other.y),
        )
    }
}

impl From<[f32; 2]> for Point2D {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for [f32; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

/// Distance from `p` to the closed segment `a`-`b`.
pub fn distance_to_segment(p: Point2D, a: Point2D, b: Point2D) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    p.distance(Point2D::new(a.x + t * abx, a.y + t * aby))
}

/// Walls shorter than this cannot be built.
pub const MIN_SEGMENT_LENGTH: f32 = f32::EPSILON;

/// Static wall segment. Never mutated once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub start: Point2D,
    pub end: Point2D,
}

impl Wall {
    pub const fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Orientation of the segment in radians.
    pub fn angle(&self) -> f32 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }

    pub fn distance_to(&self, p: Point2D) -> f32 {
        distance_to_segment(p, self.start, self.end)
    }
}

fn default_platform_length() -> f32 {
    40.0
}

/// Rotating platform segment.
///
/// `length` is the distance from the center to each tip. `current_angle` is
/// session state and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    #[serde(rename = "pos")]
    pub center: Point2D,
    #[serde(default = "default_platform_length")]
    pub length: f32,
    /// Radians per second of simulated time.
    #[serde(default)]
    pub angular_velocity: f32,
    #[serde(skip)]
    pub current_angle: f32,
}

impl Platform {
    pub const fn new(center: Point2D, length: f32, angular_velocity: f32) -> Self {
        Self {
            center,
            length,
            angular_velocity,
            current_angle: 0.0,
        }
    }

    /// Advances the angle by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.current_angle += self.angular_velocity * dt;
    }

    /// Both tips of the segment at its current angle.
    pub fn endpoints(&self) -> (Point2D, Point2D) {
        let (sin, cos) = self.current_angle.sin_cos();
        let dx = cos * self.length;
        let dy = sin * self.length;
        (
            Point2D::new(self.center.x - dx, self.center.y - dy),
            Point2D::new(self.center.x + dx, self.center.y + dy),
        )
    }

    pub fn distance_to(&self, p: Point2D) -> f32 {
        let (a, b) = self.endpoints();
        distance_to_segment(p, a, b)
    }
}
