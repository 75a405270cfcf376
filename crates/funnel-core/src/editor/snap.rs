//! Grid snapping for authored points.

use crate::geometry::Point2D;

/// Snaps points to a square grid when enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnap {
    /// Grid spacing in field units.
    pub size: f32,
    pub enabled: bool,
}

impl Default for GridSnap {
    fn default() -> Self {
        Self {
            size: 20.0,
            enabled: false,
        }
    }
}

impl GridSnap {
    pub fn snap(&self, p: Point2D) -> Point2D {
        if !self.enabled || self.size <= 0.0 {
            return p;
        }
        Point2D::new(
            (p.x / self.size).round() * self.size,
            (p.y / self.size).round() * self.size,
        )
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}
