//! Platform presets selectable while authoring.

use crate::geometry::{Platform, Point2D};

/// A `{length, angular_velocity}` preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformTemplate {
    pub length: f32,
    pub angular_velocity: f32,
}

impl PlatformTemplate {
    pub const fn new(length: f32, angular_velocity: f32) -> Self {
        Self {
            length,
            angular_velocity,
        }
    }

    pub fn instantiate(&self, center: Point2D) -> Platform {
        Platform::new(center, self.length, self.angular_velocity)
    }
}

/// Built-in presets, in cycling order.
pub const PLATFORM_TEMPLATES: [PlatformTemplate; 5] = [
    PlatformTemplate::new(50.0, 2.0),
    PlatformTemplate::new(50.0, -2.0),
    PlatformTemplate::new(40.0, 3.0),
    PlatformTemplate::new(80.0, 1.0),
    PlatformTemplate::new(30.0, -4.0),
];

/// Circular cursor over [`PLATFORM_TEMPLATES`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateCursor {
    index: usize,
}

impl TemplateCursor {
    pub fn index(self) -> usize {
        self.index
    }

    pub fn current(self) -> PlatformTemplate {
        PLATFORM_TEMPLATES[self.index]
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % PLATFORM_TEMPLATES.len();
    }

    pub fn previous(&mut self) {
        self.index = (self.index + PLATFORM_TEMPLATES.len() - 1) % PLATFORM_TEMPLATES.len();
    }
}
