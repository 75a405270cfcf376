//! Test utilities: a scripted physics backend.
//!
//! `ScriptedBackend` implements `PhysicsBackend` without a solver. Bodies
//! only move when a test places them or when a constant per-step fall is
//! configured, which makes finish order fully predictable.

use crate::config::SimulationConfig;
use crate::error::SolverError;
use crate::geometry::{Platform, Point2D, Wall};
use crate::physics::{BodyHandle, PhysicsBackend, PlatformHandle};

#[derive(Debug, Default)]
pub(crate) struct ScriptedBackend {
    bodies: Vec<Option<Point2D>>,
    pub walls: Vec<Wall>,
    platform_angles: Vec<f32>,
    pub steps: u64,
    pub clears: u64,
    /// Gravity from the last `configure` call.
    pub gravity: Option<f32>,
    /// Added to every body's y on each step.
    fall_per_step: f32,
    /// Step number (1-based) that returns an error.
    fail_on_step: Option<u64>,
}

impl ScriptedBackend {
    pub fn falling(fall_per_step: f32) -> Self {
        Self {
            fall_per_step,
            ..Default::default()
        }
    }

    pub fn fail_on_step(mut self, step: u64) -> Self {
        self.fail_on_step = Some(step);
        self
    }

    pub fn place(&mut self, handle: BodyHandle, position: Point2D) {
        if let Some(slot) = self.bodies.get_mut(handle.0 as usize) {
            if slot.is_some() {
                *slot = Some(position);
            }
        }
    }

    pub fn live_bodies(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    pub fn platform_angle(&self, handle: PlatformHandle) -> Option<f32> {
        self.platform_angles.get(handle.0 as usize).copied()
    }

    pub fn platform_count(&self) -> usize {
        self.platform_angles.len()
    }
}

impl PhysicsBackend for ScriptedBackend {
    fn configure(&mut self, config: &SimulationConfig) {
        self.gravity = Some(config.gravity);
    }

    fn step(&mut self, dt: f32) -> Result<(), SolverError> {
        if self.fail_on_step == Some(self.steps + 1) {
            return Err(SolverError::DegenerateGeometry("scripted failure".to_string()));
        }
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SolverError::InvalidTimestep(dt));
        }
        self.steps += 1;
        for position in self.bodies.iter_mut().flatten() {
            position.y += self.fall_per_step;
        }
        Ok(())
    }

    fn add_static_segment(&mut self, wall: &Wall) -> Result<(), SolverError> {
        self.walls.push(*wall);
        Ok(())
    }

    fn add_rotating_segment(&mut self, platform: &Platform) -> Result<PlatformHandle, SolverError> {
        #[allow(clippy::cast_possible_truncation)]
        let handle = PlatformHandle(self.platform_angles.len() as u32);
        self.platform_angles.push(platform.current_angle);
        Ok(handle)
    }

    fn set_platform_angle(&mut self, handle: PlatformHandle, angle: f32) {
        if let Some(slot) = self.platform_angles.get_mut(handle.0 as usize) {
            *slot = angle;
        }
    }

    fn spawn_body(&mut self, position: Point2D, _radius: f32) -> BodyHandle {
        #[allow(clippy::cast_possible_truncation)]
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Some(position));
        handle
    }

    fn get_position(&self, handle: BodyHandle) -> Option<Point2D> {
        self.bodies.get(handle.0 as usize).copied().flatten()
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        if let Some(slot) = self.bodies.get_mut(handle.0 as usize) {
            *slot = None;
        }
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.bodies.clear();
        self.walls.clear();
        self.platform_angles.clear();
    }
}
