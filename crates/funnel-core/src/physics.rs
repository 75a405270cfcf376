//! Physics adapter over an external rigid-body solver.
//!
//! The race only talks to [`PhysicsBackend`]. [`RapierWorld`] is the default
//! backend and keeps every `Rapier2D` component needed for a deterministic
//! step.

use rapier2d::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::config::{DEFAULT_TIMESTEP, SimulationConfig};
use crate::error::SolverError;
use crate::geometry::{MIN_SEGMENT_LENGTH, Platform, Point2D, Wall};

/// Opaque handle to a dynamic circle body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

/// Opaque handle to a rotating platform segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformHandle(pub u32);

/// Capability the race needs from a rigid-body solver.
///
/// `step` must be deterministic for identical prior state and configuration.
/// Position queries are only meaningful between steps.
pub trait PhysicsBackend {
    /// Applies gravity and material settings. Takes effect from the next `clear`.
    fn configure(&mut self, config: &SimulationConfig);

    /// Advances the world by `dt` seconds.
    fn step(&mut self, dt: f32) -> Result<(), SolverError>;

    fn add_static_segment(&mut self, wall: &Wall) -> Result<(), SolverError>;

    /// Adds a segment whose orientation is driven by [`set_platform_angle`].
    ///
    /// [`set_platform_angle`]: PhysicsBackend::set_platform_angle
    fn add_rotating_segment(&mut self, platform: &Platform) -> Result<PlatformHandle, SolverError>;

    /// Orients the platform for the next step.
    fn set_platform_angle(&mut self, handle: PlatformHandle, angle: f32);

    /// Spawns a dynamic circle. Overlap with existing geometry is not checked.
    fn spawn_body(&mut self, position: Point2D, radius: f32) -> BodyHandle;

    fn get_position(&self, handle: BodyHandle) -> Option<Point2D>;

    fn remove_body(&mut self, handle: BodyHandle);

    /// Removes every body and segment.
    fn clear(&mut self);
}

/// Material and gravity settings applied by [`RapierWorld`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RapierSettings {
    pub gravity: f32,
    pub marble_elasticity: f32,
    pub marble_friction: f32,
    pub wall_elasticity: f32,
    pub wall_friction: f32,
    pub wall_radius: f32,
    pub platform_elasticity: f32,
    pub platform_friction: f32,
    pub platform_radius: f32,
}

impl From<&SimulationConfig> for RapierSettings {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            gravity: config.gravity,
            marble_elasticity: config.marble_elasticity,
            marble_friction: config.marble_friction,
            wall_elasticity: config.wall_elasticity,
            wall_friction: config.wall_friction,
            wall_radius: config.wall_radius,
            platform_elasticity: config.platform_elasticity,
            platform_friction: config.platform_friction,
            platform_radius: config.platform_radius,
        }
    }
}

impl Default for RapierSettings {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

/// `Rapier2D` world implementing [`PhysicsBackend`].
pub struct RapierWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub gravity: Vector,
    pub frame: u64,
    settings: RapierSettings,
    /// Indexed by `BodyHandle.0`; `None` once removed.
    bodies: Vec<Option<RigidBodyHandle>>,
    /// Indexed by `PlatformHandle.0`.
    platforms: Vec<RigidBodyHandle>,
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RapierWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RapierWorld")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .field("gravity", &self.gravity)
            .finish_non_exhaustive()
    }
}

impl RapierWorld {
    /// Creates a world with the default settings.
    pub fn new() -> Self {
        Self::with_settings(RapierSettings::default())
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::with_settings(RapierSettings::from(config))
    }

    pub fn with_settings(settings: RapierSettings) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: DEFAULT_TIMESTEP,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(0.0, settings.gravity),
            frame: 0,
            settings,
            bodies: Vec::new(),
            platforms: Vec::new(),
        }
    }

    pub fn settings(&self) -> &RapierSettings {
        &self.settings
    }

    /// Returns the number of completed steps.
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Number of live marble bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    /// Current orientation of a platform body, in radians.
    pub fn platform_angle(&self, handle: PlatformHandle) -> Option<f32> {
        let body_handle = self.platforms.get(handle.0 as usize)?;
        self.rigid_body_set
            .get(*body_handle)
            .map(|body| body.rotation().angle())
    }

    /// Computes a hash of every body's position and velocity.
    /// Two worlds stepped identically hash identically.
    pub fn compute_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.frame.hash(&mut hasher);

        for (handle, body) in self.rigid_body_set.iter() {
            let (index, generation) = handle.into_raw_parts();
            index.hash(&mut hasher);
            generation.hash(&mut hasher);

            let pos = body.translation();
            hash_f32(pos.x, &mut hasher);
            hash_f32(pos.y, &mut hasher);
            hash_f32(body.rotation().angle(), &mut hasher);

            let linvel = body.linvel();
            hash_f32(linvel.x, &mut hasher);
            hash_f32(linvel.y, &mut hasher);
            hash_f32(body.angvel(), &mut hasher);
        }

        hasher.finish()
    }

    fn rigid_body_handle(&self, handle: BodyHandle) -> Option<RigidBodyHandle> {
        self.bodies.get(handle.0 as usize).copied().flatten()
    }

    fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }
}

impl PhysicsBackend for RapierWorld {
    fn configure(&mut self, config: &SimulationConfig) {
        self.settings = RapierSettings::from(config);
    }

    fn step(&mut self, dt: f32) -> Result<(), SolverError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SolverError::InvalidTimestep(dt));
        }
        self.integration_parameters.dt = dt;

        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        self.frame += 1;

        for (index, slot) in self.bodies.iter().enumerate() {
            let Some(body) = slot.and_then(|h| self.rigid_body_set.get(h)) else {
                continue;
            };
            let pos = body.translation();
            if !pos.x.is_finite() || !pos.y.is_finite() {
                #[allow(clippy::cast_possible_truncation)]
                return Err(SolverError::NonFiniteBody(BodyHandle(index as u32)));
            }
        }
        Ok(())
    }

    fn add_static_segment(&mut self, wall: &Wall) -> Result<(), SolverError> {
        if !wall.start.is_finite() || !wall.end.is_finite() {
            return Err(SolverError::DegenerateGeometry(format!(
                "wall {wall:?} has non-finite coordinates"
            )));
        }
        let length = wall.length();
        if length < MIN_SEGMENT_LENGTH {
            return Err(SolverError::DegenerateGeometry(format!(
                "wall {wall:?} has zero length"
            )));
        }

        let mid = wall.start.midpoint(wall.end);
        let collider = ColliderBuilder::cuboid(length / 2.0, self.settings.wall_radius)
            .translation(Vector::new(mid.x, mid.y))
            .rotation(wall.angle())
            .friction(self.settings.wall_friction)
            .restitution(self.settings.wall_elasticity)
            .build();

        self.collider_set.insert(collider);
        Ok(())
    }

    fn add_rotating_segment(&mut self, platform: &Platform) -> Result<PlatformHandle, SolverError> {
        if !platform.center.is_finite()
            || !platform.length.is_finite()
            || platform.length <= 0.0
            || !platform.current_angle.is_finite()
        {
            return Err(SolverError::DegenerateGeometry(format!(
                "platform {platform:?} cannot be built"
            )));
        }

        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(Vector::new(platform.center.x, platform.center.y))
            .rotation(platform.current_angle)
            .build();
        let body_handle = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::cuboid(platform.length, self.settings.platform_radius)
            .friction(self.settings.platform_friction)
            .restitution(self.settings.platform_elasticity)
            .build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        #[allow(clippy::cast_possible_truncation)]
        let handle = PlatformHandle(self.platforms.len() as u32);
        self.platforms.push(body_handle);
        Ok(handle)
    }

    fn set_platform_angle(&mut self, handle: PlatformHandle, angle: f32) {
        let Some(body_handle) = self.platforms.get(handle.0 as usize).copied() else {
            return;
        };
        if let Some(body) = self.rigid_body_set.get_mut(body_handle) {
            body.set_next_kinematic_rotation(Rotation::from_angle(angle));
        }
    }

    fn spawn_body(&mut self, position: Point2D, radius: f32) -> BodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(position.x, position.y))
            .ccd_enabled(true)
            .build();
        let body_handle = self.rigid_body_set.insert(rigid_body);

        let collider = ColliderBuilder::ball(radius)
            .restitution(self.settings.marble_elasticity)
            .friction(self.settings.marble_friction)
            .density(1.0)
            .build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);

        #[allow(clippy::cast_possible_truncation)]
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Some(body_handle));
        handle
    }

    fn get_position(&self, handle: BodyHandle) -> Option<Point2D> {
        let body = self.rigid_body_set.get(self.rigid_body_handle(handle)?)?;
        let pos = body.translation();
        Some(Point2D::new(pos.x, pos.y))
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        let Some(slot) = self.bodies.get_mut(handle.0 as usize) else {
            return;
        };
        if let Some(body_handle) = slot.take() {
            self.remove_rigid_body(body_handle);
        }
    }

    fn clear(&mut self) {
        *self = Self::with_settings(self.settings);
    }
}

/// Hashes a f32 value by converting to bits.
fn hash_f32(value: f32, hasher: &mut impl Hasher) {
    value.to_bits().hash(hasher);
}
