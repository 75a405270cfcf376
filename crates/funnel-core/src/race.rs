//! Race state machine: Idle -> Running -> Finished -> (reset) -> Idle.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::{SessionError, SolverError};
use crate::finish::FinishDetector;
use crate::geometry::Platform;
use crate::level::LevelDefinition;
use crate::marble::{Marble, MarbleId, spawn_grid};
use crate::physics::{PhysicsBackend, PlatformHandle};

/// Why a race stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RaceOutcome {
    /// Every marble crossed the finish boundary.
    Completed,
    /// The tick budget ran out with marbles still in play.
    TimeLimit,
    /// The physics backend failed during a tick.
    Aborted,
}

/// Current race phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RaceState {
    /// World built, marbles placed, physics paused.
    #[default]
    Idle,
    Running,
    Finished { outcome: RaceOutcome },
}

/// Result of one [`RaceController::step`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub newly_finished: Vec<MarbleId>,
    pub state: RaceState,
}

/// Standings at any point of the race.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RaceResults {
    /// Finished marbles, first place first.
    pub ranked: Vec<MarbleId>,
    /// Marbles still in play, by id.
    pub unranked: Vec<MarbleId>,
    /// `None` until the race is finished.
    pub outcome: Option<RaceOutcome>,
}

/// Drives one race over a [`PhysicsBackend`].
pub struct RaceController<B: PhysicsBackend> {
    config: SimulationConfig,
    backend: B,
    level: LevelDefinition,
    platforms: Vec<(Platform, PlatformHandle)>,
    marbles: Vec<Marble>,
    finish_order: Vec<MarbleId>,
    detector: FinishDetector,
    tick: u64,
    state: RaceState,
}

impl<B: PhysicsBackend> RaceController<B> {
    /// Validates the inputs and builds the world in the Idle state.
    pub fn new(
        config: SimulationConfig,
        backend: B,
        level: LevelDefinition,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        level.validate()?;

        let mut controller = Self {
            detector: FinishDetector::new(config.boundary()),
            config,
            backend,
            level,
            platforms: Vec::new(),
            marbles: Vec::new(),
            finish_order: Vec::new(),
            tick: 0,
            state: RaceState::Idle,
        };
        controller.rebuild()?;
        Ok(controller)
    }

    /// Replaces the level, resetting first when a race is in progress.
    ///
    /// An invalid level is rejected and the current one stays loaded.
    pub fn load_level(&mut self, level: LevelDefinition) -> Result<(), SessionError> {
        level.validate()?;

        if self.state != RaceState::Idle {
            tracing::info!("[race] level change forces a reset");
        }

        let previous = std::mem::replace(&mut self.level, level);
        if let Err(err) = self.rebuild() {
            tracing::warn!("[race] level '{}' could not be built: {}", self.level.name, err);
            self.level = previous;
            self.rebuild()?;
            return Err(err.into());
        }

        tracing::info!(
            "[race] loaded level '{}' ({} walls, {} platforms)",
            self.level.name,
            self.level.walls.len(),
            self.level.platforms.len()
        );
        Ok(())
    }

    /// Starts the race. Returns false unless the race was Idle.
    pub fn start(&mut self) -> bool {
        if self.state != RaceState::Idle {
            return false;
        }
        self.state = RaceState::Running;
        tracing::info!(
            "[race] started with {} marbles on '{}'",
            self.marbles.len(),
            self.level.name
        );
        true
    }

    /// Advances the race by one tick. Does nothing unless Running.
    ///
    /// A backend failure ends the race with [`RaceOutcome::Aborted`].
    pub fn step(&mut self) -> Result<TickReport, SolverError> {
        if self.state != RaceState::Running {
            return Ok(self.report(Vec::new()));
        }

        let dt = self.config.dt();
        for (platform, handle) in &mut self.platforms {
            platform.advance(dt);
            self.backend.set_platform_angle(*handle, platform.current_angle);
        }

        if let Err(err) = self.backend.step(dt) {
            tracing::warn!("[race] aborted at tick {}: {}", self.tick, err);
            self.state = RaceState::Finished {
                outcome: RaceOutcome::Aborted,
            };
            return Err(err);
        }
        self.tick += 1;

        let newly_finished =
            self.detector
                .detect(&mut self.backend, &mut self.marbles, &mut self.finish_order);

        if self.finish_order.len() == self.marbles.len() {
            self.finish(RaceOutcome::Completed);
        } else if self.tick >= self.config.max_ticks {
            self.finish(RaceOutcome::TimeLimit);
        }

        Ok(self.report(newly_finished))
    }

    /// Returns to Idle with a fresh world. Does nothing while Idle.
    pub fn reset(&mut self) -> Result<(), SolverError> {
        if self.state == RaceState::Idle {
            return Ok(());
        }
        self.rebuild()?;
        tracing::info!("[race] reset");
        Ok(())
    }

    pub fn state(&self) -> RaceState {
        self.state
    }

    pub fn outcome(&self) -> Option<RaceOutcome> {
        match self.state {
            RaceState::Finished { outcome } => Some(outcome),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, RaceState::Finished { .. })
    }

    /// Number of completed ticks since the last reset.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Duration of one tick in simulated seconds.
    pub fn dt(&self) -> f32 {
        self.config.dt()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn level(&self) -> &LevelDefinition {
        &self.level
    }

    /// Platforms with their runtime angles.
    pub fn platforms(&self) -> &[(Platform, PlatformHandle)] {
        &self.platforms
    }

    /// Marbles ordered by id.
    pub fn marbles(&self) -> &[Marble] {
        &self.marbles
    }

    pub fn finish_order(&self) -> &[MarbleId] {
        &self.finish_order
    }

    pub fn finished_count(&self) -> usize {
        self.finish_order.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn results(&self) -> RaceResults {
        RaceResults {
            ranked: self.finish_order.clone(),
            unranked: self
                .marbles
                .iter()
                .filter(|m| m.is_active())
                .map(|m| m.id)
                .collect(),
            outcome: self.outcome(),
        }
    }

    /// Clears the backend and rebuilds level geometry and marbles.
    fn rebuild(&mut self) -> Result<(), SolverError> {
        self.backend.configure(&self.config);
        self.backend.clear();
        self.platforms.clear();
        self.marbles.clear();
        self.finish_order.clear();
        self.detector.reset();
        self.tick = 0;
        self.state = RaceState::Idle;

        for wall in &self.level.walls {
            self.backend.add_static_segment(wall)?;
        }
        for platform in &self.level.platforms {
            let mut platform = *platform;
            platform.current_angle = 0.0;
            let handle = self.backend.add_rotating_segment(&platform)?;
            self.platforms.push((platform, handle));
        }
        self.marbles = spawn_grid(&mut self.backend, &self.config);

        tracing::debug!(
            "[race] world built: {} walls, {} platforms, {} marbles",
            self.level.walls.len(),
            self.platforms.len(),
            self.marbles.len()
        );
        Ok(())
    }

    fn finish(&mut self, outcome: RaceOutcome) {
        self.state = RaceState::Finished { outcome };
        tracing::info!(
            "[race] finished at tick {} ({:?}): {}/{} marbles ranked",
            self.tick,
            outcome,
            self.finish_order.len(),
            self.marbles.len()
        );
        if let Some(winner) = self
            .finish_order
            .first()
            .and_then(|id| self.marbles.get(*id as usize))
        {
            tracing::info!("[race] winner: {}", winner.label());
        }
    }

    fn report(&self, newly_finished: Vec<MarbleId>) -> TickReport {
        TickReport {
            tick: self.tick,
            newly_finished,
            state: self.state,
        }
    }
}
