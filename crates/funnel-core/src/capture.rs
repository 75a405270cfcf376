//! Headless race capture with milestone snapshots.

use serde::Serialize;

use crate::error::SolverError;
use crate::geometry::Point2D;
use crate::marble::MarbleId;
use crate::physics::PhysicsBackend;
use crate::race::{RaceController, RaceResults};

/// Snapshots taken at fixed ticks.
pub const TICK_MILESTONES: [(&str, u64); 5] = [
    ("start", 0),
    ("falling", 30),
    ("funnel_entry", 90),
    ("bouncing", 180),
    ("congestion", 300),
];

/// Position of one marble still in play.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarbleSnapshot {
    pub id: MarbleId,
    pub label: String,
    pub position: Point2D,
}

/// Named snapshot of the race.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Milestone {
    pub name: &'static str,
    pub tick: u64,
    pub finished: usize,
    pub positions: Vec<MarbleSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    pub level: String,
    pub marble_count: usize,
    pub ticks: u64,
    pub milestones: Vec<Milestone>,
    pub results: RaceResults,
}

impl CaptureReport {
    pub fn milestone(&self, name: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.name == name)
    }
}

/// Runs a race from Idle to Finished, recording milestones.
pub struct CaptureRun<B: PhysicsBackend> {
    race: RaceController<B>,
    milestones: Vec<Milestone>,
}

impl<B: PhysicsBackend> CaptureRun<B> {
    /// The controller is reset first if a race is already in progress.
    pub fn new(mut race: RaceController<B>) -> Result<Self, SolverError> {
        race.reset()?;
        Ok(Self {
            race,
            milestones: Vec::new(),
        })
    }

    /// Ticks the race until it finishes. Solver failures are returned as-is.
    pub fn run(mut self) -> Result<CaptureReport, SolverError> {
        let total = self.race.marbles().len();
        let midway = total.div_ceil(2);
        let nearly_done = (total * 9).div_ceil(10);

        self.race.start();
        self.record_tick_milestone();

        while !self.race.is_finished() {
            self.race.step()?;
            self.record_tick_milestone();

            let finished = self.race.finished_count();
            if total > 0 && finished >= midway {
                self.record_once("midway");
            }
            if total > 0 && finished >= nearly_done {
                self.record_once("nearly_done");
            }
        }
        self.record_once("final");

        tracing::info!(
            "[capture] race on '{}' finished after {} ticks, {} milestones",
            self.race.level().name,
            self.race.tick(),
            self.milestones.len()
        );

        Ok(CaptureReport {
            level: self.race.level().name.clone(),
            marble_count: total,
            ticks: self.race.tick(),
            milestones: self.milestones,
            results: self.race.results(),
        })
    }

    fn record_tick_milestone(&mut self) {
        let tick = self.race.tick();
        if let Some(&(name, _)) = TICK_MILESTONES.iter().find(|&&(_, t)| t == tick) {
            self.record_once(name);
        }
    }

    fn record_once(&mut self, name: &'static str) {
        if self.milestones.iter().any(|m| m.name == name) {
            return;
        }
        let positions = self
            .race
            .marbles()
            .iter()
            .filter(|m| m.is_active())
            .map(|m| MarbleSnapshot {
                id: m.id,
                label: m.label(),
                position: m.position,
            })
            .collect();
        tracing::debug!("[capture] milestone '{}' at tick {}", name, self.race.tick());
        self.milestones.push(Milestone {
            name,
            tick: self.race.tick(),
            finished: self.race.finished_count(),
            positions,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::level::LevelDefinition;
    use crate::race::RaceOutcome;
    use crate::test_utils::ScriptedBackend;

    fn capture(count: u32, fall: f32) -> CaptureReport {
        let config = SimulationConfig {
            marble_count: count,
            ..Default::default()
        };
        let race = RaceController::new(
            config,
            ScriptedBackend::falling(fall),
            LevelDefinition::empty("empty"),
        )
        .unwrap();
        CaptureRun::new(race).unwrap().run().unwrap()
    }

    #[test]
    fn test_milestones_in_order() {
        // 40 rows of 10: the lowest row crosses at tick 106, then one row every 7 ticks
        let report = capture(400, 2.0);

        let names: Vec<&str> = report.milestones.iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            [
                "start",
                "falling",
                "funnel_entry",
                "bouncing",
                "midway",
                "congestion",
                "nearly_done",
                "final"
            ]
        );
        assert!(report.milestones.windows(2).all(|w| w[0].tick <= w[1].tick));

        let start = report.milestone("start").unwrap();
        assert_eq!(start.tick, 0);
        assert_eq!(start.positions.len(), 400);

        let midway = report.milestone("midway").unwrap();
        assert_eq!(midway.tick, 239);
        assert_eq!(midway.finished, 200);

        let last = report.milestone("final").unwrap();
        assert_eq!(last.finished, 400);
        assert!(last.positions.is_empty());
        assert_eq!(report.results.outcome, Some(RaceOutcome::Completed));
        assert_eq!(report.results.ranked.len(), 400);
    }

    #[test]
    fn test_short_race_skips_late_tick_milestones() {
        let report = capture(10, 500.0);

        assert!(report.milestone("falling").is_none());
        assert_eq!(report.milestone("final").unwrap().tick, 2);
        assert_eq!(report.ticks, 2);
    }

    #[test]
    fn test_report_serializes() {
        let report = capture(2, 500.0);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["level"], "empty");
        assert_eq!(json["results"]["outcome"], "completed");
        assert_eq!(json["milestones"][0]["positions"][0]["position"][1], 50.0);
    }
}
