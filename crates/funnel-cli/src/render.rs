//! Plain-text status rendering.

use funnel_core::{
    CaptureReport, EditorMode, PhysicsBackend, RaceController, RaceState, Session, SessionMode,
};

/// Number of standings rows printed before eliding.
const STANDINGS_ROWS: usize = 10;

/// One-line summary printed after every command.
pub fn status_line<B: PhysicsBackend>(session: &Session<B>) -> String {
    match session.mode() {
        SessionMode::Race => {
            let race = session.race();
            let state = match race.state() {
                RaceState::Idle => "idle".to_string(),
                RaceState::Running => "running".to_string(),
                RaceState::Finished { outcome } => format!("finished ({outcome:?})"),
            };
            format!(
                "[race] {} | level '{}' | tick {} | finished {}/{}",
                state,
                race.level().name,
                race.tick(),
                race.finished_count(),
                race.marbles().len()
            )
        }
        SessionMode::Editor => {
            let editor = session.editor();
            let level = editor.level();
            let template = editor.template();
            let drawing = match editor.mode() {
                EditorMode::Idle => String::new(),
                EditorMode::DrawingWall { anchor, .. } => {
                    format!(" | drawing from ({:.0}, {:.0})", anchor.x, anchor.y)
                }
            };
            format!(
                "[editor] level '{}' | {} walls, {} platforms | template {} (length {}, {} rad/s) | grid {}{}",
                level.name,
                level.walls.len(),
                level.platforms.len(),
                editor.template_index() + 1,
                template.length,
                template.angular_velocity,
                if editor.grid().enabled { "on" } else { "off" },
                drawing
            )
        }
    }
}

/// Multi-line standings: leaders first, then marbles still in play.
pub fn standings<B: PhysicsBackend>(race: &RaceController<B>) -> String {
    let results = race.results();
    let mut out = format!(
        "Finished: {} / {}\n",
        results.ranked.len(),
        race.marbles().len()
    );

    for (rank, id) in results.ranked.iter().enumerate().take(STANDINGS_ROWS) {
        let label = race
            .marbles()
            .get(*id as usize)
            .map_or_else(|| format!("#{id}"), |m| m.label());
        out.push_str(&format!("{:>3}. {}\n", rank + 1, label));
    }
    if results.ranked.len() > STANDINGS_ROWS {
        out.push_str(&format!(
            "     ... {} more\n",
            results.ranked.len() - STANDINGS_ROWS
        ));
    }
    if !results.unranked.is_empty() {
        out.push_str(&format!("Still in play: {}\n", results.unranked.len()));
    }
    if let Some(outcome) = results.outcome {
        out.push_str(&format!("Outcome: {outcome:?}\n"));
    }
    out
}

/// Summary printed by `capture` when no output file is given.
pub fn capture_summary(report: &CaptureReport) -> String {
    let mut out = format!(
        "Level '{}': {} marbles, {} ticks\n",
        report.level, report.marble_count, report.ticks
    );

    for milestone in &report.milestones {
        out.push_str(&format!(
            "  {:>5} {:<13} finished {:>4}, in play {:>4}\n",
            milestone.tick,
            milestone.name,
            milestone.finished,
            milestone.positions.len()
        ));
    }
    if let Some(outcome) = report.results.outcome {
        out.push_str(&format!("Outcome: {outcome:?}\n"));
    }
    let podium: Vec<String> = report
        .results
        .ranked
        .iter()
        .take(3)
        .map(ToString::to_string)
        .collect();
    if !podium.is_empty() {
        out.push_str(&format!("Podium: {}\n", podium.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::{
        EditorCommand, LevelDefinition, Point2D, RaceOutcome, RaceResults, RapierWorld,
        SessionCommand, SimulationConfig,
    };

    fn session() -> Session<RapierWorld> {
        let config = SimulationConfig {
            marble_count: 5,
            ..Default::default()
        };
        Session::new(
            config.clone(),
            RapierWorld::from_config(&config),
            LevelDefinition::default_funnel(),
        )
        .expect("Failed to create session")
    }

    #[test]
    fn test_race_status_line() {
        let session = session();
        assert_eq!(
            status_line(&session),
            "[race] idle | level 'default' | tick 0 | finished 0/5"
        );
    }

    #[test]
    fn test_editor_status_line() {
        let mut session = session();
        session.dispatch(SessionCommand::ToggleEditor).unwrap();
        session
            .dispatch(SessionCommand::Editor(EditorCommand::PointerPressed(
                Point2D::new(10.0, 20.0),
            )))
            .unwrap();

        let line = status_line(&session);
        assert!(line.starts_with("[editor] level 'default'"));
        assert!(line.contains("template 1 (length 50, 2 rad/s)"));
        assert!(line.ends_with("drawing from (10, 20)"));
    }

    #[test]
    fn test_standings_before_start() {
        let session = session();
        let text = standings(session.race());
        assert!(text.starts_with("Finished: 0 / 5"));
        assert!(text.contains("Still in play: 5"));
        assert!(!text.contains("Outcome"));
    }

    #[test]
    fn test_capture_summary() {
        let report = CaptureReport {
            level: "default".to_string(),
            marble_count: 4,
            ticks: 250,
            milestones: Vec::new(),
            results: RaceResults {
                ranked: vec![2, 0, 3, 1],
                unranked: Vec::new(),
                outcome: Some(RaceOutcome::Completed),
            },
        };

        let text = capture_summary(&report);

        assert_eq!(
            text,
            "Level 'default': 4 marbles, 250 ticks\nOutcome: Completed\nPodium: 2, 0, 3\n"
        );
    }
}
