//! Frame loop state combining the race and the level editor.
//!
//! The two are mutually exclusive: while the editor is open no physics runs,
//! and opening it during a race sends the race back to Idle.

use std::path::Path;

use crate::config::SimulationConfig;
use crate::editor::{EditorCommand, LevelEditor};
use crate::error::{LevelIoError, SessionError, SolverError};
use crate::level::LevelDefinition;
use crate::physics::PhysicsBackend;
use crate::race::{RaceController, TickReport};

/// Which state machine receives input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Race,
    Editor,
}

/// Session-level input.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Start,
    Reset,
    ToggleEditor,
    /// Ignored outside editor mode.
    Editor(EditorCommand),
    LoadLevel(LevelDefinition),
}

/// One race and one editor sharing a level, with one of them active.
pub struct Session<B: PhysicsBackend> {
    race: RaceController<B>,
    editor: LevelEditor,
    mode: SessionMode,
}

impl<B: PhysicsBackend> Session<B> {
    pub fn new(
        config: SimulationConfig,
        backend: B,
        level: LevelDefinition,
    ) -> Result<Self, SessionError> {
        let editor = LevelEditor::new(level.clone());
        let race = RaceController::new(config, backend, level)?;
        Ok(Self {
            race,
            editor,
            mode: SessionMode::Race,
        })
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn race(&self) -> &RaceController<B> {
        &self.race
    }

    pub fn editor(&self) -> &LevelEditor {
        &self.editor
    }

    /// Level currently being raced or authored.
    pub fn level(&self) -> &LevelDefinition {
        match self.mode {
            SessionMode::Race => self.race.level(),
            SessionMode::Editor => self.editor.level(),
        }
    }

    pub fn dispatch(&mut self, command: SessionCommand) -> Result<(), SessionError> {
        match command {
            SessionCommand::Start => {
                if self.mode == SessionMode::Editor {
                    tracing::debug!("[session] start ignored while editing");
                } else {
                    self.race.start();
                }
            }
            SessionCommand::Reset => self.race.reset()?,
            SessionCommand::ToggleEditor => self.toggle_editor()?,
            SessionCommand::Editor(command) => {
                if self.mode == SessionMode::Editor {
                    self.editor.apply(command);
                } else {
                    tracing::debug!("[session] editor input {:?} ignored while racing", command);
                }
            }
            SessionCommand::LoadLevel(level) => {
                self.race.load_level(level.clone())?;
                self.editor.set_level(level);
            }
        }
        Ok(())
    }

    /// Runs one frame: a race tick in race mode, nothing while editing.
    pub fn frame(&mut self) -> Result<Option<TickReport>, SolverError> {
        match self.mode {
            SessionMode::Race => self.race.step().map(Some),
            SessionMode::Editor => Ok(None),
        }
    }

    /// Loads a level file. On failure the current level stays.
    pub fn load_level_file(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let level = LevelDefinition::load_file(path)?;
        self.dispatch(SessionCommand::LoadLevel(level))
    }

    pub fn save_level_file(&self, path: impl AsRef<Path>) -> Result<(), LevelIoError> {
        self.level().save_file(path)
    }

    fn toggle_editor(&mut self) -> Result<(), SessionError> {
        match self.mode {
            SessionMode::Race => {
                self.race.reset()?;
                if self.editor.level() != self.race.level() {
                    self.editor.set_level(self.race.level().clone());
                }
                self.mode = SessionMode::Editor;
                tracing::info!("[session] editor opened");
            }
            SessionMode::Editor => {
                self.race.load_level(self.editor.level().clone())?;
                self.mode = SessionMode::Race;
                tracing::info!("[session] editor closed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;
    use crate::race::RaceState;
    use crate::test_utils::ScriptedBackend;

    fn session() -> Session<ScriptedBackend> {
        let config = SimulationConfig {
            marble_count: 10,
            ..Default::default()
        };
        Session::new(config, ScriptedBackend::falling(1.0), LevelDefinition::default_funnel())
            .expect("Failed to create session")
    }

    #[test]
    fn test_toggle_editor_while_running_resets() {
        let mut session = session();
        session.dispatch(SessionCommand::Start).unwrap();
        session.frame().unwrap();
        session.frame().unwrap();
        assert_eq!(session.race().tick(), 2);

        session.dispatch(SessionCommand::ToggleEditor).unwrap();

        assert_eq!(session.mode(), SessionMode::Editor);
        assert_eq!(session.race().state(), RaceState::Idle);
        assert_eq!(session.race().tick(), 0);

        let steps = session.race().backend().steps;
        for _ in 0..10 {
            assert_eq!(session.frame().unwrap(), None);
        }
        assert_eq!(session.race().backend().steps, steps);

        // Closing the editor does not start the race
        session.dispatch(SessionCommand::ToggleEditor).unwrap();
        session.frame().unwrap();
        assert_eq!(session.race().backend().steps, steps);
        assert_eq!(session.race().state(), RaceState::Idle);
    }

    #[test]
    fn test_edited_level_reaches_race() {
        let mut session = session();
        let walls = session.level().walls.len();

        session.dispatch(SessionCommand::ToggleEditor).unwrap();
        for command in [
            EditorCommand::PointerPressed(Point2D::new(100.0, 600.0)),
            EditorCommand::PointerReleased(Point2D::new(300.0, 650.0)),
        ] {
            session.dispatch(SessionCommand::Editor(command)).unwrap();
        }
        session.dispatch(SessionCommand::ToggleEditor).unwrap();

        assert_eq!(session.mode(), SessionMode::Race);
        assert_eq!(session.race().level().walls.len(), walls + 1);
        assert_eq!(session.race().backend().walls.len(), walls + 1);
    }

    #[test]
    fn test_editor_input_ignored_while_racing() {
        let mut session = session();
        let before = session.level().clone();

        session
            .dispatch(SessionCommand::Editor(EditorCommand::Clear))
            .unwrap();

        assert_eq!(session.level(), &before);
        assert_eq!(session.editor().level(), &before);
    }

    #[test]
    fn test_start_ignored_while_editing() {
        let mut session = session();
        session.dispatch(SessionCommand::ToggleEditor).unwrap();

        session.dispatch(SessionCommand::Start).unwrap();

        assert_eq!(session.race().state(), RaceState::Idle);
    }

    #[test]
    fn test_level_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("funnel-session-{}", std::process::id()));
        let path = dir.join("levels").join("custom.json");
        let mut session = session();
        session
            .dispatch(SessionCommand::LoadLevel(LevelDefinition::empty("custom")))
            .unwrap();

        session.save_level_file(&path).unwrap();
        session
            .dispatch(SessionCommand::LoadLevel(LevelDefinition::default_funnel()))
            .unwrap();
        session.load_level_file(&path).unwrap();

        assert_eq!(session.level().name, "custom");
        assert!(session.level().is_empty());
        assert_eq!(session.editor().level().name, "custom");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_load_keeps_level() {
        let mut session = session();
        let before = session.level().clone();

        let result = session.load_level_file("/nonexistent/funnel/level.json");

        assert!(matches!(result, Err(SessionError::LevelIo(_))));
        assert_eq!(session.level(), &before);
    }
}
