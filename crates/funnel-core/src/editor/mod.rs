//! Level editor state machine.
//!
//! Input arrives as discrete [`EditorCommand`]s:
//! - press/release with travel pairs into a wall
//! - press/release without travel places a platform from the selected template
//! - secondary click deletes the nearest element in range
//! - undo removes the most recently added wall (platforms are not tracked)

mod hit;
mod snap;
mod template;

pub use hit::*;
pub use snap::*;
pub use template::*;

use crate::error::EditorInputError;
use crate::geometry::{Point2D, Wall};
use crate::level::LevelDefinition;

/// Distances used to interpret pointer gestures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// Maximum pointer travel for a press/release pair to count as a click.
    pub click_tolerance: f32,
    /// Walls shorter than this after snapping are discarded.
    pub min_wall_length: f32,
    pub wall_hit_distance: f32,
    pub platform_hit_distance: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            click_tolerance: 5.0,
            min_wall_length: 1e-3,
            wall_hit_distance: 10.0,
            platform_hit_distance: 15.0,
        }
    }
}

/// Current gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorMode {
    Idle,
    DrawingWall { anchor: Point2D, cursor: Point2D },
}

/// One input event for the editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorCommand {
    PointerPressed(Point2D),
    PointerMoved(Point2D),
    PointerReleased(Point2D),
    SecondaryClick(Point2D),
    NextTemplate,
    PreviousTemplate,
    Undo,
    Clear,
    ResetToDefault,
    ToggleGrid,
}

/// What a successfully applied command changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOutcome {
    StartedWall,
    MovedCursor,
    AddedWall(Wall),
    AddedPlatform { index: usize },
    Deleted(HitTarget),
    SelectedTemplate(PlatformTemplate),
    UndidWall(Wall),
    Cleared,
    ResetToDefault,
    GridToggled { enabled: bool },
}

/// Authoring state for one level.
#[derive(Debug, Clone)]
pub struct LevelEditor {
    level: LevelDefinition,
    mode: EditorMode,
    templates: TemplateCursor,
    grid: GridSnap,
    config: EditorConfig,
    /// Walls added by drawing, oldest first.
    added_walls: Vec<Wall>,
}

impl Default for LevelEditor {
    fn default() -> Self {
        Self::new(LevelDefinition::default_funnel())
    }
}

impl LevelEditor {
    pub fn new(level: LevelDefinition) -> Self {
        Self::with_config(level, EditorConfig::default())
    }

    pub fn with_config(level: LevelDefinition, config: EditorConfig) -> Self {
        Self {
            level,
            mode: EditorMode::Idle,
            templates: TemplateCursor::default(),
            grid: GridSnap::default(),
            config,
            added_walls: Vec::new(),
        }
    }

    pub fn level(&self) -> &LevelDefinition {
        &self.level
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn template(&self) -> PlatformTemplate {
        self.templates.current()
    }

    pub fn template_index(&self) -> usize {
        self.templates.index()
    }

    pub fn grid(&self) -> GridSnap {
        self.grid
    }

    /// Preview segment while a wall is being drawn.
    pub fn preview(&self) -> Option<Wall> {
        match self.mode {
            EditorMode::DrawingWall { anchor, cursor } => {
                Some(Wall::new(anchor, self.grid.snap(cursor)))
            }
            EditorMode::Idle => None,
        }
    }

    /// Replaces the level being authored, for example after a file load.
    pub fn set_level(&mut self, level: LevelDefinition) {
        self.level = level;
        self.mode = EditorMode::Idle;
        self.added_walls.clear();
    }

    /// Applies a command. Rejected input is a silent no-op.
    ///
    /// Returns `true` when the command changed the editor.
    pub fn apply(&mut self, command: EditorCommand) -> bool {
        match self.try_apply(command) {
            Ok(outcome) => {
                tracing::debug!("[editor] {:?} -> {:?}", command, outcome);
                true
            }
            Err(err) => {
                tracing::debug!("[editor] ignored {:?}: {}", command, err);
                false
            }
        }
    }

    /// Applies a command, reporting why rejected input was ignored.
    pub fn try_apply(&mut self, command: EditorCommand) -> Result<EditOutcome, EditorInputError> {
        match command {
            EditorCommand::PointerPressed(p) => self.press(p),
            EditorCommand::PointerMoved(p) => self.move_cursor(p),
            EditorCommand::PointerReleased(p) => self.release(p),
            EditorCommand::SecondaryClick(p) => self.delete_nearest(p),
            EditorCommand::NextTemplate => {
                self.templates.next();
                Ok(EditOutcome::SelectedTemplate(self.template()))
            }
            EditorCommand::PreviousTemplate => {
                self.templates.previous();
                Ok(EditOutcome::SelectedTemplate(self.template()))
            }
            EditorCommand::Undo => self.undo(),
            EditorCommand::Clear => {
                self.level.walls.clear();
                self.level.platforms.clear();
                self.added_walls.clear();
                self.mode = EditorMode::Idle;
                Ok(EditOutcome::Cleared)
            }
            EditorCommand::ResetToDefault => {
                self.set_level(LevelDefinition::default_funnel());
                Ok(EditOutcome::ResetToDefault)
            }
            EditorCommand::ToggleGrid => {
                self.grid.toggle();
                Ok(EditOutcome::GridToggled {
                    enabled: self.grid.enabled,
                })
            }
        }
    }

    fn press(&mut self, p: Point2D) -> Result<EditOutcome, EditorInputError> {
        if matches!(self.mode, EditorMode::DrawingWall { .. }) {
            return Err(EditorInputError::AlreadyDrawing);
        }
        self.mode = EditorMode::DrawingWall {
            anchor: p,
            cursor: p,
        };
        Ok(EditOutcome::StartedWall)
    }

    fn move_cursor(&mut self, p: Point2D) -> Result<EditOutcome, EditorInputError> {
        let EditorMode::DrawingWall { anchor, .. } = self.mode else {
            return Err(EditorInputError::NotDrawing);
        };
        self.mode = EditorMode::DrawingWall { anchor, cursor: p };
        Ok(EditOutcome::MovedCursor)
    }

    fn release(&mut self, p: Point2D) -> Result<EditOutcome, EditorInputError> {
        let EditorMode::DrawingWall { anchor, .. } = self.mode else {
            return Err(EditorInputError::NotDrawing);
        };
        self.mode = EditorMode::Idle;

        if anchor.distance(p) <= self.config.click_tolerance {
            let platform = self.template().instantiate(self.grid.snap(p));
            self.level.platforms.push(platform);
            return Ok(EditOutcome::AddedPlatform {
                index: self.level.platforms.len() - 1,
            });
        }

        let wall = Wall::new(self.grid.snap(anchor), self.grid.snap(p));
        let length = wall.length();
        if length < self.config.min_wall_length {
            return Err(EditorInputError::DegenerateWall(length));
        }
        self.level.walls.push(wall);
        self.added_walls.push(wall);
        Ok(EditOutcome::AddedWall(wall))
    }

    fn delete_nearest(&mut self, p: Point2D) -> Result<EditOutcome, EditorInputError> {
        let target = pick(
            nearest_wall(&self.level.walls, p, self.config.wall_hit_distance),
            nearest_platform(&self.level.platforms, p, self.config.platform_hit_distance),
        )
        .ok_or(EditorInputError::NothingInRange)?;

        match target {
            HitTarget::Wall { index, .. } => {
                self.level.walls.remove(index);
            }
            HitTarget::Platform { index, .. } => {
                self.level.platforms.remove(index);
            }
        }
        Ok(EditOutcome::Deleted(target))
    }

    fn undo(&mut self) -> Result<EditOutcome, EditorInputError> {
        // Walls deleted since they were drawn are skipped.
        while let Some(wall) = self.added_walls.pop() {
            if let Some(index) = self.level.walls.iter().rposition(|w| *w == wall) {
                self.level.walls.remove(index);
                return Ok(EditOutcome::UndidWall(wall));
            }
        }
        Err(EditorInputError::NothingToUndo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_editor() -> LevelEditor {
        LevelEditor::new(LevelDefinition::empty("scratch"))
    }

    fn draw(editor: &mut LevelEditor, from: Point2D, to: Point2D) -> bool {
        editor.apply(EditorCommand::PointerPressed(from));
        editor.apply(EditorCommand::PointerMoved(to));
        editor.apply(EditorCommand::PointerReleased(to))
    }

    #[test]
    fn test_drag_adds_wall() {
        let mut editor = empty_editor();

        editor.apply(EditorCommand::PointerPressed(Point2D::new(50.0, 200.0)));
        assert!(matches!(editor.mode(), EditorMode::DrawingWall { .. }));

        editor.apply(EditorCommand::PointerMoved(Point2D::new(200.0, 300.0)));
        assert_eq!(
            editor.preview(),
            Some(Wall::new(Point2D::new(50.0, 200.0), Point2D::new(200.0, 300.0)))
        );

        editor.apply(EditorCommand::PointerReleased(Point2D::new(370.0, 500.0)));

        assert_eq!(editor.mode(), EditorMode::Idle);
        assert_eq!(
            editor.level().walls,
            vec![Wall::new(Point2D::new(50.0, 200.0), Point2D::new(370.0, 500.0))]
        );
        assert!(editor.level().platforms.is_empty());
    }

    #[test]
    fn test_click_adds_platform_from_template() {
        let mut editor = empty_editor();
        editor.apply(EditorCommand::NextTemplate);

        editor.apply(EditorCommand::PointerPressed(Point2D::new(280.0, 350.0)));
        editor.apply(EditorCommand::PointerReleased(Point2D::new(282.0, 351.0)));

        assert!(editor.level().walls.is_empty());
        let platform = editor.level().platforms[0];
        assert_eq!(platform.center, Point2D::new(282.0, 351.0));
        assert_eq!(platform.length, PLATFORM_TEMPLATES[1].length);
        assert_eq!(platform.angular_velocity, PLATFORM_TEMPLATES[1].angular_velocity);
    }

    #[test]
    fn test_degenerate_wall_discarded() {
        let mut editor = empty_editor();
        editor.apply(EditorCommand::ToggleGrid);

        // Travels past the click tolerance but both ends snap to (20, 20)
        let added = draw(&mut editor, Point2D::new(14.0, 20.0), Point2D::new(26.0, 20.0));

        assert!(!added);
        assert!(editor.level().walls.is_empty());
        assert!(editor.level().platforms.is_empty());
        assert_eq!(editor.mode(), EditorMode::Idle);
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut editor = empty_editor();
        assert!(!editor.apply(EditorCommand::PointerReleased(Point2D::new(1.0, 1.0))));
        assert!(editor.level().is_empty());
    }

    #[test]
    fn test_template_cycle() {
        let mut editor = empty_editor();
        editor.apply(EditorCommand::PreviousTemplate);
        assert_eq!(editor.template_index(), PLATFORM_TEMPLATES.len() - 1);
        editor.apply(EditorCommand::NextTemplate);
        assert_eq!(editor.template_index(), 0);
    }

    #[test]
    fn test_right_click_deletes_nearest() {
        let mut editor = empty_editor();
        draw(&mut editor, Point2D::new(0.0, 100.0), Point2D::new(200.0, 100.0));
        editor.apply(EditorCommand::PointerPressed(Point2D::new(100.0, 130.0)));
        editor.apply(EditorCommand::PointerReleased(Point2D::new(100.0, 130.0)));
        assert_eq!(editor.level().walls.len(), 1);
        assert_eq!(editor.level().platforms.len(), 1);

        // Closer to the platform at y=130 than to the wall at y=100
        editor.apply(EditorCommand::SecondaryClick(Point2D::new(100.0, 122.0)));
        assert_eq!(editor.level().walls.len(), 1);
        assert!(editor.level().platforms.is_empty());

        editor.apply(EditorCommand::SecondaryClick(Point2D::new(100.0, 104.0)));
        assert!(editor.level().walls.is_empty());
    }

    #[test]
    fn test_right_click_out_of_range_is_noop() {
        let mut editor = LevelEditor::default();
        let before = editor.level().clone();

        let result = editor.try_apply(EditorCommand::SecondaryClick(Point2D::new(790.0, 790.0)));

        assert_eq!(result, Err(EditorInputError::NothingInRange));
        assert_eq!(editor.level(), &before);
    }

    #[test]
    fn test_undo_single_wall() {
        let mut editor = empty_editor();
        draw(&mut editor, Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0));
        assert_eq!(editor.level().walls.len(), 1);

        assert!(editor.apply(EditorCommand::Undo));
        assert!(editor.level().walls.is_empty());

        // Nothing left to undo
        assert_eq!(
            editor.try_apply(EditorCommand::Undo),
            Err(EditorInputError::NothingToUndo)
        );
    }

    #[test]
    fn test_undo_ignores_platforms_and_loaded_walls() {
        let mut editor = LevelEditor::default();
        let loaded_walls = editor.level().walls.len();

        draw(&mut editor, Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0));
        editor.apply(EditorCommand::PointerPressed(Point2D::new(300.0, 300.0)));
        editor.apply(EditorCommand::PointerReleased(Point2D::new(300.0, 300.0)));
        let platforms = editor.level().platforms.len();

        editor.apply(EditorCommand::Undo);
        assert_eq!(editor.level().walls.len(), loaded_walls);
        assert_eq!(editor.level().platforms.len(), platforms);

        // Walls that came with the level are never undone
        assert!(!editor.apply(EditorCommand::Undo));
        assert_eq!(editor.level().walls.len(), loaded_walls);
    }

    #[test]
    fn test_undo_skips_deleted_walls() {
        let mut editor = empty_editor();
        draw(&mut editor, Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0));
        draw(&mut editor, Point2D::new(0.0, 300.0), Point2D::new(100.0, 300.0));

        editor.apply(EditorCommand::SecondaryClick(Point2D::new(50.0, 300.0)));
        editor.apply(EditorCommand::Undo);

        assert!(editor.level().walls.is_empty());
    }

    #[test]
    fn test_clear_and_reset_to_default() {
        let mut editor = LevelEditor::default();

        editor.apply(EditorCommand::Clear);
        assert!(editor.level().is_empty());
        assert_eq!(editor.level().name, "default");

        editor.apply(EditorCommand::ResetToDefault);
        assert_eq!(editor.level(), &LevelDefinition::default_funnel());
    }

    #[test]
    fn test_grid_snaps_platform_position() {
        let mut editor = empty_editor();
        editor.apply(EditorCommand::ToggleGrid);
        assert!(editor.grid().enabled);

        editor.apply(EditorCommand::PointerPressed(Point2D::new(287.0, 353.0)));
        editor.apply(EditorCommand::PointerReleased(Point2D::new(287.0, 353.0)));

        assert_eq!(editor.level().platforms[0].center, Point2D::new(280.0, 360.0));
    }
}
