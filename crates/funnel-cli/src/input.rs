//! Line-oriented command parser for interactive mode.

use std::path::PathBuf;

use funnel_core::{EditorCommand, Point2D, SessionCommand};

/// One parsed stdin line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Session commands applied in order.
    Commands(Vec<SessionCommand>),
    /// Run this many frames.
    Tick(u32),
    /// Run frames until the race is no longer running.
    Run,
    Save(PathBuf),
    Load(PathBuf),
    Status,
    Results,
    Quit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command `{0}` (try: start, reset, tick, run, edit, press, release, click, rclick, save, load, status, quit)")]
    Unknown(String),
    #[error("`{command}` expects {expected}")]
    Arguments {
        command: String,
        expected: &'static str,
    },
    #[error("`{0}` is not a number")]
    Number(String),
}

/// Parses one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Input>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();
    let command = command.to_ascii_lowercase();

    let session = |c: SessionCommand| Input::Commands(vec![c]);
    let editor = |c: EditorCommand| session(SessionCommand::Editor(c));

    let input = match command.as_str() {
        "start" => session(SessionCommand::Start),
        "reset" => session(SessionCommand::Reset),
        "edit" => session(SessionCommand::ToggleEditor),
        "tick" => match args.as_slice() {
            [] => Input::Tick(1),
            [n] => Input::Tick(n.parse().map_err(|_| ParseError::Number((*n).to_string()))?),
            _ => return Err(arguments(&command, "an optional frame count")),
        },
        "run" => Input::Run,
        "press" => editor(EditorCommand::PointerPressed(point(&command, &args)?)),
        "move" => editor(EditorCommand::PointerMoved(point(&command, &args)?)),
        "release" => editor(EditorCommand::PointerReleased(point(&command, &args)?)),
        "click" => {
            let p = point(&command, &args)?;
            Input::Commands(vec![
                SessionCommand::Editor(EditorCommand::PointerPressed(p)),
                SessionCommand::Editor(EditorCommand::PointerReleased(p)),
            ])
        }
        "rclick" => editor(EditorCommand::SecondaryClick(point(&command, &args)?)),
        "next" => editor(EditorCommand::NextTemplate),
        "prev" => editor(EditorCommand::PreviousTemplate),
        "undo" => editor(EditorCommand::Undo),
        "clear" => editor(EditorCommand::Clear),
        "default" => editor(EditorCommand::ResetToDefault),
        "grid" => editor(EditorCommand::ToggleGrid),
        "save" => Input::Save(path(&command, &args)?),
        "load" => Input::Load(path(&command, &args)?),
        "status" => Input::Status,
        "results" => Input::Results,
        "quit" | "exit" => Input::Quit,
        _ => return Err(ParseError::Unknown(command)),
    };
    Ok(Some(input))
}

fn arguments(command: &str, expected: &'static str) -> ParseError {
    ParseError::Arguments {
        command: command.to_string(),
        expected,
    }
}

fn number(s: &str) -> Result<f32, ParseError> {
    match s.parse::<f32>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::Number(s.to_string())),
    }
}

fn point(command: &str, args: &[&str]) -> Result<Point2D, ParseError> {
    match args {
        [x, y] => Ok(Point2D::new(number(x)?, number(y)?)),
        _ => Err(arguments(command, "two coordinates X Y")),
    }
}

fn path(command: &str, args: &[&str]) -> Result<PathBuf, ParseError> {
    match args {
        [p] => Ok(PathBuf::from(p)),
        _ => Err(arguments(command, "a file path")),
    }
}
