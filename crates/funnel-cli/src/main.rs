//! # Marble Funnel
//!
//! Marble race through an editable funnel.
//!
//! ## Usage
//!
//! ```bash
//! # Drive a session from stdin, one command per line
//! marble-funnel interactive --level levels/default.json
//!
//! # Run one race headless and write the milestone report
//! marble-funnel capture --config race.json --output report.json
//! ```

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use funnel_core::{
    CaptureRun, LevelDefinition, RaceController, RaceState, RapierWorld, Session, SessionError,
    SessionMode, SimulationConfig, SolverError,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::input::{Input, parse_line};

mod input;
mod render;

#[derive(Parser, Debug)]
#[command(name = "marble-funnel")]
#[command(about = "Marble funnel race and level editor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read commands from stdin and print the status after each one
    Interactive(SourceArgs),
    /// Run one race to completion without a display
    Capture {
        #[command(flatten)]
        source: SourceArgs,

        /// Write the capture report as JSON here instead of printing a summary
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Level file to load (defaults to the built-in funnel)
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// Simulation config JSON
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl SourceArgs {
    fn load(&self) -> anyhow::Result<(SimulationConfig, LevelDefinition)> {
        let config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                SimulationConfig::from_json(&json)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };
        let level = match &self.level {
            Some(path) => LevelDefinition::load_file(path)?,
            None => LevelDefinition::default_funnel(),
        };
        Ok((config, level))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Interactive(source) => run_interactive(&source),
        Command::Capture { source, output } => run_capture(&source, output.as_deref()),
    }
}

fn run_capture(source: &SourceArgs, output: Option<&Path>) -> anyhow::Result<()> {
    let (config, level) = source.load()?;
    let backend = RapierWorld::from_config(&config);
    let race = RaceController::new(config, backend, level).context("failed to build race")?;

    let report = CaptureRun::new(race)?.run().context("race aborted")?;

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&report)?;
            fs::write(path, json)
                .with_context(|| format!("failed to write report {}", path.display()))?;
            tracing::info!("[capture] report written to {}", path.display());
        }
        None => print!("{}", render::capture_summary(&report)),
    }
    Ok(())
}

fn run_interactive(source: &SourceArgs) -> anyhow::Result<()> {
    let (config, level) = source.load()?;
    let backend = RapierWorld::from_config(&config);
    let mut session = Session::new(config, backend, level).context("failed to build session")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", render::status_line(&session))?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let input = match parse_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(err) => {
                writeln!(out, "error: {err}")?;
                continue;
            }
        };

        if input == Input::Quit {
            break;
        }
        if let Err(err) = execute(&mut session, input, &mut out) {
            if is_solver_failure(&err) {
                writeln!(out, "{}", render::status_line(&session))?;
                return Err(err.context("physics failed, session aborted"));
            }
            writeln!(out, "error: {err:#}")?;
        }
        writeln!(out, "{}", render::status_line(&session))?;
    }
    Ok(())
}

fn execute(
    session: &mut Session<RapierWorld>,
    input: Input,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match input {
        Input::Commands(commands) => {
            for command in commands {
                session.dispatch(command)?;
            }
        }
        Input::Tick(frames) => {
            for _ in 0..frames {
                session.frame()?;
            }
        }
        Input::Run => {
            while session.mode() == SessionMode::Race
                && session.race().state() == RaceState::Running
            {
                session.frame()?;
            }
        }
        Input::Save(path) => {
            session.save_level_file(&path)?;
            writeln!(out, "saved {}", path.display())?;
        }
        Input::Load(path) => {
            session.load_level_file(&path)?;
            writeln!(out, "loaded {}", path.display())?;
        }
        Input::Status => {
            write!(out, "{}", render::standings(session.race()))?;
        }
        Input::Results => {
            let results = session.race().results();
            writeln!(out, "{}", serde_json::to_string_pretty(&results)?)?;
        }
        Input::Quit => {}
    }
    Ok(())
}

/// Solver failures end the session; everything else is reported and skipped.
fn is_solver_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<SolverError>().is_some()
        || matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::Solver(_))
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::{ConfigError, LevelIoError};

    #[test]
    fn test_solver_errors_are_fatal() {
        let err = anyhow::Error::from(SolverError::InvalidTimestep(0.0));
        assert!(is_solver_failure(&err));

        let err = anyhow::Error::from(SessionError::Solver(SolverError::DegenerateGeometry(
            "wall".to_string(),
        )));
        assert!(is_solver_failure(&err));

        // Context wrapping keeps the original error reachable
        let err = anyhow::Error::from(SolverError::InvalidTimestep(0.0)).context("tick 12");
        assert!(is_solver_failure(&err));
    }

    #[test]
    fn test_other_errors_are_recoverable() {
        let err = anyhow::Error::from(SessionError::Config(ConfigError::EmptyName));
        assert!(!is_solver_failure(&err));

        let err = anyhow::Error::from(LevelIoError::Io {
            path: PathBuf::from("missing.json"),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        assert!(!is_solver_failure(&err));
    }
}
