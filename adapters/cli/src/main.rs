#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Hopscotch levels in the terminal.

mod config;
mod input;
mod session;

use std::{
    io::{self, Write},
    ops::ControlFlow,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hopscotch_rendering::{render_frame, Presentation, RenderingBackend, TextBackend};
use hopscotch_system_turn::Game;
use tracing_subscriber::EnvFilter;

use crate::{config::FileConfig, session::Session};

/// Turn-based grid puzzle played one hop at a time.
#[derive(Parser, Debug)]
#[command(name = "hopscotch", version, about, long_about = None)]
struct Cli {
    /// Path to a `hopscotch.toml` configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Play a level interactively, one command per line on stdin.
    Play(PlayArgs),
    /// Apply a scripted sequence of moves and print the final board.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Plain-text level file.
    level: PathBuf,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Plain-text level file.
    level: PathBuf,

    /// Moves to apply, e.g. `ddsw.` or `right,right,wait`.
    #[arg(long)]
    moves: String,
}

/// Entry point for the Hopscotch command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = FileConfig::load(cli.config.as_deref())?;
    init_tracing(&config.log_filter);

    match cli.command {
        Mode::Play(args) => play(&args.level, &config),
        Mode::Replay(args) => replay(&args.level, &args.moves, &config),
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_game(level: &Path, config: &FileConfig) -> Result<Game> {
    let layout = hopscotch_level::load(level)
        .with_context(|| format!("failed to load level {}", level.display()))?;
    tracing::info!(level = %level.display(), "level loaded");
    Ok(Game::new(layout, config.game()))
}

fn play(level: &Path, config: &FileConfig) -> Result<()> {
    let mut session = Session::new(load_game(level, config)?);
    let title = format!(
        "{} (w/a/s/d to hop, . to wait, r to restart, q to quit)",
        level.display()
    );
    let presentation = Presentation::new(title, session.scene());

    let stdin = io::stdin();
    let backend = TextBackend::new(stdin.lock(), io::stdout());
    backend.run(presentation, |frame, scene| {
        let flow = match input::parse_token(&frame.line) {
            Some(input) => session.handle(input),
            None => {
                tracing::warn!(line = %frame.line, "unrecognised command");
                ControlFlow::Continue(())
            }
        };
        *scene = session.scene();
        flow
    })?;

    if let Some(fault) = session.take_fault() {
        return Err(fault).context("simulation fault");
    }
    println!("{}", session.summary());
    Ok(())
}

fn replay(level: &Path, moves: &str, config: &FileConfig) -> Result<()> {
    let mut session = Session::new(load_game(level, config)?);

    for input in input::parse_script(moves)? {
        if session.handle(input).is_break() {
            break;
        }
    }

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(render_frame(&session.scene()).as_bytes())
        .context("failed to print final board")?;
    writeln!(stdout, "{}", session.summary()).context("failed to print summary")?;

    if let Some(fault) = session.take_fault() {
        return Err(fault).context("simulation fault");
    }
    Ok(())
}
