//! Command-line interface.

use crate::config::DialogMode;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Record and replay mouse and keyboard macros.
#[derive(Debug, Parser)]
#[command(name = "macro-replay", version, about)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record input until ESC is pressed and save it as a timeline.
    Record(RecordArgs),
    /// Replay a recorded timeline. Press ESC to abort.
    Run(RunArgs),
}

/// Whether pointer moves are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MovesMode {
    /// Record pointer moves.
    #[default]
    On,
    /// Drop every pointer move, keeping clicks where they happened.
    Off,
}

/// Arguments for `record`.
#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Timeline file to write (defaults to the configured path, `macro.json`).
    pub path: Option<PathBuf>,

    /// Record pointer moves.
    #[arg(long, value_enum, default_value_t = MovesMode::On)]
    pub moves: MovesMode,

    /// Keep only the last N moves before each click, key or scroll.
    #[arg(long, value_name = "N")]
    pub keep_moves: Option<usize>,
}

impl RecordArgs {
    /// Compaction to apply, given the configured default.
    pub fn keep_moves(&self, configured: Option<usize>) -> Option<usize> {
        match self.moves {
            MovesMode::Off => Some(0),
            MovesMode::On => self.keep_moves.or(configured),
        }
    }
}

/// Arguments for `run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Timeline file to replay (defaults to the configured path, `macro.json`).
    pub path: Option<PathBuf>,

    /// Speed multiplier, e.g. 2.0 for twice as fast.
    #[arg(short, long, allow_negative_numbers = true)]
    pub speed: Option<f64>,

    /// Show the remaining-time countdown.
    #[arg(short, long, value_enum)]
    pub dialog: Option<DialogMode>,
}
