//! Macro-Replay: record mouse and keyboard input and replay it later.

mod abort_watcher;
mod app;
mod cli;
mod config;
mod enigo_injector;
mod error;
mod rdev_listener;
mod stdin_prompt;
mod terminal_status;
#[cfg(test)]
mod tests;
mod timeline_store;

pub(crate) use {
    abort_watcher::AbortWatcher,
    app::App,
    enigo_injector::EnigoInjector,
    error::{AppError, Result as AppResult},
    rdev_listener::RdevListener,
    stdin_prompt::StdinPrompt,
    terminal_status::TerminalStatus,
};

use crate::{cli::Cli, config::Config};

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "macro_replay=info,macro_replay_core=info";

/// Application entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Dropping the guard flushes the file log.
    let _log_guard = init_tracing();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(App::new(config).execute(cli.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Console logging plus a daily rolling JSON file in the data directory.
///
/// The file layer is skipped if the log directory cannot be created.
fn init_tracing() -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let log_dir = Config::project_dirs()
        .ok()
        .map(|dirs| dirs.data_dir().join("logs"))
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "macro-replay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}
