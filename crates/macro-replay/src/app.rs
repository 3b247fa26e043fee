use crate::{
    AbortWatcher, AppError, AppResult, EnigoInjector, RdevListener, StdinPrompt, TerminalStatus,
    cli::{Command, RecordArgs, RunArgs},
    config::{Config, DialogMode},
    timeline_store,
};

use macro_replay_core::{
    AbortState, CaptureSession, CoreError, OverlayController, PlaybackOutcome, PlaybackScheduler,
    PlaybackStatus,
    capability::{InputListener, StatusSurface},
};

use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

/// Runs one `record` or `run` command against the live input stack.
pub struct App {
    pub(crate) config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Execute `command` to completion.
    pub async fn execute(self, command: Command) -> AppResult<()> {
        match command {
            Command::Record(args) => self.record(args).await,
            Command::Run(args) => self.run(args).await,
        }
    }

    fn resolve_path(&self, path: Option<PathBuf>) -> PathBuf {
        path.unwrap_or_else(|| self.config.recording.default_path.clone())
    }

    /// Record until the abort key (or Ctrl-C) and save the timeline.
    #[instrument(skip(self))]
    pub async fn record(self, args: RecordArgs) -> AppResult<()> {
        let path = self.resolve_path(args.path.clone());

        let check = CaptureSession::confirm_destination(&path, &mut StdinPrompt::new());
        if !check.allows_recording() {
            return Ok(());
        }

        let keep_moves = args.keep_moves(self.config.recording.keep_moves);
        let abort = AbortState::new();
        let ctrl_c = spawn_ctrl_c_watcher(abort.clone());

        let mut listener = RdevListener::new();
        let session = CaptureSession::new(&self.config.recording.abort_key);
        let session_id = session.session_id();
        let result = session.record(&mut listener, &abort, keep_moves).await;
        ctrl_c.abort();

        let outcome = result?;
        if let Some(stats) = outcome.compaction {
            info!(
                session_id = %session_id,
                input_len = stats.input_len,
                output_len = stats.output_len,
                dropped_moves = stats.dropped_moves,
                "Pointer moves compacted"
            );
        }

        timeline_store::save(&path, &outcome.timeline)?;
        info!(
            session_id = %session_id,
            path = ?path,
            "Saved {} events to {}",
            outcome.timeline.len(),
            path.display()
        );

        Ok(())
    }

    /// Replay a timeline with the countdown overlay and ESC abort.
    #[instrument(skip(self))]
    pub async fn run(self, args: RunArgs) -> AppResult<()> {
        let path = self.resolve_path(args.path.clone());
        let timeline = timeline_store::load(&path)?;

        let playback = &self.config.playback;
        let speed = args.speed.unwrap_or(playback.speed);
        if speed <= 0.0 {
            warn!(speed, "Non-positive speed, replaying at the minimum speed instead");
        }
        let dialog = args.dialog.unwrap_or(playback.dialog);

        let abort = AbortState::new();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Playback never starts without the abort listener.
        let mut listener = RdevListener::new();
        let (subscription, watcher) =
            AbortWatcher::new(abort.clone(), &self.config.recording.abort_key)
                .spawn(&mut listener, shutdown_rx.clone())?;
        let ctrl_c = spawn_ctrl_c_watcher(abort.clone());

        let scheduler = PlaybackScheduler::new(timeline, speed, abort.clone())
            .with_poll_interval(playback.poll_interval())
            .with_abort_key(&self.config.recording.abort_key);
        let session_id = scheduler.session_id();
        let total = scheduler.estimated_duration();

        let surface = match dialog {
            DialogMode::Overlay if !total.is_zero() => status_surface(),
            DialogMode::Overlay | DialogMode::None => None,
        };
        let overlay = OverlayController::new(total, abort.clone())
            .with_tick(playback.overlay_tick())
            .spawn(surface, shutdown_rx);

        let result = tokio::task::spawn_blocking(move || {
            let mut injector = EnigoInjector::new()?;
            scheduler.run(&mut injector)
        })
        .await;

        let _ = shutdown_tx.send(true);
        match overlay.await {
            Ok(end) => info!(session_id = %session_id, ?end, "Overlay closed"),
            Err(e) => warn!(error = ?e, "Overlay task failed"),
        }
        listener.unsubscribe(subscription);
        match watcher.await {
            Ok(end) => debug!(session_id = %session_id, ?end, "Abort watcher stopped"),
            Err(e) => warn!(error = ?e, "Abort watcher task failed"),
        }
        ctrl_c.abort();

        let outcome = playback_result(result)?;
        report(&outcome);

        Ok(())
    }
}

#[track_caller]
fn playback_result(
    result: Result<Result<PlaybackOutcome, CoreError>, tokio::task::JoinError>,
) -> AppResult<PlaybackOutcome> {
    match result {
        Ok(outcome) => Ok(outcome?),
        Err(e) => Err(AppError::Core {
            source: CoreError::ChannelClosed {
                message: format!("Playback thread ended unexpectedly: {}", e),
                location: ErrorLocation::from(Location::caller()),
            },
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

fn report(outcome: &PlaybackOutcome) {
    match outcome.status {
        PlaybackStatus::Completed => info!(
            session_id = %outcome.session_id,
            dispatched = outcome.dispatched,
            skipped = outcome.skipped,
            "Done"
        ),
        PlaybackStatus::Aborted => info!(
            session_id = %outcome.session_id,
            dispatched = outcome.dispatched,
            "Aborted by user"
        ),
    }
    if !outcome.held_inputs.is_empty() {
        let held: Vec<String> = outcome.held_inputs.iter().map(ToString::to_string).collect();
        warn!(held = ?held, "Inputs may still be held down: {}", held.join(", "));
    }
}

fn status_surface() -> Option<Box<dyn StatusSurface>> {
    match TerminalStatus::stderr() {
        Ok(surface) => Some(Box::new(surface)),
        Err(e) => {
            warn!(error = %e, "Countdown overlay unavailable, continuing without it");
            None
        }
    }
}

/// Abort the session on Ctrl-C.
fn spawn_ctrl_c_watcher(abort: AbortState) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received");
                abort.abort();
            }
            Err(e) => warn!(error = %e, "Ctrl-C handler unavailable"),
        }
    })
}
