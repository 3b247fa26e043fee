use crate::{
    AbortState, CoreResult,
    capability::{InputKind, InputListener, InputNotification, OverwritePrompt},
    capture::{CaptureState, DestinationCheck, StopReason},
    keys::{ABORT_KEY_LABEL, canonical_key_name, same_key},
    timeline::{
        Event, Timeline, TimelineEntry,
        compactor::{CompactionStats, compact_with_stats},
    },
};

use std::{
    path::Path,
    time::{Duration, Instant},
};

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Everything a finished capture produced.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    /// Session id for log correlation.
    pub session_id: Uuid,
    /// The captured (and possibly compacted) timeline.
    pub timeline: Timeline,
    /// Why capture stopped.
    pub stop_reason: StopReason,
    /// Wall-clock length of the recording.
    pub duration: Duration,
    /// Compaction counts, if compaction ran.
    pub compaction: Option<CompactionStats>,
}

/// Turns live input notifications into a timeline.
///
/// The session is a plain state machine (`Idle -> Recording -> Stopped`).
/// [`CaptureSession::record`] drives it from a listener; tests can drive
/// [`CaptureSession::handle`] directly with stamped notifications.
#[derive(Debug)]
pub struct CaptureSession {
    session_id: Uuid,
    abort_key: String,
    state: CaptureState,
    started_at: Option<Instant>,
    last_at: Option<Instant>,
    stopped_at: Option<Instant>,
    stop_reason: Option<StopReason>,
    entries: Vec<TimelineEntry>,
}

impl CaptureSession {
    /// Create an idle session that stops on `abort_key`.
    pub fn new(abort_key: &str) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            abort_key: canonical_key_name(abort_key),
            state: CaptureState::Idle,
            started_at: None,
            last_at: None,
            stopped_at: None,
            stop_reason: None,
            entries: Vec::new(),
        }
    }

    /// Ask before recording over an existing destination.
    ///
    /// Returns [`DestinationCheck::Declined`] if `destination` exists and the
    /// prompt refused; the caller must not record in that case.
    #[instrument(skip(prompt))]
    pub fn confirm_destination(
        destination: &Path,
        prompt: &mut dyn OverwritePrompt,
    ) -> DestinationCheck {
        if !destination.exists() {
            return DestinationCheck::Fresh;
        }

        if prompt.confirm_overwrite(destination) {
            info!(destination = ?destination, "Overwrite confirmed");
            DestinationCheck::Overwrite
        } else {
            info!(destination = ?destination, "Overwrite declined, recording cancelled");
            DestinationCheck::Declined
        }
    }

    /// Session id for log correlation.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Number of entries captured so far.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Move from `Idle` to `Recording`, measuring the first delta from `now`.
    pub fn start(&mut self, now: Instant) {
        if self.state != CaptureState::Idle {
            warn!(session_id = %self.session_id, state = ?self.state, "Start ignored, session not idle");
            return;
        }
        self.state = CaptureState::Recording { started_at: now };
        self.started_at = Some(now);
        self.last_at = Some(now);
        debug!(session_id = %self.session_id, "Capture started");
    }

    /// Apply one notification. Returns `true` while the session is still recording.
    ///
    /// The abort key's press stops the session and is not recorded; its
    /// release is never recorded either.
    pub fn handle(&mut self, notification: InputNotification) -> bool {
        if !matches!(self.state, CaptureState::Recording { .. }) {
            return false;
        }

        let InputNotification { at, input } = notification;

        let event = match input {
            InputKind::KeyPress { key } if same_key(&key, &self.abort_key) => {
                info!(session_id = %self.session_id, "Stopping capture ({} pressed)", ABORT_KEY_LABEL);
                self.stop(StopReason::AbortKey, at);
                return false;
            }
            InputKind::KeyRelease { key } if same_key(&key, &self.abort_key) => {
                return true;
            }
            InputKind::Move { x, y } => Event::Move { x, y },
            InputKind::Click {
                x,
                y,
                button,
                pressed,
            } => Event::Click {
                x,
                y,
                button,
                pressed,
            },
            InputKind::Scroll { dx, dy } => Event::Scroll { dx, dy },
            InputKind::KeyPress { key } => Event::Key {
                key: canonical_key_name(&key),
                pressed: true,
            },
            InputKind::KeyRelease { key } => Event::Key {
                key: canonical_key_name(&key),
                pressed: false,
            },
        };

        let last = self.last_at.unwrap_or(at);
        let delta = at.saturating_duration_since(last).as_secs_f64();
        // Out-of-order stamps yield a zero delta and never move the clock backwards.
        self.last_at = Some(last.max(at));
        self.entries.push(TimelineEntry::new(delta, event));

        true
    }

    /// Move to `Stopped`. Further notifications are ignored.
    pub fn stop(&mut self, reason: StopReason, at: Instant) {
        if self.state == CaptureState::Stopped {
            return;
        }
        self.state = CaptureState::Stopped;
        self.stop_reason = Some(reason);
        self.stopped_at = Some(at);
    }

    /// Record from `listener` until the abort key, cancellation, or end of stream.
    ///
    /// The listener is always unsubscribed before this returns successfully.
    /// `keep_moves` runs the move compactor on the result when set.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::ListenerUnavailable`] if the listener
    /// cannot be subscribed. No entries are recorded in that case.
    #[instrument(skip(self, listener, abort), fields(session_id = %self.session_id))]
    pub async fn record(
        mut self,
        listener: &mut dyn InputListener,
        abort: &AbortState,
        keep_moves: Option<usize>,
    ) -> CoreResult<CaptureOutcome> {
        let (sink, mut notifications) = mpsc::unbounded_channel();

        self.start(Instant::now());
        let subscription = listener.subscribe(sink)?;

        info!(
            subscription_id = %subscription.id(),
            "Recording, press {} at any time to stop", ABORT_KEY_LABEL
        );

        let reason = loop {
            tokio::select! {
                biased;
                _ = abort.cancelled() => break StopReason::Cancelled,
                next = notifications.recv() => match next {
                    Some(notification) => {
                        if !self.handle(notification) {
                            break self.stop_reason.unwrap_or(StopReason::AbortKey);
                        }
                    }
                    None => {
                        warn!("Listener stream closed during capture");
                        break StopReason::ListenerClosed;
                    }
                },
            }
        };

        listener.unsubscribe(subscription);
        self.stop(reason, Instant::now());

        Ok(self.finish(keep_moves))
    }

    /// Finalize the timeline, optionally compacting move runs.
    pub fn finish(mut self, keep_moves: Option<usize>) -> CaptureOutcome {
        let now = Instant::now();
        self.stop(StopReason::Cancelled, now);

        let duration = match (self.started_at, self.stopped_at) {
            (Some(started_at), Some(stopped_at)) => stopped_at.saturating_duration_since(started_at),
            _ => Duration::ZERO,
        };

        let raw = Timeline::from(std::mem::take(&mut self.entries));
        let (timeline, compaction) = match keep_moves {
            Some(keep) => {
                let (compacted, stats) = compact_with_stats(&raw, keep);
                (compacted, Some(stats))
            }
            None => (raw, None),
        };

        let stop_reason = self.stop_reason.unwrap_or(StopReason::Cancelled);

        info!(
            session_id = %self.session_id,
            event_count = timeline.len(),
            duration_ms = duration.as_millis(),
            ?stop_reason,
            "Capture finished"
        );

        CaptureOutcome {
            session_id: self.session_id,
            timeline,
            stop_reason,
            duration,
            compaction,
        }
    }
}
