//! Watches live key presses during playback for a user-issued abort.

use macro_replay_core::{
    AbortDecision, AbortState, CoreResult,
    capability::{InputKind, InputListener, NotificationReceiver, Subscription},
};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info, instrument};

/// Why the watcher stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEnd {
    /// The user pressed the abort key.
    Aborted,
    /// Playback ended first.
    Shutdown,
    /// The listener stopped delivering notifications.
    StreamClosed,
}

/// Turns abort-key presses into an abort of the playback session.
///
/// Presses of the abort key that playback itself is synthesizing are ignored.
pub struct AbortWatcher {
    abort: AbortState,
    abort_key: String,
}

impl AbortWatcher {
    pub fn new(abort: AbortState, abort_key: &str) -> Self {
        Self {
            abort,
            abort_key: abort_key.to_string(),
        }
    }

    /// Subscribe to `listener` and watch its key presses on a new task.
    ///
    /// # Errors
    ///
    /// Returns [`macro_replay_core::CoreError::ListenerUnavailable`] if the
    /// listener cannot be subscribed. Nothing is spawned in that case.
    pub fn spawn(
        self,
        listener: &mut dyn InputListener,
        shutdown_rx: watch::Receiver<bool>,
    ) -> CoreResult<(Subscription, JoinHandle<WatchEnd>)> {
        let (sink, notifications) = mpsc::unbounded_channel();
        let subscription = listener.subscribe(sink)?;
        let handle = tokio::spawn(self.run(notifications, shutdown_rx));
        Ok((subscription, handle))
    }

    /// Consume notifications until abort, shutdown, or end of stream.
    #[instrument(skip_all, fields(abort_key = %self.abort_key))]
    pub async fn run(
        self,
        mut notifications: NotificationReceiver,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> WatchEnd {
        loop {
            tokio::select! {
                biased;
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        return WatchEnd::Shutdown;
                    }
                }
                next = notifications.recv() => match next {
                    Some(notification) => {
                        let InputKind::KeyPress { key } = notification.input else {
                            continue;
                        };
                        match self.abort.observe_key_press(&key, &self.abort_key) {
                            AbortDecision::Aborted => {
                                info!("Abort key pressed, stopping playback");
                                return WatchEnd::Aborted;
                            }
                            AbortDecision::Suppressed => debug!("Synthesized abort key ignored"),
                            AbortDecision::Ignored => {}
                        }
                    }
                    None => return WatchEnd::StreamClosed,
                },
            }
        }
    }
}
