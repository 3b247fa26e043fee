//! Shared cancellation for capture and playback sessions.
//!
//! [`AbortState`] is a cheap cloneable handle. Every unit of a session holds a
//! clone and polls it at its own checkpoints; nothing is forcibly stopped.
//! It also tracks which keys playback is synthesizing, so the listener that
//! watches for a user-issued abort can ignore the macro's own replayed escape
//! key. The OS hook reports a synthesized press some time after the
//! injector call returns, so a key stays marked from its synthesized press
//! until [`SYNTHESIS_ECHO_GRACE`] after its synthesized release.

use crate::keys::{canonical_key_name, same_key};

use std::{
    collections::HashMap,
    pin::pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use tokio::sync::Notify;
use tracing::{debug, error, info};

/// How long after a synthesized release the key's hook echo is still expected.
pub const SYNTHESIS_ECHO_GRACE: Duration = Duration::from_millis(250);

/// What the abort watcher should do with an observed key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortDecision {
    /// Not the abort key.
    Ignored,
    /// The abort key, but playback synthesized it.
    Suppressed,
    /// The abort key, pressed by the user. The session is now aborted.
    Aborted,
}

/// Playback's claim on one key name.
#[derive(Debug, Default)]
struct Synthesized {
    in_flight: usize,
    held: bool,
    echo_until: Option<Instant>,
}

impl Synthesized {
    fn is_active(&self, now: Instant) -> bool {
        self.in_flight > 0 || self.held || self.echo_until.is_some_and(|until| now < until)
    }
}

#[derive(Debug, Default)]
struct Inner {
    aborted: AtomicBool,
    notify: Notify,
    synthesizing: Mutex<HashMap<String, Synthesized>>,
}

/// Per-session cancellation flag plus the set of keys being synthesized.
#[derive(Debug, Clone, Default)]
pub struct AbortState {
    inner: Arc<Inner>,
}

impl AbortState {
    /// Create a fresh, non-aborted state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent; returns `true` only for the call that set it.
    pub fn abort(&self) -> bool {
        let first = !self.inner.aborted.swap(true, Ordering::AcqRel);
        if first {
            info!("Abort requested");
            self.inner.notify.notify_waiters();
        }
        first
    }

    /// Whether cancellation has been signalled.
    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::Acquire)
    }

    /// Wait until cancellation is signalled. Returns immediately if it already was.
    pub async fn cancelled(&self) {
        loop {
            let mut notified = pin!(self.inner.notify.notified());
            // Register before checking the flag so a concurrent abort() is not missed.
            let _ = notified.as_mut().enable();
            if self.is_aborted() {
                return;
            }
            notified.await;
        }
    }

    /// Mark `key` as being synthesized until the returned guard is dropped.
    pub fn synthesizing(&self, key: &str) -> SynthesisGuard {
        let key = canonical_key_name(key);
        self.lock_synthesizing()
            .entry(key.clone())
            .or_default()
            .in_flight += 1;
        debug!(key = %key, "Synthesis window opened");
        SynthesisGuard {
            state: self.clone(),
            key,
        }
    }

    /// Record that playback pressed `key` and has not released it yet.
    pub fn hold_synthesized(&self, key: &str) {
        let key = canonical_key_name(key);
        let mut set = self.lock_synthesizing();
        let entry = set.entry(key).or_default();
        entry.held = true;
        entry.echo_until = None;
    }

    /// Record that playback released `key`.
    ///
    /// The key stays marked for [`SYNTHESIS_ECHO_GRACE`] so the hook's late
    /// report of the press is still recognized.
    pub fn release_synthesized(&self, key: &str) {
        let key = canonical_key_name(key);
        let mut set = self.lock_synthesizing();
        let entry = set.entry(key.clone()).or_default();
        entry.held = false;
        entry.echo_until = Some(Instant::now() + SYNTHESIS_ECHO_GRACE);
        debug!(key = %key, "Synthesized key released");
    }

    /// Whether `key` is currently marked as synthesized by playback.
    pub fn is_synthesizing(&self, key: &str) -> bool {
        let key = canonical_key_name(key);
        let now = Instant::now();
        let mut set = self.lock_synthesizing();
        set.retain(|_, synthesized| synthesized.is_active(now));
        set.contains_key(&key)
    }

    /// Classify a key press seen by the abort watcher, aborting on a user-issued abort key.
    pub fn observe_key_press(&self, key: &str, abort_key: &str) -> AbortDecision {
        if !same_key(key, abort_key) {
            return AbortDecision::Ignored;
        }
        if self.is_synthesizing(key) {
            debug!(key = %key, "Ignoring synthesized abort key");
            return AbortDecision::Suppressed;
        }
        self.abort();
        AbortDecision::Aborted
    }

    fn lock_synthesizing(&self) -> std::sync::MutexGuard<'_, HashMap<String, Synthesized>> {
        // A poisoned set is still a valid set; keep going with it.
        self.inner.synthesizing.lock().unwrap_or_else(|e| {
            error!("Synthesizing set lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

/// RAII marker for an in-flight key synthesis.
///
/// Releases its claim on the key on drop, even if the synthesis call failed.
#[derive(Debug)]
pub struct SynthesisGuard {
    state: AbortState,
    key: String,
}

impl Drop for SynthesisGuard {
    fn drop(&mut self) {
        let mut set = self.state.lock_synthesizing();
        if let Some(synthesized) = set.get_mut(&self.key) {
            synthesized.in_flight = synthesized.in_flight.saturating_sub(1);
        }
        debug!(key = %self.key, "Synthesis window closed");
    }
}
