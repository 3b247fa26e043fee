use crate::{
    AbortState, CoreError, CoreResult,
    capability::InputInjector,
    keys::{ABORT_KEY, ABORT_KEY_LABEL, canonical_key_name, same_key},
    playback::{
        DEFAULT_POLL_INTERVAL, HeldInput, MIN_POLL_INTERVAL, PlaybackOutcome, PlaybackStatus,
        effective_speed, outcome::HeldInputs, scaled_delay, wait_interruptible,
    },
    timeline::{Event, MouseButton, Timeline},
};

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

/// Replays a timeline in recorded order with scaled, abortable delays.
///
/// The scheduler is synchronous: run it on a thread of its own (the platform
/// injector is usually not `Send`, so create it on that thread too). The only
/// shared state it touches is the [`AbortState`], which it polls between
/// entries and during every wait.
#[derive(Debug)]
pub struct PlaybackScheduler {
    session_id: Uuid,
    timeline: Timeline,
    speed: f64,
    abort: AbortState,
    poll_interval: Duration,
    abort_key: String,
    estimated: Duration,
}

impl PlaybackScheduler {
    /// Create a scheduler for `timeline` at `speed` (values <= 0 become a tiny positive speed).
    ///
    /// The total estimated duration is computed here once.
    pub fn new(timeline: Timeline, speed: f64, abort: AbortState) -> Self {
        let speed = effective_speed(speed);
        let estimated = timeline
            .iter()
            .map(|entry| scaled_delay(entry.delta, speed))
            .fold(Duration::ZERO, Duration::saturating_add);

        Self {
            session_id: Uuid::new_v4(),
            timeline,
            speed,
            abort,
            poll_interval: DEFAULT_POLL_INTERVAL,
            abort_key: ABORT_KEY.to_string(),
            estimated,
        }
    }

    /// Set the wait polling granularity, clamped to 1..=5 ms.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.clamp(MIN_POLL_INTERVAL, DEFAULT_POLL_INTERVAL);
        self
    }

    /// Set the key whose synthesis must not be mistaken for a user abort.
    pub fn with_abort_key(mut self, abort_key: &str) -> Self {
        self.abort_key = canonical_key_name(abort_key);
        self
    }

    /// Sum of all scaled delays.
    pub fn estimated_duration(&self) -> Duration {
        self.estimated
    }

    /// The effective speed multiplier.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Session id for log correlation.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The timeline being replayed.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Replay every entry in order until done or aborted.
    ///
    /// Entries whose key cannot be synthesized are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns the injector's error for any other failed synthesis. Entries
    /// already dispatched stay dispatched; inputs they left held are logged.
    #[instrument(skip(self, injector), fields(session_id = %self.session_id))]
    pub fn run(&self, injector: &mut dyn InputInjector) -> CoreResult<PlaybackOutcome> {
        info!(
            event_count = self.timeline.len(),
            speed = self.speed,
            estimated_ms = self.estimated.as_millis(),
            "Running macro, press {} to abort", ABORT_KEY_LABEL
        );

        let started = Instant::now();
        let mut held = HeldInputs::default();
        let mut dispatched = 0usize;
        let mut skipped = 0usize;
        let mut status = PlaybackStatus::Completed;
        let mut failure = None;

        for (index, entry) in self.timeline.iter().enumerate() {
            if self.abort.is_aborted() {
                status = PlaybackStatus::Aborted;
                break;
            }

            let delay = scaled_delay(entry.delta, self.speed);
            if !wait_interruptible(delay, &self.abort, self.poll_interval)
                || self.abort.is_aborted()
            {
                status = PlaybackStatus::Aborted;
                break;
            }

            match self.dispatch(&entry.event, injector, &mut held) {
                Ok(()) => {
                    dispatched += 1;
                    trace!(index, kind = entry.event.kind(), "Entry dispatched");
                }
                Err(CoreError::UnknownKey { key, .. }) => {
                    skipped += 1;
                    warn!(index, key = %key, "Skipping entry with unknown key");
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        let held_inputs = held.into_vec();
        let elapsed = started.elapsed();

        if let Some(e) = failure {
            warn!(index = dispatched + skipped, error = %e, "Run failed");
            warn_held(&held_inputs);
            return Err(e);
        }

        match status {
            PlaybackStatus::Completed => info!(
                dispatched,
                skipped,
                elapsed_ms = elapsed.as_millis(),
                "Run finished"
            ),
            PlaybackStatus::Aborted => info!(
                dispatched,
                remaining = self.timeline.len() - dispatched - skipped,
                elapsed_ms = elapsed.as_millis(),
                "Run aborted"
            ),
        }

        warn_held(&held_inputs);

        Ok(PlaybackOutcome {
            session_id: self.session_id,
            status,
            dispatched,
            skipped,
            held_inputs,
            elapsed,
        })
    }

    fn dispatch(
        &self,
        event: &Event,
        injector: &mut dyn InputInjector,
        held: &mut HeldInputs,
    ) -> CoreResult<()> {
        match event {
            Event::Move { x, y } => injector.set_pointer_position(*x, *y),
            Event::Click {
                x,
                y,
                button,
                pressed,
            } => {
                let resolved = MouseButton::from_name(button);
                if resolved.name() != button.to_ascii_lowercase() {
                    debug!(button = %button, resolved = resolved.name(), "Button name resolved");
                }

                injector.set_pointer_position(*x, *y)?;
                if *pressed {
                    injector.press_button(resolved)?;
                    held.press(HeldInput::Button(resolved));
                } else {
                    injector.release_button(resolved)?;
                    held.release(&HeldInput::Button(resolved));
                }
                Ok(())
            }
            Event::Scroll { dx, dy } => injector.scroll_by(*dx, *dy),
            Event::Key { key, pressed } => {
                let is_abort_key = same_key(key, &self.abort_key);
                let _guard = is_abort_key.then(|| self.abort.synthesizing(key));

                if *pressed {
                    if is_abort_key {
                        self.abort.hold_synthesized(key);
                    }
                    let result = injector.press_key(key);
                    if result.is_err() && is_abort_key {
                        self.abort.release_synthesized(key);
                    }
                    result?;
                    held.press(HeldInput::Key(key.clone()));
                } else {
                    let result = injector.release_key(key);
                    if is_abort_key {
                        self.abort.release_synthesized(key);
                    }
                    result?;
                    held.release(&HeldInput::Key(key.clone()));
                }
                Ok(())
            }
        }
    }
}

fn warn_held(held_inputs: &[HeldInput]) {
    for input in held_inputs {
        warn!(input = %input, "Input left held when playback stopped");
    }
}
