use crate::{AbortState, capability::StatusSurface, overlay::StatusSlot};

use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, instrument, warn};

/// Default interval between countdown updates.
pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

/// Text published once the countdown is over.
pub const FINAL_STATUS: &str = "remaining 00:00";

/// Why the countdown stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEnd {
    /// Elapsed time reached the estimated total.
    Elapsed,
    /// The session's abort flag was observed.
    Aborted,
    /// Playback finished (or the owner went away) before the estimate ran out.
    Shutdown,
}

/// Format a remaining duration as `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.as_secs_f64().round() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Independently scheduled countdown of remaining playback time.
///
/// Reads only a start instant and the precomputed total, so the cost of
/// updating the display never touches the scheduler's timing. Nothing waits
/// on the controller.
#[derive(Debug, Clone)]
pub struct OverlayController {
    total: Duration,
    tick: Duration,
    abort: AbortState,
}

impl OverlayController {
    /// Count down from `total`, stopping early if `abort` is signalled.
    pub fn new(total: Duration, abort: AbortState) -> Self {
        Self {
            total,
            tick: DEFAULT_TICK,
            abort,
        }
    }

    /// Set the update interval. A zero interval is replaced by the default.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = if tick.is_zero() { DEFAULT_TICK } else { tick };
        self
    }

    /// Estimated total being counted down.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Publish the countdown into `slot` until it runs out, abort, or `shutdown_rx` changes.
    ///
    /// Always ends by publishing [`FINAL_STATUS`] and dropping the slot.
    #[instrument(skip(self, slot, shutdown_rx), fields(total_ms = self.total.as_millis()))]
    pub async fn run(self, slot: StatusSlot, mut shutdown_rx: watch::Receiver<bool>) -> OverlayEnd {
        let started = Instant::now();
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let end = if *shutdown_rx.borrow_and_update() {
            OverlayEnd::Shutdown
        } else {
            loop {
                tokio::select! {
                    biased;
                    _ = self.abort.cancelled() => break OverlayEnd::Aborted,
                    _ = shutdown_rx.changed() => break OverlayEnd::Shutdown,
                    _ = ticker.tick() => {
                        let remaining = self.total.saturating_sub(started.elapsed());
                        slot.publish(format!("remaining {}", format_remaining(remaining)));
                        if remaining.is_zero() {
                            break OverlayEnd::Elapsed;
                        }
                    }
                }
            }
        };

        slot.publish(FINAL_STATUS);
        debug!(?end, "Countdown closed");

        end
    }

    /// Spawn the countdown and a task draining it into `surface`.
    ///
    /// With no surface, or nothing to count down, the countdown is not
    /// started at all and the handle resolves immediately.
    pub fn spawn(
        self,
        surface: Option<Box<dyn StatusSurface>>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<OverlayEnd> {
        let Some(mut surface) = surface else {
            debug!("No status surface, overlay disabled");
            return tokio::spawn(async { OverlayEnd::Shutdown });
        };
        if self.total.is_zero() {
            debug!("Nothing to count down, overlay not shown");
            surface.dispose();
            return tokio::spawn(async { OverlayEnd::Elapsed });
        }

        let (slot, slot_rx) = StatusSlot::new();
        let pump = tokio::spawn(drive_surface(surface, slot_rx));

        tokio::spawn(async move {
            let end = self.run(slot, shutdown_rx).await;
            if let Err(e) = pump.await {
                warn!(error = ?e, "Status surface task panicked");
            }
            end
        })
    }
}

/// Drain `slot_rx` into `surface` until the slot closes, then dispose the surface.
///
/// A failed publish disables the surface for the rest of the session; the
/// slot keeps draining so writers are unaffected.
pub async fn drive_surface(
    mut surface: Box<dyn StatusSurface>,
    mut slot_rx: watch::Receiver<String>,
) {
    let mut enabled = true;

    while slot_rx.changed().await.is_ok() {
        let text = slot_rx.borrow_and_update().clone();
        if !enabled {
            continue;
        }
        if let Err(e) = surface.publish(&text) {
            warn!(error = %e, "Status surface failed, overlay disabled");
            enabled = false;
        }
    }

    surface.dispose();
}
