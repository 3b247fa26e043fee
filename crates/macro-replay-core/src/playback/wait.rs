use crate::AbortState;

use std::time::{Duration, Instant};

/// Longest single sleep while waiting for an entry's delay.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Shortest poll interval accepted by the scheduler.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Smallest speed multiplier; anything at or below zero is raised to this.
pub const MIN_SPEED: f64 = 1e-6;

/// Sanitize a speed multiplier so it can be divided by.
pub fn effective_speed(speed: f64) -> f64 {
    if speed.is_nan() || speed <= 0.0 {
        MIN_SPEED
    } else {
        speed.max(MIN_SPEED)
    }
}

/// Scale a recorded delay (seconds) by `speed`, saturating on overflow.
pub fn scaled_delay(delta: f64, speed: f64) -> Duration {
    let seconds = delta.max(0.0) / effective_speed(speed);
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

/// Sleep for `duration` in steps of at most `poll`, returning early on abort.
///
/// Returns `true` if the full duration elapsed, `false` if the wait was
/// interrupted by `abort`.
pub fn wait_interruptible(duration: Duration, abort: &AbortState, poll: Duration) -> bool {
    let poll = poll.max(MIN_POLL_INTERVAL);
    let deadline = Instant::now().checked_add(duration);

    loop {
        if abort.is_aborted() {
            return false;
        }

        let step = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return true;
                }
                remaining.min(poll)
            }
            None => poll,
        };

        std::thread::sleep(step);
    }
}
