mod outcome;
mod scheduler;
mod wait;

pub use {
    outcome::{HeldInput, PlaybackOutcome, PlaybackStatus},
    scheduler::PlaybackScheduler,
    wait::{
        DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL, MIN_SPEED, effective_speed, scaled_delay,
        wait_interruptible,
    },
};
