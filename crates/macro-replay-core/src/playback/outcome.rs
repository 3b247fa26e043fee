use crate::timeline::MouseButton;

use std::{fmt, time::Duration};

use uuid::Uuid;

/// How a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Every entry was dispatched.
    Completed,
    /// The abort flag was observed before the end.
    Aborted,
}

/// An input left pressed when playback stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeldInput {
    /// A key pressed but not released.
    Key(String),
    /// A pointer button pressed but not released.
    Button(MouseButton),
}

impl fmt::Display for HeldInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeldInput::Key(key) => write!(f, "key {}", key),
            HeldInput::Button(button) => write!(f, "{} button", button.name()),
        }
    }
}

/// Report of a finished playback run.
///
/// An aborted run is a normal outcome, not an error. When it stops between a
/// press and its release the input is left held; those are listed in
/// [`PlaybackOutcome::held_inputs`] and are deliberately not auto-released.
#[derive(Debug, Clone)]
pub struct PlaybackOutcome {
    /// Session id for log correlation.
    pub session_id: Uuid,
    /// Whether the run completed or was aborted.
    pub status: PlaybackStatus,
    /// Entries synthesized.
    pub dispatched: usize,
    /// Entries skipped because their key could not be synthesized.
    pub skipped: usize,
    /// Inputs pressed but not released when playback stopped.
    pub held_inputs: Vec<HeldInput>,
    /// Wall-clock time spent in playback.
    pub elapsed: Duration,
}

impl PlaybackOutcome {
    /// Whether every entry was dispatched.
    pub fn is_complete(&self) -> bool {
        self.status == PlaybackStatus::Completed
    }
}

/// Tracks presses without a matching release, in press order.
#[derive(Debug, Default)]
pub(crate) struct HeldInputs {
    held: Vec<HeldInput>,
}

impl HeldInputs {
    pub(crate) fn press(&mut self, input: HeldInput) {
        if !self.held.contains(&input) {
            self.held.push(input);
        }
    }

    pub(crate) fn release(&mut self, input: &HeldInput) {
        self.held.retain(|held| held != input);
    }

    pub(crate) fn into_vec(self) -> Vec<HeldInput> {
        self.held
    }
}
