use std::time::Instant;

/// Lifecycle of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Created, not yet listening.
    Idle,
    /// Listening and appending entries.
    Recording {
        /// When recording started.
        started_at: Instant,
    },
    /// Finished; no further entries are accepted.
    Stopped,
}

/// Why a capture session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user pressed the abort key.
    AbortKey,
    /// The session's [`crate::AbortState`] was signalled (e.g. Ctrl-C).
    Cancelled,
    /// The listener stopped delivering notifications.
    ListenerClosed,
}

/// Result of checking a capture destination before recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationCheck {
    /// Nothing exists at the destination.
    Fresh,
    /// Something exists and the user agreed to overwrite it.
    Overwrite,
    /// Something exists and the user declined; do not record.
    Declined,
}

impl DestinationCheck {
    /// Whether recording may proceed.
    pub fn allows_recording(self) -> bool {
        !matches!(self, DestinationCheck::Declined)
    }
}
