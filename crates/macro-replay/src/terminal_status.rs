//! Countdown status line on the terminal.

use macro_replay_core::{CoreError, CoreResult, capability::StatusSurface};

use std::{
    io::{self, IsTerminal, Stderr, Write},
    panic::Location,
};

use error_location::ErrorLocation;

/// [`StatusSurface`] that rewrites a single line in place.
pub struct TerminalStatus<W: Write + Send = Stderr> {
    out: W,
    width: usize,
}

impl TerminalStatus<Stderr> {
    /// Status line on stderr. Unavailable when stderr is not a terminal.
    #[track_caller]
    pub fn stderr() -> CoreResult<Self> {
        let out = io::stderr();
        if !out.is_terminal() {
            return Err(CoreError::OverlayUnavailable {
                reason: "stderr is not a terminal".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(Self::with_writer(out))
    }
}

impl<W: Write + Send> TerminalStatus<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out, width: 0 }
    }
}

impl<W: Write + Send> StatusSurface for TerminalStatus<W> {
    #[track_caller]
    fn publish(&mut self, text: &str) -> CoreResult<()> {
        // Pad over whatever the previous, possibly longer, text left behind.
        let width = self.width.max(text.len());
        self.width = text.len();

        write!(self.out, "\r{:<width$}", text, width = width)
            .and_then(|()| self.out.flush())
            .map_err(|e| CoreError::OverlayUnavailable {
                reason: format!("Failed to write status line: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    fn dispose(&mut self) {
        if self.width > 0 {
            let _ = writeln!(self.out);
            let _ = self.out.flush();
        }
    }
}
