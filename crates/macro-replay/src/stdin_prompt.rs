use macro_replay_core::capability::OverwritePrompt;

use std::{
    io::{self, BufRead, Stderr, StdinLock, Write},
    path::Path,
};

use tracing::warn;

/// [`OverwritePrompt`] that asks a yes/no question on the terminal.
///
/// `y`/`yes` confirms; `n`/`no`, an empty answer or end of input declines.
/// Anything else asks again.
pub struct StdinPrompt<R: BufRead = StdinLock<'static>, W: Write = Stderr> {
    input: R,
    output: W,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self::with_io(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    pub fn with_io(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn say(&mut self, text: &str) {
        if let Err(e) = write!(self.output, "{}", text).and_then(|()| self.output.flush()) {
            warn!(error = %e, "Failed to write overwrite prompt");
        }
    }
}

impl<R: BufRead, W: Write> OverwritePrompt for StdinPrompt<R, W> {
    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        loop {
            self.say(&format!("{} exists. Overwrite? [y/N] ", path.display()));

            let mut answer = String::new();
            match self.input.read_line(&mut answer) {
                Ok(0) => return false,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Failed to read overwrite answer");
                    return false;
                }
            }

            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return true,
                "n" | "no" | "" => return false,
                _ => self.say("Please answer 'y' or 'n'.\n"),
            }
        }
    }
}
