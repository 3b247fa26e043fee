use tokio::sync::watch;

/// Single-slot, last-write-wins mailbox for status text.
///
/// Writers never block and never queue: a publish replaces whatever the
/// reader has not picked up yet. Dropping the slot closes it, which tells the
/// reader the countdown is over.
#[derive(Debug)]
pub struct StatusSlot {
    tx: watch::Sender<String>,
}

impl StatusSlot {
    /// Create a slot and the receiver that drains it.
    pub fn new() -> (Self, watch::Receiver<String>) {
        let (tx, rx) = watch::channel(String::new());
        (Self { tx }, rx)
    }

    /// Replace the current text.
    pub fn publish(&self, text: impl Into<String>) {
        self.tx.send_replace(text.into());
    }

    /// The most recently published text.
    pub fn latest(&self) -> String {
        self.tx.borrow().clone()
    }
}
