use crate::TerminalStatus;

use macro_replay_core::capability::StatusSurface;

/// WHAT: Each publish rewrites the line in place
/// WHY: The countdown must not scroll the terminal
#[test]
#[allow(clippy::unwrap_used)]
fn given_publishes_when_writing_then_carriage_return_each() {
    let mut out = Vec::new();
    let mut status = TerminalStatus::with_writer(&mut out);

    status.publish("00:02").unwrap();
    status.publish("00:01").unwrap();
    drop(status);

    assert_eq!(String::from_utf8_lossy(&out), "\r00:02\r00:01");
}

/// WHAT: A shorter text pads over the previous one
/// WHY: Leftover characters would garble the status line
#[test]
#[allow(clippy::unwrap_used)]
fn given_shorter_text_when_publishing_then_padded() {
    let mut out = Vec::new();
    let mut status = TerminalStatus::with_writer(&mut out);

    status.publish("Remaining 00:10").unwrap();
    status.publish("Done").unwrap();
    status.publish("Go").unwrap();
    drop(status);

    assert_eq!(
        String::from_utf8_lossy(&out),
        "\rRemaining 00:10\rDone           \rGo  "
    );
}

/// WHAT: Dispose ends the line only if something was shown
/// WHY: Later log output starts on a fresh line, with no stray blank lines
#[test]
#[allow(clippy::unwrap_used)]
fn given_dispose_when_published_then_newline() {
    let mut idle_out = Vec::new();
    TerminalStatus::with_writer(&mut idle_out).dispose();
    assert!(idle_out.is_empty());

    let mut shown_out = Vec::new();
    let mut shown = TerminalStatus::with_writer(&mut shown_out);
    shown.publish("Done").unwrap();
    shown.dispose();
    drop(shown);
    assert_eq!(String::from_utf8_lossy(&shown_out), "\rDone\n");
}
