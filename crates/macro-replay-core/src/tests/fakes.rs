use crate::{
    AbortDecision, AbortState, CoreError, CoreResult, MouseButton,
    capability::{
        InputInjector, InputKind, InputListener, InputNotification, NotificationSender,
        OverwritePrompt, StatusSurface, Subscription,
    },
    keys::ABORT_KEY,
};

use std::{
    panic::Location,
    path::Path,
    sync::{Arc, Mutex},
    time::Instant,
};

use error_location::ErrorLocation;

/// An action the fake injector was asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Position(i32, i32),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    Scroll(i32, i32),
    KeyDown(String),
    KeyUp(String),
}

/// Injector that records every call with the instant it happened.
///
/// With `abort_watch` set, each key press is also fed to the abort watcher
/// logic while the call is in progress, the way a live listener would see it.
#[derive(Debug, Default)]
pub(crate) struct RecordingInjector {
    pub(crate) actions: Vec<(Instant, Action)>,
    pub(crate) unknown_keys: Vec<String>,
    pub(crate) fail_all: bool,
    pub(crate) fail_keys: Vec<String>,
    pub(crate) abort_watch: Option<AbortState>,
    pub(crate) watch_decisions: Vec<AbortDecision>,
}

impl RecordingInjector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn plain_actions(&self) -> Vec<Action> {
        self.actions.iter().map(|(_, a)| a.clone()).collect()
    }

    #[track_caller]
    fn check(&mut self, key: Option<&str>) -> CoreResult<()> {
        if self.fail_all {
            return Err(CoreError::InjectionFailed {
                reason: "fake injector failure".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        match key {
            Some(key) if self.fail_keys.iter().any(|k| k == key) => {
                Err(CoreError::InjectionFailed {
                    reason: format!("fake injector failure on {}", key),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
            Some(key) if self.unknown_keys.iter().any(|k| k == key) => Err(CoreError::UnknownKey {
                key: key.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
            _ => Ok(()),
        }
    }

    fn push(&mut self, action: Action) {
        self.actions.push((Instant::now(), action));
    }
}

impl InputInjector for RecordingInjector {
    fn set_pointer_position(&mut self, x: i32, y: i32) -> CoreResult<()> {
        self.check(None)?;
        self.push(Action::Position(x, y));
        Ok(())
    }

    fn press_button(&mut self, button: MouseButton) -> CoreResult<()> {
        self.check(None)?;
        self.push(Action::ButtonDown(button));
        Ok(())
    }

    fn release_button(&mut self, button: MouseButton) -> CoreResult<()> {
        self.check(None)?;
        self.push(Action::ButtonUp(button));
        Ok(())
    }

    fn scroll_by(&mut self, dx: i32, dy: i32) -> CoreResult<()> {
        self.check(None)?;
        self.push(Action::Scroll(dx, dy));
        Ok(())
    }

    fn press_key(&mut self, key: &str) -> CoreResult<()> {
        self.check(Some(key))?;
        if let Some(abort) = &self.abort_watch {
            let decision = abort.observe_key_press(key, ABORT_KEY);
            self.watch_decisions.push(decision);
        }
        self.push(Action::KeyDown(key.to_string()));
        Ok(())
    }

    fn release_key(&mut self, key: &str) -> CoreResult<()> {
        self.check(Some(key))?;
        self.push(Action::KeyUp(key.to_string()));
        Ok(())
    }
}

/// Injector that reports its key events into a listener channel, like an OS
/// hook observing synthesized input after the call has returned.
#[derive(Debug)]
pub(crate) struct EchoingInjector {
    pub(crate) echo: NotificationSender,
}

impl EchoingInjector {
    fn send(&self, input: InputKind) {
        let _ = self.echo.send(InputNotification::now(input));
    }
}

impl InputInjector for EchoingInjector {
    fn set_pointer_position(&mut self, _x: i32, _y: i32) -> CoreResult<()> {
        Ok(())
    }

    fn press_button(&mut self, _button: MouseButton) -> CoreResult<()> {
        Ok(())
    }

    fn release_button(&mut self, _button: MouseButton) -> CoreResult<()> {
        Ok(())
    }

    fn scroll_by(&mut self, _dx: i32, _dy: i32) -> CoreResult<()> {
        Ok(())
    }

    fn press_key(&mut self, key: &str) -> CoreResult<()> {
        self.send(InputKind::KeyPress {
            key: key.to_string(),
        });
        Ok(())
    }

    fn release_key(&mut self, key: &str) -> CoreResult<()> {
        self.send(InputKind::KeyRelease {
            key: key.to_string(),
        });
        Ok(())
    }
}

/// Shared buffer that collects formatted log output.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap_or_else(|e| e.into_inner())).into_owned()
    }

    /// Subscriber writing plain-text events into this buffer.
    pub(crate) fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        let buffer = self.clone();
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || buffer.clone())
            .finish()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Listener that replays a fixed script into the sink on subscribe.
///
/// With `keep_open` the sink is held after the script, so the stream does
/// not close on its own.
#[derive(Debug, Default)]
pub(crate) struct ScriptedListener {
    pub(crate) script: Vec<InputNotification>,
    pub(crate) keep_open: bool,
    pub(crate) unavailable: bool,
    pub(crate) held_sink: Option<NotificationSender>,
    pub(crate) subscribed: usize,
    pub(crate) unsubscribed: usize,
}

impl ScriptedListener {
    pub(crate) fn new(script: Vec<InputNotification>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }
}

impl InputListener for ScriptedListener {
    #[track_caller]
    fn subscribe(&mut self, sink: NotificationSender) -> CoreResult<Subscription> {
        if self.unavailable {
            return Err(CoreError::ListenerUnavailable {
                reason: "no input hook in tests".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.subscribed += 1;
        for notification in self.script.drain(..) {
            let _ = sink.send(notification);
        }
        if self.keep_open {
            self.held_sink = Some(sink);
        }
        Ok(Subscription::new())
    }

    fn unsubscribe(&mut self, _subscription: Subscription) {
        self.unsubscribed += 1;
        self.held_sink = None;
    }
}

/// Build a notification stamped at `base + millis`.
pub(crate) fn at(base: Instant, millis: u64, input: InputKind) -> InputNotification {
    InputNotification {
        at: base + std::time::Duration::from_millis(millis),
        input,
    }
}

/// Surface that stores everything published into shared state.
#[derive(Debug, Clone, Default)]
pub(crate) struct CapturingSurface {
    pub(crate) published: Arc<Mutex<Vec<String>>>,
    pub(crate) disposed: Arc<Mutex<bool>>,
    pub(crate) fail: bool,
}

impl StatusSurface for CapturingSurface {
    #[track_caller]
    fn publish(&mut self, text: &str) -> CoreResult<()> {
        if self.fail {
            return Err(CoreError::OverlayUnavailable {
                reason: "surface gone".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        Ok(())
    }

    fn dispose(&mut self) {
        *self.disposed.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }
}

/// Prompt with a canned answer that counts how often it was asked.
#[derive(Debug, Default)]
pub(crate) struct CannedPrompt {
    pub(crate) answer: bool,
    pub(crate) asked: usize,
}

impl OverwritePrompt for CannedPrompt {
    fn confirm_overwrite(&mut self, _path: &Path) -> bool {
        self.asked += 1;
        self.answer
    }
}
