//! Global input listener backed by `rdev`.
//!
//! `rdev::listen` installs an OS hook on the calling thread and never
//! returns while the hook is alive, so the hook thread is started once per
//! process and kept for its lifetime. Subscriptions only swap the sink the
//! hook forwards into.

use macro_replay_core::{
    CoreError, CoreResult,
    capability::{
        InputKind, InputListener, InputNotification, NotificationSender, Subscription,
    },
};

use std::{
    panic::Location,
    sync::{Arc, Mutex, OnceLock, mpsc},
    thread,
    time::Duration,
};

use error_location::ErrorLocation;
use rdev::{Button, EventType, Key};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// How long to wait for the hook to report a startup failure.
const STARTUP_GRACE: Duration = Duration::from_millis(200);

pub(crate) type SinkSlot = Arc<Mutex<Option<(Uuid, NotificationSender)>>>;

/// Process-wide hook state.
struct Hub {
    sink: SinkSlot,
    running: Mutex<bool>,
}

static HUB: OnceLock<Hub> = OnceLock::new();

fn hub() -> &'static Hub {
    HUB.get_or_init(|| Hub {
        sink: Arc::new(Mutex::new(None)),
        running: Mutex::new(false),
    })
}

/// [`InputListener`] over the OS-wide `rdev` hook.
#[derive(Debug, Default)]
pub struct RdevListener;

impl RdevListener {
    pub fn new() -> Self {
        Self
    }

    #[track_caller]
    fn ensure_hook(hub: &'static Hub) -> CoreResult<()> {
        let mut running = hub.running.lock().unwrap_or_else(|e| e.into_inner());
        if *running {
            return Ok(());
        }

        let (startup_tx, startup_rx) = mpsc::channel::<String>();
        let sink = Arc::clone(&hub.sink);

        thread::Builder::new()
            .name("rdev-listener".to_string())
            .spawn(move || {
                let mut forwarder = Forwarder::new(sink);
                if let Err(e) = rdev::listen(move |event| forwarder.forward(event)) {
                    error!(error = ?e, "Input hook stopped");
                    let _ = startup_tx.send(format!("{:?}", e));
                }
            })
            .map_err(|e| CoreError::ListenerUnavailable {
                reason: format!("Failed to spawn listener thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        match startup_rx.recv_timeout(STARTUP_GRACE) {
            Ok(reason) => Err(CoreError::ListenerUnavailable {
                reason: format!(
                    "Input hook could not be installed ({}). Check input monitoring / accessibility permissions.",
                    reason
                ),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(_) => {
                *running = true;
                info!("Input hook installed");
                Ok(())
            }
        }
    }
}

impl InputListener for RdevListener {
    #[track_caller]
    #[instrument(skip(self, sink))]
    fn subscribe(&mut self, sink: NotificationSender) -> CoreResult<Subscription> {
        let hub = hub();
        Self::ensure_hook(hub)?;

        let subscription = Subscription::new();
        let previous = hub
            .sink
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace((subscription.id(), sink));
        if let Some((id, _)) = previous {
            warn!(replaced = %id, "Replacing an active subscription");
        }

        debug!(subscription_id = %subscription.id(), "Subscribed to input hook");
        Ok(subscription)
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        let mut slot = hub().sink.lock().unwrap_or_else(|e| e.into_inner());
        if matches!(slot.as_ref(), Some((id, _)) if *id == subscription.id()) {
            *slot = None;
            debug!(subscription_id = %subscription.id(), "Unsubscribed from input hook");
        }
    }
}

/// Runs on the hook thread; converts `rdev` events and forwards them.
pub(crate) struct Forwarder {
    sink: SinkSlot,
    // rdev reports button events without a position.
    pointer: (i32, i32),
    // Name each held key was pressed under, so its release matches.
    held_keys: Vec<(Key, String)>,
}

impl Forwarder {
    pub(crate) fn new(sink: SinkSlot) -> Self {
        Self {
            sink,
            pointer: (0, 0),
            held_keys: Vec::new(),
        }
    }

    pub(crate) fn forward(&mut self, event: rdev::Event) {
        let Some(input) = self.convert(event) else {
            return;
        };

        let mut slot = self.sink.lock().unwrap_or_else(|e| e.into_inner());
        let closed = match slot.as_ref() {
            Some((_, sink)) => sink.send(InputNotification::now(input)).is_err(),
            None => false,
        };
        if closed {
            *slot = None;
        }
    }

    fn convert(&mut self, event: rdev::Event) -> Option<InputKind> {
        match event.event_type {
            EventType::MouseMove { x, y } => {
                self.pointer = (x.round() as i32, y.round() as i32);
                Some(InputKind::Move {
                    x: self.pointer.0,
                    y: self.pointer.1,
                })
            }
            EventType::ButtonPress(button) => Some(self.click(button, true)),
            EventType::ButtonRelease(button) => Some(self.click(button, false)),
            EventType::Wheel { delta_x, delta_y } => Some(InputKind::Scroll {
                dx: saturate(delta_x),
                dy: saturate(delta_y),
            }),
            EventType::KeyPress(key) => {
                let name = key_name(key, event.name.as_deref());
                if !self.held_keys.iter().any(|(held, _)| *held == key) {
                    self.held_keys.push((key, name.clone()));
                }
                Some(InputKind::KeyPress { key: name })
            }
            EventType::KeyRelease(key) => {
                let name = match self.held_keys.iter().position(|(held, _)| *held == key) {
                    Some(index) => self.held_keys.remove(index).1,
                    None => key_name(key, event.name.as_deref()),
                };
                Some(InputKind::KeyRelease { key: name })
            }
        }
    }

    fn click(&self, button: Button, pressed: bool) -> InputKind {
        InputKind::Click {
            x: self.pointer.0,
            y: self.pointer.1,
            button: button_name(button),
            pressed,
        }
    }
}

fn saturate(ticks: i64) -> i32 {
    ticks.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Canonical name of an `rdev` button.
pub(crate) fn button_name(button: Button) -> String {
    match button {
        Button::Left => "left".to_string(),
        Button::Right => "right".to_string(),
        Button::Middle => "middle".to_string(),
        Button::Unknown(1) => "back".to_string(),
        Button::Unknown(2) => "forward".to_string(),
        Button::Unknown(code) => format!("button{}", code),
    }
}

/// Canonical name of an `rdev` key.
///
/// Symbolic keys get their lower-case name. Printable keys use the character
/// the OS reported (so shifted keys record as `A`, `!`), falling back to the
/// unshifted character of the physical key.
pub(crate) fn key_name(key: Key, typed: Option<&str>) -> String {
    if let Some(name) = symbolic_name(key) {
        return name.to_string();
    }

    if let Some(c) = typed.and_then(single_printable) {
        return c.to_string();
    }

    match physical_char(key) {
        Some(c) => c.to_string(),
        None => match key {
            Key::Unknown(code) => format!("<{}>", code),
            other => format!("{:?}", other).to_ascii_lowercase(),
        },
    }
}

fn single_printable(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(c),
        _ => None,
    }
}

fn symbolic_name(key: Key) -> Option<&'static str> {
    let name = match key {
        Key::Alt => "alt",
        Key::AltGr => "alt_gr",
        Key::Backspace => "backspace",
        Key::CapsLock => "caps_lock",
        Key::ControlLeft => "ctrl_l",
        Key::ControlRight => "ctrl_r",
        Key::Delete | Key::KpDelete => "delete",
        Key::DownArrow => "down",
        Key::End => "end",
        Key::Escape => "esc",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        Key::Home => "home",
        Key::LeftArrow => "left",
        Key::MetaLeft => "cmd",
        Key::MetaRight => "cmd_r",
        Key::PageDown => "page_down",
        Key::PageUp => "page_up",
        Key::Return | Key::KpReturn => "enter",
        Key::RightArrow => "right",
        Key::ShiftLeft => "shift",
        Key::ShiftRight => "shift_r",
        Key::Space => "space",
        Key::Tab => "tab",
        Key::UpArrow => "up",
        Key::PrintScreen => "print_screen",
        Key::ScrollLock => "scroll_lock",
        Key::Pause => "pause",
        Key::NumLock => "num_lock",
        Key::Insert => "insert",
        Key::Function => "fn",
        _ => return None,
    };
    Some(name)
}

fn physical_char(key: Key) -> Option<char> {
    let c = match key {
        Key::KeyA => 'a',
        Key::KeyB => 'b',
        Key::KeyC => 'c',
        Key::KeyD => 'd',
        Key::KeyE => 'e',
        Key::KeyF => 'f',
        Key::KeyG => 'g',
        Key::KeyH => 'h',
        Key::KeyI => 'i',
        Key::KeyJ => 'j',
        Key::KeyK => 'k',
        Key::KeyL => 'l',
        Key::KeyM => 'm',
        Key::KeyN => 'n',
        Key::KeyO => 'o',
        Key::KeyP => 'p',
        Key::KeyQ => 'q',
        Key::KeyR => 'r',
        Key::KeyS => 's',
        Key::KeyT => 't',
        Key::KeyU => 'u',
        Key::KeyV => 'v',
        Key::KeyW => 'w',
        Key::KeyX => 'x',
        Key::KeyY => 'y',
        Key::KeyZ => 'z',
        Key::Num0 | Key::Kp0 => '0',
        Key::Num1 | Key::Kp1 => '1',
        Key::Num2 | Key::Kp2 => '2',
        Key::Num3 | Key::Kp3 => '3',
        Key::Num4 | Key::Kp4 => '4',
        Key::Num5 | Key::Kp5 => '5',
        Key::Num6 | Key::Kp6 => '6',
        Key::Num7 | Key::Kp7 => '7',
        Key::Num8 | Key::Kp8 => '8',
        Key::Num9 | Key::Kp9 => '9',
        Key::BackQuote => '`',
        Key::Minus | Key::KpMinus => '-',
        Key::Equal => '=',
        Key::KpPlus => '+',
        Key::KpMultiply => '*',
        Key::KpDivide | Key::Slash => '/',
        Key::LeftBracket => '[',
        Key::RightBracket => ']',
        Key::SemiColon => ';',
        Key::Quote => '\'',
        Key::BackSlash | Key::IntlBackslash => '\\',
        Key::Comma => ',',
        Key::Dot => '.',
        _ => return None,
    };
    Some(c)
}
