//! Input synthesis backed by `enigo`.
//!
//! `Enigo` is not `Send`; create the injector on the thread that runs
//! playback.

use macro_replay_core::{CoreError, CoreResult, MouseButton, capability::InputInjector};

use std::panic::Location;

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use error_location::ErrorLocation;
use tracing::{debug, instrument};

/// [`InputInjector`] over the platform input stack.
pub struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    /// Connect to the platform input stack.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            CoreError::InjectorUnavailable {
                reason: format!("Failed to initialize input synthesis: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        debug!("Input injector initialized");

        Ok(Self { enigo })
    }

    #[track_caller]
    fn key(&mut self, name: &str, direction: Direction) -> CoreResult<()> {
        let key = key_for_name(name).ok_or_else(|| CoreError::UnknownKey {
            key: name.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.enigo
            .key(key, direction)
            .map_err(|e| CoreError::InjectionFailed {
                reason: format!("Key {} {:?} failed: {}", name, direction, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    #[track_caller]
    fn button(&mut self, button: MouseButton, direction: Direction) -> CoreResult<()> {
        // Reported like an unmapped key so playback skips it.
        let mapped = enigo_button(button).ok_or_else(|| CoreError::UnknownKey {
            key: button.name().to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.enigo
            .button(mapped, direction)
            .map_err(|e| CoreError::InjectionFailed {
                reason: format!("Button {} {:?} failed: {}", button.name(), direction, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl InputInjector for EnigoInjector {
    #[track_caller]
    fn set_pointer_position(&mut self, x: i32, y: i32) -> CoreResult<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| CoreError::InjectionFailed {
                reason: format!("Pointer move to ({}, {}) failed: {}", x, y, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    fn press_button(&mut self, button: MouseButton) -> CoreResult<()> {
        self.button(button, Direction::Press)
    }

    fn release_button(&mut self, button: MouseButton) -> CoreResult<()> {
        self.button(button, Direction::Release)
    }

    #[track_caller]
    fn scroll_by(&mut self, dx: i32, dy: i32) -> CoreResult<()> {
        // enigo scrolls down for positive vertical lengths.
        if dy != 0 {
            self.enigo
                .scroll(dy.saturating_neg(), Axis::Vertical)
                .map_err(|e| CoreError::InjectionFailed {
                    reason: format!("Vertical scroll by {} failed: {}", dy, e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }
        if dx != 0 {
            self.enigo
                .scroll(dx, Axis::Horizontal)
                .map_err(|e| CoreError::InjectionFailed {
                    reason: format!("Horizontal scroll by {} failed: {}", dx, e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
        }
        Ok(())
    }

    fn press_key(&mut self, key: &str) -> CoreResult<()> {
        self.key(key, Direction::Press)
    }

    fn release_key(&mut self, key: &str) -> CoreResult<()> {
        self.key(key, Direction::Release)
    }
}

/// Platform button for `button`; side buttons are unavailable on macOS.
pub(crate) fn enigo_button(button: MouseButton) -> Option<Button> {
    match button {
        MouseButton::Left => Some(Button::Left),
        MouseButton::Right => Some(Button::Right),
        MouseButton::Middle => Some(Button::Middle),
        #[cfg(not(target_os = "macos"))]
        MouseButton::Back => Some(Button::Back),
        #[cfg(not(target_os = "macos"))]
        MouseButton::Forward => Some(Button::Forward),
        #[cfg(target_os = "macos")]
        MouseButton::Back | MouseButton::Forward => None,
    }
}

/// Platform key for a canonical key name, if there is one.
///
/// Side-specific modifiers collapse onto the generic key.
pub(crate) fn key_for_name(name: &str) -> Option<Key> {
    let name = macro_replay_core::keys::canonical_key_name(name);

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(Key::Unicode(c));
    }

    let key = match name.as_str() {
        "alt" | "alt_l" | "alt_r" | "alt_gr" => Key::Alt,
        "backspace" => Key::Backspace,
        "caps_lock" => Key::CapsLock,
        "ctrl" | "ctrl_l" | "ctrl_r" => Key::Control,
        "delete" => Key::Delete,
        "down" => Key::DownArrow,
        "end" => Key::End,
        "enter" => Key::Return,
        "esc" => Key::Escape,
        "home" => Key::Home,
        "left" => Key::LeftArrow,
        "cmd" | "cmd_l" | "cmd_r" => Key::Meta,
        "page_down" => Key::PageDown,
        "page_up" => Key::PageUp,
        "right" => Key::RightArrow,
        "shift" | "shift_l" | "shift_r" => Key::Shift,
        "space" => Key::Space,
        "tab" => Key::Tab,
        "up" => Key::UpArrow,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        #[cfg(not(target_os = "macos"))]
        "insert" => Key::Insert,
        #[cfg(not(target_os = "macos"))]
        "print_screen" => Key::PrintScr,
        #[cfg(not(target_os = "macos"))]
        "num_lock" => Key::Numlock,
        #[cfg(not(target_os = "macos"))]
        "pause" => Key::Pause,
        _ => return None,
    };

    Some(key)
}
