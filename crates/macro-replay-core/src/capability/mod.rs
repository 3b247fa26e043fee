//! Platform capabilities the engine consumes.
//!
//! The engine never touches the OS input stack directly. Listening, injecting,
//! showing status and asking the user are traits here, implemented by the
//! binary against real backends and by tests against fakes.

use crate::{CoreResult, timeline::MouseButton};

use std::{path::Path, time::Instant};

use tokio::sync::mpsc;
use uuid::Uuid;

/// One raw input observation from a listener.
#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    /// Pointer moved to an absolute position.
    Move {
        /// Horizontal screen coordinate.
        x: i32,
        /// Vertical screen coordinate.
        y: i32,
    },
    /// Pointer button pressed or released.
    Click {
        /// Horizontal screen coordinate.
        x: i32,
        /// Vertical screen coordinate.
        y: i32,
        /// Button name as reported by the backend.
        button: String,
        /// `true` for press.
        pressed: bool,
    },
    /// Scroll wheel ticks.
    Scroll {
        /// Horizontal ticks, positive right.
        dx: i32,
        /// Vertical ticks, positive up.
        dy: i32,
    },
    /// Key pressed (canonical name).
    KeyPress {
        /// Canonical key name.
        key: String,
    },
    /// Key released (canonical name).
    KeyRelease {
        /// Canonical key name.
        key: String,
    },
}

/// An input observation stamped with the instant the backend delivered it.
#[derive(Debug, Clone, PartialEq)]
pub struct InputNotification {
    /// Delivery time on the monotonic clock.
    pub at: Instant,
    /// What happened.
    pub input: InputKind,
}

impl InputNotification {
    /// Stamp `input` with the current instant.
    pub fn now(input: InputKind) -> Self {
        Self {
            at: Instant::now(),
            input,
        }
    }
}

/// Ordered stream a listener feeds. Unbounded so the platform hook never blocks.
pub type NotificationSender = mpsc::UnboundedSender<InputNotification>;

/// Receiving end of a [`NotificationSender`].
pub type NotificationReceiver = mpsc::UnboundedReceiver<InputNotification>;

/// Handle returned by [`InputListener::subscribe`].
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    id: Uuid,
}

impl Subscription {
    /// Create a handle with a fresh id.
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Identifier for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of live input notifications.
///
/// Implementations must deliver notifications in true temporal order.
pub trait InputListener: Send {
    /// Start delivering notifications into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::ListenerUnavailable`] if the platform hook
    /// cannot be installed.
    fn subscribe(&mut self, sink: NotificationSender) -> CoreResult<Subscription>;

    /// Stop delivering notifications for `subscription`.
    fn unsubscribe(&mut self, subscription: Subscription);
}

/// Synthesizes input actions on the live input stack.
pub trait InputInjector {
    /// Move the pointer to an absolute position.
    fn set_pointer_position(&mut self, x: i32, y: i32) -> CoreResult<()>;

    /// Press a pointer button.
    fn press_button(&mut self, button: MouseButton) -> CoreResult<()>;

    /// Release a pointer button.
    fn release_button(&mut self, button: MouseButton) -> CoreResult<()>;

    /// Scroll by ticks. Positive `dy` scrolls up, positive `dx` right.
    fn scroll_by(&mut self, dx: i32, dy: i32) -> CoreResult<()>;

    /// Press a key by canonical name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::UnknownKey`] if the name has no platform key.
    fn press_key(&mut self, key: &str) -> CoreResult<()>;

    /// Release a key by canonical name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::UnknownKey`] if the name has no platform key.
    fn release_key(&mut self, key: &str) -> CoreResult<()>;
}

/// Somewhere to show the playback countdown.
pub trait StatusSurface: Send {
    /// Replace the displayed text.
    fn publish(&mut self, text: &str) -> CoreResult<()>;

    /// Tear the surface down. Called once, after the last publish.
    fn dispose(&mut self);
}

/// Asks the user before an existing timeline is overwritten.
pub trait OverwritePrompt {
    /// Return `true` if `path` may be overwritten.
    fn confirm_overwrite(&mut self, path: &Path) -> bool;
}
