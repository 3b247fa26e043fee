use serde::{Deserialize, Serialize};

/// A single recorded input action.
///
/// Serialized with an internal `type` tag so that a stored record reads as
/// `{"type": "click", "x": 10, "y": 20, "button": "left", "pressed": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    /// Absolute pointer move.
    Move {
        /// Horizontal screen coordinate.
        x: i32,
        /// Vertical screen coordinate.
        y: i32,
    },
    /// Pointer button press or release at a position.
    Click {
        /// Horizontal screen coordinate.
        x: i32,
        /// Vertical screen coordinate.
        y: i32,
        /// Button name as recorded (`left`, `right`, `middle`, ...).
        button: String,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Scroll wheel ticks. Positive `dy` scrolls up, positive `dx` right.
    Scroll {
        /// Horizontal ticks.
        dx: i32,
        /// Vertical ticks.
        dy: i32,
    },
    /// Keyboard press or release.
    Key {
        /// Canonical key name, see [`crate::keys`].
        key: String,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
}

impl Event {
    /// Whether this is a pointer move, the only kind the compactor may drop.
    pub fn is_move(&self) -> bool {
        matches!(self, Event::Move { .. })
    }

    /// Short kind label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Move { .. } => "move",
            Event::Click { .. } => "click",
            Event::Scroll { .. } => "scroll",
            Event::Key { .. } => "key",
        }
    }
}

/// Pointer buttons the injector knows how to press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
    /// Side "back" button.
    Back,
    /// Side "forward" button.
    Forward,
}

impl MouseButton {
    /// Resolve a recorded button name. Unknown names fall back to [`MouseButton::Left`].
    pub fn from_name(name: &str) -> Self {
        let name = name.strip_prefix("Button.").unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "right" => MouseButton::Right,
            "middle" => MouseButton::Middle,
            "back" | "x1" | "button8" => MouseButton::Back,
            "forward" | "x2" | "button9" => MouseButton::Forward,
            _ => MouseButton::Left,
        }
    }

    /// Canonical name written to timelines.
    pub fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
            MouseButton::Back => "back",
            MouseButton::Forward => "forward",
        }
    }
}

/// An event together with the time elapsed since the previous entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    /// Seconds since the previous entry (or since capture start). Never negative.
    pub delta: f64,
    /// The recorded action.
    pub event: Event,
}

impl TimelineEntry {
    /// Create an entry, clamping negative or non-finite deltas to zero.
    pub fn new(delta: f64, event: Event) -> Self {
        Self {
            delta: clamp_delta(delta),
            event,
        }
    }
}

/// Clamp a delta to a finite, non-negative number of seconds.
pub(crate) fn clamp_delta(delta: f64) -> f64 {
    if delta.is_finite() && delta > 0.0 {
        delta
    } else {
        0.0
    }
}

/// Ordered sequence of timeline entries. Insertion order is temporal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end of the timeline.
    pub fn push(&mut self, entry: TimelineEntry) {
        self.entries.push(entry);
    }

    /// Entries in temporal order.
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Iterate entries in temporal order.
    pub fn iter(&self) -> std::slice::Iter<'_, TimelineEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the timeline has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all deltas, in seconds.
    pub fn total_delta(&self) -> f64 {
        self.entries.iter().map(|e| e.delta).sum()
    }

    /// Number of pointer-move entries.
    pub fn move_count(&self) -> usize {
        self.entries.iter().filter(|e| e.event.is_move()).count()
    }

    /// Consume the timeline, returning its entries.
    pub fn into_entries(self) -> Vec<TimelineEntry> {
        self.entries
    }
}

impl From<Vec<TimelineEntry>> for Timeline {
    fn from(entries: Vec<TimelineEntry>) -> Self {
        Self { entries }
    }
}

impl FromIterator<TimelineEntry> for Timeline {
    fn from_iter<I: IntoIterator<Item = TimelineEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineEntry;
    type IntoIter = std::slice::Iter<'a, TimelineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
