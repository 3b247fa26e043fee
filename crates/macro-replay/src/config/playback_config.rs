use crate::config::{default_overlay_tick_ms, default_poll_interval_ms, default_speed};

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Whether to show the remaining-time countdown during playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DialogMode {
    /// Countdown status line on the terminal.
    #[default]
    Overlay,
    /// No countdown.
    None,
}

/// Replay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Speed multiplier (2.0 = twice as fast).
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Longest single sleep while waiting, in milliseconds (1..=5).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Countdown refresh interval, in milliseconds.
    #[serde(default = "default_overlay_tick_ms")]
    pub overlay_tick_ms: u64,

    /// Countdown display mode.
    #[serde(default)]
    pub dialog: DialogMode,
}

impl PlaybackConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn overlay_tick(&self) -> Duration {
        Duration::from_millis(self.overlay_tick_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            poll_interval_ms: default_poll_interval_ms(),
            overlay_tick_ms: default_overlay_tick_ms(),
            dialog: DialogMode::default(),
        }
    }
}
