mod playback_config;
mod recording_config;
#[allow(clippy::module_inception)]
mod config;

pub(crate) use {
    config::Config,
    playback_config::{DialogMode, PlaybackConfig},
    recording_config::RecordingConfig,
};

pub(crate) const DEFAULT_ABORT_KEY: &str = macro_replay_core::keys::ABORT_KEY;
pub(crate) const DEFAULT_TIMELINE_PATH: &str = "macro.json";
pub(crate) const DEFAULT_SPEED: f64 = 1.0;
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 5;
pub(crate) const DEFAULT_OVERLAY_TICK_MS: u64 = 250;

pub(crate) fn default_abort_key() -> String {
    DEFAULT_ABORT_KEY.to_string()
}

pub(crate) fn default_timeline_path() -> std::path::PathBuf {
    std::path::PathBuf::from(DEFAULT_TIMELINE_PATH)
}

pub(crate) fn default_speed() -> f64 {
    DEFAULT_SPEED
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub(crate) fn default_overlay_tick_ms() -> u64 {
    DEFAULT_OVERLAY_TICK_MS
}
