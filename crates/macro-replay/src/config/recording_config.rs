use crate::config::{default_abort_key, default_timeline_path};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Key that stops recording and playback.
    #[serde(default = "default_abort_key")]
    pub abort_key: String,

    /// Moves kept before each non-move event (None = keep every move).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_moves: Option<usize>,

    /// Timeline file used when no path is given on the command line.
    #[serde(default = "default_timeline_path")]
    pub default_path: PathBuf,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            abort_key: default_abort_key(),
            keep_moves: None,
            default_path: default_timeline_path(),
        }
    }
}
