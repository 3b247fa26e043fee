//! Reading and writing timeline files.

use crate::{AppError, AppResult};

use std::{fs, io::Write, panic::Location, path::Path};

use error_location::ErrorLocation;
use macro_replay_core::{Timeline, timeline::codec};
use tracing::{debug, info, instrument};

/// Read and decode the timeline at `path`.
///
/// Both the canonical delta form and legacy absolute timestamps are accepted.
#[track_caller]
#[instrument]
pub fn load(path: &Path) -> AppResult<Timeline> {
    let contents = fs::read_to_string(path).map_err(|e| AppError::TimelineStore {
        path: path.to_path_buf(),
        reason: format!("Failed to read timeline: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let timeline = codec::from_json_str(&contents)?;

    info!(event_count = timeline.len(), "Loaded {} events", timeline.len());

    Ok(timeline)
}

/// Encode `timeline` and write it to `path` atomically.
#[track_caller]
#[instrument(skip(timeline), fields(event_count = timeline.len()))]
pub fn save(path: &Path, timeline: &Timeline) -> AppResult<()> {
    let caller = Location::caller();
    let store_error = |reason: String| AppError::TimelineStore {
        path: path.to_path_buf(),
        reason,
        location: ErrorLocation::from(caller),
    };

    let contents = codec::to_json_string(timeline)?;

    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent)?;
            debug!(dir = ?parent, "Created timeline directory");
        }
        _ => {}
    }

    let temp_path = path.with_extension("json.tmp");

    let mut temp_file = fs::File::create(&temp_path)
        .map_err(|e| store_error(format!("Failed to create temp file: {}", e)))?;

    temp_file
        .write_all(contents.as_bytes())
        .map_err(|e| store_error(format!("Failed to write temp file: {}", e)))?;

    temp_file
        .sync_all()
        .map_err(|e| store_error(format!("Failed to sync temp file: {}", e)))?;

    fs::rename(&temp_path, path)
        .map_err(|e| store_error(format!("Failed to rename temp file to final: {}", e)))?;

    info!(path = ?path, "Saved {} events", timeline.len());

    Ok(())
}
