//! Conversion between stored event records and [`Timeline`].
//!
//! The canonical stored form is a JSON array of records, each carrying the
//! delay since the previous record in `dt`. Older recordings carry an absolute
//! `t` (seconds since capture start) instead; those are detected from the first
//! record and converted to deltas on the way in.

use crate::{
    CoreError, CoreResult,
    keys::canonical_key_name,
    timeline::{Event, Timeline, TimelineEntry, clamp_delta},
};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

const DELTA_FIELD: &str = "dt";
const LEGACY_TIME_FIELD: &str = "t";
const TYPE_FIELD: &str = "type";

/// Which timing field the stored records use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// Records carry `dt`, the delay since the previous record.
    Delta,
    /// Records carry `t`, an absolute timestamp since capture start.
    LegacyAbsolute,
}

/// Detect the record format from the first record.
///
/// An empty list is treated as [`RecordFormat::Delta`].
pub fn detect_format(records: &[Value]) -> RecordFormat {
    match records.first() {
        Some(Value::Object(first)) if !first.contains_key(DELTA_FIELD) => {
            RecordFormat::LegacyAbsolute
        }
        _ => RecordFormat::Delta,
    }
}

/// Decode parsed event records into a timeline.
///
/// # Errors
///
/// Returns [`CoreError::MalformedInput`] if a record is not an object, is
/// missing its `type` tag, has an unknown tag, or carries payload or timing
/// fields of the wrong type.
#[track_caller]
#[instrument(skip(records), fields(record_count = records.len()))]
pub fn decode(records: &[Value]) -> CoreResult<Timeline> {
    let format = detect_format(records);
    let mut timeline = Timeline::new();
    let mut prev_t = 0.0_f64;

    for (index, record) in records.iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(malformed(index, "record is not an object"));
        };

        let delta = match format {
            RecordFormat::Delta => {
                clamp_delta(seconds_field(fields, DELTA_FIELD, index)?.unwrap_or(0.0))
            }
            RecordFormat::LegacyAbsolute => {
                let t = seconds_field(fields, LEGACY_TIME_FIELD, index)?.unwrap_or(prev_t);
                let delta = clamp_delta(t - prev_t);
                prev_t = t;
                delta
            }
        };

        let event = decode_event(fields, index)?;
        timeline.push(TimelineEntry { delta, event });
    }

    debug!(?format, entry_count = timeline.len(), "Timeline decoded");

    Ok(timeline)
}

/// Encode a timeline into canonical `dt`-tagged records.
pub fn encode(timeline: &Timeline) -> Vec<Value> {
    timeline
        .iter()
        .map(|entry| {
            let dt = entry.delta;
            match &entry.event {
                Event::Move { x, y } => json!({"dt": dt, "type": "move", "x": x, "y": y}),
                Event::Click {
                    x,
                    y,
                    button,
                    pressed,
                } => json!({
                    "dt": dt,
                    "type": "click",
                    "x": x,
                    "y": y,
                    "button": button,
                    "pressed": pressed,
                }),
                Event::Scroll { dx, dy } => {
                    json!({"dt": dt, "type": "scroll", "dx": dx, "dy": dy})
                }
                Event::Key { key, pressed } => {
                    json!({"dt": dt, "type": "key", "key": key, "pressed": pressed})
                }
            }
        })
        .collect()
}

/// Parse a JSON document holding an array of records and decode it.
///
/// # Errors
///
/// Returns [`CoreError::MalformedInput`] if the document is not valid JSON, is
/// not an array, or any record fails to decode.
#[track_caller]
pub fn from_json_str(json: &str) -> CoreResult<Timeline> {
    let document: Value = serde_json::from_str(json).map_err(|e| CoreError::MalformedInput {
        index: None,
        reason: format!("Invalid JSON: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let Value::Array(records) = document else {
        return Err(CoreError::MalformedInput {
            index: None,
            reason: "Timeline document must be a JSON array".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    };

    decode(&records)
}

/// Serialize a timeline to a pretty-printed JSON array in canonical form.
///
/// Field order within each record is `dt`, `type`, then the payload.
///
/// # Errors
///
/// Returns [`CoreError::MalformedInput`] if serialization fails.
#[track_caller]
pub fn to_json_string(timeline: &Timeline) -> CoreResult<String> {
    #[derive(Serialize)]
    struct Record<'a> {
        dt: f64,
        #[serde(flatten)]
        event: &'a Event,
    }

    let records: Vec<Record<'_>> = timeline
        .iter()
        .map(|entry| Record {
            dt: entry.delta,
            event: &entry.event,
        })
        .collect();

    serde_json::to_string_pretty(&records).map_err(|e| CoreError::MalformedInput {
        index: None,
        reason: format!("Failed to serialize timeline: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn decode_event(fields: &Map<String, Value>, index: usize) -> CoreResult<Event> {
    match fields.get(TYPE_FIELD) {
        Some(Value::String(_)) => {}
        Some(_) => return Err(malformed(index, "type tag is not a string")),
        None => return Err(malformed(index, "missing type tag")),
    }

    let mut payload = fields.clone();
    payload.remove(DELTA_FIELD);
    payload.remove(LEGACY_TIME_FIELD);

    let event: Event = serde_json::from_value(Value::Object(payload))
        .map_err(|e| malformed(index, &e.to_string()))?;

    Ok(match event {
        Event::Key { key, pressed } => Event::Key {
            key: canonical_key_name(&key),
            pressed,
        },
        other => other,
    })
}

/// Read a seconds value, accepting numbers and numeric strings.
#[track_caller]
fn seconds_field(
    fields: &Map<String, Value>,
    name: &str,
    index: usize,
) -> CoreResult<Option<f64>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| malformed(index, &format!("`{}` is not representable", name))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| malformed(index, &format!("`{}` is not a number: {:?}", name, s))),
        Some(other) => Err(malformed(
            index,
            &format!("`{}` has wrong type: {}", name, other),
        )),
    }
}

#[track_caller]
fn malformed(index: usize, reason: &str) -> CoreError {
    CoreError::MalformedInput {
        index: Some(index),
        reason: reason.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}
