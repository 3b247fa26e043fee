use crate::{
    CoreError, Event, Timeline, TimelineEntry,
    timeline::codec::{self, RecordFormat},
};

use serde_json::{Value, json};

const TOLERANCE: f64 = 1e-9;

fn deltas(timeline: &Timeline) -> Vec<f64> {
    timeline.iter().map(|e| e.delta).collect()
}

fn assert_deltas(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < TOLERANCE, "{:?} vs {:?}", actual, expected);
    }
}

fn as_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(records) => records,
        other => vec![other],
    }
}

/// WHAT: Legacy absolute timestamps become relative deltas
/// WHY: Older recordings store `t` since capture start instead of `dt`
#[test]
#[allow(clippy::unwrap_used)]
fn given_legacy_timestamps_when_decoding_then_consecutive_differences_returned() {
    // Given: Three legacy records at t = 0, 0.5, 1.2
    let records = as_records(json!([
        {"t": 0.0, "type": "move", "x": 1, "y": 1},
        {"t": 0.5, "type": "move", "x": 2, "y": 2},
        {"t": 1.2, "type": "move", "x": 3, "y": 3},
    ]));

    // When: Decoding
    let timeline = codec::decode(&records).unwrap();

    // Then: Deltas are 0, 0.5, 0.7
    assert_eq!(codec::detect_format(&records), RecordFormat::LegacyAbsolute);
    assert_deltas(&deltas(&timeline), &[0.0, 0.5, 0.7]);
}

/// WHAT: Non-monotonic legacy timestamps never produce negative deltas
/// WHY: Delta non-negativity must hold even for corrupted clocks
#[test]
#[allow(clippy::unwrap_used)]
fn given_non_monotonic_legacy_timestamps_when_decoding_then_deltas_clamped_to_zero() {
    // Given: Timestamps that go backwards in the middle
    let records = as_records(json!([
        {"t": 1.0, "type": "key", "key": "a", "pressed": true},
        {"t": 0.5, "type": "key", "key": "a", "pressed": false},
        {"t": 2.0, "type": "scroll", "dx": 0, "dy": -1},
    ]));

    // When: Decoding
    let timeline = codec::decode(&records).unwrap();

    // Then: The backwards step is zero and the clock follows the raw timestamps
    assert!(timeline.iter().all(|e| e.delta >= 0.0));
    assert_deltas(&deltas(&timeline), &[1.0, 0.0, 1.5]);
}

/// WHAT: A legacy record without `t` reuses the previous timestamp
/// WHY: Matches how older recordings with gaps were replayed
#[test]
#[allow(clippy::unwrap_used)]
fn given_legacy_record_missing_t_when_decoding_then_delta_is_zero() {
    let records = as_records(json!([
        {"t": 0.4, "type": "move", "x": 0, "y": 0},
        {"type": "move", "x": 1, "y": 1},
        {"t": 1.0, "type": "move", "x": 2, "y": 2},
    ]));

    let timeline = codec::decode(&records).unwrap();

    assert_deltas(&deltas(&timeline), &[0.4, 0.0, 0.6]);
}

/// WHAT: Delta-tagged records are coerced to non-negative floats
/// WHY: Hand-edited files may carry strings, negatives, or omit `dt`
#[test]
#[allow(clippy::unwrap_used)]
fn given_delta_records_with_odd_values_when_decoding_then_coerced() {
    // Given: dt as string, negative, missing, and integer
    let records = as_records(json!([
        {"dt": "0.25", "type": "move", "x": 0, "y": 0},
        {"dt": -3.0, "type": "move", "x": 0, "y": 0},
        {"type": "move", "x": 0, "y": 0},
        {"dt": 2, "type": "move", "x": 0, "y": 0},
    ]));

    // When: Decoding
    let timeline = codec::decode(&records).unwrap();

    // Then: All deltas are finite and non-negative
    assert_eq!(codec::detect_format(&records), RecordFormat::Delta);
    assert_deltas(&deltas(&timeline), &[0.25, 0.0, 0.0, 2.0]);
}

/// WHAT: Every event kind decodes into its typed payload
/// WHY: Playback dispatches on the typed event
#[test]
#[allow(clippy::unwrap_used)]
fn given_each_event_kind_when_decoding_then_payload_preserved() {
    let records = as_records(json!([
        {"dt": 0.1, "type": "move", "x": 10, "y": 20},
        {"dt": 0.1, "type": "click", "x": 10, "y": 20, "button": "right", "pressed": true},
        {"dt": 0.1, "type": "scroll", "dx": 0, "dy": 3},
        {"dt": 0.1, "type": "key", "key": "Key.esc", "pressed": false},
    ]));

    let timeline = codec::decode(&records).unwrap();
    let events: Vec<&Event> = timeline.iter().map(|e| &e.event).collect();

    assert_eq!(*events[0], Event::Move { x: 10, y: 20 });
    assert_eq!(
        *events[1],
        Event::Click {
            x: 10,
            y: 20,
            button: "right".to_string(),
            pressed: true
        }
    );
    assert_eq!(*events[2], Event::Scroll { dx: 0, dy: 3 });
    // Legacy symbolic key names are canonicalized
    assert_eq!(
        *events[3],
        Event::Key {
            key: "esc".to_string(),
            pressed: false
        }
    );
}

/// WHAT: Missing type tag is rejected with the record index
/// WHY: No partial playback may start from a malformed timeline
#[test]
fn given_record_without_type_when_decoding_then_malformed_input_at_index() {
    let records = as_records(json!([
        {"dt": 0.1, "type": "move", "x": 1, "y": 1},
        {"dt": 0.1, "x": 1, "y": 1},
    ]));

    let result = codec::decode(&records);

    assert!(matches!(
        result,
        Err(CoreError::MalformedInput { index: Some(1), .. })
    ));
}

/// WHAT: Payload fields of the wrong type are rejected
/// WHY: A string coordinate cannot be synthesized
#[test]
fn given_wrong_payload_type_when_decoding_then_malformed_input() {
    let records = as_records(json!([
        {"dt": 0.1, "type": "move", "x": "left", "y": 1},
    ]));

    assert!(matches!(
        codec::decode(&records),
        Err(CoreError::MalformedInput { index: Some(0), .. })
    ));
}

/// WHAT: Unknown type tags and non-object records are rejected
/// WHY: The codec must not guess what an unrecognized record means
#[test]
fn given_unknown_tag_or_non_object_when_decoding_then_malformed_input() {
    let unknown = as_records(json!([{"dt": 0.0, "type": "teleport", "x": 1, "y": 1}]));
    let scalar = as_records(json!([{"dt": 0.0, "type": "move", "x": 1, "y": 1}, 42]));
    let bad_dt = as_records(json!([{"dt": true, "type": "move", "x": 1, "y": 1}]));

    assert!(matches!(
        codec::decode(&unknown),
        Err(CoreError::MalformedInput { index: Some(0), .. })
    ));
    assert!(matches!(
        codec::decode(&scalar),
        Err(CoreError::MalformedInput { index: Some(1), .. })
    ));
    assert!(matches!(
        codec::decode(&bad_dt),
        Err(CoreError::MalformedInput { index: Some(0), .. })
    ));
}

/// WHAT: Encode then decode yields the same deltas and events
/// WHY: The canonical form must be lossless for playback
#[test]
#[allow(clippy::unwrap_used)]
fn given_timeline_when_encoding_and_decoding_then_identical() {
    // Given: A timeline with every kind and fractional deltas
    let timeline: Timeline = vec![
        TimelineEntry::new(0.0, Event::Move { x: 5, y: 6 }),
        TimelineEntry::new(
            0.123_456,
            Event::Click {
                x: 5,
                y: 6,
                button: "left".to_string(),
                pressed: true,
            },
        ),
        TimelineEntry::new(1.5, Event::Scroll { dx: -2, dy: 1 }),
        TimelineEntry::new(
            0.010_1,
            Event::Key {
                key: "q".to_string(),
                pressed: true,
            },
        ),
    ]
    .into();

    // When: Round-tripping through records and through a JSON string
    let from_records = codec::decode(&codec::encode(&timeline)).unwrap();
    let from_string = codec::from_json_str(&codec::to_json_string(&timeline).unwrap()).unwrap();

    // Then: Both match the original
    assert_eq!(from_records, timeline);
    assert_deltas(&deltas(&from_string), &deltas(&timeline));
    let string_events: Vec<&Event> = from_string.iter().map(|e| &e.event).collect();
    let original_events: Vec<&Event> = timeline.iter().map(|e| &e.event).collect();
    assert_eq!(string_events, original_events);
}

/// WHAT: Canonical records carry `dt` and `type` fields
/// WHY: The persisted form is what other tools and older versions read
#[test]
#[allow(clippy::unwrap_used)]
fn given_timeline_when_serializing_then_records_are_delta_tagged() {
    let timeline: Timeline = vec![TimelineEntry::new(0.5, Event::Scroll { dx: 0, dy: 2 })].into();

    let json = codec::to_json_string(&timeline).unwrap();
    let parsed: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, json!([{"dt": 0.5, "type": "scroll", "dx": 0, "dy": 2}]));
    assert!(json.find("\"dt\"").unwrap() < json.find("\"type\"").unwrap());
}

/// WHAT: Documents that are not arrays are rejected
/// WHY: A timeline is always an ordered list of records
#[test]
fn given_non_array_document_when_parsing_then_malformed_input() {
    assert!(matches!(
        codec::from_json_str(r#"{"dt": 0, "type": "move"}"#),
        Err(CoreError::MalformedInput { index: None, .. })
    ));
    assert!(matches!(
        codec::from_json_str("not json"),
        Err(CoreError::MalformedInput { index: None, .. })
    ));
}

/// WHAT: An empty array decodes to an empty timeline
/// WHY: Recording nothing then pressing ESC is valid
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_array_when_parsing_then_empty_timeline() {
    let timeline = codec::from_json_str("[]").unwrap();

    assert!(timeline.is_empty());
}
