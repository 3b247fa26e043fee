use crate::{
    Event, Timeline, TimelineEntry,
    timeline::compactor::{compact, compact_with_stats},
};

use proptest::prelude::*;

const TOLERANCE: f64 = 1e-9;

fn mv(delta: f64) -> TimelineEntry {
    TimelineEntry::new(delta, Event::Move { x: 1, y: 1 })
}

fn click(delta: f64) -> TimelineEntry {
    TimelineEntry::new(
        delta,
        Event::Click {
            x: 1,
            y: 1,
            button: "left".to_string(),
            pressed: true,
        },
    )
}

fn key(delta: f64, name: &str) -> TimelineEntry {
    TimelineEntry::new(
        delta,
        Event::Key {
            key: name.to_string(),
            pressed: true,
        },
    )
}

/// Cumulative time at each non-move entry, in order.
fn non_move_offsets(timeline: &Timeline) -> Vec<(f64, Event)> {
    let mut elapsed = 0.0;
    let mut offsets = Vec::new();
    for entry in timeline {
        elapsed += entry.delta;
        if !entry.event.is_move() {
            offsets.push((elapsed, entry.event.clone()));
        }
    }
    offsets
}

fn assert_same_offsets(before: &Timeline, after: &Timeline) {
    let before = non_move_offsets(before);
    let after = non_move_offsets(after);
    assert_eq!(before.len(), after.len());
    for ((b, be), (a, ae)) in before.iter().zip(&after) {
        assert_eq!(be, ae);
        assert!((a - b).abs() < TOLERANCE, "offset {} became {}", b, a);
    }
}

/// WHAT: Three moves before a click collapse into one carrying their time
/// WHY: Cumulative time to the click (0.5s) must be unchanged
#[test]
fn given_move_run_before_click_when_compacting_with_one_then_single_move_keeps_time() {
    // Given: move 0.1, move 0.1, move 0.1, click 0.2
    let raw: Timeline = vec![mv(0.1), mv(0.1), mv(0.1), click(0.2)].into();

    // When: Compacting with keep_moves = 1
    let compacted = compact(&raw, 1);

    // Then: move 0.3, click 0.2
    assert_eq!(compacted.len(), 2);
    assert!(compacted.entries()[0].event.is_move());
    assert!((compacted.entries()[0].delta - 0.3).abs() < TOLERANCE);
    assert!((compacted.entries()[1].delta - 0.2).abs() < TOLERANCE);
    assert_same_offsets(&raw, &compacted);
}

/// WHAT: With keep_moves = 0 the run's time folds into the next non-move entry
/// WHY: Removing every move must not make the click happen earlier
#[test]
fn given_move_run_when_compacting_with_zero_then_time_folds_into_click() {
    let raw: Timeline = vec![mv(0.1), mv(0.2), click(0.3), key(0.0, "a")].into();

    let compacted = compact(&raw, 0);

    assert_eq!(compacted.len(), 2);
    assert_eq!(compacted.move_count(), 0);
    assert!((compacted.entries()[0].delta - 0.6).abs() < TOLERANCE);
    assert_same_offsets(&raw, &compacted);
}

/// WHAT: Keeping more moves than the run holds keeps the run unchanged
/// WHY: Short runs carry no redundancy to remove
#[test]
fn given_short_run_when_keep_exceeds_run_then_run_unchanged() {
    let raw: Timeline = vec![mv(0.1), mv(0.2), click(0.3)].into();

    let compacted = compact(&raw, 5);

    assert_eq!(compacted, raw);
}

/// WHAT: A trailing move run is dropped entirely
/// WHY: No later event needs its time; nothing trails the final event
#[test]
fn given_trailing_move_run_when_compacting_then_no_moves_trail_last_event() {
    let raw: Timeline = vec![click(0.1), key(0.1, "b"), mv(0.5), mv(0.5)].into();

    let (compacted, stats) = compact_with_stats(&raw, 1);

    assert_eq!(compacted.len(), 2);
    assert!(!compacted.entries()[1].event.is_move());
    assert_eq!(stats.dropped_moves, 2);
    assert_eq!(stats.input_len, 4);
    assert_eq!(stats.output_len, 2);
}

/// WHAT: Keeping two moves adds the dropped time to the first kept one
/// WHY: The path before a click keeps its last segments with original spacing
#[test]
fn given_long_run_when_keeping_two_then_first_kept_absorbs_dropped_time() {
    let raw: Timeline = vec![mv(0.1), mv(0.2), mv(0.3), mv(0.4), click(0.5)].into();

    let compacted = compact(&raw, 2);
    let kept: Vec<f64> = compacted.iter().map(|e| e.delta).collect();

    assert_eq!(kept.len(), 3);
    assert!((kept[0] - 0.6).abs() < TOLERANCE);
    assert!((kept[1] - 0.4).abs() < TOLERANCE);
    assert!((kept[2] - 0.5).abs() < TOLERANCE);
    assert_same_offsets(&raw, &compacted);
}

/// WHAT: A timeline without moves is returned unchanged
/// WHY: Compaction must only ever touch move entries
#[test]
fn given_no_moves_when_compacting_then_unchanged() {
    let raw: Timeline = vec![key(0.2, "x"), click(0.1), key(0.0, "y")].into();

    assert_eq!(compact(&raw, 0), raw);
    assert_eq!(compact(&raw, 1), raw);
}

fn arb_entry() -> impl Strategy<Value = TimelineEntry> {
    (0u8..4, 0.0f64..2.0).prop_map(|(kind, delta)| match kind {
        0 | 1 => mv(delta),
        2 => click(delta),
        _ => key(delta, "k"),
    })
}

proptest! {
    /// Cumulative time to every non-move entry survives compaction for any keep_moves.
    #[test]
    fn compaction_preserves_non_move_offsets(
        entries in proptest::collection::vec(arb_entry(), 0..64),
        keep_moves in 0usize..5,
    ) {
        let raw: Timeline = entries.into();
        let compacted = compact(&raw, keep_moves);

        let before = non_move_offsets(&raw);
        let after = non_move_offsets(&compacted);
        prop_assert_eq!(before.len(), after.len());
        for ((b, be), (a, ae)) in before.iter().zip(&after) {
            prop_assert_eq!(be, ae);
            prop_assert!((a - b).abs() < TOLERANCE);
        }
    }

    /// With keep_moves = 1 at most one move precedes any non-move entry and none trail.
    #[test]
    fn compaction_with_one_bounds_move_runs(
        entries in proptest::collection::vec(arb_entry(), 0..64),
    ) {
        let compacted = compact(&entries.into(), 1);

        let mut run = 0usize;
        for entry in &compacted {
            if entry.event.is_move() {
                run += 1;
                prop_assert!(run <= 1);
            } else {
                run = 0;
            }
        }
        prop_assert_eq!(run, 0);
    }
}
