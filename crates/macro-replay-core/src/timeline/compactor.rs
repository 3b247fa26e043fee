//! Pointer-move compaction.
//!
//! A raw capture carries a move entry for every pointer sample, which is
//! mostly noise for replay. Compaction collapses each run of consecutive moves
//! down to its last `keep_moves` entries. The time of the dropped moves is
//! never lost: it is folded into the first kept move, or into the non-move
//! entry that ends the run when nothing is kept, so every click, key and
//! scroll still happens at exactly the same offset from the start.

use crate::timeline::{Timeline, TimelineEntry};

use tracing::{debug, instrument};

/// Moves kept before each non-move entry by default.
pub const DEFAULT_KEEP_MOVES: usize = 1;

/// Entry counts before and after a compaction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    /// Entries in the input timeline.
    pub input_len: usize,
    /// Entries in the output timeline.
    pub output_len: usize,
    /// Move entries removed.
    pub dropped_moves: usize,
}

/// Collapse move runs, keeping at most `keep_moves` moves before each non-move entry.
///
/// A move run at the very end of the timeline is dropped entirely.
pub fn compact(timeline: &Timeline, keep_moves: usize) -> Timeline {
    compact_with_stats(timeline, keep_moves).0
}

/// Same as [`compact`], also returning [`CompactionStats`].
#[instrument(skip(timeline), fields(input_len = timeline.len()))]
pub fn compact_with_stats(timeline: &Timeline, keep_moves: usize) -> (Timeline, CompactionStats) {
    let mut output: Vec<TimelineEntry> = Vec::with_capacity(timeline.len());
    let mut run: Vec<&TimelineEntry> = Vec::new();

    for entry in timeline {
        if entry.event.is_move() {
            run.push(entry);
            continue;
        }

        let carried = flush_run(&mut run, keep_moves, &mut output);
        output.push(TimelineEntry {
            delta: entry.delta + carried,
            event: entry.event.clone(),
        });
    }

    // Nothing follows a trailing run, so its time is not needed.
    let trailing = run.len();

    let compacted = Timeline::from(output);
    let stats = CompactionStats {
        input_len: timeline.len(),
        output_len: compacted.len(),
        dropped_moves: timeline.len() - compacted.len(),
    };

    debug!(
        output_len = stats.output_len,
        dropped_moves = stats.dropped_moves,
        trailing_moves = trailing,
        keep_moves,
        "Move runs compacted"
    );

    (compacted, stats)
}

/// Emit the kept suffix of `run` and return the delta still owed to the next entry.
fn flush_run(
    run: &mut Vec<&TimelineEntry>,
    keep_moves: usize,
    output: &mut Vec<TimelineEntry>,
) -> f64 {
    if run.is_empty() {
        return 0.0;
    }

    let split = run.len().saturating_sub(keep_moves);
    let (dropped, kept) = run.split_at(split);
    let dropped_delta: f64 = dropped.iter().map(|e| e.delta).sum();

    let owed = match kept.split_first() {
        Some((first, rest)) => {
            output.push(TimelineEntry {
                delta: first.delta + dropped_delta,
                event: first.event.clone(),
            });
            output.extend(rest.iter().map(|e| (*e).clone()));
            0.0
        }
        None => dropped_delta,
    };

    run.clear();
    owed
}
