//! Macro-replay Core Library
//!
//! Input timeline model plus the capture and replay engine: delta-time
//! normalization, pointer-move compaction, an abortable playback scheduler,
//! and a countdown overlay that runs beside it without touching its timing.
//!
//! The platform input stack is reached only through the traits in
//! [`capability`], so every piece here runs against fakes in tests.
//!
//! # Example
//!
//! ```no_run
//! use macro_replay_core::{
//!     AbortState, CoreResult, PlaybackScheduler,
//!     capability::InputInjector,
//!     timeline::codec,
//! };
//!
//! fn replay(json: &str, injector: &mut dyn InputInjector) -> CoreResult<()> {
//!     let timeline = codec::from_json_str(json)?;
//!     let scheduler = PlaybackScheduler::new(timeline, 2.0, AbortState::new());
//!
//!     let outcome = scheduler.run(injector)?;
//!     println!("Dispatched {} events", outcome.dispatched);
//!     Ok(())
//! }
//! ```

mod abort;
pub mod capability;
mod capture;
mod error;
pub mod keys;
pub mod overlay;
mod playback;
pub mod timeline;

pub use {
    abort::{AbortDecision, AbortState, SYNTHESIS_ECHO_GRACE, SynthesisGuard},
    capture::{CaptureOutcome, CaptureSession, CaptureState, DestinationCheck, StopReason},
    error::{CoreError, Result as CoreResult},
    overlay::{OverlayController, OverlayEnd, StatusSlot},
    playback::{
        DEFAULT_POLL_INTERVAL, HeldInput, MIN_POLL_INTERVAL, MIN_SPEED, PlaybackOutcome,
        PlaybackScheduler, PlaybackStatus,
    },
    timeline::{Event, MouseButton, Timeline, TimelineEntry},
};

#[cfg(test)]
mod tests;
