pub mod codec;
pub mod compactor;
mod event;

pub(crate) use event::clamp_delta;

pub use event::{Event, MouseButton, Timeline, TimelineEntry};
