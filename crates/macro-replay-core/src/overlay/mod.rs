mod controller;
mod status_slot;

pub use {
    controller::{
        DEFAULT_TICK, FINAL_STATUS, OverlayController, OverlayEnd, drive_surface,
        format_remaining,
    },
    status_slot::StatusSlot,
};
