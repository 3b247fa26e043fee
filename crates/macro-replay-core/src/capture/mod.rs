mod capture_state;
mod session;

pub use {
    capture_state::{CaptureState, DestinationCheck, StopReason},
    session::{CaptureOutcome, CaptureSession},
};
