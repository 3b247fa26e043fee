use error_location::ErrorLocation;
use thiserror::Error;

/// Timeline, capture, and playback errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A stored timeline record is unrecognized or type-inconsistent.
    #[error("Malformed timeline record {index:?}: {reason} {location}")]
    MalformedInput {
        /// Index of the offending record, if the failure is record-specific.
        index: Option<usize>,
        /// Description of what was wrong with the record.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The platform input listener could not be acquired.
    #[error("Input listener unavailable: {reason} {location}")]
    ListenerUnavailable {
        /// Description of the listener failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The platform input injector could not be acquired.
    #[error("Input injector unavailable: {reason} {location}")]
    InjectorUnavailable {
        /// Description of the injector failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Synthesizing an input action failed.
    #[error("Input injection failed: {reason} {location}")]
    InjectionFailed {
        /// Description of the injection failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A recorded key name has no platform equivalent.
    #[error("Unknown key name: {key:?} {location}")]
    UnknownKey {
        /// The canonical key name that could not be mapped.
        key: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The status surface could not be created or stopped working.
    #[error("Status overlay unavailable: {reason} {location}")]
    OverlayUnavailable {
        /// Description of the surface failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An internal channel closed unexpectedly.
    #[error("Channel closed: {message} {location}")]
    ChannelClosed {
        /// Human-readable error message.
        message: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
