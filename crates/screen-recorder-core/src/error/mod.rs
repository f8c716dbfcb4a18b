use std::{path::PathBuf, time::Duration};

use error_location::ErrorLocation;
use thiserror::Error;

/// Recording session errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// The selected capture area cannot be recorded.
    #[error("Invalid capture area: {reason} {location}")]
    InvalidArea {
        /// Why the area was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The encoder binary is missing or the OS refused to spawn it.
    #[error("Failed to launch encoder {binary:?}: {reason} {location}")]
    Launch {
        /// Path of the encoder binary.
        binary: PathBuf,
        /// Description of the launch failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The encoder did not exit within the allotted time.
    #[error("Encoder (pid {pid:?}) still running after {waited:?} {location}")]
    TerminationTimeout {
        /// OS process id, if it was known.
        pid: Option<u32>,
        /// Total time spent waiting for exit.
        waited: Duration,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The concat pass failed. Intermediate segments are left on disk.
    #[error("Failed to merge {} segments: {reason} {location}", retained.len())]
    Merge {
        /// Description of the merge failure (encoder diagnostics tail).
        reason: String,
        /// Segment and manifest files kept for manual recovery.
        retained: Vec<PathBuf>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The encoder exited without a stop request.
    #[error("Encoder exited unexpectedly ({status}), footage kept in: {retained:?} {location}")]
    UnexpectedExit {
        /// Exit status as reported by the OS.
        status: String,
        /// Files holding the footage recorded before the exit: the salvaged
        /// output, or the segments if they could not be merged.
        retained: Vec<PathBuf>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The event is not valid in the session's current state.
    #[error("Cannot {event} while {state} {location}")]
    InvalidTransition {
        /// Name of the rejected event.
        event: &'static str,
        /// Session state at the time of the event.
        state: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem or pipe operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for RecorderError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        RecorderError::Io {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
