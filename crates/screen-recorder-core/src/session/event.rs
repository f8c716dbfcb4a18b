use crate::{
    capture::{MonitorGeometry, SelectionRect},
    encoder::SessionConfig,
    segment::ActiveSegment,
    session::SessionState,
};

use std::path::PathBuf;

/// What to capture: a monitor and an optional area on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Index of the monitor in the configured monitor list.
    pub monitor_index: usize,
    /// Geometry of that monitor.
    pub monitor: MonitorGeometry,
    /// User-drawn area, in monitor-local coordinates.
    pub selection: Option<SelectionRect>,
}

/// Input to [`RecordingSession::handle`](crate::RecordingSession::handle).
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Begin recording.
    Start {
        /// Initial capture target.
        request: CaptureRequest,
        /// Encoder settings for the whole session.
        config: SessionConfig,
    },
    /// The user picked another monitor or area while recording.
    MonitorChanged(CaptureRequest),
    /// Finish recording and produce the output file.
    Stop,
    /// One second passed.
    Tick,
    /// Check whether the encoder is still alive without advancing the clock.
    ProbeEncoder,
}

impl SessionEvent {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Start { .. } => "start",
            SessionEvent::MonitorChanged(_) => "change monitor",
            SessionEvent::Stop => "stop",
            SessionEvent::Tick => "tick",
            SessionEvent::ProbeEncoder => "probe encoder",
        }
    }
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State before the event.
    pub from: SessionState,
    /// State after the event.
    pub to: SessionState,
    /// Segment started by the event, if any.
    pub started: Option<ActiveSegment>,
    /// Final output produced by the event, if any.
    pub output: Option<PathBuf>,
}

impl Transition {
    pub(crate) fn stay(state: SessionState) -> Self {
        Self {
            from: state,
            to: state,
            started: None,
            output: None,
        }
    }
}
