use std::fmt;

/// Recording session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No encoder running, no segments pending.
    #[default]
    Idle,
    /// An encoder is writing the current segment.
    Recording,
    /// The current segment is being closed and a new one started.
    Switching,
    /// The last segment is being closed and the output finalized.
    Stopping,
}

impl SessionState {
    /// Whether the elapsed-time clock advances in this state.
    pub fn is_active(self) -> bool {
        matches!(self, SessionState::Recording | SessionState::Switching)
    }

    /// Whether a transition is in flight.
    pub fn is_transitioning(self) -> bool {
        matches!(self, SessionState::Switching | SessionState::Stopping)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Switching => "switching",
            SessionState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}
