mod clock;
mod event;
mod machine;
mod state;

pub use {
    clock::ElapsedClock,
    event::{CaptureRequest, SessionEvent, Transition},
    machine::RecordingSession,
    state::SessionState,
};
