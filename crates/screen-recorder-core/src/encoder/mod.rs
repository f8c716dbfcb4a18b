mod backend;
mod command;
mod config;
mod diagnostics;
mod process;
mod supervisor;

pub(crate) use command::{concat_args, recording_args};

pub use {
    backend::{CaptureBackend, GdiGrabBackend, X11GrabBackend, backend_by_name, default_backend},
    config::SessionConfig,
    diagnostics::{DiagnosticEvent, ProgressLine, log_diagnostics},
    process::EncoderProcess,
    supervisor::{DEFAULT_GRACEFUL_TIMEOUT, EncoderSupervisor},
};

pub(crate) use diagnostics::spawn_drain;

#[cfg(test)]
pub(crate) use diagnostics::{DIAGNOSTIC_BATCH_LINES, MAX_LINE_BYTES};
