//! Screen Recorder Core Library
//!
//! Recording session controller for a screen recorder that drives an
//! external ffmpeg-compatible encoder. Resolves capture targets, supervises
//! encoder processes, splits recordings into segments when the target
//! changes mid-session, and merges them losslessly on stop.
//!
//! # Example
//!
//! ```no_run
//! use screen_recorder_core::{
//!     CaptureRequest, CoreResult, EncoderSupervisor, MonitorGeometry, RecordingSession,
//!     SegmentManager, SessionConfig, SessionEvent, DEFAULT_GRACEFUL_TIMEOUT, default_backend,
//! };
//!
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let (diagnostics_tx, _diagnostics_rx) = tokio::sync::mpsc::channel(64);
//!     let supervisor = EncoderSupervisor::new(
//!         "ffmpeg",
//!         default_backend(),
//!         diagnostics_tx,
//!         DEFAULT_GRACEFUL_TIMEOUT,
//!     );
//!     supervisor.verify().await?;
//!
//!     let mut session = RecordingSession::new(SegmentManager::new(supervisor, "recordings"));
//!     let request = CaptureRequest {
//!         monitor_index: 0,
//!         monitor: MonitorGeometry { x: 0, y: 0, width: 1920, height: 1080 },
//!         selection: None,
//!     };
//!     let config = SessionConfig {
//!         frame_rate: 60,
//!         bitrate: "1000k".to_string(),
//!         codec: "libx264".to_string(),
//!         container: "mkv".to_string(),
//!         audio_device: None,
//!         volume_percent: 100,
//!     };
//!
//!     session.handle(SessionEvent::Start { request, config }).await?;
//!     tokio::time::sleep(Duration::from_secs(5)).await;
//!     let stopped = session.handle(SessionEvent::Stop).await?;
//!
//!     println!("Saved to {:?}", stopped.output);
//!     Ok(())
//! }
//! ```

mod capture;
mod encoder;
mod error;
mod segment;
mod session;

pub use {
    capture::{CaptureOrigin, CaptureTarget, MonitorGeometry, SelectionRect, resolve},
    encoder::{
        CaptureBackend, DEFAULT_GRACEFUL_TIMEOUT, DiagnosticEvent, EncoderProcess,
        EncoderSupervisor, GdiGrabBackend, ProgressLine, SessionConfig, X11GrabBackend,
        backend_by_name, default_backend, log_diagnostics,
    },
    error::RecorderError,
    error::Result as CoreResult,
    segment::{ActiveSegment, ExitReport, RecordingSegment, SegmentManager},
    session::{CaptureRequest, ElapsedClock, RecordingSession, SessionEvent, SessionState, Transition},
};

#[cfg(test)]
mod tests;
