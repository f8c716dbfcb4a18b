use crate::{
    CoreResult, RecorderError,
    capture::{CaptureTarget, resolve},
    encoder::SessionConfig,
    segment::{ActiveSegment, SegmentManager},
    session::{CaptureRequest, ElapsedClock, SessionEvent, SessionState, Transition},
};

use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Target and settings of the recording in progress.
#[derive(Debug, Clone)]
struct ActiveRecording {
    target: CaptureTarget,
    config: SessionConfig,
}

/// The recording state machine.
///
/// Owned by a single coordinating task; every transition goes through
/// [`handle`](Self::handle), which takes `&mut self`, so transitions never
/// overlap. Events arriving while a transition is in flight are rejected
/// with [`RecorderError::InvalidTransition`].
#[derive(Debug)]
pub struct RecordingSession {
    id: Uuid,
    state: SessionState,
    clock: ElapsedClock,
    recording: Option<ActiveRecording>,
    segments: SegmentManager,
}

impl RecordingSession {
    /// Create an idle session that records through `segments`.
    pub fn new(segments: SegmentManager) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            clock: ElapsedClock::default(),
            recording: None,
            segments,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Elapsed recording time.
    pub fn elapsed(&self) -> &ElapsedClock {
        &self.clock
    }

    /// Target being recorded, if any.
    pub fn target(&self) -> Option<&CaptureTarget> {
        self.recording.as_ref().map(|recording| &recording.target)
    }

    /// Settings of the recording in progress, if any.
    pub fn config(&self) -> Option<&SessionConfig> {
        self.recording.as_ref().map(|recording| &recording.config)
    }

    /// Segment bookkeeping for this session.
    pub fn segments(&self) -> &SegmentManager {
        &self.segments
    }

    /// Id of the current (or most recent) recording, for log correlation.
    pub fn session_id(&self) -> Uuid {
        self.id
    }

    /// Segment the encoder is currently writing.
    pub fn active_segment(&self) -> Option<ActiveSegment> {
        self.segments.active_segment()
    }

    /// Apply one event.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::InvalidTransition`] for events that are not
    /// valid in the current state, leaving the state untouched. Stopping an
    /// idle session is a no-op, not an error. Other errors
    /// come from resolving the target, running the encoder, or finalizing;
    /// the resulting state is documented per event on [`SessionEvent`].
    #[instrument(skip(self, event), fields(event = event.name(), state = %self.state))]
    pub async fn handle(&mut self, event: SessionEvent) -> CoreResult<Transition> {
        if self.state.is_transitioning() {
            return Err(self.invalid(event.name()));
        }

        match event {
            SessionEvent::Start { request, config } => self.start(request, config).await,
            SessionEvent::MonitorChanged(request) => self.change_target(request).await,
            SessionEvent::Stop => self.stop().await,
            SessionEvent::Tick => {
                if self.state.is_active() {
                    self.clock.tick();
                }
                self.check_encoder().await
            }
            SessionEvent::ProbeEncoder => self.check_encoder().await,
        }
    }

    /// Stop and finalize an in-flight recording before the application exits.
    ///
    /// Returns the final output path, or `None` if nothing was recording.
    ///
    /// # Errors
    ///
    /// Same as stopping through [`handle`](Self::handle).
    pub async fn shutdown(&mut self) -> CoreResult<Option<PathBuf>> {
        if self.state != SessionState::Recording {
            debug!(state = %self.state, "Nothing to shut down");
            return Ok(None);
        }

        info!(session_id = %self.id, "Finalizing recording before exit");
        self.handle(SessionEvent::Stop)
            .await
            .map(|transition| transition.output)
    }

    async fn start(
        &mut self,
        request: CaptureRequest,
        config: SessionConfig,
    ) -> CoreResult<Transition> {
        if self.state != SessionState::Idle {
            return Err(self.invalid("start"));
        }

        let target = resolve(
            request.monitor_index,
            &request.monitor,
            request.selection.as_ref(),
        )?;

        self.id = Uuid::new_v4();
        let started = self.segments.begin_segment(&target, &config).await?;

        info!(
            session_id = %self.id,
            target = %target,
            fps = config.frame_rate,
            codec = %config.codec,
            "Recording started"
        );

        self.recording = Some(ActiveRecording { target, config });
        self.clock.start();
        self.state = SessionState::Recording;

        Ok(Transition {
            from: SessionState::Idle,
            to: SessionState::Recording,
            started: Some(started),
            output: None,
        })
    }

    async fn change_target(&mut self, request: CaptureRequest) -> CoreResult<Transition> {
        let Some(recording) = self.recording.clone() else {
            return Err(self.invalid("change monitor"));
        };
        if self.state != SessionState::Recording {
            return Err(self.invalid("change monitor"));
        }

        let target = resolve(
            request.monitor_index,
            &request.monitor,
            request.selection.as_ref(),
        )?;

        self.state = SessionState::Switching;
        info!(session_id = %self.id, from = %recording.target, to = %target, "Switching target");

        match self.segments.switch_target(&target, &recording.config).await {
            Ok(started) => {
                self.recording = Some(ActiveRecording {
                    target,
                    config: recording.config,
                });
                self.state = SessionState::Recording;

                Ok(Transition {
                    from: SessionState::Recording,
                    to: SessionState::Recording,
                    started: Some(started),
                    output: None,
                })
            }
            Err(e) => {
                error!(session_id = %self.id, error = %e, "Switch failed, finalizing recorded segments");

                let finalized = self.segments.finalize(&recording.config.container).await;
                self.report_salvage(finalized);
                self.enter_idle();

                Err(e)
            }
        }
    }

    async fn stop(&mut self) -> CoreResult<Transition> {
        let Some(recording) = self.recording.clone() else {
            debug!("Stop requested while idle, ignoring");
            return Ok(Transition::stay(self.state));
        };
        if self.state != SessionState::Recording {
            return Err(self.invalid("stop"));
        }

        self.state = SessionState::Stopping;
        let elapsed = self.clock.formatted();

        let ended = self.segments.end_segment().await;
        let finalized = self.segments.finalize(&recording.config.container).await;
        self.enter_idle();

        if let Err(e) = ended {
            self.report_salvage(finalized);
            return Err(e);
        }

        let output = finalized?;
        info!(session_id = %self.id, elapsed = %elapsed, output = ?output, "Recording stopped");

        Ok(Transition {
            from: SessionState::Recording,
            to: SessionState::Idle,
            started: None,
            output,
        })
    }

    async fn check_encoder(&mut self) -> CoreResult<Transition> {
        if self.state != SessionState::Recording {
            return Ok(Transition::stay(self.state));
        }
        let Some(recording) = self.recording.clone() else {
            return Ok(Transition::stay(self.state));
        };

        let Some(report) = self.segments.reap_exited().await? else {
            return Ok(Transition::stay(self.state));
        };

        let recorded: Vec<PathBuf> = self
            .segments
            .segments()
            .iter()
            .map(|segment| segment.path.clone())
            .collect();

        // Salvage everything recorded so far into one file, as a stop would.
        let retained = match self.segments.finalize(&recording.config.container).await {
            Ok(Some(output)) => vec![output],
            Ok(None) => Vec::new(),
            Err(RecorderError::Merge { retained, .. }) => retained,
            Err(e) => {
                error!(session_id = %self.id, error = %e, "Failed to save recorded footage");
                recorded
            }
        };
        self.enter_idle();

        error!(
            session_id = %self.id,
            status = %report.status,
            retained = ?retained,
            "Encoder exited unexpectedly, session reset"
        );

        Err(RecorderError::UnexpectedExit {
            status: report.status.to_string(),
            retained,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    fn enter_idle(&mut self) {
        self.state = SessionState::Idle;
        self.clock.reset();
        self.recording = None;
    }

    fn report_salvage(&self, finalized: CoreResult<Option<PathBuf>>) {
        match finalized {
            Ok(Some(output)) => warn!(session_id = %self.id, output = ?output, "Recorded footage saved"),
            Ok(None) => debug!(session_id = %self.id, "No footage to save"),
            Err(e) => error!(session_id = %self.id, error = %e, "Failed to save recorded footage"),
        }
    }

    #[track_caller]
    fn invalid(&self, event: &'static str) -> RecorderError {
        RecorderError::InvalidTransition {
            event,
            state: self.state.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
