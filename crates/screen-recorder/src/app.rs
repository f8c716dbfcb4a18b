use crate::{AppCommand, AppError, AppResult, app_command::HELP_TEXT, config::Config};

use screen_recorder_core::{
    CaptureRequest, DiagnosticEvent, MonitorGeometry, RecorderError, RecordingSession,
    SelectionRect, SessionEvent, SessionState, log_diagnostics, resolve,
};

use std::{fs, panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

/// Main application state.
///
/// Owns the recording session outright. Every command and diagnostic event
/// is handled on this one task, so session transitions never overlap.
pub struct App {
    pub(crate) session: RecordingSession,
    pub(crate) config: Config,
    pub(crate) config_path: PathBuf,
    pub(crate) selection: Option<SelectionRect>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) diagnostics_rx: mpsc::Receiver<DiagnosticEvent>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Screen Recorder starting");

        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if cmd == AppCommand::Shutdown {
                        info!("Shutdown requested");
                        break;
                    }
                    if let Err(e) = self.handle_command(cmd).await {
                        error!(error = %e, "Command failed");
                    }
                }

                Some(event) = self.diagnostics_rx.recv() => {
                    self.handle_diagnostic(event).await;
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        match self.session.shutdown().await {
            Ok(Some(output)) => info!(output = ?output, "Recording saved before exit"),
            Ok(None) => {}
            Err(e) => error!(error = %e, "Failed to finalize recording on exit"),
        }

        let _ = self.shutdown_tx.send(true);
        info!("Screen Recorder shut down successfully");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn handle_command(&mut self, cmd: AppCommand) -> AppResult<()> {
        match cmd {
            AppCommand::StartRecording => self.start_recording().await,
            AppCommand::StopRecording => self.stop_recording().await,
            AppCommand::SelectMonitor { index } => self.select_monitor(index).await,
            AppCommand::SelectArea { rect } => self.select_area(rect).await,
            AppCommand::ClearArea => {
                self.selection = None;
                info!("Capture area cleared");
                self.switch_if_recording().await
            }
            AppCommand::Status => {
                println!("{}", self.status_line());
                Ok(())
            }
            AppCommand::OpenOutput => self.open_output(),
            AppCommand::Help => {
                println!("{}", HELP_TEXT);
                Ok(())
            }
            AppCommand::Tick => self.forward(SessionEvent::Tick).await,
            AppCommand::Shutdown => Ok(()),
        }
    }

    async fn handle_diagnostic(&mut self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::Lines { sequence, lines } => log_diagnostics(sequence, &lines),
            DiagnosticEvent::StreamClosed { sequence } => {
                debug!(sequence, "Encoder diagnostic stream closed");
                if let Err(e) = self.forward(SessionEvent::ProbeEncoder).await {
                    error!(error = %e, "Encoder check failed");
                }
            }
            DiagnosticEvent::ReadFailed { sequence, reason } => {
                warn!(sequence, reason = %reason, "Encoder diagnostics unreadable");
            }
        }
    }

    async fn start_recording(&mut self) -> AppResult<()> {
        let request = self.capture_request()?;
        let config = self.config.to_session_config();

        let transition = self
            .session
            .handle(SessionEvent::Start { request, config })
            .await?;

        if let Some(segment) = transition.started {
            info!(
                session_id = %self.session.session_id(),
                path = ?segment.path,
                "Recording"
            );
        }

        Ok(())
    }

    async fn stop_recording(&mut self) -> AppResult<()> {
        if self.session.state() == SessionState::Idle {
            println!("Not recording");
            return Ok(());
        }

        let result = self.session.handle(SessionEvent::Stop).await;

        // A custom area applies to one recording only.
        if self.session.state() == SessionState::Idle {
            self.selection = None;
        }

        match result?.output {
            Some(output) => {
                info!(output = ?output, "Recording saved");
                println!("Saved {}", output.display());
            }
            None => warn!("Nothing was recorded"),
        }

        Ok(())
    }

    async fn select_monitor(&mut self, index: usize) -> AppResult<()> {
        if self.config.monitor(index).is_none() {
            return Err(AppError::ConfigError {
                reason: format!(
                    "monitor {} does not exist ({} configured)",
                    index,
                    self.config.monitors.len()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.config.selection.monitor_index = index;
        self.selection = None;
        info!(monitor_index = index, "Monitor selected");

        if let Err(e) = self.config.save_to(&self.config_path) {
            warn!(error = %e, "Failed to persist monitor choice");
        }

        self.switch_if_recording().await
    }

    async fn select_area(&mut self, rect: SelectionRect) -> AppResult<()> {
        let index = self.config.selected_monitor_index();
        let monitor = self.monitor_geometry(index)?;

        // Reject unrecordable areas now rather than on the next start.
        let target = resolve(index, &monitor, Some(&rect))?;

        self.selection = Some(rect);
        info!(target = %target, "Capture area selected");

        self.switch_if_recording().await
    }

    async fn switch_if_recording(&mut self) -> AppResult<()> {
        if self.session.state() != SessionState::Recording {
            return Ok(());
        }

        let request = self.capture_request()?;
        self.forward(SessionEvent::MonitorChanged(request)).await
    }

    async fn forward(&mut self, event: SessionEvent) -> AppResult<()> {
        match self.session.handle(event).await {
            Ok(_) => Ok(()),
            Err(e @ RecorderError::UnexpectedExit { .. }) => {
                println!("Recording interrupted: {}", e);
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn capture_request(&self) -> AppResult<CaptureRequest> {
        let monitor_index = self.config.selected_monitor_index();
        Ok(CaptureRequest {
            monitor_index,
            monitor: self.monitor_geometry(monitor_index)?,
            selection: self.selection,
        })
    }

    #[track_caller]
    fn monitor_geometry(&self, index: usize) -> AppResult<MonitorGeometry> {
        self.config.monitor(index).ok_or_else(|| AppError::ConfigError {
            reason: "no monitors configured".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    fn open_output(&self) -> AppResult<()> {
        let dir = &self.config.output.directory;
        fs::create_dir_all(dir)?;
        open::that(dir)?;
        info!(output_dir = ?dir, "Opened output folder");
        Ok(())
    }

    pub(crate) fn status_line(&self) -> String {
        let state = self.session.state();
        let monitor_index = self.config.selected_monitor_index();
        let area = match &self.selection {
            Some(rect) => format!("area ({},{})-({},{})", rect.x1, rect.y1, rect.x2, rect.y2),
            None => "full monitor".to_string(),
        };

        match self.session.target() {
            Some(target) if state != SessionState::Idle => format!(
                "{} {} [{}], segment {}, output {}",
                state,
                self.session.elapsed().formatted(),
                target,
                self.session.segments().next_sequence().saturating_sub(1),
                self.config.output.directory.display()
            ),
            _ => format!(
                "{}, monitor {} {}, output {}",
                state,
                monitor_index,
                area,
                self.config.output.directory.display()
            ),
        }
    }
}
