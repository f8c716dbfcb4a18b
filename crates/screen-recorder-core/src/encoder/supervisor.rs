use crate::{
    CoreResult, RecorderError,
    capture::CaptureTarget,
    encoder::{
        CaptureBackend, DiagnosticEvent, EncoderProcess, SessionConfig, concat_args,
        recording_args, spawn_drain,
    },
    segment::RecordingSegment,
};

use std::{
    io,
    panic::Location,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    sync::Arc,
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::{io::AsyncWriteExt, process::Command, sync::mpsc, time::timeout};
use tracing::{debug, info, instrument, warn};

/// Time the encoder gets to finalize its container after a quit request.
pub const DEFAULT_GRACEFUL_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on waiting for exit after a forced kill.
const FORCED_KILL_WAIT: Duration = Duration::from_secs(2);

/// Bound on joining a drain task after its process exited.
const DRAIN_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Bound on the startup `-version` probe.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Interactive quit command understood by the encoder.
const QUIT_TOKEN: &[u8] = b"q";

/// Lines of encoder output kept in a merge failure message.
const MERGE_ERROR_TAIL_LINES: usize = 20;

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Spawns, stops and reaps the external encoder.
///
/// Owns the encoder binary path and the platform capture backend. Each
/// started process gets a drain task that forwards its diagnostic stream to
/// the channel given at construction.
#[derive(Debug)]
pub struct EncoderSupervisor {
    binary: PathBuf,
    backend: Arc<dyn CaptureBackend>,
    diagnostics_tx: mpsc::Sender<DiagnosticEvent>,
    graceful_timeout: Duration,
}

impl EncoderSupervisor {
    /// Create a supervisor for the given encoder binary and backend.
    pub fn new(
        binary: impl Into<PathBuf>,
        backend: Arc<dyn CaptureBackend>,
        diagnostics_tx: mpsc::Sender<DiagnosticEvent>,
        graceful_timeout: Duration,
    ) -> Self {
        Self {
            binary: binary.into(),
            backend,
            diagnostics_tx,
            graceful_timeout,
        }
    }

    /// Path of the encoder binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Name of the active capture backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Check that the encoder binary can be launched.
    ///
    /// Meant to run once at startup, before any session exists.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Launch`] if the binary is missing, cannot be
    /// spawned, or does not answer `-version` successfully.
    #[instrument(skip(self), fields(binary = ?self.binary))]
    pub async fn verify(&self) -> CoreResult<()> {
        let mut command = self.command();
        command
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let status = match timeout(VERIFY_TIMEOUT, command.status()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                return Err(RecorderError::Launch {
                    binary: self.binary.clone(),
                    reason: e.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Err(_) => {
                return Err(RecorderError::Launch {
                    binary: self.binary.clone(),
                    reason: format!("no answer to -version within {:?}", VERIFY_TIMEOUT),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        if !status.success() {
            return Err(RecorderError::Launch {
                binary: self.binary.clone(),
                reason: format!("-version exited with {}", status),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!(backend = self.backend.name(), "Encoder binary verified");

        Ok(())
    }

    /// Spawn an encoder writing `target` to `output_path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Launch`] if the OS refuses to spawn the binary.
    #[instrument(
        skip(self, target, config, output_path),
        fields(target = %target, output = ?output_path)
    )]
    pub async fn start(
        &self,
        target: &CaptureTarget,
        config: &SessionConfig,
        output_path: &Path,
        sequence: u32,
    ) -> CoreResult<EncoderProcess> {
        let args = recording_args(self.backend.as_ref(), target, config, output_path);
        debug!(args = ?args, "Spawning encoder");

        let mut command = self.command();
        command
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| RecorderError::Launch {
            binary: self.binary.clone(),
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let drain = child
            .stderr
            .take()
            .map(|stderr| spawn_drain(stderr, sequence, self.diagnostics_tx.clone()));

        info!(pid = ?child.id(), sequence, "Encoder started");

        Ok(EncoderProcess::new(
            child,
            sequence,
            output_path.to_path_buf(),
            drain,
        ))
    }

    /// Stop an encoder and collect its segment.
    ///
    /// Sends the quit token (or SIGTERM where the token is unsupported or
    /// cannot be delivered), waits for the graceful timeout, then kills. All
    /// pipes are closed on every path. A second call returns the outcome of
    /// the first without touching the process.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::TerminationTimeout`] if the process survives
    /// the forced kill.
    #[instrument(skip(self, process), fields(sequence = process.sequence()))]
    pub async fn stop(&self, process: &mut EncoderProcess) -> CoreResult<Option<RecordingSegment>> {
        if let Some(outcome) = &process.outcome {
            debug!("Encoder already stopped");
            return Ok(outcome.clone());
        }

        let status = match process.exit_status {
            Some(status) => status,
            None => self.terminate(process).await?,
        };

        self.finish(process, status).await
    }

    /// Non-blocking liveness check.
    ///
    /// Returns the exit status once the process has exited on its own.
    #[track_caller]
    pub fn poll_exit(&self, process: &mut EncoderProcess) -> CoreResult<Option<ExitStatus>> {
        if process.outcome.is_some() {
            return Ok(process.exit_status);
        }

        if process.exit_status.is_none() {
            process.exit_status = process.child.try_wait()?;
        }

        Ok(process.exit_status)
    }

    /// Run a lossless concat pass over `manifest` into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::Launch`] if the binary cannot be spawned and
    /// [`RecorderError::Merge`] if the pass exits unsuccessfully. The merge
    /// error carries no retained files; the caller knows which ones it keeps.
    #[instrument(skip(self))]
    pub async fn concat(&self, manifest: &Path, output: &Path, container: &str) -> CoreResult<()> {
        let args = concat_args(manifest, output, container);
        debug!(args = ?args, "Running concat pass");

        let mut command = self.command();
        command.args(&args).stdin(Stdio::null());

        let result = command.output().await.map_err(|e| RecorderError::Launch {
            binary: self.binary.clone(),
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(MERGE_ERROR_TAIL_LINES)..].join("\n");

            return Err(RecorderError::Merge {
                reason: format!("concat exited with {}: {}", result.status, tail),
                retained: Vec::new(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        info!(output = ?output, "Concat pass complete");

        Ok(())
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.kill_on_drop(true);

        #[cfg(target_os = "windows")]
        command.creation_flags(CREATE_NO_WINDOW);

        command
    }

    async fn terminate(&self, process: &mut EncoderProcess) -> CoreResult<ExitStatus> {
        let pid = process.child.id();
        self.request_quit(process).await;

        if let Ok(waited) = timeout(self.graceful_timeout, process.child.wait()).await {
            return self.settle(process, waited).await;
        }

        let escalation = RecorderError::TerminationTimeout {
            pid,
            waited: self.graceful_timeout,
            location: ErrorLocation::from(Location::caller()),
        };
        warn!(error = %escalation, "Graceful stop timed out, killing encoder");

        if let Err(e) = process.child.start_kill() {
            warn!(error = %e, "Failed to deliver kill");
        }

        match timeout(FORCED_KILL_WAIT, process.child.wait()).await {
            Ok(waited) => self.settle(process, waited).await,
            Err(_) => {
                self.close_streams(process).await;
                Err(RecorderError::TerminationTimeout {
                    pid,
                    waited: self.graceful_timeout + FORCED_KILL_WAIT,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Pass a successful wait through; on a failed wait the pipes are closed
    /// before the error is returned.
    pub(crate) async fn settle(
        &self,
        process: &mut EncoderProcess,
        waited: io::Result<ExitStatus>,
    ) -> CoreResult<ExitStatus> {
        match waited {
            Ok(status) => Ok(status),
            Err(e) => {
                warn!(error = %e, "Waiting for the encoder failed");
                self.close_streams(process).await;
                Err(RecorderError::from(e))
            }
        }
    }

    async fn request_quit(&self, process: &mut EncoderProcess) {
        let stdin = process.stdin.take();

        if self.backend.supports_quit_token()
            && let Some(mut stdin) = stdin
        {
            match stdin.write_all(QUIT_TOKEN).await {
                Ok(()) => {
                    if let Err(e) = stdin.flush().await {
                        debug!(error = %e, "Flushing quit token failed");
                    }
                    debug!("Quit token sent");
                    return;
                }
                Err(e) => warn!(error = %e, "Failed to send quit token"),
            }
        }

        send_terminate(process.child.id());
    }

    async fn finish(
        &self,
        process: &mut EncoderProcess,
        status: ExitStatus,
    ) -> CoreResult<Option<RecordingSegment>> {
        process.exit_status = Some(status);
        self.close_streams(process).await;

        let segment = RecordingSegment::inspect(process.output_path(), process.sequence())?;

        match &segment {
            Some(segment) => info!(
                status = %status,
                size_bytes = segment.size_bytes,
                "Encoder stopped, segment recorded"
            ),
            None => warn!(status = %status, "Encoder stopped without output"),
        }

        process.outcome = Some(segment.clone());

        Ok(segment)
    }

    async fn close_streams(&self, process: &mut EncoderProcess) {
        process.stdin.take();
        process.stdout.take();

        if let Some(mut drain) = process.drain.take()
            && timeout(DRAIN_JOIN_TIMEOUT, &mut drain).await.is_err()
        {
            debug!("Drain task still reading, aborting");
            drain.abort();
        }
    }
}

#[cfg(unix)]
fn send_terminate(pid: Option<u32>) {
    use nix::{
        sys::signal::{self, Signal},
        unistd::Pid,
    };

    let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };

    match signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => debug!(pid, "SIGTERM sent"),
        Err(e) => warn!(pid, error = %e, "Failed to send SIGTERM"),
    }
}

#[cfg(not(unix))]
fn send_terminate(pid: Option<u32>) {
    debug!(?pid, "No cooperative termination signal on this platform");
}
