use crate::{
    CoreResult, RecorderError,
    capture::CaptureTarget,
    encoder::{EncoderProcess, EncoderSupervisor, SessionConfig},
    segment::{
        RecordingSegment, SEGMENT_CONTAINER, final_file_name, manifest_file_name,
        segment_file_name, unique_path, write_manifest,
    },
};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
    process::ExitStatus,
};

use chrono::Local;
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// The segment currently being written by a live encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSegment {
    /// Sequence number assigned to the segment.
    pub sequence: u32,
    /// File the encoder writes to.
    pub path: PathBuf,
}

/// An encoder that exited without being asked to.
#[derive(Debug, Clone)]
pub struct ExitReport {
    /// Exit status reported by the OS.
    pub status: ExitStatus,
    /// Segment salvaged from the partial output, if it was nonempty.
    pub segment: Option<RecordingSegment>,
}

/// Tracks the segments of one session and merges them at the end.
///
/// Holds at most one live [`EncoderProcess`]. Segments are appended in the
/// order their processes exit, which is also sequence order since a new
/// segment is only begun after the previous one has been stopped.
#[derive(Debug)]
pub struct SegmentManager {
    supervisor: EncoderSupervisor,
    output_dir: PathBuf,
    segments: Vec<RecordingSegment>,
    current: Option<EncoderProcess>,
    next_sequence: u32,
}

impl SegmentManager {
    /// Create a manager writing into `output_dir`.
    pub fn new(supervisor: EncoderSupervisor, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            supervisor,
            output_dir: output_dir.into(),
            segments: Vec::new(),
            current: None,
            next_sequence: 0,
        }
    }

    /// The supervisor used to run encoders.
    pub fn supervisor(&self) -> &EncoderSupervisor {
        &self.supervisor
    }

    /// Directory holding segments, manifests and final files.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Finished segments, in sequence order.
    pub fn segments(&self) -> &[RecordingSegment] {
        &self.segments
    }

    /// Sequence number the next segment will get.
    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    /// Whether an encoder is currently running.
    pub fn is_encoding(&self) -> bool {
        self.current.is_some()
    }

    /// The segment in progress, if any.
    pub fn active_segment(&self) -> Option<ActiveSegment> {
        self.current.as_ref().map(|process| ActiveSegment {
            sequence: process.sequence(),
            path: process.output_path().to_path_buf(),
        })
    }

    /// Start an encoder for the next segment.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::InvalidTransition`] while another encoder is
    /// running, an IO error if the output directory cannot be created, and
    /// [`RecorderError::Launch`] if the encoder fails to spawn.
    #[instrument(skip(self, target, config), fields(target = %target))]
    pub async fn begin_segment(
        &mut self,
        target: &CaptureTarget,
        config: &SessionConfig,
    ) -> CoreResult<ActiveSegment> {
        if self.current.is_some() {
            return Err(RecorderError::InvalidTransition {
                event: "begin a segment",
                state: "an encoder is running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        fs::create_dir_all(&self.output_dir)?;

        let sequence = self.next_sequence;
        let name = segment_file_name(sequence, &Local::now());
        let path = unique_path(&self.output_dir, &name);

        let process = self.supervisor.start(target, config, &path, sequence).await?;
        self.current = Some(process);
        self.next_sequence += 1;

        info!(sequence, path = ?path, "Segment started");

        Ok(ActiveSegment { sequence, path })
    }

    /// Stop the running encoder and record its segment.
    ///
    /// Does nothing when no encoder is running.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::TerminationTimeout`] if the encoder could not
    /// be stopped. The handle is dropped regardless, which kills the process.
    #[instrument(skip(self))]
    pub async fn end_segment(&mut self) -> CoreResult<Option<RecordingSegment>> {
        let Some(mut process) = self.current.take() else {
            debug!("No segment in progress");
            return Ok(None);
        };

        let segment = self.supervisor.stop(&mut process).await?;
        self.record(segment.clone());

        Ok(segment)
    }

    /// Move recording to a new target without touching the config.
    ///
    /// # Errors
    ///
    /// Propagates failures from stopping the old encoder or starting the new
    /// one. Segments recorded before the failure are kept.
    #[instrument(skip(self, new_target, config), fields(target = %new_target))]
    pub async fn switch_target(
        &mut self,
        new_target: &CaptureTarget,
        config: &SessionConfig,
    ) -> CoreResult<ActiveSegment> {
        self.end_segment().await?;
        self.begin_segment(new_target, config).await
    }

    /// Collect the running encoder if it has exited on its own.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the process or its output cannot be inspected.
    pub async fn reap_exited(&mut self) -> CoreResult<Option<ExitReport>> {
        let Some(process) = self.current.as_mut() else {
            return Ok(None);
        };

        let Some(status) = self.supervisor.poll_exit(process)? else {
            return Ok(None);
        };

        let Some(mut process) = self.current.take() else {
            return Ok(None);
        };

        warn!(
            sequence = process.sequence(),
            status = %status,
            "Encoder exited without a stop request"
        );

        let segment = self.supervisor.stop(&mut process).await?;
        self.record(segment.clone());

        Ok(Some(ExitReport { status, segment }))
    }

    /// Produce the final output file from the recorded segments.
    ///
    /// Segments are always Matroska. A single segment is renamed into place
    /// when `container` is also Matroska; otherwise the segments are spliced
    /// or remuxed by a stream-copy concat pass, after which the segments and
    /// manifest are deleted. The segment list is empty afterwards in every
    /// case.
    ///
    /// Returns `None` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::InvalidTransition`] while an encoder is
    /// running and [`RecorderError::Merge`] if the concat pass fails, in which
    /// case every segment file and the manifest are left on disk.
    #[instrument(skip(self))]
    pub async fn finalize(&mut self, container: &str) -> CoreResult<Option<PathBuf>> {
        if self.current.is_some() {
            return Err(RecorderError::InvalidTransition {
                event: "finalize",
                state: "an encoder is running".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let segments = self.take_segments();
        let output = unique_path(&self.output_dir, &final_file_name(container, &Local::now()));

        match segments.as_slice() {
            [] => {
                info!("No segments recorded, nothing to finalize");
                Ok(None)
            }
            [single] if container == SEGMENT_CONTAINER => {
                fs::rename(&single.path, &output)?;
                info!(output = ?output, "Single segment moved into place");
                Ok(Some(output))
            }
            _ => self.merge(&segments, &output, container).await.map(Some),
        }
    }

    /// Forget all recorded segments without touching their files.
    ///
    /// Resets sequence numbering for the next session.
    pub fn take_segments(&mut self) -> Vec<RecordingSegment> {
        self.next_sequence = 0;
        std::mem::take(&mut self.segments)
    }

    async fn merge(
        &self,
        segments: &[RecordingSegment],
        output: &Path,
        container: &str,
    ) -> CoreResult<PathBuf> {
        let manifest = unique_path(&self.output_dir, &manifest_file_name(&Local::now()));
        let mut retained: Vec<PathBuf> = segments.iter().map(|s| s.path.clone()).collect();

        if let Err(e) = write_manifest(&manifest, segments) {
            return Err(RecorderError::Merge {
                reason: format!("failed to write manifest: {}", e),
                retained,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Err(e) = self.supervisor.concat(&manifest, output, container).await {
            let reason = match e {
                RecorderError::Merge { reason, .. } => reason,
                other => other.to_string(),
            };
            retained.push(manifest);

            error!(reason = %reason, retained = ?retained, "Merge failed, keeping segments");

            return Err(RecorderError::Merge {
                reason,
                retained,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        for path in retained.iter().chain(std::iter::once(&manifest)) {
            if let Err(e) = fs::remove_file(path) {
                warn!(path = ?path, error = %e, "Failed to remove intermediate file");
            }
        }

        info!(output = ?output, segments = segments.len(), "Segments merged");

        Ok(output.to_path_buf())
    }

    fn record(&mut self, segment: Option<RecordingSegment>) {
        if let Some(segment) = segment {
            self.segments.push(segment);
        }
    }
}
