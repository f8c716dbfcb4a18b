use crate::segment::RecordingSegment;

use std::{
    path::{Path, PathBuf},
    process::ExitStatus,
};

use tokio::{
    process::{Child, ChildStdin, ChildStdout},
    task::JoinHandle,
};

/// Handle to one running encoder process.
///
/// Owns the child and all three of its pipes. Only
/// [`EncoderSupervisor`](crate::EncoderSupervisor) can start, stop or reap it;
/// everyone else sees the sequence number and output path.
#[derive(Debug)]
pub struct EncoderProcess {
    pub(crate) child: Child,
    pub(crate) stdin: Option<ChildStdin>,
    pub(crate) stdout: Option<ChildStdout>,
    pub(crate) drain: Option<JoinHandle<()>>,
    pub(crate) exit_status: Option<ExitStatus>,
    /// Set once the process has been stopped or reaped.
    pub(crate) outcome: Option<Option<RecordingSegment>>,
    sequence: u32,
    output_path: PathBuf,
}

impl EncoderProcess {
    pub(crate) fn new(
        mut child: Child,
        sequence: u32,
        output_path: PathBuf,
        drain: Option<JoinHandle<()>>,
    ) -> Self {
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();

        Self {
            child,
            stdin,
            stdout,
            drain,
            exit_status: None,
            outcome: None,
            sequence,
            output_path,
        }
    }

    /// Sequence number of the segment this process writes.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// File the encoder writes to.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// OS process id, if the process has not been reaped yet.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// `false` once the process has been stopped or reaped.
    pub fn is_alive(&self) -> bool {
        self.outcome.is_none() && self.exit_status.is_none()
    }
}
