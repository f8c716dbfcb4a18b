use crate::CoreResult;

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::debug;

/// One contiguous output file produced by a single encoder run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSegment {
    /// Location of the segment file.
    pub path: PathBuf,
    /// Position of the segment within its session.
    pub sequence: u32,
    /// File size observed when the encoder exited.
    pub size_bytes: u64,
}

impl RecordingSegment {
    /// Inspect an encoder's output file after the process has exited.
    ///
    /// Returns `None` when the file is missing or empty; only nonempty files
    /// become segments.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file exists but cannot be inspected.
    #[track_caller]
    pub fn inspect(path: &Path, sequence: u32) -> CoreResult<Option<Self>> {
        let size_bytes = match std::fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?path, "Encoder output missing");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let segment = Self {
            path: path.to_path_buf(),
            sequence,
            size_bytes,
        };

        if !segment.is_valid() {
            debug!(path = ?path, "Encoder output empty");
            return Ok(None);
        }

        Ok(Some(segment))
    }

    /// A segment is usable when the encoder wrote at least one byte.
    pub fn is_valid(&self) -> bool {
        self.size_bytes > 0
    }
}
