use crate::{CoreResult, segment::RecordingSegment};

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tracing::debug;

/// One concat manifest entry: `file '<path>'`.
///
/// Single quotes inside the path are closed, escaped and reopened (`'\''`),
/// which is how the concat demuxer expects them.
pub(crate) fn manifest_line(path: &Path) -> String {
    let absolute = absolute_path(path);
    let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
    format!("file '{}'", escaped)
}

/// Write the ordered segment list for a concat pass.
#[track_caller]
pub(crate) fn write_manifest(path: &Path, segments: &[RecordingSegment]) -> CoreResult<()> {
    let mut file = fs::File::create(path)?;

    for segment in segments {
        writeln!(file, "{}", manifest_line(&segment.path))?;
    }

    file.sync_all()?;
    debug!(manifest = ?path, entries = segments.len(), "Concat manifest written");

    Ok(())
}

fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
