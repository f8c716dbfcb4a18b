use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

const TIMESTAMP_FORMAT: &str = "%m-%d-%Y.%H.%M.%S";

/// Container every segment is recorded in. Matroska stays readable when the
/// encoder is killed before writing its trailer; the session container is
/// applied when finalizing.
pub(crate) const SEGMENT_CONTAINER: &str = "mkv";

fn timestamp(now: &DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `Video_part<seq>.<timestamp>.mkv`
pub(crate) fn segment_file_name(sequence: u32, now: &DateTime<Local>) -> String {
    format!("Video_part{}.{}.{}", sequence, timestamp(now), SEGMENT_CONTAINER)
}

/// `Video_<timestamp>.<container>`
pub(crate) fn final_file_name(container: &str, now: &DateTime<Local>) -> String {
    format!("Video_{}.{}", timestamp(now), container)
}

/// `concat_list.<timestamp>.txt`
pub(crate) fn manifest_file_name(now: &DateTime<Local>) -> String {
    format!("concat_list.{}.txt", timestamp(now))
}

/// `dir/name`, or `dir/<stem>_<n>.<ext>` with the first free `n` if taken.
pub(crate) fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (name, None),
    };

    (1u32..)
        .map(|n| match extension {
            Some(extension) => dir.join(format!("{}_{}.{}", stem, n, extension)),
            None => dir.join(format!("{}_{}", stem, n)),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
