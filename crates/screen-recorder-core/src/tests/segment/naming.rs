use crate::{
    RecordingSegment,
    segment::{
        final_file_name, manifest_file_name, manifest_line, segment_file_name, unique_path,
        write_manifest,
    },
};

use std::{fs, path::Path};

use chrono::{DateTime, Local, TimeZone};
use tempfile::TempDir;

#[allow(clippy::unwrap_used)]
fn fixed_time() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 7, 14, 5, 9).single().unwrap()
}

/// WHAT: File names embed sequence and timestamp
/// WHY: Segments of one session sort together and never collide
#[test]
fn given_fixed_time_when_naming_files_then_timestamped_names() {
    // Given: A fixed local time
    let now = fixed_time();

    // When/Then: Each kind of file gets its pattern
    assert_eq!(
        segment_file_name(2, &now),
        "Video_part2.03-07-2026.14.05.09.mkv"
    );
    assert_eq!(final_file_name("mp4", &now), "Video_03-07-2026.14.05.09.mp4");
    assert_eq!(manifest_file_name(&now), "concat_list.03-07-2026.14.05.09.txt");
}

/// WHAT: Taken names get a numeric suffix
/// WHY: Two recordings finished within one second must not overwrite each other
#[test]
#[allow(clippy::unwrap_used)]
fn given_existing_file_when_choosing_path_then_suffix_appended() {
    // Given: A directory that already holds the preferred name and its first alternative
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Video_x.mkv"), b"a").unwrap();
    fs::write(dir.path().join("Video_x_1.mkv"), b"b").unwrap();

    // When: Choosing paths
    let taken = unique_path(dir.path(), "Video_x.mkv");
    let free = unique_path(dir.path(), "Video_y.mkv");

    // Then: The first free suffix, or the name itself
    assert_eq!(taken, dir.path().join("Video_x_2.mkv"));
    assert_eq!(free, dir.path().join("Video_y.mkv"));
}

/// WHAT: Single quotes in paths are escaped for the concat demuxer
/// WHY: An unescaped quote ends the path early and the merge fails
#[test]
fn given_path_with_quote_when_writing_manifest_line_then_escaped() {
    // Given: An absolute path containing a quote
    let path = Path::new("/recordings/it's here/Video_part0.mkv");

    // When: Formatting the manifest line
    let line = manifest_line(path);

    // Then: The quote is closed, escaped and reopened
    assert_eq!(line, r"file '/recordings/it'\''s here/Video_part0.mkv'");
}

/// WHAT: The manifest lists segments in order with absolute paths
/// WHY: The concat pass resolves relative paths against the manifest, not the cwd
#[test]
#[allow(clippy::unwrap_used)]
fn given_segments_when_writing_manifest_then_one_absolute_line_each() {
    // Given: Two segments in a scratch directory
    let dir = TempDir::new().unwrap();
    let segments: Vec<RecordingSegment> = (0..2)
        .map(|sequence| RecordingSegment {
            path: dir.path().join(format!("Video_part{}.mkv", sequence)),
            sequence,
            size_bytes: 1,
        })
        .collect();
    let manifest = dir.path().join("concat_list.txt");

    // When: Writing the manifest
    write_manifest(&manifest, &segments).unwrap();

    // Then: Lines match the segment order
    let content = fs::read_to_string(&manifest).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], manifest_line(&segments[0].path));
    assert!(lines[1].starts_with("file '/"));
    assert!(lines[1].ends_with("Video_part1.mkv'"));
}

/// WHAT: Only nonempty files become segments
/// WHY: A crashed encoder may leave an empty or missing file behind
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_and_missing_files_when_inspecting_then_no_segment() {
    // Given: An empty file, a missing one and a nonempty one
    let dir = TempDir::new().unwrap();
    let empty = dir.path().join("empty.mkv");
    let full = dir.path().join("full.mkv");
    fs::write(&empty, b"").unwrap();
    fs::write(&full, b"frames").unwrap();

    // When/Then: Only the nonempty file is a segment
    assert!(RecordingSegment::inspect(&empty, 0).unwrap().is_none());
    assert!(RecordingSegment::inspect(&dir.path().join("missing.mkv"), 0).unwrap().is_none());
    let segment = RecordingSegment::inspect(&full, 5).unwrap().unwrap();
    assert_eq!(segment.size_bytes, 6);
    assert_eq!(segment.sequence, 5);
}
