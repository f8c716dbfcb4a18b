mod manager;
mod manifest;
mod naming;
#[allow(clippy::module_inception)]
mod segment;

pub(crate) use {
    manifest::write_manifest,
    naming::{
        SEGMENT_CONTAINER, final_file_name, manifest_file_name, segment_file_name, unique_path,
    },
};

#[cfg(test)]
pub(crate) use manifest::manifest_line;

pub use {
    manager::{ActiveSegment, ExitReport, SegmentManager},
    segment::RecordingSegment,
};
