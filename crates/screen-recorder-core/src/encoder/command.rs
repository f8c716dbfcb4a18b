use crate::{
    capture::CaptureTarget,
    encoder::{CaptureBackend, SessionConfig},
};

use std::path::Path;

/// Pixel format accepted by every player we care about.
const PIXEL_FORMAT: &str = "yuv420p";

/// Full argument vector for one recording run.
///
/// Input arguments come from the backend; the encoding tail (volume filter,
/// codec, preset, bitrate, pixel format) is the same on every platform and
/// the output path is always last.
pub(crate) fn recording_args(
    backend: &dyn CaptureBackend,
    target: &CaptureTarget,
    config: &SessionConfig,
    output: &Path,
) -> Vec<String> {
    let mut args = backend.input_args(target, config);

    if config.audio_device.is_some() {
        args.extend([
            "-filter:a".to_string(),
            format!("volume={:.2}", config.volume_multiplier()),
        ]);
    }

    args.extend(
        [
            "-threads",
            "0",
            "-pix_fmt",
            PIXEL_FORMAT,
            "-loglevel",
            "info",
            "-hide_banner",
            "-c:v",
        ]
        .map(String::from),
    );
    args.push(config.codec.clone());

    if let Some(preset) = codec_preset(&config.codec) {
        args.extend(["-preset".to_string(), preset.to_string()]);
    }

    args.extend([
        "-b:v".to_string(),
        config.bitrate.clone(),
        output.to_string_lossy().into_owned(),
    ]);

    args
}

/// Arguments for a lossless concat pass over a segment manifest.
pub(crate) fn concat_args(manifest: &Path, output: &Path, container: &str) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        manifest.to_string_lossy().into_owned(),
        "-c".to_string(),
        "copy".to_string(),
    ];

    // Moves the index to the front; only meaningful for ISO-BMFF containers.
    if matches!(container, "mp4" | "mov") {
        args.extend(["-movflags".to_string(), "+faststart".to_string()]);
    }

    args.push(output.to_string_lossy().into_owned());
    args
}

fn codec_preset(codec: &str) -> Option<&'static str> {
    match codec {
        "libx264" => Some("veryfast"),
        "libx265" => Some("medium"),
        _ => None,
    }
}
