use crate::{
    CaptureOrigin, CaptureTarget, GdiGrabBackend, SessionConfig, X11GrabBackend,
    encoder::{concat_args, recording_args},
};

use std::path::Path;

fn target() -> CaptureTarget {
    CaptureTarget {
        monitor_index: 1,
        x: 1930,
        y: 20,
        width: 100,
        height: 50,
        origin: CaptureOrigin::CustomArea,
    }
}

fn config(audio_device: Option<&str>) -> SessionConfig {
    SessionConfig {
        frame_rate: 60,
        bitrate: "8000k".to_string(),
        codec: "libx264".to_string(),
        container: "mkv".to_string(),
        audio_device: audio_device.map(String::from),
        volume_percent: 75,
    }
}

/// WHAT: X11 recording arguments follow the documented order
/// WHY: The encoder parses inputs and options positionally
#[test]
fn given_x11_backend_with_audio_when_building_args_then_full_vector_in_order() {
    // Given: X11 backend, custom area and a pulse source
    let backend = X11GrabBackend::new(":1.0");

    // When: Building the argument vector
    let args = recording_args(&backend, &target(), &config(Some("default")), Path::new("out.mkv"));

    // Then: Inputs, volume filter, encoding tail, output last
    let expected = [
        "-f", "x11grab", "-framerate", "60", "-video_size", "100x50", "-i", ":1.0+1930,20",
        "-f", "pulse", "-i", "default", "-filter:a", "volume=0.75", "-threads", "0",
        "-pix_fmt", "yuv420p", "-loglevel", "info", "-hide_banner", "-c:v", "libx264",
        "-preset", "veryfast", "-b:v", "8000k", "out.mkv",
    ];
    assert_eq!(args, expected);
}

/// WHAT: GDI arguments carry the offset and DirectShow audio input
/// WHY: gdigrab takes offsets as separate options, not in the input name
#[test]
fn given_gdigrab_backend_when_building_args_then_offsets_and_dshow_audio() {
    // Given: GDI backend with a microphone
    let backend = GdiGrabBackend;

    // When: Building the argument vector
    let args = recording_args(
        &backend,
        &target(),
        &config(Some("Microphone (USB)")),
        Path::new("out.mkv"),
    );

    // Then: Desktop input with offsets, then dshow audio
    let expected_prefix = [
        "-f", "gdigrab", "-framerate", "60", "-offset_x", "1930", "-offset_y", "20",
        "-video_size", "100x50", "-i", "desktop", "-f", "dshow", "-i", "audio=Microphone (USB)",
    ];
    assert_eq!(args[..expected_prefix.len()], expected_prefix);
    assert_eq!(args.last().map(String::as_str), Some("out.mkv"));
}

/// WHAT: No audio device means no audio input and no volume filter
/// WHY: A volume filter without an audio stream makes the encoder fail
#[test]
fn given_no_audio_device_when_building_args_then_no_audio_options() {
    // Given: Video-only settings
    let backend = X11GrabBackend::new(":0.0");

    // When: Building the argument vector
    let args = recording_args(&backend, &target(), &config(None), Path::new("out.mkv"));

    // Then: Neither pulse input nor volume filter
    assert!(!args.iter().any(|arg| arg == "pulse"));
    assert!(!args.iter().any(|arg| arg == "-filter:a"));
}

/// WHAT: Presets depend on the codec
/// WHY: Unknown codecs may not accept -preset at all
#[test]
#[allow(clippy::unwrap_used)]
fn given_various_codecs_when_building_args_then_matching_preset() {
    // Given: x265 and a hardware codec
    let backend = X11GrabBackend::new(":0.0");
    let mut x265 = config(None);
    x265.codec = "libx265".to_string();
    let mut nvenc = config(None);
    nvenc.codec = "h264_nvenc".to_string();

    // When: Building both argument vectors
    let x265_args = recording_args(&backend, &target(), &x265, Path::new("a.mkv"));
    let nvenc_args = recording_args(&backend, &target(), &nvenc, Path::new("b.mkv"));

    // Then: x265 gets medium, the hardware codec gets none
    let preset = x265_args.iter().position(|arg| arg == "-preset").unwrap();
    assert_eq!(x265_args[preset + 1], "medium");
    assert!(!nvenc_args.iter().any(|arg| arg == "-preset"));
}

/// WHAT: Concat passes stream-copy and only add faststart for MP4
/// WHY: Merging must never re-encode; faststart is meaningless for MKV
#[test]
fn given_containers_when_building_concat_args_then_faststart_only_for_mp4() {
    // Given: A manifest and two outputs
    let manifest = Path::new("/tmp/concat_list.txt");

    // When: Building concat args for mkv and mp4
    let mkv = concat_args(manifest, Path::new("/tmp/out.mkv"), "mkv");
    let mp4 = concat_args(manifest, Path::new("/tmp/out.mp4"), "mp4");

    // Then: Same stream-copy core, faststart only for mp4
    assert_eq!(
        mkv,
        [
            "-hide_banner", "-f", "concat", "-safe", "0", "-i", "/tmp/concat_list.txt", "-c",
            "copy", "/tmp/out.mkv",
        ]
    );
    assert!(mp4.windows(2).any(|pair| pair == ["-movflags", "+faststart"]));
    assert_eq!(mp4.last().map(String::as_str), Some("/tmp/out.mp4"));
}
