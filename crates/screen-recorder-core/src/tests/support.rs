//! Shell scripts standing in for the encoder binary.

use crate::{
    CaptureRequest, DiagnosticEvent, EncoderSupervisor, MonitorGeometry, SegmentManager,
    SessionConfig, X11GrabBackend,
};

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::Arc,
    time::Duration,
};

use tokio::sync::mpsc;

/// ETXTBSY: another thread forked while the script was still open for writing.
const TEXT_FILE_BUSY: i32 = 26;

pub(crate) const TEST_GRACEFUL_TIMEOUT: Duration = Duration::from_millis(300);

/// How the fake encoder behaves while recording.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FakeEncoder {
    /// Writes its output file name into the output, then exits on stdin input or EOF.
    Cooperative,
    /// Creates an empty output file, then exits on stdin input or EOF.
    EmptyOutput,
    /// Writes output, then ignores the quit token and SIGTERM.
    IgnoresQuit,
    /// Writes a partial output and exits immediately with status 3.
    ExitsEarly,
    /// Records like `Cooperative` but every concat pass fails.
    FailingConcat,
    /// Records like `Cooperative` the first time, then like `ExitsEarly`.
    CrashesAfterFirst,
}

impl FakeEncoder {
    fn recording_body(self) -> &'static str {
        match self {
            FakeEncoder::Cooperative | FakeEncoder::FailingConcat => {
                r#"basename "$last" > "$last"
echo "frame=  60 fps= 60 q=28.0 size=  256kB time=00:00:01.00 bitrate=2097.2kbits/s speed=1.00x" >&2
read -r _
exit 0"#
            }
            FakeEncoder::EmptyOutput => {
                r#": > "$last"
read -r _
exit 0"#
            }
            FakeEncoder::IgnoresQuit => {
                r#"trap '' TERM
basename "$last" > "$last"
while true; do :; done"#
            }
            FakeEncoder::CrashesAfterFirst => {
                r#"marker="$0.recorded"
if [ -e "$marker" ]; then
    printf 'partial' > "$last"
    exit 3
fi
: > "$marker"
basename "$last" > "$last"
read -r _
exit 0"#
            }
            FakeEncoder::ExitsEarly => {
                r#"printf 'partial' > "$last"
echo "Device disappeared" >&2
exit 3"#
            }
        }
    }

    fn concat_body(self) -> &'static str {
        match self {
            FakeEncoder::FailingConcat => {
                r#"echo "Invalid data found when processing input" >&2
exit 1"#
            }
            _ => {
                r#": > "$last"
sed -e "s/^file '//" -e "s/'\$//" "$7" | while IFS= read -r part; do
    cat "$part" >> "$last"
done
exit 0"#
            }
        }
    }
}

/// Write an executable fake encoder into `dir`.
#[allow(clippy::unwrap_used)]
pub(crate) fn install(dir: &Path, mode: FakeEncoder) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
for last; do :; done
if [ "$1" = "-version" ]; then
    echo "fake encoder version 1.0"
    exit 0
fi
if [ "$2" = "-f" ] && [ "$3" = "concat" ]; then
{concat}
fi
{recording}
"#,
        concat = mode.concat_body(),
        recording = mode.recording_body(),
    );

    let path = dir.join(format!("fake-encoder-{:?}.sh", mode).to_lowercase());
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    wait_until_executable(&path);

    path
}

#[allow(clippy::panic)]
fn wait_until_executable(path: &Path) {
    for _ in 0..50 {
        match Command::new(path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(_) => return,
            Err(e) if e.raw_os_error() == Some(TEXT_FILE_BUSY) => {
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(e) => panic!("fake encoder not executable: {}", e),
        }
    }
    panic!("fake encoder stayed busy");
}

pub(crate) fn supervisor(binary: &Path) -> (EncoderSupervisor, mpsc::Receiver<DiagnosticEvent>) {
    let (tx, rx) = mpsc::channel(64);
    let supervisor = EncoderSupervisor::new(
        binary,
        Arc::new(X11GrabBackend::new(":99.0")),
        tx,
        TEST_GRACEFUL_TIMEOUT,
    );
    (supervisor, rx)
}

pub(crate) fn segment_manager(
    dir: &Path,
    mode: FakeEncoder,
) -> (SegmentManager, mpsc::Receiver<DiagnosticEvent>) {
    let binary = install(dir, mode);
    let (supervisor, rx) = supervisor(&binary);
    (SegmentManager::new(supervisor, dir.join("out")), rx)
}

pub(crate) fn session_config(container: &str) -> SessionConfig {
    SessionConfig {
        frame_rate: 30,
        bitrate: "1000k".to_string(),
        codec: "libx264".to_string(),
        container: container.to_string(),
        audio_device: None,
        volume_percent: 100,
    }
}

pub(crate) fn monitors() -> [MonitorGeometry; 2] {
    [
        MonitorGeometry {
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
        },
        MonitorGeometry {
            x: 1920,
            y: 0,
            width: 1280,
            height: 1024,
        },
    ]
}

pub(crate) fn request(monitor_index: usize) -> CaptureRequest {
    CaptureRequest {
        monitor_index,
        monitor: monitors()[monitor_index],
        selection: None,
    }
}
