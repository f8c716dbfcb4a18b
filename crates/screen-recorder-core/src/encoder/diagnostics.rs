//! Encoder diagnostic stream draining.
//!
//! The encoder writes progress and warnings to its diagnostic stream
//! continuously. If nobody reads it the pipe buffer fills up and the encoder
//! blocks mid-frame, so every live process gets a dedicated reader task that
//! forwards batches of lines to the coordinator over a bounded channel.

use std::time::{Duration, Instant};

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};
use tracing::{debug, warn};

/// Lines collected before a batch is forwarded.
pub(crate) const DIAGNOSTIC_BATCH_LINES: usize = 100;

/// Maximum age of a partial batch before it is forwarded anyway.
const DIAGNOSTIC_FLUSH_INTERVAL: Duration = Duration::from_secs(2);

const READ_CHUNK_BYTES: usize = 4096;

/// Longest unterminated line kept before it is forwarded as is.
pub(crate) const MAX_LINE_BYTES: usize = READ_CHUNK_BYTES * 16;

/// Message from a drain task to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    /// A batch of diagnostic lines from one encoder run.
    Lines {
        /// Sequence number of the segment being encoded.
        sequence: u32,
        /// Lines in the order they were written.
        lines: Vec<String>,
    },
    /// The diagnostic stream reached end-of-stream.
    StreamClosed {
        /// Sequence number of the segment being encoded.
        sequence: u32,
    },
    /// Reading the diagnostic stream failed.
    ReadFailed {
        /// Sequence number of the segment being encoded.
        sequence: u32,
        /// Description of the read error.
        reason: String,
    },
}

/// Parsed encoder progress report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressLine {
    /// Frames encoded so far.
    pub frame: Option<String>,
    /// Current encoding frame rate.
    pub fps: Option<String>,
    /// Media time written so far.
    pub time: Option<String>,
    /// Current output bitrate.
    pub bitrate: Option<String>,
    /// Encoding speed relative to realtime.
    pub speed: Option<String>,
}

impl ProgressLine {
    /// Parse a progress line (`frame= .. fps= .. time= .. bitrate= ..`).
    ///
    /// Returns `None` for lines that are not progress reports.
    pub fn parse(line: &str) -> Option<Self> {
        if !(line.contains("time=") && line.contains("bitrate=")) {
            return None;
        }

        Some(Self {
            frame: extract_value(line, "frame="),
            fps: extract_value(line, "fps="),
            time: extract_value(line, "time="),
            bitrate: extract_value(line, "bitrate="),
            speed: extract_value(line, "speed="),
        })
    }
}

fn extract_value(line: &str, key: &str) -> Option<String> {
    let start = line.find(key)?;
    let value = line[start + key.len()..].trim_start();
    let end = value.find(char::is_whitespace).unwrap_or(value.len());

    if end == 0 {
        return None;
    }
    Some(value[..end].to_string())
}

/// Log a batch of diagnostic lines under the `encoder` target.
pub fn log_diagnostics(sequence: u32, lines: &[String]) {
    for line in lines {
        match ProgressLine::parse(line) {
            Some(progress) => debug!(
                target: "encoder",
                sequence,
                time = progress.time.as_deref().unwrap_or("??"),
                bitrate = progress.bitrate.as_deref().unwrap_or("N/A"),
                speed = progress.speed.as_deref().unwrap_or("??"),
                fps = progress.fps.as_deref().unwrap_or("??"),
                "Encoder progress"
            ),
            None => debug!(target: "encoder", sequence, "{}", line),
        }
    }
}

/// Spawn the reader task for one encoder's diagnostic stream.
///
/// Lines are split on both `\n` and `\r` (progress reports are
/// carriage-return terminated), and overlong runs without either are cut at
/// [`MAX_LINE_BYTES`]. The task ends on end-of-stream or on the first read
/// error; in both cases the reader is dropped, closing the pipe.
pub(crate) fn spawn_drain<R>(
    reader: R,
    sequence: u32,
    tx: mpsc::Sender<DiagnosticEvent>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut drain = Drain {
            sequence,
            tx,
            batch: Vec::with_capacity(DIAGNOSTIC_BATCH_LINES),
            batch_started: Instant::now(),
        };

        let mut reader = reader;
        let mut chunk = [0u8; READ_CHUNK_BYTES];
        let mut pending: Vec<u8> = Vec::new();

        loop {
            match reader.read(&mut chunk).await {
                Ok(0) => {
                    drain.push_bytes(&mut pending);
                    drain.flush();
                    drain.report(DiagnosticEvent::StreamClosed { sequence });
                    debug!(sequence, "Encoder diagnostic stream closed");
                    break;
                }
                Ok(read) => {
                    for &byte in &chunk[..read] {
                        if byte == b'\n' || byte == b'\r' {
                            drain.push_bytes(&mut pending);
                        } else {
                            pending.push(byte);
                            if pending.len() >= MAX_LINE_BYTES {
                                drain.push_bytes(&mut pending);
                            }
                        }
                    }
                }
                Err(e) => {
                    drain.push_bytes(&mut pending);
                    drain.flush();
                    drain.report(DiagnosticEvent::ReadFailed {
                        sequence,
                        reason: e.to_string(),
                    });
                    warn!(sequence, error = %e, "Failed to read encoder diagnostics");
                    break;
                }
            }
        }
    })
}

struct Drain {
    sequence: u32,
    tx: mpsc::Sender<DiagnosticEvent>,
    batch: Vec<String>,
    batch_started: Instant,
}

impl Drain {
    fn push_bytes(&mut self, pending: &mut Vec<u8>) {
        if pending.is_empty() {
            return;
        }

        let line = String::from_utf8_lossy(pending).trim().to_string();
        pending.clear();

        if line.is_empty() {
            return;
        }

        if self.batch.is_empty() {
            self.batch_started = Instant::now();
        }
        self.batch.push(line);

        if self.batch.len() >= DIAGNOSTIC_BATCH_LINES
            || self.batch_started.elapsed() >= DIAGNOSTIC_FLUSH_INTERVAL
        {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }

        let lines = std::mem::replace(
            &mut self.batch,
            Vec::with_capacity(DIAGNOSTIC_BATCH_LINES),
        );
        self.report(DiagnosticEvent::Lines {
            sequence: self.sequence,
            lines,
        });
    }

    /// Never waits for the consumer: a full or closed channel falls back to
    /// logging in place.
    fn report(&self, event: DiagnosticEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) | Err(TrySendError::Closed(event)) => {
                if let DiagnosticEvent::Lines { sequence, lines } = &event {
                    debug!(
                        sequence,
                        count = lines.len(),
                        "Diagnostic channel unavailable, logging in place"
                    );
                    log_diagnostics(*sequence, lines);
                }
            }
        }
    }
}
