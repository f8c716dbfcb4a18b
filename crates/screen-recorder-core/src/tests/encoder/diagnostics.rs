use crate::{
    DiagnosticEvent, ProgressLine,
    encoder::{DIAGNOSTIC_BATCH_LINES, MAX_LINE_BYTES, spawn_drain},
};

use std::io::Cursor;

use tokio::sync::mpsc;

/// WHAT: Progress reports are parsed into their fields
/// WHY: Progress is logged as structured fields rather than raw text
#[test]
#[allow(clippy::unwrap_used)]
fn given_progress_report_when_parsing_then_fields_extracted() {
    // Given: A typical progress line with padded values
    let line = "frame=  120 fps= 60 q=28.0 size=     512kB time=00:00:02.00 bitrate=2097.2kbits/s speed=1.00x";

    // When: Parsing
    let progress = ProgressLine::parse(line).unwrap();

    // Then: Every field is trimmed and present
    assert_eq!(progress.frame.as_deref(), Some("120"));
    assert_eq!(progress.fps.as_deref(), Some("60"));
    assert_eq!(progress.time.as_deref(), Some("00:00:02.00"));
    assert_eq!(progress.bitrate.as_deref(), Some("2097.2kbits/s"));
    assert_eq!(progress.speed.as_deref(), Some("1.00x"));
}

/// WHAT: Ordinary diagnostic lines are not progress
/// WHY: They are logged verbatim instead
#[test]
fn given_warning_line_when_parsing_then_none() {
    // Given: A stream mapping line
    let line = "Stream #0:0 -> #0:0 (rawvideo (native) -> h264 (libx264))";

    // When/Then: Not a progress line
    assert!(ProgressLine::parse(line).is_none());
}

/// WHAT: Carriage returns split lines like newlines
/// WHY: Progress reports overwrite themselves with \r and never end in \n
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_mixed_line_endings_when_draining_then_lines_split_on_both() {
    // Given: A stream with \r, \n and \r\n terminators and no trailing newline
    let (tx, mut rx) = mpsc::channel(8);
    let reader = Cursor::new(b"first\rsecond\r\nthird\nfourth".to_vec());

    // When: Draining to end of stream
    spawn_drain(reader, 4, tx).await.unwrap();

    // Then: One batch with every nonempty line, then closure
    assert_eq!(
        rx.recv().await,
        Some(DiagnosticEvent::Lines {
            sequence: 4,
            lines: vec![
                "first".to_string(),
                "second".to_string(),
                "third".to_string(),
                "fourth".to_string(),
            ],
        })
    );
    assert_eq!(rx.recv().await, Some(DiagnosticEvent::StreamClosed { sequence: 4 }));
    assert_eq!(rx.recv().await, None);
}

/// WHAT: Long output is forwarded in bounded batches
/// WHY: The coordinator must never receive one unbounded message
#[tokio::test]
#[allow(clippy::unwrap_used, clippy::panic)]
async fn given_many_lines_when_draining_then_batches_are_capped() {
    // Given: Two and a half batches worth of lines
    let total = DIAGNOSTIC_BATCH_LINES * 2 + DIAGNOSTIC_BATCH_LINES / 2;
    let text: String = (0..total).map(|i| format!("line {}\n", i)).collect();
    let (tx, mut rx) = mpsc::channel(8);

    // When: Draining
    spawn_drain(Cursor::new(text.into_bytes()), 0, tx).await.unwrap();

    // Then: Full, full, partial, then closure; order preserved
    let mut sizes = Vec::new();
    let mut first_lines = Vec::new();
    while let Some(event) = rx.recv().await {
        match event {
            DiagnosticEvent::Lines { lines, .. } => {
                first_lines.push(lines[0].clone());
                sizes.push(lines.len());
            }
            DiagnosticEvent::StreamClosed { .. } => break,
            DiagnosticEvent::ReadFailed { reason, .. } => panic!("unexpected read failure: {}", reason),
        }
    }
    assert_eq!(
        sizes,
        [DIAGNOSTIC_BATCH_LINES, DIAGNOSTIC_BATCH_LINES, DIAGNOSTIC_BATCH_LINES / 2]
    );
    assert_eq!(first_lines[1], format!("line {}", DIAGNOSTIC_BATCH_LINES));
}

/// WHAT: A closed channel does not stop the drain
/// WHY: The encoder blocks if its diagnostic pipe is not read to the end
#[tokio::test]
async fn given_closed_channel_when_draining_then_task_still_completes() {
    // Given: A receiver that is already gone
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    // When: Draining several batches
    let text = "x\n".repeat(DIAGNOSTIC_BATCH_LINES * 3);
    let result = spawn_drain(Cursor::new(text.into_bytes()), 1, tx).await;

    // Then: The task ran to completion
    assert!(result.is_ok());
}

/// WHAT: Output that never ends a line is cut into bounded pieces
/// WHY: A stream without terminators must not grow the reader's buffer forever
#[tokio::test]
#[allow(clippy::unwrap_used, clippy::panic)]
async fn given_unterminated_stream_when_draining_then_lines_capped() {
    // Given: Two and a half maximum lines worth of bytes with no terminator
    let total = MAX_LINE_BYTES * 2 + MAX_LINE_BYTES / 2;
    let (tx, mut rx) = mpsc::channel(8);

    // When: Draining
    spawn_drain(Cursor::new(vec![b'x'; total]), 1, tx).await.unwrap();

    // Then: Three capped lines carrying every byte, then closure
    let mut lines = Vec::new();
    while let Some(event) = rx.recv().await {
        match event {
            DiagnosticEvent::Lines { lines: batch, .. } => lines.extend(batch),
            DiagnosticEvent::StreamClosed { .. } => break,
            other => panic!("unexpected event {:?}", other),
        }
    }
    let lengths: Vec<usize> = lines.iter().map(String::len).collect();
    assert_eq!(lengths, [MAX_LINE_BYTES, MAX_LINE_BYTES, MAX_LINE_BYTES / 2]);
}
