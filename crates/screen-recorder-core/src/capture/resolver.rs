use crate::{
    CoreResult, RecorderError,
    capture::{CaptureOrigin, CaptureTarget, MonitorGeometry, SelectionRect},
};

use std::panic::Location;

use error_location::ErrorLocation;

/// Resolve a monitor choice and optional selection into encoder geometry.
///
/// Without a selection the whole monitor is captured. With one, the
/// rectangle is clipped to the monitor, its size rounded down to even numbers
/// (codecs using 4:2:0 chroma reject odd dimensions), and its top-left corner
/// translated by the monitor origin so that multi-monitor layouts resolve to
/// global desktop coordinates.
///
/// # Errors
///
/// Returns [`RecorderError::InvalidArea`] if the selection is degenerate,
/// lies entirely off the monitor, or the even adjustment leaves nothing to
/// record.
#[track_caller]
pub fn resolve(
    monitor_index: usize,
    monitor: &MonitorGeometry,
    selection: Option<&SelectionRect>,
) -> CoreResult<CaptureTarget> {
    let Some(rect) = selection else {
        let width = even_or_empty(monitor.width)?;
        let height = even_or_empty(monitor.height)?;

        return Ok(CaptureTarget {
            monitor_index,
            x: monitor.x,
            y: monitor.y,
            width,
            height,
            origin: CaptureOrigin::FullMonitor,
        });
    };

    if rect.x1 == rect.x2 || rect.y1 == rect.y2 {
        return Err(RecorderError::InvalidArea {
            reason: "degenerate selection".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let (left, width) = clip(rect.x1, rect.x2, monitor.width);
    let (top, height) = clip(rect.y1, rect.y2, monitor.height);

    if width == 0 || height == 0 {
        return Err(RecorderError::InvalidArea {
            reason: "selection lies outside the monitor".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let width = even_or_empty(width)?;
    let height = even_or_empty(height)?;

    Ok(CaptureTarget {
        monitor_index,
        x: left.saturating_add(monitor.x),
        y: top.saturating_add(monitor.y),
        width,
        height,
        origin: CaptureOrigin::CustomArea,
    })
}

/// Clip the span between `a` and `b` to `0..=limit`.
///
/// Returns the start and length of what remains.
fn clip(a: i32, b: i32, limit: u32) -> (i32, u32) {
    let limit = i64::from(limit);
    let start = i64::from(a.min(b)).clamp(0, limit);
    let end = i64::from(a.max(b)).clamp(0, limit);

    (
        i32::try_from(start).unwrap_or(i32::MAX),
        u32::try_from(end - start).unwrap_or(0),
    )
}

#[track_caller]
fn even_or_empty(value: u32) -> CoreResult<u32> {
    let adjusted = value - value % 2;
    if adjusted == 0 {
        return Err(RecorderError::InvalidArea {
            reason: "adjusted area is empty".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(adjusted)
}
