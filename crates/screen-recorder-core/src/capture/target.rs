use std::fmt;

/// Position and size of one monitor in global desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorGeometry {
    /// Left edge of the monitor on the virtual desktop.
    pub x: i32,
    /// Top edge of the monitor on the virtual desktop.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A user-drawn rectangle in monitor-local coordinates.
///
/// Corners may be given in any drag direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRect {
    /// First corner, horizontal.
    pub x1: i32,
    /// First corner, vertical.
    pub y1: i32,
    /// Opposite corner, horizontal.
    pub x2: i32,
    /// Opposite corner, vertical.
    pub y2: i32,
}

impl SelectionRect {
    /// Create a rectangle from two corner points.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

/// Whether a target covers the whole monitor or a user selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOrigin {
    /// Entire monitor bounds.
    FullMonitor,
    /// User-drawn rectangle.
    CustomArea,
}

/// Concrete pixel geometry handed to the encoder.
///
/// `width` and `height` are always positive and even.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTarget {
    /// Index of the monitor the target lives on.
    pub monitor_index: usize,
    /// Absolute horizontal offset on the virtual desktop.
    pub x: i32,
    /// Absolute vertical offset on the virtual desktop.
    pub y: i32,
    /// Capture width in pixels.
    pub width: u32,
    /// Capture height in pixels.
    pub height: u32,
    /// How the target was produced.
    pub origin: CaptureOrigin,
}

impl CaptureTarget {
    /// Size formatted the way encoders expect it (`WxH`).
    pub fn video_size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match self.origin {
            CaptureOrigin::FullMonitor => "monitor",
            CaptureOrigin::CustomArea => "area",
        };
        write!(
            f,
            "{} {} {}x{}+{},{}",
            origin, self.monitor_index, self.width, self.height, self.x, self.y
        )
    }
}
