use screen_recorder_core::MonitorGeometry;

use serde::{Deserialize, Serialize};

/// One monitor in global desktop coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Left edge on the virtual desktop.
    #[serde(default)]
    pub x: i32,
    /// Top edge on the virtual desktop.
    #[serde(default)]
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl From<MonitorConfig> for MonitorGeometry {
    fn from(monitor: MonitorConfig) -> Self {
        MonitorGeometry {
            x: monitor.x,
            y: monitor.y,
            width: monitor.width,
            height: monitor.height,
        }
    }
}
