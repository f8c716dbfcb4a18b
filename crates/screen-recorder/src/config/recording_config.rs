use crate::config::{
    default_bitrate, default_codec, default_container, default_frame_rate, default_volume,
};

use serde::{Deserialize, Serialize};

/// Encoding settings applied to every recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Capture frame rate.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Video bitrate tier (e.g. `"8000k"`).
    #[serde(default = "default_bitrate")]
    pub bitrate: String,
    /// Video codec (`libx264`, `libx265`, ...).
    #[serde(default = "default_codec")]
    pub codec: String,
    /// Output container (`mkv` or `mp4`).
    #[serde(default = "default_container")]
    pub container: String,
    /// Audio input device (None = record video only).
    #[serde(default)]
    pub audio_device: Option<String>,
    /// Audio volume, 0–100.
    #[serde(default = "default_volume")]
    pub volume: u8,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            bitrate: default_bitrate(),
            codec: default_codec(),
            container: default_container(),
            audio_device: None,
            volume: default_volume(),
        }
    }
}
