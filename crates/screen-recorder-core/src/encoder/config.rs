/// Encoder settings for one recording session.
///
/// Cloned into the session on start and never mutated while segments are
/// being produced, so every segment of a session shares the same encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Capture frame rate.
    pub frame_rate: u32,
    /// Target video bitrate, in encoder notation (e.g. `"8000k"`).
    pub bitrate: String,
    /// Video codec name (e.g. `"libx264"`).
    pub codec: String,
    /// Container extension without the dot (e.g. `"mkv"`).
    pub container: String,
    /// Audio input identifier. `None` records video only.
    pub audio_device: Option<String>,
    /// Input volume, 0–100.
    pub volume_percent: u8,
}

impl SessionConfig {
    /// Volume as a multiplier in `[0.0, 1.0]`.
    pub fn volume_multiplier(&self) -> f32 {
        f32::from(self.volume_percent.min(100)) / 100.0
    }
}
