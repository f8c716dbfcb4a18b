mod encoder_config;
mod monitor_config;
mod output_config;
mod recording_config;
mod selection_config;
#[allow(clippy::module_inception)]
mod config;

pub(crate) use {
    config::Config, encoder_config::EncoderConfig, monitor_config::MonitorConfig,
    output_config::OutputConfig, recording_config::RecordingConfig,
    selection_config::SelectionConfig,
};

pub(crate) const DEFAULT_ENCODER_BINARY: &str = "ffmpeg";
pub(crate) const DEFAULT_GRACEFUL_TIMEOUT_SECS: u64 = 5;
pub(crate) const DEFAULT_FRAME_RATE: u32 = 60;
pub(crate) const DEFAULT_BITRATE: &str = "1000k";
pub(crate) const DEFAULT_CODEC: &str = "libx264";
pub(crate) const DEFAULT_CONTAINER: &str = "mkv";
pub(crate) const DEFAULT_VOLUME: u8 = 100;

/// Bitrates offered to the user.
pub(crate) const BITRATE_TIERS: [&str; 8] = [
    "1000k", "2000k", "4000k", "6000k", "8000k", "10000k", "15000k", "20000k",
];

/// Containers the concat pass can stream-copy into.
pub(crate) const SUPPORTED_CONTAINERS: [&str; 2] = ["mkv", "mp4"];

pub(crate) fn default_encoder_binary() -> std::path::PathBuf {
    std::path::PathBuf::from(DEFAULT_ENCODER_BINARY)
}

pub(crate) fn default_graceful_timeout_secs() -> u64 {
    DEFAULT_GRACEFUL_TIMEOUT_SECS
}

pub(crate) fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

pub(crate) fn default_bitrate() -> String {
    DEFAULT_BITRATE.to_string()
}

pub(crate) fn default_codec() -> String {
    DEFAULT_CODEC.to_string()
}

pub(crate) fn default_container() -> String {
    DEFAULT_CONTAINER.to_string()
}

pub(crate) fn default_volume() -> u8 {
    DEFAULT_VOLUME
}
