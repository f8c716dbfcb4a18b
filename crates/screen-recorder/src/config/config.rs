//! Configuration management for screen-recorder.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        BITRATE_TIERS, EncoderConfig, MonitorConfig, OutputConfig, RecordingConfig,
        SUPPORTED_CONTAINERS, SelectionConfig,
    },
};

use screen_recorder_core::{
    CaptureBackend, MonitorGeometry, SessionConfig, backend_by_name, default_backend,
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    sync::Arc,
};

use directories::{ProjectDirs, UserDirs};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

const MAX_VOLUME: u8 = 100;

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// External encoder settings.
    #[serde(default)]
    pub encoder: EncoderConfig,
    /// Encoding settings for new recordings.
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Output location.
    pub output: OutputConfig,
    /// Known monitors. Enumerating displays is outside this application, so
    /// the layout is configured.
    pub monitors: Vec<MonitorConfig>,
    /// Last capture choice.
    #[serde(default)]
    pub selection: SelectionConfig,
}

impl Config {
    /// Load configuration from `path`, writing the default there if missing.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            info!(config_path = ?path, "No config found, creating default");
            let config = Self::default_config()?;
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config = Self::from_toml_str(&contents)?;
        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Parse configuration from TOML text.
    #[track_caller]
    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        toml::from_str(contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Check every value a recording depends on.
    ///
    /// Call once after loading, before any recording starts.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate(&self) -> AppResult<()> {
        let recording = &self.recording;

        let problem = if recording.frame_rate == 0 {
            Some("frame rate must be greater than zero".to_string())
        } else if recording.volume > MAX_VOLUME {
            Some(format!("volume {} exceeds {}", recording.volume, MAX_VOLUME))
        } else if !SUPPORTED_CONTAINERS.contains(&recording.container.as_str()) {
            Some(format!(
                "container '{}' is not one of {:?}",
                recording.container, SUPPORTED_CONTAINERS
            ))
        } else if !BITRATE_TIERS.contains(&recording.bitrate.as_str()) {
            Some(format!(
                "bitrate '{}' is not one of {:?}",
                recording.bitrate, BITRATE_TIERS
            ))
        } else if recording.codec.trim().is_empty() {
            Some("codec must not be empty".to_string())
        } else if self.monitors.is_empty() {
            Some("at least one monitor must be configured".to_string())
        } else if let Some(name) = &self.encoder.backend
            && backend_by_name(name).is_none()
        {
            Some(format!("unknown capture backend '{}'", name))
        } else {
            None
        };

        if let Some(reason) = problem {
            return Err(AppError::ConfigError {
                reason,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.selection.monitor_index >= self.monitors.len() {
            warn!(
                monitor_index = self.selection.monitor_index,
                monitors = self.monitors.len(),
                "Saved monitor no longer exists, primary monitor will be used"
            );
        }

        Ok(())
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Encoder settings for a new recording.
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            frame_rate: self.recording.frame_rate,
            bitrate: self.recording.bitrate.clone(),
            codec: self.recording.codec.clone(),
            container: self.recording.container.clone(),
            audio_device: self.recording.audio_device.clone(),
            volume_percent: self.recording.volume.min(MAX_VOLUME),
        }
    }

    /// Geometry of the monitor at `index`.
    pub fn monitor(&self, index: usize) -> Option<MonitorGeometry> {
        self.monitors.get(index).copied().map(MonitorGeometry::from)
    }

    /// The saved monitor choice, falling back to the first monitor.
    pub fn selected_monitor_index(&self) -> usize {
        if self.selection.monitor_index < self.monitors.len() {
            self.selection.monitor_index
        } else {
            0
        }
    }

    /// Capture backend named in the config, or the platform default.
    #[track_caller]
    pub fn capture_backend(&self) -> AppResult<Arc<dyn CaptureBackend>> {
        match &self.encoder.backend {
            None => Ok(default_backend()),
            Some(name) => backend_by_name(name).ok_or_else(|| AppError::ConfigError {
                reason: format!("unknown capture backend '{}'", name),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Directory for rolling log files.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.data_local_dir().join("logs"))
    }

    /// Location of `config.toml` in the platform config directory.
    #[track_caller]
    pub fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "screen-recorder", "Screen-Recorder").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    #[track_caller]
    fn default_config() -> AppResult<Self> {
        let directory = match UserDirs::new().and_then(|dirs| dirs.video_dir().map(Path::to_path_buf))
        {
            Some(videos) => videos.join("Screen-Recorder"),
            None => Self::project_dirs()?.data_dir().join("recordings"),
        };

        warn!(
            output_dir = ?directory,
            "Default config created. Edit the monitor list to match your display layout."
        );

        Ok(Self::with_output_dir(directory))
    }

    /// Default settings writing into `directory`, with a single 1920x1080
    /// monitor at the desktop origin.
    pub fn with_output_dir(directory: impl Into<PathBuf>) -> Self {
        Config {
            encoder: EncoderConfig::default(),
            recording: RecordingConfig::default(),
            output: OutputConfig {
                directory: directory.into(),
            },
            monitors: vec![MonitorConfig {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
            }],
            selection: SelectionConfig::default(),
        }
    }
}
