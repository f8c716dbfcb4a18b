use crate::{capture::CaptureTarget, encoder::SessionConfig};

use std::{fmt::Debug, sync::Arc};

/// Display used by the X11 backend when `DISPLAY` is unset.
const DEFAULT_X11_DISPLAY: &str = ":0.0";

/// Platform-specific desktop and audio capture inputs for the encoder.
///
/// One implementation per platform, selected once at startup. The backend only
/// produces the input half of the argument vector; encoding options are
/// shared and appended by the supervisor.
pub trait CaptureBackend: Debug + Send + Sync {
    /// Short identifier used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Encoder input arguments for the given target and settings.
    fn input_args(&self, target: &CaptureTarget, config: &SessionConfig) -> Vec<String>;

    /// Whether the encoder accepts an interactive quit token on stdin.
    fn supports_quit_token(&self) -> bool {
        true
    }
}

/// Windows GDI desktop grabber with DirectShow audio.
#[derive(Debug, Default, Clone)]
pub struct GdiGrabBackend;

impl CaptureBackend for GdiGrabBackend {
    fn name(&self) -> &'static str {
        "gdigrab"
    }

    fn input_args(&self, target: &CaptureTarget, config: &SessionConfig) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            "gdigrab".to_string(),
            "-framerate".to_string(),
            config.frame_rate.to_string(),
            "-offset_x".to_string(),
            target.x.to_string(),
            "-offset_y".to_string(),
            target.y.to_string(),
            "-video_size".to_string(),
            target.video_size(),
            "-i".to_string(),
            "desktop".to_string(),
        ];

        if let Some(device) = &config.audio_device {
            args.extend([
                "-f".to_string(),
                "dshow".to_string(),
                "-i".to_string(),
                format!("audio={}", device),
            ]);
        }

        args
    }
}

/// X11 desktop grabber with PulseAudio input.
#[derive(Debug, Clone)]
pub struct X11GrabBackend {
    display: String,
}

impl X11GrabBackend {
    /// Create a backend grabbing from the given X display (e.g. `":0.0"`).
    pub fn new(display: impl Into<String>) -> Self {
        Self {
            display: display.into(),
        }
    }

    /// Create a backend for the display named by `DISPLAY`.
    pub fn from_env() -> Self {
        let display =
            std::env::var("DISPLAY").unwrap_or_else(|_| DEFAULT_X11_DISPLAY.to_string());
        Self::new(display)
    }
}

impl CaptureBackend for X11GrabBackend {
    fn name(&self) -> &'static str {
        "x11grab"
    }

    fn input_args(&self, target: &CaptureTarget, config: &SessionConfig) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            "x11grab".to_string(),
            "-framerate".to_string(),
            config.frame_rate.to_string(),
            "-video_size".to_string(),
            target.video_size(),
            "-i".to_string(),
            format!("{}+{},{}", self.display, target.x, target.y),
        ];

        if let Some(device) = &config.audio_device {
            args.extend([
                "-f".to_string(),
                "pulse".to_string(),
                "-i".to_string(),
                device.clone(),
            ]);
        }

        args
    }
}

/// Backend for the platform the binary was built for.
pub fn default_backend() -> Arc<dyn CaptureBackend> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(GdiGrabBackend)
    }
    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(X11GrabBackend::from_env())
    }
}

/// Look up a backend by its [`CaptureBackend::name`].
pub fn backend_by_name(name: &str) -> Option<Arc<dyn CaptureBackend>> {
    match name {
        "gdigrab" => Some(Arc::new(GdiGrabBackend)),
        "x11grab" => Some(Arc::new(X11GrabBackend::from_env())),
        _ => None,
    }
}
