use crate::config::{default_encoder_binary, default_graceful_timeout_secs};

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

/// External encoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Encoder binary, either a bare name looked up on `PATH` or a full path.
    #[serde(default = "default_encoder_binary")]
    pub binary: PathBuf,
    /// Seconds the encoder gets to finalize its output after a quit request.
    #[serde(default = "default_graceful_timeout_secs")]
    pub graceful_timeout_secs: u64,
    /// Capture backend name (`gdigrab`, `x11grab`). None = platform default.
    #[serde(default)]
    pub backend: Option<String>,
}

impl EncoderConfig {
    /// Graceful stop timeout as a [`Duration`].
    pub fn graceful_timeout(&self) -> Duration {
        Duration::from_secs(self.graceful_timeout_secs)
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            binary: default_encoder_binary(),
            graceful_timeout_secs: default_graceful_timeout_secs(),
            backend: None,
        }
    }
}
