use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where recordings are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory holding segments, manifests and final recordings.
    pub directory: PathBuf,
}
