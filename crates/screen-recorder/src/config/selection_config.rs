use serde::{Deserialize, Serialize};

/// Last capture choice, restored on the next launch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Index into the monitor list.
    #[serde(default)]
    pub monitor_index: usize,
}
