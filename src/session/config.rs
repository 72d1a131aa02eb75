//! Session limits.

use serde::{Deserialize, Serialize};

/// Settings for the detection loop itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Consecutive failed acquisitions tolerated before the session aborts.
    pub max_consecutive_failures: u32,
    /// Stop after this many acquired frames (unbounded if unset).
    pub max_frames: Option<u64>,
    /// Prometheus exporter port (0 disables the exporter).
    pub metrics_port: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 5,
            max_frames: None,
            metrics_port: 0,
        }
    }
}
