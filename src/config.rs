//! Configuration file format and validation.
//!
//! Every section is optional; missing keys fall back to the built-in
//! defaults.
//!
//! ```toml
//! [capture]
//! device_id = 0
//!
//! [detection]
//! diff_threshold = 30
//! min_area = 15000.0
//!
//! [display]
//! quit_key = "q"
//!
//! [session]
//! max_consecutive_failures = 5
//! ```

use crate::capture::CaptureConfig;
use crate::detection::DetectionParams;
use crate::display::DisplayConfig;
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// Frame rate outside the supported range.
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    /// Blur kernel size is even or zero.
    #[error("invalid blur kernel size {0} (must be odd)")]
    InvalidKernel(u32),
    /// Minimum area is negative or not finite.
    #[error("invalid minimum area {0}")]
    InvalidMinArea(f64),
    /// Box thickness is zero.
    #[error("box thickness must be at least 1")]
    InvalidThickness,
    /// Quit key is a control character.
    #[error("invalid quit key {0:?}")]
    InvalidQuitKey(char),
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The file is not valid TOML for this layout.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// `[capture]` table.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// `[detection]` table.
    #[serde(default)]
    pub detection: DetectionParams,
    /// `[display]` table.
    #[serde(default)]
    pub display: DisplayConfig,
    /// `[session]` table.
    #[serde(default)]
    pub session: SessionConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.detection.validate()?;
        self.display.validate()?;
        Ok(())
    }
}
