//! Live output of the detection pipeline.
//!
//! A [`Display`] receives the four views of every analyzed frame and is
//! polled for key presses in between. Implementations range from real
//! windows (feature `gui`) to headless and scripted sinks.

#[cfg(feature = "gui")]
mod window;

#[cfg(feature = "gui")]
pub use window::WindowDisplay;

use crate::config::ConfigError;
use crate::detection::FrameAnalysis;
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use thiserror::Error;

/// Window titles, in the order the views are shown.
pub const VIEW_NAMES: [&str; 4] = ["Gray", "Delta", "Threshold", "Color"];

/// Errors that can occur while presenting frames.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The window backend reported an error.
    #[error("window backend error: {0}")]
    Backend(String),
    /// The display was used after `close`.
    #[error("display already closed")]
    Closed,
}

/// Display and keyboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Key that ends the session.
    pub quit_key: char,
    /// How long each key poll may block, in milliseconds.
    pub key_wait_ms: u64,
    /// Run without windows.
    pub headless: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            quit_key: 'q',
            key_wait_ms: 1,
            headless: false,
        }
    }
}

impl DisplayConfig {
    /// Key poll timeout.
    pub fn key_wait(&self) -> Duration {
        Duration::from_millis(self.key_wait_ms)
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quit_key.is_control() {
            return Err(ConfigError::InvalidQuitKey(self.quit_key));
        }
        Ok(())
    }
}

/// The four synchronized views of one analyzed frame.
#[derive(Debug, Clone, Copy)]
pub struct Views<'a> {
    /// Blurred grayscale frame.
    pub gray: &'a GrayImage,
    /// Difference against the reference.
    pub delta: &'a GrayImage,
    /// Dilated motion mask.
    pub threshold: &'a GrayImage,
    /// Color frame with bounding boxes.
    pub color: &'a RgbImage,
}

impl<'a> From<&'a FrameAnalysis> for Views<'a> {
    fn from(analysis: &'a FrameAnalysis) -> Self {
        Self {
            gray: &analysis.blurred,
            delta: &analysis.delta,
            threshold: &analysis.mask,
            color: &analysis.annotated,
        }
    }
}

/// Output surface for the views plus a keyboard source.
pub trait Display {
    /// Presents the views of one frame.
    fn show(&mut self, views: &Views<'_>) -> Result<(), DisplayError>;

    /// Waits up to `wait` for a key press.
    fn poll_key(&mut self, wait: Duration) -> Result<Option<char>, DisplayError>;

    /// Tears down every window.
    fn close(&mut self);
}

/// Display without any windows.
///
/// Frames are only traced; no key is ever reported, so a headless
/// session ends through the stop signal or the frame limit.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    shown: u64,
}

impl HeadlessDisplay {
    /// Creates a display that only counts frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames presented so far.
    pub fn shown(&self) -> u64 {
        self.shown
    }
}

impl Display for HeadlessDisplay {
    fn show(&mut self, views: &Views<'_>) -> Result<(), DisplayError> {
        self.shown += 1;
        tracing::trace!(
            frame = self.shown,
            width = views.color.width(),
            height = views.color.height(),
            "Views ready"
        );
        Ok(())
    }

    fn poll_key(&mut self, _wait: Duration) -> Result<Option<char>, DisplayError> {
        Ok(None)
    }

    fn close(&mut self) {
        tracing::debug!(frames = self.shown, "Headless display closed");
    }
}

/// Display that returns scripted key presses and records what it shows.
#[derive(Debug, Default)]
pub struct ScriptedDisplay {
    keys: VecDeque<Option<char>>,
    shown: u64,
    polls: u64,
    last_color: Option<RgbImage>,
    closed: bool,
}

impl ScriptedDisplay {
    /// Creates a display answering successive polls with `keys`.
    ///
    /// Polls past the end of the script report no key.
    pub fn new(keys: impl IntoIterator<Item = Option<char>>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Creates a display that reports `key` on poll number `poll` (1-based).
    pub fn key_on_poll(poll: usize, key: char) -> Self {
        let mut keys = vec![None; poll.saturating_sub(1)];
        keys.push(Some(key));
        Self::new(keys)
    }

    /// Number of frames shown.
    pub fn shown(&self) -> u64 {
        self.shown
    }

    /// Number of key polls.
    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Last annotated frame shown.
    pub fn last_color(&self) -> Option<&RgbImage> {
        self.last_color.as_ref()
    }

    /// Returns true once `close` was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Display for ScriptedDisplay {
    fn show(&mut self, views: &Views<'_>) -> Result<(), DisplayError> {
        if self.closed {
            return Err(DisplayError::Closed);
        }
        self.shown += 1;
        self.last_color = Some(views.color.clone());
        Ok(())
    }

    fn poll_key(&mut self, _wait: Duration) -> Result<Option<char>, DisplayError> {
        if self.closed {
            return Err(DisplayError::Closed);
        }
        self.polls += 1;
        Ok(self.keys.pop_front().flatten())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_keys_in_order() {
        let mut display = ScriptedDisplay::key_on_poll(3, 'q');
        let wait = Duration::from_millis(1);

        assert_eq!(display.poll_key(wait).unwrap(), None);
        assert_eq!(display.poll_key(wait).unwrap(), None);
        assert_eq!(display.poll_key(wait).unwrap(), Some('q'));
        assert_eq!(display.poll_key(wait).unwrap(), None);
        assert_eq!(display.polls(), 4);
    }

    #[test]
    fn test_closed_display_rejects_frames() {
        let mut display = ScriptedDisplay::default();
        display.close();

        let gray = GrayImage::new(2, 2);
        let color = RgbImage::new(2, 2);
        let views = Views {
            gray: &gray,
            delta: &gray,
            threshold: &gray,
            color: &color,
        };
        assert!(matches!(display.show(&views), Err(DisplayError::Closed)));
        assert!(display.is_closed());
    }

    #[test]
    fn test_default_display_config() {
        let config = DisplayConfig::default();
        assert_eq!(config.quit_key, 'q');
        assert_eq!(config.key_wait(), Duration::from_millis(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_control_quit_key_rejected() {
        let config = DisplayConfig {
            quit_key: '\n',
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidQuitKey('\n'))
        ));
    }
}
