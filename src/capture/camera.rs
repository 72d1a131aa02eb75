//! Camera abstraction for frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and synthetic sources for demos
//! and testing.

use super::{CaptureConfig, Frame};
use image::{Rgb, RgbImage};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// No device with the requested index.
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    /// The device exists but could not be opened.
    #[error("failed to open camera: {0}")]
    OpenFailed(String),
    /// The requested format was rejected.
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    /// A frame could not be read or decoded.
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    /// `capture` was called before `open`.
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera implementations.
///
/// The session holds the camera exclusively between `open` and `close`.
pub trait Camera {
    /// Opens and initializes the camera with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures a single frame.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Closes the camera and releases resources.
    fn close(&mut self);
}

/// Frames before the synthetic object enters the scene.
const MOCK_STILL_FRAMES: u64 = 3;
/// Horizontal distance the synthetic object travels per frame.
const MOCK_STEP_PX: u64 = 8;

/// Synthetic camera producing a static scene with one moving square.
///
/// The background is a fixed gradient, so the first frame makes a clean
/// reference. From the fourth frame on, a bright square crosses the
/// scene from left to right and wraps around.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    sequence: u64,
}

impl MockCamera {
    /// Creates an unopened synthetic camera.
    pub fn new() -> Self {
        Self::default()
    }

    fn render(config: &CaptureConfig, sequence: u64) -> RgbImage {
        let (width, height) = (config.width, config.height);
        let side = (width.min(height) / 3).max(1);

        let object = (sequence > MOCK_STILL_FRAMES).then(|| {
            let travel = u64::from(width.saturating_sub(side).max(1));
            let x0 = ((sequence - MOCK_STILL_FRAMES) * MOCK_STEP_PX % travel) as u32;
            let y0 = (height - side) / 2;
            (x0, y0)
        });

        RgbImage::from_fn(width, height, |x, y| {
            if let Some((x0, y0)) = object {
                if (x0..x0 + side).contains(&x) && (y0..y0 + side).contains(&y) {
                    return Rgb([230, 230, 230]);
                }
            }
            let shade = 60 + ((x / 8 + y / 8) % 32) as u8;
            Rgb([shade, shade, shade])
        })
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.sequence = 0;
        tracing::info!("MockCamera opened with config: {:?}", config);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;

        self.sequence += 1;
        let image = Self::render(config, self.sequence);
        Ok(Frame::new(image, self.sequence))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        self.config = None;
        tracing::info!("MockCamera closed");
    }
}

/// Camera that replays a fixed script of frames and failures.
///
/// Once the script is exhausted every capture fails. The camera keeps
/// count of capture attempts and releases so callers can check how a
/// session drove it.
#[derive(Debug, Default)]
pub struct ScriptedCamera {
    script: VecDeque<Option<RgbImage>>,
    open: bool,
    sequence: u64,
    attempts: u64,
    releases: u64,
    fail_open: bool,
}

impl ScriptedCamera {
    /// Creates a camera that delivers the given images in order.
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            script: frames.into_iter().map(Some).collect(),
            ..Default::default()
        }
    }

    /// Creates a camera whose `open` always fails, like a missing device.
    pub fn unavailable() -> Self {
        Self {
            fail_open: true,
            ..Default::default()
        }
    }

    /// Appends a frame to the script.
    pub fn push_frame(&mut self, image: RgbImage) {
        self.script.push_back(Some(image));
    }

    /// Appends a failed acquisition to the script.
    pub fn push_failure(&mut self) {
        self.script.push_back(None);
    }

    /// Number of `capture` calls made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Number of times the camera was closed.
    pub fn releases(&self) -> u64 {
        self.releases
    }

    /// Number of scripted entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Camera for ScriptedCamera {
    fn open(&mut self, _config: &CaptureConfig) -> Result<(), CameraError> {
        if self.fail_open {
            return Err(CameraError::DeviceNotFound("scripted device".into()));
        }
        self.open = true;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        if !self.open {
            return Err(CameraError::NotInitialized);
        }
        self.attempts += 1;

        match self.script.pop_front() {
            Some(Some(image)) => {
                self.sequence += 1;
                Ok(Frame::new(image, self.sequence))
            }
            Some(None) => Err(CameraError::CaptureFailed("scripted failure".into())),
            None => Err(CameraError::CaptureFailed("script exhausted".into())),
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.releases += 1;
        }
    }
}
