//! Detection parameters.
//!
//! The defaults reproduce the classic background-subtraction setup:
//! 21×21 blur, difference threshold 30, two dilation passes and a
//! 15 000 px² minimum region area.

use crate::config::ConfigError;
use image::Rgb;
use serde::{Deserialize, Serialize};

/// Tunable parameters of the per-frame pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Side of the square Gaussian kernel (odd).
    pub blur_kernel: u32,
    /// Differences strictly above this value count as motion.
    pub diff_threshold: u8,
    /// Number of 3×3 dilation passes applied to the motion mask.
    pub dilate_iterations: u8,
    /// Regions with a contour area below this are ignored (px²).
    pub min_area: f64,
    /// Outline color of the bounding boxes (RGB).
    pub box_color: [u8; 3],
    /// Outline width of the bounding boxes in pixels.
    pub box_thickness: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            blur_kernel: 21,
            diff_threshold: 30,
            dilate_iterations: 2,
            min_area: 15_000.0,
            box_color: [0, 0, 255],
            box_thickness: 2,
        }
    }
}

impl DetectionParams {
    /// Parameters for small frames or distant subjects.
    pub fn sensitive() -> Self {
        Self {
            diff_threshold: 15,
            min_area: 2_000.0,
            ..Default::default()
        }
    }

    /// Returns a copy with a different minimum region area.
    pub fn with_min_area(mut self, min_area: f64) -> Self {
        self.min_area = min_area;
        self
    }

    /// Returns the box color as a pixel.
    pub fn box_pixel(&self) -> Rgb<u8> {
        Rgb(self.box_color)
    }

    /// Validates the parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(ConfigError::InvalidKernel(self.blur_kernel));
        }
        if !self.min_area.is_finite() || self.min_area < 0.0 {
            return Err(ConfigError::InvalidMinArea(self.min_area));
        }
        if self.box_thickness == 0 {
            return Err(ConfigError::InvalidThickness);
        }
        Ok(())
    }
}
