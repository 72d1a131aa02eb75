//! OpenCV HighGUI windows.

use super::{Display, DisplayError, Views, VIEW_NAMES};
use image::{GrayImage, RgbImage};
use opencv::{core::Mat, highgui, prelude::*};
use std::time::Duration;

impl From<opencv::Error> for DisplayError {
    fn from(e: opencv::Error) -> Self {
        DisplayError::Backend(e.to_string())
    }
}

/// One HighGUI window per view, created on the first frame.
#[derive(Debug, Default)]
pub struct WindowDisplay {
    created: bool,
}

impl WindowDisplay {
    /// Creates a display; windows open on the first frame.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_windows(&mut self) -> Result<(), DisplayError> {
        if !self.created {
            for name in VIEW_NAMES {
                highgui::named_window(name, highgui::WINDOW_AUTOSIZE)?;
            }
            self.created = true;
        }
        Ok(())
    }
}

/// Wraps packed 8-bit samples in an owned `Mat` with `channels` per pixel.
fn to_mat(data: &[u8], channels: i32, rows: u32) -> Result<Mat, DisplayError> {
    let flat = Mat::from_slice(data)?;
    let shaped = flat.reshape(channels, rows as i32)?;
    Ok(shaped.try_clone()?)
}

fn gray_mat(image: &GrayImage) -> Result<Mat, DisplayError> {
    to_mat(image.as_raw(), 1, image.height())
}

/// HighGUI expects BGR channel order.
fn color_mat(image: &RgbImage) -> Result<Mat, DisplayError> {
    let bgr: Vec<u8> = image
        .as_raw()
        .chunks_exact(3)
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect();
    to_mat(&bgr, 3, image.height())
}

impl Display for WindowDisplay {
    fn show(&mut self, views: &Views<'_>) -> Result<(), DisplayError> {
        self.ensure_windows()?;

        let [gray, delta, threshold, color] = VIEW_NAMES;
        highgui::imshow(gray, &gray_mat(views.gray)?)?;
        highgui::imshow(delta, &gray_mat(views.delta)?)?;
        highgui::imshow(threshold, &gray_mat(views.threshold)?)?;
        highgui::imshow(color, &color_mat(views.color)?)?;
        Ok(())
    }

    fn poll_key(&mut self, wait: Duration) -> Result<Option<char>, DisplayError> {
        let delay = i32::try_from(wait.as_millis()).unwrap_or(i32::MAX).max(1);
        let code = highgui::wait_key(delay)?;
        if code < 0 {
            return Ok(None);
        }
        Ok(Some(char::from((code & 0xFF) as u8)))
    }

    fn close(&mut self) {
        if self.created {
            if let Err(e) = highgui::destroy_all_windows() {
                tracing::warn!("Failed to destroy windows: {}", e);
            }
            self.created = false;
            tracing::info!("Windows closed");
        }
    }
}
