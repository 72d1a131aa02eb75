//! Background differencing and mask cleanup.

use image::{GrayImage, Luma};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

/// Per-pixel absolute difference of two equally sized images.
pub fn difference(reference: &GrayImage, current: &GrayImage) -> GrayImage {
    debug_assert_eq!(reference.dimensions(), current.dimensions());
    GrayImage::from_fn(current.width(), current.height(), |x, y| {
        let a = reference.get_pixel(x, y)[0];
        let b = current.get_pixel(x, y)[0];
        Luma([a.abs_diff(b)])
    })
}

/// Marks pixels strictly above `level` as foreground (255), the rest as 0.
pub fn binarize(delta: &GrayImage, level: u8) -> GrayImage {
    threshold(delta, level, ThresholdType::Binary)
}

/// Grows the foreground by `iterations` passes of a 3×3 square element.
///
/// Repeated 3×3 dilation equals a single dilation with a Chebyshev
/// radius of `iterations`.
pub fn dilate(mask: &GrayImage, iterations: u8) -> GrayImage {
    if iterations == 0 {
        return mask.clone();
    }
    morphology::dilate(mask, Norm::LInf, iterations)
}
