//! Grayscale conversion and Gaussian smoothing.
//!
//! The blur uses a fixed square kernel whose sigma is derived from its
//! size, with mirrored borders that do not repeat the edge sample.
//! Sums are rounded to the nearest intensity, so flat regions keep
//! their exact value.

use image::{GrayImage, Luma, RgbImage};

/// Converts a color frame to a blurred single-channel image.
pub fn preprocess(frame: &RgbImage, kernel_size: u32) -> GrayImage {
    gaussian_blur(&grayscale(frame), kernel_size)
}

/// BT.601 luma weights in 14-bit fixed point, summing to `1 << 14`.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Converts a color frame to grayscale with BT.601 weights, rounded.
pub fn grayscale(frame: &RgbImage) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let [r, g, b] = frame.get_pixel(x, y).0;
        let sum = LUMA_R * u32::from(r) + LUMA_G * u32::from(g) + LUMA_B * u32::from(b);
        Luma([((sum + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8])
    })
}

/// Builds a normalized 1-D Gaussian kernel of the given size.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let size = size.max(1);
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size as f32 - 1.0) / 2.0;

    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();

    weights.into_iter().map(|w| w / sum).collect()
}

/// Applies a separable Gaussian blur with a `kernel_size`×`kernel_size` kernel.
pub fn gaussian_blur(image: &GrayImage, kernel_size: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || kernel_size <= 1 {
        return image.clone();
    }

    let kernel = gaussian_kernel(kernel_size);
    let radius = (kernel.len() / 2) as i64;
    let (w, h) = (width as usize, height as usize);
    let src = image.as_raw();

    let mut horizontal = vec![0f32; w * h];
    for y in 0..h {
        let row = &src[y * w..(y + 1) * w];
        for x in 0..w {
            horizontal[y * w + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let sx = reflect_101(x as i64 + k as i64 - radius, w);
                    weight * f32::from(row[sx])
                })
                .sum();
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let acc: f32 = kernel
            .iter()
            .enumerate()
            .map(|(k, weight)| {
                let sy = reflect_101(y as i64 + k as i64 - radius, h);
                weight * horizontal[sy * w + x]
            })
            .sum();
        Luma([acc.round().clamp(0.0, 255.0) as u8])
    })
}

/// Maps an out-of-range index back into `0..len` by mirroring around the
/// edge samples (`dcb|abcd|cba`).
fn reflect_101(index: i64, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as i64;
    let period = 2 * (len - 1);
    let m = index.rem_euclid(period);
    (if m >= len { period - m } else { m }) as usize
}
