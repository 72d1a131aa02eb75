//! Bounding box rendering.

use super::MotionRegion;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

/// Draws every region's bounding box on a copy of `frame`.
///
/// Outlines are `thickness` pixels wide and grow inward from the box
/// edge, so they never leave the frame.
pub fn annotate(
    frame: &RgbImage,
    regions: &[MotionRegion],
    color: Rgb<u8>,
    thickness: u32,
) -> RgbImage {
    let mut canvas = frame.clone();
    for region in regions {
        draw_box(&mut canvas, region.bounds, color, thickness);
    }
    canvas
}

fn draw_box(canvas: &mut RgbImage, bounds: Rect, color: Rgb<u8>, thickness: u32) {
    for inset in 0..thickness {
        let shrink = 2 * inset;
        if bounds.width() <= shrink || bounds.height() <= shrink {
            break;
        }
        let rect = Rect::at(bounds.left() + inset as i32, bounds.top() + inset as i32)
            .of_size(bounds.width() - shrink, bounds.height() - shrink);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(x: i32, y: i32, w: u32, h: u32) -> MotionRegion {
        MotionRegion {
            bounds: Rect::at(x, y).of_size(w, h),
            area: f64::from((w - 1) * (h - 1)),
            contour: Vec::new(),
        }
    }

    #[test]
    fn test_no_regions_leaves_frame_untouched() {
        let frame = RgbImage::from_pixel(16, 16, Rgb([7, 8, 9]));
        assert_eq!(annotate(&frame, &[], Rgb([0, 0, 255]), 2), frame);
    }

    #[test]
    fn test_outline_is_two_pixels_inward() {
        let background = Rgb([10, 10, 10]);
        let blue = Rgb([0, 0, 255]);
        let frame = RgbImage::from_pixel(20, 20, background);

        let out = annotate(&frame, &[region(4, 4, 10, 10)], blue, 2);

        assert_eq!(*out.get_pixel(4, 4), blue);
        assert_eq!(*out.get_pixel(5, 5), blue);
        assert_eq!(*out.get_pixel(13, 13), blue);
        assert_eq!(*out.get_pixel(12, 9), blue);
        assert_eq!(*out.get_pixel(6, 6), background);
        assert_eq!(*out.get_pixel(3, 4), background);
        assert_eq!(*out.get_pixel(14, 14), background);
    }

    #[test]
    fn test_thin_box_does_not_panic() {
        let frame = RgbImage::new(8, 8);
        let out = annotate(&frame, &[region(2, 2, 2, 1)], Rgb([255, 0, 0]), 3);
        assert_eq!(*out.get_pixel(2, 2), Rgb([255, 0, 0]));
    }
}
