//! Contour extraction and area filtering.
//!
//! Only the outer borders of top-level foreground components are kept.
//! Each border is reduced to its corner points: intermediate points on
//! horizontal, vertical and diagonal runs are dropped.
//!
//! The mask is traced inside a one-pixel background frame, so components
//! touching the image edge are reported like any other.

use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use imageproc::rect::Rect;

/// A region of the frame that changed enough to be reported.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionRegion {
    /// Smallest axis-aligned rectangle containing the contour.
    pub bounds: Rect,
    /// Area enclosed by the contour in px².
    pub area: f64,
    /// Simplified contour points.
    pub contour: Vec<Point<i32>>,
}

/// Extracts the simplified outer contours of a binary mask.
pub fn external_contours(mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut padded, mask, 1, 1);

    find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            let points: Vec<Point<i32>> = c
                .points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            simplify_chain(&points)
        })
        .collect()
}

/// Removes points lying in the middle of a straight run of a closed chain.
pub fn simplify_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let kept: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let p = points[i];
            let next = points[(i + 1) % n];
            (p.x - prev.x, p.y - prev.y) != (next.x - p.x, next.y - p.y)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        vec![points[0]]
    } else {
        kept
    }
}

/// Area enclosed by a closed polygon (shoelace formula).
pub fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
        .sum();
    twice.abs() as f64 / 2.0
}

/// Smallest axis-aligned rectangle containing every point.
///
/// Width and height count pixels, so a single point has size 1×1.
pub fn bounding_rect(points: &[Point<i32>]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Rect::at(min_x, min_y).of_size((max_x - min_x + 1) as u32, (max_y - min_y + 1) as u32))
}

/// Keeps contours whose area is at least `min_area`.
pub fn motion_regions(contours: Vec<Vec<Point<i32>>>, min_area: f64) -> Vec<MotionRegion> {
    contours
        .into_iter()
        .filter_map(|contour| {
            let area = contour_area(&contour);
            if area < min_area {
                tracing::trace!(area, min_area, "Contour below area threshold");
                return None;
            }
            let bounds = bounding_rect(&contour)?;
            Some(MotionRegion {
                bounds,
                area,
                contour,
            })
        })
        .collect()
}
