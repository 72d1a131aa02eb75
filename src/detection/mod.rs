//! Background-subtraction motion detection.
//!
//! Each frame is normalized (grayscale + blur) and compared against a
//! reference captured from the first frame. The difference is binarized,
//! dilated and split into contours; contours large enough become
//! [`MotionRegion`]s and are drawn onto the color frame.
//!
//! [`analyze`] is the pure per-frame step. [`MotionDetector`] owns the
//! reference frame and feeds it to `analyze`.

mod annotate;
mod difference;
mod params;
mod preprocess;
mod regions;

pub use annotate::annotate;
pub use difference::{binarize, difference, dilate};
pub use params::DetectionParams;
pub use preprocess::{gaussian_blur, gaussian_kernel, grayscale, preprocess};
pub use regions::{
    bounding_rect, contour_area, external_contours, motion_regions, simplify_chain, MotionRegion,
};

use crate::capture::Frame;
use image::{GrayImage, RgbImage};
use thiserror::Error;

/// Errors raised by the per-frame pipeline.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// The frame size differs from the reference.
    #[error("frame is {actual:?} but the reference is {expected:?}")]
    DimensionMismatch {
        /// Reference width and height.
        expected: (u32, u32),
        /// Frame width and height.
        actual: (u32, u32),
    },
    /// The frame has zero width or height; carries its sequence number.
    #[error("frame {0} has no pixels")]
    EmptyFrame(u64),
}

/// Everything computed for one analyzed frame.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    /// Sequence number of the source frame.
    pub sequence: u64,
    /// Blurred grayscale frame.
    pub blurred: GrayImage,
    /// Absolute difference against the reference.
    pub delta: GrayImage,
    /// Thresholded and dilated motion mask.
    pub mask: GrayImage,
    /// Regions that passed the area filter.
    pub regions: Vec<MotionRegion>,
    /// Color frame with bounding boxes drawn.
    pub annotated: RgbImage,
}

impl FrameAnalysis {
    /// Returns true if at least one region was reported.
    pub fn has_motion(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Area of the largest reported region.
    pub fn largest_area(&self) -> Option<f64> {
        self.regions.iter().map(|r| r.area).reduce(f64::max)
    }
}

/// Result of feeding one frame to the detector.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The frame became the reference; nothing was analyzed.
    Baseline,
    /// The frame was compared against the reference.
    Analyzed(FrameAnalysis),
}

/// Runs the comparison of an already blurred frame against the reference.
pub fn analyze(
    reference: &GrayImage,
    blurred: GrayImage,
    frame: &Frame,
    params: &DetectionParams,
) -> Result<FrameAnalysis, DetectionError> {
    if reference.dimensions() != blurred.dimensions() {
        return Err(DetectionError::DimensionMismatch {
            expected: reference.dimensions(),
            actual: blurred.dimensions(),
        });
    }

    let delta = difference(reference, &blurred);
    let mask = dilate(&binarize(&delta, params.diff_threshold), params.dilate_iterations);
    let regions = motion_regions(external_contours(&mask), params.min_area);
    let annotated = annotate(
        frame.image(),
        &regions,
        params.box_pixel(),
        params.box_thickness,
    );

    tracing::trace!(
        sequence = frame.sequence(),
        regions = regions.len(),
        "Frame analyzed"
    );

    Ok(FrameAnalysis {
        sequence: frame.sequence(),
        blurred,
        delta,
        mask,
        regions,
        annotated,
    })
}

/// Stateful detector holding the reference frame.
///
/// The reference is taken from the first processed frame and stays
/// fixed for the lifetime of the detector.
pub struct MotionDetector {
    params: DetectionParams,
    reference: Option<GrayImage>,
}

impl MotionDetector {
    /// Creates a detector with no reference frame.
    pub fn new(params: DetectionParams) -> Self {
        Self {
            params,
            reference: None,
        }
    }

    /// Processes one frame.
    ///
    /// The first frame only sets the reference and yields
    /// [`StepOutcome::Baseline`].
    pub fn process(&mut self, frame: &Frame) -> Result<StepOutcome, DetectionError> {
        if !frame.is_valid() {
            return Err(DetectionError::EmptyFrame(frame.sequence()));
        }

        let blurred = preprocess(frame.image(), self.params.blur_kernel);

        match &self.reference {
            None => {
                tracing::info!(
                    sequence = frame.sequence(),
                    width = frame.width(),
                    height = frame.height(),
                    "Reference frame captured"
                );
                self.reference = Some(blurred);
                Ok(StepOutcome::Baseline)
            }
            Some(reference) => {
                analyze(reference, blurred, frame, &self.params).map(StepOutcome::Analyzed)
            }
        }
    }

    /// Returns true once the reference frame is set.
    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Returns the reference frame, if set.
    pub fn reference(&self) -> Option<&GrayImage> {
        self.reference.as_ref()
    }

    /// Returns the detection parameters.
    pub fn params(&self) -> &DetectionParams {
        &self.params
    }
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self::new(DetectionParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const BACKGROUND: u8 = 100;

    fn scene(width: u32, height: u32, squares: &[(u32, u32, u32, u8)]) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            for &(x0, y0, side, value) in squares {
                if (x0..x0 + side).contains(&x) && (y0..y0 + side).contains(&y) {
                    return Rgb([value, value, value]);
                }
            }
            Rgb([BACKGROUND, BACKGROUND, BACKGROUND])
        })
    }

    fn analyzed(outcome: StepOutcome) -> FrameAnalysis {
        match outcome {
            StepOutcome::Analyzed(analysis) => analysis,
            StepOutcome::Baseline => panic!("expected an analyzed frame"),
        }
    }

    #[test]
    fn test_first_frame_sets_reference_once() {
        let mut detector = MotionDetector::default();
        let first = Frame::new(scene(120, 90, &[(10, 10, 20, 200)]), 1);
        assert!(!detector.has_reference());

        assert!(matches!(
            detector.process(&first).unwrap(),
            StepOutcome::Baseline
        ));
        let expected = preprocess(first.image(), 21);
        assert_eq!(detector.reference(), Some(&expected));

        let later = Frame::new(scene(120, 90, &[]), 2);
        detector.process(&later).unwrap();
        assert_eq!(detector.reference(), Some(&expected));
    }

    #[test]
    fn test_identical_frames_have_no_motion() {
        let mut detector = MotionDetector::default();
        let image = scene(160, 120, &[(30, 30, 40, 180)]);
        detector.process(&Frame::new(image.clone(), 1)).unwrap();

        let analysis = analyzed(detector.process(&Frame::new(image.clone(), 2)).unwrap());

        assert!(analysis.delta.pixels().all(|p| p[0] == 0));
        assert!(analysis.mask.pixels().all(|p| p[0] == 0));
        assert!(!analysis.has_motion());
        assert_eq!(analysis.annotated, image);
    }

    #[test]
    fn test_threshold_is_strict_at_thirty() {
        let params = DetectionParams::default().with_min_area(0.0);

        let mut detector = MotionDetector::new(params.clone());
        detector.process(&Frame::new(scene(160, 120, &[]), 1)).unwrap();
        let delta_30 = scene(160, 120, &[(40, 30, 60, BACKGROUND + 30)]);
        let analysis = analyzed(detector.process(&Frame::new(delta_30, 2)).unwrap());
        assert_eq!(analysis.delta.get_pixel(70, 60)[0], 30);
        assert!(analysis.mask.pixels().all(|p| p[0] == 0));

        let mut detector = MotionDetector::new(params);
        detector.process(&Frame::new(scene(160, 120, &[]), 1)).unwrap();
        let delta_31 = scene(160, 120, &[(40, 30, 60, BACKGROUND + 31)]);
        let analysis = analyzed(detector.process(&Frame::new(delta_31, 2)).unwrap());
        assert_eq!(analysis.mask.get_pixel(70, 60)[0], 255);
        assert_eq!(analysis.regions.len(), 1);
    }

    #[test]
    fn test_small_blob_filtered_large_blob_boxed() {
        let mut detector = MotionDetector::default();
        detector.process(&Frame::new(scene(320, 240, &[]), 1)).unwrap();

        let small = scene(320, 240, &[(20, 20, 40, 250)]);
        let analysis = analyzed(detector.process(&Frame::new(small, 2)).unwrap());
        assert!(analysis.mask.pixels().any(|p| p[0] == 255));
        assert!(!analysis.has_motion());

        let large = scene(320, 240, &[(100, 50, 140, 250)]);
        let analysis = analyzed(detector.process(&Frame::new(large, 3)).unwrap());
        assert_eq!(analysis.regions.len(), 1);

        let bounds = analysis.regions[0].bounds;
        assert!(bounds.left() <= 100 && bounds.top() <= 50);
        assert!(bounds.right() >= 239 && bounds.bottom() >= 189);
        assert!(analysis.largest_area().unwrap() >= 15_000.0);
        assert_eq!(
            *analysis.annotated.get_pixel(bounds.left() as u32, bounds.top() as u32),
            Rgb([0, 0, 255])
        );
    }

    #[test]
    fn test_two_separated_blobs_give_two_boxes() {
        let mut detector = MotionDetector::default();
        detector.process(&Frame::new(scene(400, 240, &[]), 1)).unwrap();

        let two = scene(400, 240, &[(20, 40, 140, 240), (230, 60, 140, 240)]);
        let analysis = analyzed(detector.process(&Frame::new(two, 2)).unwrap());

        assert_eq!(analysis.regions.len(), 2);
        let a = analysis.regions[0].bounds;
        let b = analysis.regions[1].bounds;
        assert!(a.intersect(b).is_none());
    }

    #[test]
    fn test_blob_at_left_edge_boxed() {
        let mut detector = MotionDetector::default();
        detector.process(&Frame::new(scene(320, 240, &[]), 1)).unwrap();

        let entering = scene(320, 240, &[(0, 50, 150, 220)]);
        let analysis = analyzed(detector.process(&Frame::new(entering, 2)).unwrap());

        assert_eq!(analysis.regions.len(), 1);
        assert_eq!(analysis.regions[0].bounds.left(), 0);
        assert_eq!(*analysis.annotated.get_pixel(0, 120), Rgb([0, 0, 255]));
    }

    #[test]
    fn test_red_object_on_black_detected() {
        let mut detector = MotionDetector::default();
        let black = RgbImage::new(320, 240);
        detector.process(&Frame::new(black, 1)).unwrap();

        let red = RgbImage::from_fn(320, 240, |x, y| {
            if (60..260).contains(&x) && (40..200).contains(&y) {
                Rgb([140, 0, 0])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let analysis = analyzed(detector.process(&Frame::new(red, 2)).unwrap());

        assert_eq!(analysis.delta.get_pixel(160, 120)[0], 42);
        assert_eq!(analysis.regions.len(), 1);
    }

    #[test]
    fn test_dimension_change_rejected() {
        let mut detector = MotionDetector::default();
        detector.process(&Frame::new(scene(64, 48, &[]), 1)).unwrap();

        let result = detector.process(&Frame::new(scene(32, 24, &[]), 2));
        assert!(matches!(
            result,
            Err(DetectionError::DimensionMismatch {
                expected: (64, 48),
                actual: (32, 24)
            })
        ));
    }

    #[test]
    fn test_empty_frame_rejected() {
        let mut detector = MotionDetector::default();
        let result = detector.process(&Frame::new(RgbImage::new(0, 0), 7));
        assert!(matches!(result, Err(DetectionError::EmptyFrame(7))));
        assert!(!detector.has_reference());
    }
}
