//! Property tests for the per-frame pipeline.

use image::{Rgb, RgbImage};
use motion_watch::detection::{preprocess, DetectionParams, MotionDetector, StepOutcome};
use motion_watch::Frame;
use proptest::prelude::*;

const WIDTH: u32 = 32;
const HEIGHT: u32 = 24;

fn uniform(value: u8) -> RgbImage {
    RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([value, value, value]))
}

fn arbitrary_image() -> impl Strategy<Value = RgbImage> {
    proptest::collection::vec(any::<u8>(), (WIDTH * HEIGHT * 3) as usize)
        .prop_map(|pixels| RgbImage::from_raw(WIDTH, HEIGHT, pixels).unwrap())
}

fn run(detector: &mut MotionDetector, image: RgbImage, sequence: u64) -> StepOutcome {
    detector.process(&Frame::new(image, sequence)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn reference_is_first_frame_and_never_changes(
        first in arbitrary_image(),
        later in proptest::collection::vec(arbitrary_image(), 1..4),
    ) {
        let mut detector = MotionDetector::default();
        let expected = preprocess(&first, 21);

        prop_assert!(matches!(run(&mut detector, first, 1), StepOutcome::Baseline));
        for (i, image) in later.into_iter().enumerate() {
            let outcome = run(&mut detector, image, i as u64 + 2);
            prop_assert!(matches!(outcome, StepOutcome::Analyzed(_)));
            prop_assert_eq!(detector.reference(), Some(&expected));
        }
    }

    #[test]
    fn identical_frames_report_nothing(image in arbitrary_image()) {
        let mut detector = MotionDetector::new(DetectionParams::default().with_min_area(0.0));
        run(&mut detector, image.clone(), 1);

        match run(&mut detector, image.clone(), 2) {
            StepOutcome::Analyzed(analysis) => {
                prop_assert!(analysis.delta.pixels().all(|p| p[0] == 0));
                prop_assert!(analysis.mask.pixels().all(|p| p[0] == 0));
                prop_assert!(analysis.regions.is_empty());
                prop_assert_eq!(analysis.annotated, image);
            }
            StepOutcome::Baseline => prop_assert!(false, "second frame must be analyzed"),
        }
    }

    #[test]
    fn uniform_shift_crosses_threshold_strictly(base in 0u8..=200, shift in 0u8..=55) {
        let mut detector = MotionDetector::default();
        run(&mut detector, uniform(base), 1);

        match run(&mut detector, uniform(base + shift), 2) {
            StepOutcome::Analyzed(analysis) => {
                prop_assert!(analysis.delta.pixels().all(|p| p[0] == shift));
                let expected = if shift > 30 { 255 } else { 0 };
                prop_assert!(analysis.mask.pixels().all(|p| p[0] == expected));
            }
            StepOutcome::Baseline => prop_assert!(false, "second frame must be analyzed"),
        }
    }

    #[test]
    fn regions_respect_area_and_frame_bounds(
        first in arbitrary_image(),
        second in arbitrary_image(),
        min_area in 0.0f64..200.0,
    ) {
        let mut detector = MotionDetector::new(DetectionParams::default().with_min_area(min_area));
        run(&mut detector, first, 1);

        if let StepOutcome::Analyzed(analysis) = run(&mut detector, second, 2) {
            for region in &analysis.regions {
                prop_assert!(region.area >= min_area);
                prop_assert!(region.bounds.left() >= 0 && region.bounds.top() >= 0);
                prop_assert!(region.bounds.right() < WIDTH as i32);
                prop_assert!(region.bounds.bottom() < HEIGHT as i32);
            }
        }
    }
}
