use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use motion_watch::detection::{analyze, preprocess, DetectionParams};
use motion_watch::Frame;

fn scene(offset: u32) -> RgbImage {
    RgbImage::from_fn(640, 480, |x, y| {
        if (offset..offset + 160).contains(&x) && (160..320).contains(&y) {
            Rgb([230, 230, 230])
        } else {
            let shade = 60 + ((x / 8 + y / 8) % 32) as u8;
            Rgb([shade, shade, shade])
        }
    })
}

fn bench_pipeline(c: &mut Criterion) {
    let params = DetectionParams::default();
    let reference = preprocess(&scene(0), params.blur_kernel);
    let frame = Frame::new(scene(240), 2);

    c.bench_function("preprocess 640x480", |b| {
        b.iter(|| preprocess(black_box(frame.image()), params.blur_kernel))
    });

    c.bench_function("analyze 640x480", |b| {
        b.iter(|| {
            let blurred = preprocess(frame.image(), params.blur_kernel);
            analyze(black_box(&reference), blurred, &frame, &params).unwrap()
        })
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
