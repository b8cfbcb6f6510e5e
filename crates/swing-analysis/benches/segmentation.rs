//! Segmentation and Scoring Benchmarks
//!
//! # Running Benchmarks
//! ```bash
//! cargo bench --package swing-analysis --bench segmentation
//! ```
//!
//! # Metrics Measured
//! - Segmentation latency per frame at common resolutions
//! - Full analysis latency for a synthetic swing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgb, RgbImage};
use std::time::Duration;
use swing_analysis::synthetic::SyntheticSwing;
use swing_analysis::{AnalysisContext, FrameBuffer, Segmenter};
use swing_models::ScoringOptions;
use tokio::sync::watch;

/// Synthetic frame: textured background with a flat-coloured player block.
fn create_test_frame(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let in_player = x > width * 2 / 5 && x < width * 3 / 5 && y > height / 6 && y < height * 5 / 6;
        if in_player {
            Rgb([190, 30, 30])
        } else {
            Rgb([
                ((x * 7 + y * 11) % 256) as u8,
                ((x * 13 + y * 17) % 256) as u8,
                ((x * 19 + y * 23) % 256) as u8,
            ])
        }
    })
}

fn bench_segment(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    let segmenter = Segmenter::default();
    for (width, height) in [(1280, 720), (640, 360), (320, 180)] {
        let image = create_test_frame(width, height);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("region_grow", format!("{}x{}", width, height)),
            &image,
            |b, image| {
                b.iter(|| {
                    let mask = segmenter.segment(black_box(&FrameBuffer::from_rgb(image)), None);
                    black_box(mask)
                })
            },
        );
    }

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    let ctx = AnalysisContext::default();
    let options = ScoringOptions::default();
    let (_tx, cancel) = watch::channel(false);

    for fps in [30.0, 120.0] {
        let frames = (3.0 * fps) as usize;
        let series = SyntheticSwing::default()
            .with_fps(fps)
            .with_frames(frames)
            .with_contact(frames * 2 / 3)
            .build();

        group.bench_with_input(BenchmarkId::new("swing", format!("{fps}fps")), &series, |b, series| {
            b.iter(|| black_box(ctx.analyze(black_box(series), &options, &cancel)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_segment, bench_analyze);
criterion_main!(benches);
