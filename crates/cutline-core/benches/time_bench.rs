//! Benchmarks for cutline-core time operations.
//!
//! Run with: cargo bench -p cutline-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cutline_core::{EasingCurve, FrameRate, KeyframeTrack};

fn bench_frame_conversion(c: &mut Criterion) {
    let rate = FrameRate::FPS_60;
    let ntsc = FrameRate::FPS_29_97;

    c.bench_function("frame_from_ms_60fps", |bencher| {
        bencher.iter(|| black_box(rate).frame_from_ms(black_box(3_599_983.3)));
    });

    c.bench_function("ms_from_frame_29.97", |bencher| {
        bencher.iter(|| black_box(ntsc).ms_from_frame(black_box(107_892)));
    });
}

fn bench_keyframe_evaluate(c: &mut Criterion) {
    let mut values = Vec::new();
    for i in 0..64 {
        values.push(if i % 2 == 0 { 1.0 } else { 1.05 });
    }
    let breathe = KeyframeTrack::evenly_spaced(&values, 20_000.0);
    let fade = KeyframeTrack::between(0.0, 1.0, 1000.0, EasingCurve::Linear);

    c.bench_function("evaluate_breathe_64", |bencher| {
        bencher.iter(|| breathe.evaluate(black_box(12_345.0)));
    });

    c.bench_function("evaluate_fade", |bencher| {
        bencher.iter(|| fade.evaluate(black_box(512.0)));
    });
}

criterion_group!(benches, bench_frame_conversion, bench_keyframe_evaluate);
criterion_main!(benches);
