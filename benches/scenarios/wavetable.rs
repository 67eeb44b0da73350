//! Benchmarks for building tables on the control thread.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use wavesketch::dsp::wavetable::{Point, Preset, WaveSource, WavetableBuilder};

pub fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/wavetable");

    // A freehand stroke: a few hundred points, as a mouse drag would produce
    let points: Vec<Point> = (0..400)
        .map(|i| {
            let x = i as f32 * 2.0;
            let y = 150.0 + 120.0 * (x / 800.0 * std::f32::consts::TAU).sin();
            Point::new(x, y)
        })
        .collect();

    for len in [2048usize, 8192] {
        let builder = WavetableBuilder::new(len, 64);

        group.bench_with_input(BenchmarkId::new("drawn", len), &len, |b, _| {
            b.iter(|| {
                builder.build(black_box(WaveSource::Drawn {
                    points: &points,
                    height: 300.0,
                }))
            })
        });

        group.bench_with_input(BenchmarkId::new("preset", len), &len, |b, _| {
            b.iter(|| builder.build(black_box(WaveSource::Preset(Preset::Square))))
        });
    }

    group.finish();
}
