//! Benchmarks for wavetable playback.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use wavesketch::dsp::oscillator::{playback_rate, TablePlayer};
use wavesketch::dsp::wavetable::{Preset, WaveSource, WavetableBuilder};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let builder = WavetableBuilder::new(8192, 64);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Integer-ish stride, interpolation still runs every sample
        let table = builder.build(WaveSource::Preset(Preset::Sawtooth));
        let mut player = TablePlayer::new();
        player.set_rate(playback_rate(440.0, 48_000.0, table.len()));
        group.bench_with_input(BenchmarkId::new("a4", size), &size, |b, _| {
            b.iter(|| {
                player.render(black_box(&mut buffer), black_box(&table));
            })
        });

        // Low note: many fractional steps per table sample
        let mut player = TablePlayer::new();
        player.set_rate(playback_rate(27.5, 48_000.0, table.len()));
        group.bench_with_input(BenchmarkId::new("a0", size), &size, |b, _| {
            b.iter(|| {
                player.render(black_box(&mut buffer), black_box(&table));
            })
        });
    }

    group.finish();
}
