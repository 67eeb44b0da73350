//! Benchmarks for the state-variable filter and cascaded bands.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use wavesketch::dsp::filter::SVFilter;
use wavesketch::graph::filter::{Band, FilterChain, Slope};
use wavesketch::graph::node::{GraphNode, RenderCtx};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0);

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Single lowpass stage
        let mut filter = SVFilter::lowpass(1000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Single highpass stage
        let mut filter = SVFilter::highpass(1000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("highpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Worst case: both bands on at 48 dB/oct, eight stages
        let mut chain = FilterChain::new();
        chain.rebuild(Slope::Db48.db(), Slope::Db48.db());
        chain.set_enabled(Band::LowPass, true);
        chain.set_enabled(Band::HighPass, true);
        chain.set_params(Band::LowPass, 2000.0, 1.0);
        chain.set_params(Band::HighPass, 80.0, 1.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("chain_48db", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                chain.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
