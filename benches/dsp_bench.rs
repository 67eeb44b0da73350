//! Render-path benchmarks. Everything measured here runs inside the audio
//! callback except the table builds, which run on the control thread.
//!
//! Run with: cargo bench
//!
//! Block deadlines at 48kHz:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Low-level primitives (table player, filters, automation)
//!   - scenarios/*  Whole-engine rendering and table rebuilds

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Low-level DSP primitives
    dsp::bench_oscillator,
    dsp::bench_filter,
    dsp::bench_automation,
    // Real-world scenarios
    scenarios::bench_voices,
    scenarios::bench_wavetable,
);
criterion_main!(benches);
