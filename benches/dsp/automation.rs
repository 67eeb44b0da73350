//! Benchmarks for gain automation lookups.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use wavesketch::dsp::automation::ParamAutomation;
use wavesketch::dsp::envelope::{EnvelopeCycle, EnvelopeParams};

use crate::BLOCK_SIZES;

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");
    let sample_rate = 48_000.0f64;

    // One full ADSR cycle, which is what the scheduler keeps in the timeline
    let mut gain = ParamAutomation::new(0.0);
    let params = EnvelopeParams::default();
    EnvelopeCycle::plan(0.0, &params, 0.5).write(&mut gain);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        // Land in the decay ramp
        let start = 0.07;

        group.bench_with_input(BenchmarkId::new("value_at", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    *sample = gain.value_at(black_box(start + i as f64 / sample_rate));
                }
            })
        });
    }

    group.finish();
}
