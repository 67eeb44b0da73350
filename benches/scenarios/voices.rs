//! Benchmarks for the complete mono engine.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use wavesketch::dsp::wavetable::Preset;
use wavesketch::graph::filter::Slope;
use wavesketch::synth::message::NoteId;
use wavesketch::{EngineConfig, MonoSynth, Patch};

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let config = EngineConfig::default();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === HELD NOTE, FILTERS OFF ===
        // table → envelope → master gain
        let mut synth = MonoSynth::new(config.clone(), &Patch::default());
        synth.note_on(NoteId::Midi(45), 110.0);
        group.bench_with_input(BenchmarkId::new("dry", size), &size, |b, _| {
            b.iter(|| {
                synth.render_block(black_box(&mut buffer));
            })
        });

        // === HELD NOTE, BOTH BANDS AT 24 dB/oct ===
        let mut patch = Patch {
            preset: Preset::Sawtooth,
            ..Patch::default()
        };
        patch.lowpass.enabled = true;
        patch.lowpass.cutoff_hz = 1800.0;
        patch.lowpass.slope = Slope::Db24;
        patch.highpass.enabled = true;
        patch.highpass.cutoff_hz = 60.0;
        patch.highpass.slope = Slope::Db24;
        let mut synth = MonoSynth::new(config.clone(), &patch);
        synth.note_on(NoteId::Midi(45), 110.0);
        group.bench_with_input(BenchmarkId::new("filtered", size), &size, |b, _| {
            b.iter(|| {
                synth.render_block(black_box(&mut buffer));
            })
        });

        // === SILENT ===
        // Baseline for the callback when no key is down
        let mut synth = MonoSynth::new(config.clone(), &Patch::default());
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                synth.render_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
