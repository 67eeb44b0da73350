use std::f32::consts::{FRAC_PI_2, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Wavetable Construction
======================

A wavetable is one cycle of a waveform stored as a fixed number of samples.
Looping it at the right speed gives a pitched tone whose timbre is exactly
the drawn shape.

Every table goes through the same pipeline, whatever it was made from:

  drawn points ──┐
                 │   resample       ┌───────────┐    ┌──────┐
  imported data ─┼──────────────→   │ normalize │ ─→ │ fade │ ─→ Wavetable
                 │   truncate/pad   └───────────┘    └──────┘
  preset shape ──┘   analytic


Resampling Drawn Points
-----------------------

A freehand stroke produces points at whatever spacing the pointer moved:

    y
    │  •     •
    │ •  • •   •
    │•          •  •
    └──────────────────→ x     (uneven gaps)

We sort by x and lay L evenly spaced targets over [first.x, last.x]. Each
target is a linear interpolation between the two source points around it.
Targets increase monotonically, so the search window only ever moves
forward and the whole resample is O(L + N).


Normalize, Never Clip
---------------------

If the loudest sample is above the headroom, the WHOLE buffer is scaled by
headroom / peak. The shape is untouched; only its size changes. Clipping
individual samples would flatten peaks and add harmonics the user never drew.


Fading the Loop Point
---------------------

The last sample jumps straight back to the first when the table loops. If
they differ, that step is an audible click at the note's fundamental. A short
quarter-sine ramp at each end pins both ends to exactly zero:

    gain
    1.0 ┤   ╭──────────────────────╮
        │  ╱                        ╲
    0.0 ┼─╯                          ╰─
        0   F                    L-F   L

    gain(i) = sin(i / F * π/2)    for i in 0..F (mirrored at the tail)
*/

/// Peak level a table is scaled down to when it would exceed full scale.
pub const HEADROOM: f32 = 0.99;

/// One cycle of audio, always exactly the engine's table length.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavetable {
    samples: Box<[f32]>,
}

impl Wavetable {
    /// An all-zero table.
    pub fn silent(len: usize) -> Self {
        Self {
            samples: vec![0.0; len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        peak(&self.samples)
    }
}

/// Analytic single-cycle shapes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Sine,
    Sawtooth,
    Square,
    Triangle,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Sine,
        Preset::Sawtooth,
        Preset::Square,
        Preset::Triangle,
    ];

    /// Value of the shape at normalized time `t` in `[0, 1)`.
    pub fn value_at(self, t: f32) -> f32 {
        match self {
            Preset::Sine => (TAU * t).sin(),
            Preset::Sawtooth => 2.0 * t - 1.0,
            Preset::Square => {
                if t < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Preset::Triangle => {
                if t < 0.25 {
                    4.0 * t
                } else if t < 0.75 {
                    2.0 - 4.0 * t
                } else {
                    4.0 * t - 4.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Sine => "sine",
            Preset::Sawtooth => "sawtooth",
            Preset::Square => "square",
            Preset::Triangle => "triangle",
        }
    }
}

/// A point on the drawing surface, in surface pixels (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Where a wavetable's raw samples come from.
#[derive(Debug, Clone, Copy)]
pub enum WaveSource<'a> {
    /// Freehand points on a surface of the given usable height.
    Drawn { points: &'a [Point], height: f32 },
    /// Sample values already in amplitude units, e.g. an import.
    Samples(&'a [f32]),
    Preset(Preset),
}

/// Turns any [`WaveSource`] into a normalized, fade-smoothed [`Wavetable`].
#[derive(Debug, Clone, Copy)]
pub struct WavetableBuilder {
    len: usize,
    fade_samples: usize,
}

impl WavetableBuilder {
    pub fn new(len: usize, fade_samples: usize) -> Self {
        let len = len.max(1);
        Self {
            len,
            fade_samples: fade_samples.min(len / 2),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn fade_samples(&self) -> usize {
        self.fade_samples
    }

    pub fn build(&self, source: WaveSource<'_>) -> Wavetable {
        let mut samples = self.raw(source);
        normalize(&mut samples);
        apply_fade(&mut samples, self.fade_samples);
        Wavetable {
            samples: samples.into_boxed_slice(),
        }
    }

    /// The source fitted to the table length, before normalize and fade.
    pub fn raw(&self, source: WaveSource<'_>) -> Vec<f32> {
        match source {
            WaveSource::Drawn { points, height } => {
                let curve: Vec<Point> = points
                    .iter()
                    .filter(|p| p.x.is_finite() && p.y.is_finite())
                    .map(|p| Point::new(p.x, surface_to_amplitude(p.y, height)))
                    .collect();
                resample(&curve, self.len)
            }
            WaveSource::Samples(samples) => {
                let finite: Vec<f32> = samples.iter().copied().filter(|s| s.is_finite()).collect();
                fit_samples(&finite, self.len)
            }
            WaveSource::Preset(preset) => render_preset(preset, self.len),
        }
    }
}

/// Map a surface y coordinate to an amplitude in `[-1, 1]`.
///
/// The top edge is +1, the vertical centre is 0 and the bottom edge is -1.
pub fn surface_to_amplitude(y: f32, height: f32) -> f32 {
    if height <= 0.0 {
        return 0.0;
    }
    let half = height / 2.0;
    ((half - y) / half).clamp(-1.0, 1.0)
}

/// Piecewise-linear resample of `points` (x, value) to exactly `len` values.
///
/// Targets are spread evenly from the smallest to the largest x. An empty
/// input gives zeros, a single point gives a constant.
pub fn resample(points: &[Point], len: usize) -> Vec<f32> {
    let mut out = vec![0.0; len];
    if points.is_empty() || len == 0 {
        return out;
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    let first = sorted[0];
    let last = sorted[sorted.len() - 1];
    if sorted.len() == 1 || len == 1 || last.x <= first.x {
        out.fill(first.y);
        return out;
    }

    let step = (last.x - first.x) / (len - 1) as f32;
    let mut window = 0;
    for (i, sample) in out.iter_mut().enumerate() {
        let x = first.x + step * i as f32;

        // Advance until sorted[window + 1] is the first point past x
        while window + 2 < sorted.len() && sorted[window + 1].x <= x {
            window += 1;
        }

        let left = sorted[window];
        let right = sorted[window + 1];
        let span = right.x - left.x;
        *sample = if span <= f32::EPSILON {
            right.y
        } else {
            let t = ((x - left.x) / span).clamp(0.0, 1.0);
            left.y + (right.y - left.y) * t
        };
    }

    out
}

/// Truncate or zero-pad to exactly `len` samples. Never interpolates.
pub fn fit_samples(samples: &[f32], len: usize) -> Vec<f32> {
    let mut out: Vec<f32> = samples.iter().copied().take(len).collect();
    out.resize(len, 0.0);
    out
}

pub fn render_preset(preset: Preset, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| preset.value_at(i as f32 / len as f32))
        .collect()
}

/// Scale the whole buffer so its peak sits at [`HEADROOM`], if it is louder.
pub fn normalize(samples: &mut [f32]) {
    let peak = peak(samples);
    if peak > HEADROOM {
        let scale = HEADROOM / peak;
        for sample in samples.iter_mut() {
            *sample *= scale;
        }
    }
}

/// Quarter-sine fade over the first and last `fade_samples` samples.
///
/// `fade_samples` is held to half the buffer so the two ramps never overlap.
pub fn apply_fade(samples: &mut [f32], fade_samples: usize) {
    let len = samples.len();
    let fade = fade_samples.min(len / 2);
    for i in 0..fade {
        let gain = (i as f32 / fade as f32 * FRAC_PI_2).sin();
        samples[i] *= gain;
        samples[len - 1 - i] *= gain;
    }
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_4;

    const LEN: usize = 8192;
    const FADE: usize = 64;

    fn builder() -> WavetableBuilder {
        WavetableBuilder::new(LEN, FADE)
    }

    fn zigzag(count: usize) -> Vec<Point> {
        // Uneven spacing, values touching both rails of a 200px surface
        let mut x = 0.0;
        (0..count)
            .map(|i| {
                x += 1.0 + (i % 3) as f32 * 2.5;
                Point::new(x, if i % 2 == 0 { 0.0 } else { 200.0 })
            })
            .collect()
    }

    #[test]
    fn drawn_points_fill_table_below_unity() {
        for count in [2, 3, 17, 500] {
            let points = zigzag(count);
            let table = builder().build(WaveSource::Drawn {
                points: &points,
                height: 200.0,
            });
            assert_eq!(table.len(), LEN);
            assert!(table.peak() <= HEADROOM + 1e-6, "peak {}", table.peak());
        }
    }

    #[test]
    fn empty_drawing_is_silent() {
        let table = builder().build(WaveSource::Drawn {
            points: &[],
            height: 100.0,
        });
        assert_eq!(table.len(), LEN);
        assert!(table.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn unsorted_points_are_walked_in_x_order() {
        let points = [
            Point::new(2.0, 1.0),
            Point::new(0.0, -1.0),
            Point::new(1.0, 0.0),
        ];
        let out = resample(&points, 5);
        let expected = [-1.0, -0.5, 0.0, 0.5, 1.0];
        for (a, b) in out.iter().zip(expected) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn resample_is_identity_on_its_own_output() {
        let points = zigzag(40)
            .into_iter()
            .map(|p| Point::new(p.x, surface_to_amplitude(p.y, 200.0)))
            .collect::<Vec<_>>();
        let first = resample(&points, LEN);

        let again: Vec<Point> = first
            .iter()
            .enumerate()
            .map(|(i, &v)| Point::new(i as f32, v))
            .collect();
        let second = resample(&again, LEN);

        for (a, b) in first.iter().zip(&second) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-4);
        }
    }

    #[test]
    fn short_import_is_zero_padded() {
        let source: Vec<f32> = (0..LEN - 10).map(|i| ((i % 7) as f32 - 3.0) * 0.1).collect();
        let raw = builder().raw(WaveSource::Samples(&source));
        assert_eq!(raw.len(), LEN);
        assert_eq!(&raw[..LEN - 10], &source[..]);
        assert!(raw[LEN - 10..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn long_import_is_truncated() {
        let source: Vec<f32> = (0..LEN + 10).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        let raw = builder().raw(WaveSource::Samples(&source));
        assert_eq!(raw, source[..LEN].to_vec());
    }

    #[test]
    fn non_finite_samples_are_dropped_before_fitting() {
        let source = [0.5, f32::INFINITY, 0.2, f32::NAN, 0.3, f32::NEG_INFINITY];
        let raw = builder().raw(WaveSource::Samples(&source));
        assert_eq!(&raw[..3], &[0.5, 0.2, 0.3]);
        assert!(raw[3..].iter().all(|&s| s == 0.0));

        let table = builder().build(WaveSource::Samples(&source));
        assert!(table.samples().iter().all(|s| s.is_finite()));
        assert!(table.peak() <= HEADROOM + 1e-6);
    }

    #[test]
    fn loud_import_is_scaled_not_clipped() {
        let source = [0.5, -4.0, 2.0, 1.0];
        let mut samples = fit_samples(&source, 4);
        normalize(&mut samples);
        assert_abs_diff_eq!(samples[1], -HEADROOM, epsilon = 1e-6);
        assert_abs_diff_eq!(samples[2], HEADROOM / 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(samples[0], 0.5 * HEADROOM / 4.0, epsilon = 1e-6);
    }

    #[test]
    fn fade_pins_both_ends_to_zero() {
        for preset in Preset::ALL {
            let table = builder().build(WaveSource::Preset(preset));
            assert_eq!(table.samples()[0], 0.0);
            assert_eq!(table.samples()[LEN - 1], 0.0);
        }
    }

    #[test]
    fn fade_midpoint_is_attenuated_by_sin_quarter_pi() {
        let mut samples = vec![0.5; LEN];
        apply_fade(&mut samples, FADE);
        assert_abs_diff_eq!(samples[FADE / 2], 0.5 * FRAC_PI_4.sin(), epsilon = 1e-6);
        assert_abs_diff_eq!(samples[LEN - 1 - FADE / 2], 0.5 * FRAC_PI_4.sin(), epsilon = 1e-6);
        assert_eq!(samples[FADE], 0.5);
    }

    #[test]
    fn oversized_fade_does_not_overlap() {
        let mut samples = vec![1.0; 8];
        apply_fade(&mut samples, 100);
        // Held to four samples per side: each sample faded exactly once
        assert_abs_diff_eq!(samples[3], (0.75 * FRAC_PI_2).sin(), epsilon = 1e-6);
        assert_abs_diff_eq!(samples[4], (0.75 * FRAC_PI_2).sin(), epsilon = 1e-6);
    }

    #[test]
    fn presets_have_expected_shape() {
        let sine = render_preset(Preset::Sine, 4);
        assert_abs_diff_eq!(sine[1], 1.0, epsilon = 1e-6);
        let square = render_preset(Preset::Square, 4);
        assert_eq!(square, vec![1.0, 1.0, -1.0, -1.0]);
        let triangle = render_preset(Preset::Triangle, 4);
        assert_eq!(triangle, vec![0.0, 1.0, 0.0, -1.0]);
        let saw = render_preset(Preset::Sawtooth, 4);
        assert_eq!(saw, vec![-1.0, -0.5, 0.0, 0.5]);
    }

    #[test]
    fn built_presets_stay_below_unity() {
        for preset in Preset::ALL {
            let table = builder().build(WaveSource::Preset(preset));
            assert!(table.peak() <= HEADROOM + 1e-6);
        }
    }
}
