use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
| type      | constructed by | passes       | rejects      |
| --------- | -------------- | ------------ | ------------ |
| low-pass  | LPF            | below cutoff | above cutoff |
| high-pass | HPF            | above cutoff | below cutoff |

One SVFilter is one second-order (12 dB/octave) stage. Steeper slopes are
built by cascading stages, see `graph::filter`.

Damping is k = 1 / Q. Q = 1/√2 is the Butterworth value: flat passband, no
peak at the corner, and what every stage after the first is pinned to.
*/

/// Butterworth Q, the flattest second-order response.
pub const BUTTERWORTH_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

pub const MIN_Q: f32 = 0.1;
pub const MAX_Q: f32 = 20.0;
pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub highpass: f32,
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1000.0,
            q: BUTTERWORTH_Q,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz: clamp_cutoff(cutoff_hz),
            ..Self::new(FilterType::LowPass)
        }
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz: clamp_cutoff(cutoff_hz),
            ..Self::new(FilterType::HighPass)
        }
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    #[inline]
    fn compute_g(&self, ctx: &RenderCtx) -> f32 {
        // Keep the prewarp below Nyquist, tan() explodes at π/2
        let cutoff = self.cutoff_hz.min(ctx.sample_rate * 0.49);
        let wd = TAU * cutoff;
        let wa = (2.0 * ctx.sample_rate) * (wd / (2.0 * ctx.sample_rate)).tan();
        wa / (2.0 * ctx.sample_rate)
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            highpass: sample - k * v1 - v2,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx);
        let k = 1.0 / self.q;

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);

            *sample = match self.filter_type {
                FilterType::LowPass => outputs.lowpass,
                FilterType::HighPass => outputs.highpass,
            }
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = clamp_cutoff(cutoff);
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = clamp_q(q);
    }
}

pub fn clamp_cutoff(cutoff_hz: f32) -> f32 {
    if cutoff_hz.is_nan() {
        return MAX_CUTOFF_HZ;
    }
    cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
}

pub fn clamp_q(q: f32) -> f32 {
    if q.is_nan() {
        return BUTTERWORTH_Q;
    }
    q.clamp(MIN_Q, MAX_Q)
}
