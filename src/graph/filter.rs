#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    dsp::filter::{clamp_cutoff, clamp_q, FilterType, SVFilter, BUTTERWORTH_Q},
    graph::node::{GraphNode, RenderCtx},
};

/*
Cascaded Filter Bands
=====================

A single state-variable stage rolls off at 12 dB per octave. Steeper slopes
come from running the signal through several identical stages in series:

    slope     stages
    12 dB     [SVF]
    24 dB     [SVF] → [SVF]
    36 dB     [SVF] → [SVF] → [SVF]
    48 dB     [SVF] → [SVF] → [SVF] → [SVF]

    stages = round(slope / 12), clamped to 1..=4

Resonance Only Once
-------------------

Each stage with Q above Butterworth puts a peak at the cutoff. Stack four of
them and the peaks multiply: Q = 4 becomes a 4⁴ = 256x spike and the chain
rings or blows up. So only stage 0 gets the user's Q; every stage after it is
pinned at Q = 1/√2, which adds steepness without adding a peak.

    stage:   0          1          2          3
    Q:     user Q    0.707      0.707      0.707
    cutoff:  ─────────── same for all ──────────

Rebuild vs Update
-----------------

Changing the slope changes the number of stages, so the band throws its
stages away and allocates new ones, then re-applies the last cutoff and Q.
Changing cutoff or Q just writes into the existing stages.

Bypass
------

A disabled band is skipped entirely, but its stages are kept. Turning it
back on restores exactly the tuning it had.

Signal path (fixed order):

    gain → [low-pass band] → [high-pass band] → master
*/

/// Rolloff steepness of a band.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slope {
    Db12,
    Db24,
    Db36,
    Db48,
}

impl Slope {
    pub const ALL: [Slope; 4] = [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48];

    /// Nearest slope to an arbitrary dB/octave value.
    pub fn from_db(db: f32) -> Self {
        match stage_count_for_slope(db) {
            1 => Slope::Db12,
            2 => Slope::Db24,
            3 => Slope::Db36,
            _ => Slope::Db48,
        }
    }

    pub fn db(self) -> f32 {
        self.stages() as f32 * 12.0
    }

    pub fn stages(self) -> usize {
        match self {
            Slope::Db12 => 1,
            Slope::Db24 => 2,
            Slope::Db36 => 3,
            Slope::Db48 => 4,
        }
    }
}

/// Number of cascaded stages for a slope in dB/octave.
pub fn stage_count_for_slope(slope_db: f32) -> usize {
    if slope_db.is_nan() {
        return 1;
    }
    (slope_db / 12.0).round().clamp(1.0, 4.0) as usize
}

/// Which band of the chain a parameter change addresses.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    LowPass,
    HighPass,
}

/// One filter type realized as 1–4 cascaded stages.
pub struct FilterBand {
    filter_type: FilterType,
    stages: Vec<SVFilter>,
    enabled: bool,
    cutoff_hz: f32,
    q: f32,
}

impl FilterBand {
    pub fn new(filter_type: FilterType, cutoff_hz: f32) -> Self {
        let mut band = Self {
            filter_type,
            stages: Vec::new(),
            enabled: false,
            cutoff_hz: clamp_cutoff(cutoff_hz),
            q: BUTTERWORTH_Q,
        };
        band.rebuild(Slope::Db12.db());
        band
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz)
    }

    /// Discard all stages and allocate `round(slope_db / 12)` fresh ones,
    /// tuned to the last-known cutoff and Q.
    pub fn rebuild(&mut self, slope_db: f32) {
        let count = stage_count_for_slope(slope_db);
        self.stages = (0..count).map(|_| SVFilter::new(self.filter_type)).collect();
        self.apply();
        debug!(
            filter = ?self.filter_type,
            stages = count,
            "rebuilt filter band"
        );
    }

    /// Retune every stage. Q reaches only stage 0.
    pub fn set_params(&mut self, cutoff_hz: f32, q: f32) {
        self.cutoff_hz = clamp_cutoff(cutoff_hz);
        self.q = clamp_q(q);
        self.apply();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn cutoff_hz(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn stages(&self) -> &[SVFilter] {
        &self.stages
    }

    pub fn slope(&self) -> Slope {
        Slope::from_db(self.stages.len() as f32 * 12.0)
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    fn apply(&mut self) {
        for (i, stage) in self.stages.iter_mut().enumerate() {
            stage.set_cutoff(self.cutoff_hz);
            stage.set_q(if i == 0 { self.q } else { BUTTERWORTH_Q });
        }
    }
}

impl GraphNode for FilterBand {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if !self.enabled {
            return;
        }
        for stage in &mut self.stages {
            stage.render(out, ctx);
        }
    }
}

/// Low-pass band followed by high-pass band.
pub struct FilterChain {
    lowpass: FilterBand,
    highpass: FilterBand,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self {
            lowpass: FilterBand::lowpass(20_000.0),
            highpass: FilterBand::highpass(20.0),
        }
    }
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, lowpass_slope_db: f32, highpass_slope_db: f32) {
        self.lowpass.rebuild(lowpass_slope_db);
        self.highpass.rebuild(highpass_slope_db);
    }

    pub fn rebuild_band(&mut self, band: Band, slope_db: f32) {
        self.band_mut(band).rebuild(slope_db);
    }

    pub fn set_params(&mut self, band: Band, cutoff_hz: f32, q: f32) {
        self.band_mut(band).set_params(cutoff_hz, q);
    }

    pub fn set_enabled(&mut self, band: Band, enabled: bool) {
        self.band_mut(band).set_enabled(enabled);
    }

    pub fn band(&self, band: Band) -> &FilterBand {
        match band {
            Band::LowPass => &self.lowpass,
            Band::HighPass => &self.highpass,
        }
    }

    pub fn band_mut(&mut self, band: Band) -> &mut FilterBand {
        match band {
            Band::LowPass => &mut self.lowpass,
            Band::HighPass => &mut self.highpass,
        }
    }

    pub fn reset(&mut self) {
        self.lowpass.reset();
        self.highpass.reset();
    }
}

impl GraphNode for FilterChain {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.lowpass.render_block(out, ctx);
        self.highpass.render_block(out, ctx);
    }
}
