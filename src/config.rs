#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::MIN_STAGE_TIME;

/// Audio-level settings fixed for the lifetime of an engine.
///
/// User-facing sound parameters live in [`crate::Patch`]; this struct only
/// covers what the renderer needs to size its buffers and clocks.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f32,
    /// Number of samples in every wavetable.
    pub table_len: usize,
    /// Samples faded in at the head and out at the tail of each table.
    pub fade_samples: usize,
    /// Level held between the decay and release stages.
    pub sustain_level: f32,
    /// Floor applied to every envelope stage duration, in seconds.
    pub min_stage_time: f32,
    /// Capacity of the control → renderer message queue.
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            table_len: 8192,
            fade_samples: 64,
            sustain_level: 0.5,
            min_stage_time: MIN_STAGE_TIME,
            queue_capacity: 64,
        }
    }
}

impl EngineConfig {
    pub fn sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self.sanitized()
    }

    pub fn table_len(mut self, table_len: usize) -> Self {
        self.table_len = table_len;
        self.sanitized()
    }

    pub fn fade_samples(mut self, fade_samples: usize) -> Self {
        self.fade_samples = fade_samples;
        self.sanitized()
    }

    pub fn sustain_level(mut self, level: f32) -> Self {
        self.sustain_level = level;
        self.sanitized()
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self.sanitized()
    }

    /// Clamp every field into the range the engine can work with.
    ///
    /// The head and tail fades must not overlap, so `fade_samples` is held to
    /// at most half the table.
    pub fn sanitized(mut self) -> Self {
        if !(self.sample_rate.is_finite() && self.sample_rate >= 1_000.0) {
            warn!(sample_rate = self.sample_rate, "invalid sample rate, using 48 kHz");
            self.sample_rate = 48_000.0;
        }
        if self.table_len < 2 {
            warn!(table_len = self.table_len, "table too short, using 2 samples");
            self.table_len = 2;
        }
        let max_fade = self.table_len / 2;
        if self.fade_samples > max_fade {
            warn!(
                fade_samples = self.fade_samples,
                max_fade, "fade overlaps itself, clamping"
            );
            self.fade_samples = max_fade;
        }
        self.sustain_level = if self.sustain_level.is_finite() {
            self.sustain_level.clamp(0.0, 1.0)
        } else {
            0.5
        };
        if !(self.min_stage_time.is_finite() && self.min_stage_time > 0.0) {
            self.min_stage_time = MIN_STAGE_TIME;
        }
        self.queue_capacity = self.queue_capacity.max(1);
        self
    }

    /// Output frequency of a table played back one sample per frame.
    pub fn base_frequency(&self) -> f32 {
        self.sample_rate / self.table_len as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_is_held_to_half_the_table() {
        let config = EngineConfig::default().table_len(100).fade_samples(80);
        assert_eq!(config.fade_samples, 50);
    }

    #[test]
    fn base_frequency_matches_table_loop() {
        let config = EngineConfig::default().sample_rate(44_100.0);
        assert!((config.base_frequency() - 44_100.0 / 8192.0).abs() < 1e-4);
    }

    #[test]
    fn nonsense_values_are_replaced() {
        let config = EngineConfig::default()
            .sample_rate(f32::NAN)
            .sustain_level(3.0)
            .queue_capacity(0);
        assert_eq!(config.sample_rate, 48_000.0);
        assert_eq!(config.sustain_level, 1.0);
        assert_eq!(config.queue_capacity, 1);
    }
}
