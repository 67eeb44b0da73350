use crate::dsp::wavetable::Wavetable;

/// Rate at which a table must be stepped through to sound at `pitch_hz`.
///
/// Played one sample per frame, a table of `table_len` samples repeats at
/// `sample_rate / table_len` Hz; the rate is the pitch relative to that.
pub fn playback_rate(pitch_hz: f32, sample_rate: f32, table_len: usize) -> f64 {
    if table_len == 0 || sample_rate <= 0.0 {
        return 0.0;
    }
    pitch_hz as f64 / (sample_rate as f64 / table_len as f64)
}

/// Loops through a wavetable at a fractional rate.
///
/// The read position is kept in table samples; reads interpolate linearly
/// between neighbours and wrap at the end, so the last sample blends into
/// the first exactly like a continuous cycle.
#[derive(Debug, Clone, Default)]
pub struct TablePlayer {
    position: f64,
    rate: f64,
}

impl TablePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = if rate.is_finite() { rate.max(0.0) } else { 0.0 };
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Restart from the top of the table.
    pub fn reset(&mut self) {
        self.position = 0.0;
    }

    /// Move the read position to the same point of the cycle in a table of
    /// `to_len` samples.
    pub fn rescale(&mut self, from_len: usize, to_len: usize) {
        if from_len == 0 || to_len == 0 {
            self.position = 0.0;
            return;
        }
        self.position = (self.position * to_len as f64 / from_len as f64) % to_len as f64;
    }

    #[inline]
    pub fn next_sample(&mut self, table: &[f32]) -> f32 {
        let len = table.len();
        if len == 0 {
            return 0.0;
        }

        let index = self.position as usize % len;
        let frac = (self.position - self.position.floor()) as f32;
        let current = table[index];
        let next = table[(index + 1) % len];

        self.position += self.rate;
        if self.position >= len as f64 {
            self.position %= len as f64;
        }

        current + (next - current) * frac
    }

    pub fn render(&mut self, buffer: &mut [f32], table: &Wavetable) {
        let samples = table.samples();
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(samples);
        }
    }
}
