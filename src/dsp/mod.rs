//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components avoid allocating while rendering, so they can be owned
//! directly by the voice. They stay focused on the signal-processing math;
//! graph nodes and the scheduler layer timing and orchestration on top.

/// Time-stamped parameter curves (set, ramp, cancel).
pub mod automation;
/// ADSR breakpoints and the gain program they write.
pub mod envelope;
/// State-variable filter stage, low-pass or high-pass.
pub mod filter;
/// Looping wavetable playback.
pub mod oscillator;
/// Building fixed-length, normalized, faded wavetables.
pub mod wavetable;

pub use envelope::EnvelopeState;

/// Convert a level in decibels to a linear gain factor.
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::db_to_gain;

    #[test]
    fn decibels_to_linear() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
        assert!((db_to_gain(6.0) - 1.9953).abs() < 1e-3);
    }
}
