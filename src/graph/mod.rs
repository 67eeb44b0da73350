//! Block-rendering nodes built on the DSP primitives.
//!
//! Graph nodes wrap the low-level DSP primitives with what the voice needs:
//! note events, clock-aware rendering and reconfiguration between blocks.

/// Gain stage driven by a scheduled automation curve.
pub mod envelope;
/// Cascaded low-pass and high-pass bands.
pub mod filter;
/// Core traits shared by all graph nodes.
pub mod node;
/// Looping wavetable oscillator.
pub mod oscillator;
