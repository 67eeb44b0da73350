//! Real-world scenario benchmarks.
//!
//! These model what the audio callback and the control thread actually do:
//! rendering a held note through the whole engine, and rebuilding a table
//! after a redraw.

mod voices;
mod wavetable;

pub use voices::bench_voices;
pub use wavetable::bench_wavetable;
