//! Draw a single-cycle waveform and play it back as a tuned, looping voice.
//!
//! The crate is layered the same way from the bottom up:
//!
//! - [`dsp`]: allocation-free primitives (wavetable building, automation
//!   curves, filter stages, table playback)
//! - [`graph`]: block-rendering nodes wrapping those primitives
//! - [`engine`]: the audio clock and the self-rescheduling envelope loop
//! - [`synth`]: the monophonic voice engine and its control messages
//! - [`io`]: sample files, MIDI bytes and pitch mapping
//! - [`runtime`]: the platform audio output device

pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod graph;
pub mod io;
pub mod patch;
#[cfg(feature = "rtrb")]
pub mod runtime;
pub mod synth;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use patch::Patch;
pub use synth::mono::MonoSynth;

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Shortest duration any envelope stage may take, in seconds.
pub const MIN_STAGE_TIME: f32 = 0.001;
