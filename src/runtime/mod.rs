//! Audio device plumbing.
//!
//! Opens the platform's default output with cpal and runs a
//! [`crate::MonoSynth`] inside its callback. The stream is built paused and
//! only becomes audible once [`RunningOutput::resume`] is called, which the
//! front end does on the first user gesture.

mod output;

pub use output::{render_interleaved, scope, OutputDevice, RunningOutput, ScopeReceiver, ScopeTap};
