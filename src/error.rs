//! Error type shared by the library.
//!
//! Parameter values are clamped rather than rejected, so the only failures
//! left are the audio device, the control queue, file I/O and unparsable
//! note names.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No output device, or none that accepts f32 samples.
    #[error("unsupported audio output: {0}")]
    UnsupportedOutput(String),

    #[error("audio stream: {0}")]
    Stream(String),

    /// The renderer has not drained the control queue yet.
    #[error("control queue is full")]
    QueueFull,

    #[error("unknown note name: {0:?}")]
    UnknownNote(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
