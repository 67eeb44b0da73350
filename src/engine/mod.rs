// Purpose: timing. The audio clock and everything scheduled against it.

pub mod clock;
pub mod scheduler;

pub use self::{clock::AudioClock, scheduler::EnvelopeScheduler};
