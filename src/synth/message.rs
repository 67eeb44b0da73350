use std::sync::Arc;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::dsp::envelope::EnvelopeParams;
use crate::dsp::wavetable::Wavetable;
use crate::graph::filter::{Band, Slope};

/// Where a note came from. Two sources never share an identity, so a
/// released MIDI key cannot silence a held on-screen key with the same pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteId {
    /// Index into the on-screen keyboard layout.
    Virtual(u8),
    /// MIDI note number.
    Midi(u8),
}

#[derive(Debug, Clone)]
pub enum SynthMessage {
    NoteOn { id: NoteId, pitch_hz: f32 },
    NoteOff { id: NoteId },
    AllNotesOff,
    SetWavetable(Arc<Wavetable>),
    SetEnvelope(EnvelopeParams),
    SetEnvelopeEnabled(bool),
    SetFilter { band: Band, cutoff_hz: f32, q: f32 },
    SetSlope { band: Band, slope: Slope },
    SetBandEnabled { band: Band, enabled: bool },
    SetMasterDb(f32),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}
