use crate::{
    io::midi::MidiEvent,
    synth::message::{NoteId, SynthMessage},
};

/// Map a MIDI event on `channel_filter` to a synth message.
///
/// Only note events are routed; everything else is left to the caller.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn { channel, key, .. } if channel == channel_filter => {
            Some(SynthMessage::NoteOn {
                id: NoteId::Midi(key),
                pitch_hz: midi_note_to_freq(key),
            })
        }
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(SynthMessage::NoteOff {
                id: NoteId::Midi(key),
            })
        }
        _ => None,
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
