use crate::io::pitch::{note_name_to_freq, NoteName};
use crate::synth::message::{NoteId, SynthMessage};

pub const MIN_OCTAVE: i32 = 0;
pub const MAX_OCTAVE: i32 = 8;
pub const DEFAULT_OCTAVE: i32 = 4;

/// Computer-keyboard piano layout: home row for white keys, the row above
/// for black keys, spanning an octave and a half.
pub const KEY_LAYOUT: [(char, NoteName, i32); 17] = [
    ('a', NoteName::C, 0),
    ('w', NoteName::CSharp, 0),
    ('s', NoteName::D, 0),
    ('e', NoteName::DSharp, 0),
    ('d', NoteName::E, 0),
    ('f', NoteName::F, 0),
    ('t', NoteName::FSharp, 0),
    ('g', NoteName::G, 0),
    ('y', NoteName::GSharp, 0),
    ('h', NoteName::A, 0),
    ('u', NoteName::ASharp, 0),
    ('j', NoteName::B, 0),
    ('k', NoteName::C, 1),
    ('o', NoteName::CSharp, 1),
    ('l', NoteName::D, 1),
    ('p', NoteName::DSharp, 1),
    (';', NoteName::E, 1),
];

/// On-screen keyboard state: which octave the layout plays in.
///
/// Keys are identified by their position in [`KEY_LAYOUT`], so a release
/// still matches its press after the octave has moved.
#[derive(Debug, Clone)]
pub struct VirtualKeyboard {
    octave: i32,
}

impl Default for VirtualKeyboard {
    fn default() -> Self {
        Self::new(DEFAULT_OCTAVE)
    }
}

impl VirtualKeyboard {
    pub fn new(octave: i32) -> Self {
        Self {
            octave: octave.clamp(MIN_OCTAVE, MAX_OCTAVE),
        }
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn octave_up(&mut self) {
        self.octave = (self.octave + 1).min(MAX_OCTAVE);
    }

    pub fn octave_down(&mut self) {
        self.octave = (self.octave - 1).max(MIN_OCTAVE);
    }

    pub fn key_index(key: char) -> Option<u8> {
        KEY_LAYOUT
            .iter()
            .position(|(c, _, _)| *c == key)
            .map(|i| i as u8)
    }

    /// Name, octave and pitch of a layout key at the current octave.
    pub fn pitch(&self, index: u8) -> Option<(NoteName, i32, f32)> {
        let (_, name, offset) = KEY_LAYOUT.get(index as usize)?;
        let octave = self.octave + offset;
        Some((*name, octave, note_name_to_freq(*name, octave)))
    }

    pub fn note_on(&self, key: char) -> Option<SynthMessage> {
        let index = Self::key_index(key)?;
        let (_, _, pitch_hz) = self.pitch(index)?;
        Some(SynthMessage::NoteOn {
            id: NoteId::Virtual(index),
            pitch_hz,
        })
    }

    pub fn note_off(&self, key: char) -> Option<SynthMessage> {
        Self::key_index(key).map(|index| SynthMessage::NoteOff {
            id: NoteId::Virtual(index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn home_row_plays_a4() {
        let keyboard = VirtualKeyboard::default();
        match keyboard.note_on('h') {
            Some(SynthMessage::NoteOn { id, pitch_hz }) => {
                assert_eq!(id, NoteId::Virtual(9));
                assert_eq!(pitch_hz, 440.0);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(keyboard.note_on('z').is_none());
    }

    #[test]
    fn octave_is_clamped() {
        let mut keyboard = VirtualKeyboard::new(42);
        assert_eq!(keyboard.octave(), MAX_OCTAVE);
        keyboard.octave_up();
        assert_eq!(keyboard.octave(), MAX_OCTAVE);

        for _ in 0..20 {
            keyboard.octave_down();
        }
        assert_eq!(keyboard.octave(), MIN_OCTAVE);
    }

    #[test]
    fn upper_keys_reach_next_octave() {
        let mut keyboard = VirtualKeyboard::default();
        keyboard.octave_down();
        let (name, octave, pitch) = keyboard.pitch(12).unwrap();
        assert_eq!(name, NoteName::C);
        assert_eq!(octave, 4);
        assert_relative_eq!(pitch, 261.6256, max_relative = 1e-5);
    }

    #[test]
    fn release_matches_press_across_octave_change() {
        let mut keyboard = VirtualKeyboard::default();
        let Some(SynthMessage::NoteOn { id: pressed, .. }) = keyboard.note_on('a') else {
            panic!("expected note on");
        };
        keyboard.octave_up();
        let Some(SynthMessage::NoteOff { id: released }) = keyboard.note_off('a') else {
            panic!("expected note off");
        };
        assert_eq!(pressed, released);
    }
}
