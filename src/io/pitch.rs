use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Concert pitch of A4.
pub const A4_HZ: f32 = 440.0;

/// Octave that A4 belongs to; its octave factor is 1.
pub const REFERENCE_OCTAVE: i32 = 4;

/// The twelve pitch classes, named with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    /// Position within the octave, C = 0.
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Semitone offset from A within the same octave (C is -9, B is +2).
    pub fn semitones_from_a(self) -> i32 {
        self.index() - NoteName::A.index()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteName {
    type Err = Error;

    /// Accepts a letter with an optional `#` or `b`, e.g. "F#" or "Db".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let natural: i32 = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(Error::UnknownNote(s.to_string())),
        };
        let shift = match chars.as_str() {
            "" => 0,
            "#" => 1,
            "b" => -1,
            _ => return Err(Error::UnknownNote(s.to_string())),
        };
        let index = (natural + shift).rem_euclid(12) as usize;
        Ok(NoteName::ALL[index])
    }
}

/// Scale factor for an octave relative to A4's octave: 2^(octave - 4).
pub fn octave_factor(octave: i32) -> f32 {
    2.0_f32.powi(octave - REFERENCE_OCTAVE)
}

/// `A4 * octave_factor * 2^(semitones / 12)`.
pub fn note_name_to_freq(name: NoteName, octave: i32) -> f32 {
    A4_HZ * octave_factor(octave) * 2.0_f32.powf(name.semitones_from_a() as f32 / 12.0)
}

/// MIDI note number for a name and octave, if it lies in 0..=127.
pub fn note_name_to_midi(name: NoteName, octave: i32) -> Option<u8> {
    let note = (octave + 1) * 12 + name.index();
    u8::try_from(note).ok().filter(|n| *n <= 127)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::converter::midi_note_to_freq;
    use approx::assert_relative_eq;

    #[test]
    fn a4_and_octaves() {
        assert_eq!(note_name_to_freq(NoteName::A, 4), 440.0);
        assert_eq!(note_name_to_freq(NoteName::A, 5), 880.0);
        assert_eq!(note_name_to_freq(NoteName::A, 3), 220.0);
        assert_relative_eq!(
            note_name_to_freq(NoteName::C, 4),
            261.6256,
            max_relative = 1e-5
        );
    }

    #[test]
    fn agrees_with_midi_mapping() {
        for octave in -1..=9 {
            for name in NoteName::ALL {
                let Some(note) = note_name_to_midi(name, octave) else {
                    continue;
                };
                assert_relative_eq!(
                    note_name_to_freq(name, octave),
                    midi_note_to_freq(note),
                    max_relative = 1e-5
                );
            }
        }
    }

    #[test]
    fn parses_sharps_and_flats() {
        assert_eq!("C".parse::<NoteName>().unwrap(), NoteName::C);
        assert_eq!("c#".parse::<NoteName>().unwrap(), NoteName::CSharp);
        assert_eq!("Db".parse::<NoteName>().unwrap(), NoteName::CSharp);
        assert_eq!("Cb".parse::<NoteName>().unwrap(), NoteName::B);
        assert_eq!("B#".parse::<NoteName>().unwrap(), NoteName::C);
        assert!("H".parse::<NoteName>().is_err());
        assert!("C##".parse::<NoteName>().is_err());
        assert!("".parse::<NoteName>().is_err());
    }

    #[test]
    fn semitone_offsets() {
        assert_eq!(NoteName::C.semitones_from_a(), -9);
        assert_eq!(NoteName::A.semitones_from_a(), 0);
        assert_eq!(NoteName::B.semitones_from_a(), 2);
    }
}
