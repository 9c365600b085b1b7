//! Pitch representations and conversions.
//!
//! A [`Note`] is either a frequency in Hz or a MIDI note number. Scientific
//! pitch names parse to MIDI numbers:
//!
//! ```rust
//! use lumen_synth::Note;
//!
//! let a4: Note = "A4".parse().unwrap();
//! assert_eq!(a4, Note::Midi(69));
//! assert!((a4.frequency() - 440.0).abs() < 0.01);
//!
//! let middle_c: Note = "C4".parse().unwrap();
//! assert_eq!(middle_c, Note::Midi(60));
//!
//! let hz: Note = "261.63hz".parse().unwrap();
//! assert_eq!(hz, Note::Frequency(261.63));
//! ```

use core::fmt;
use core::str::FromStr;

use crate::error::NoteError;

const NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Convert MIDI note number to frequency in Hz.
///
/// Uses standard tuning: A4 (note 69) = 440 Hz.
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Convert frequency in Hz to a (fractional) MIDI note number.
#[inline]
pub fn freq_to_midi(freq: f32) -> f32 {
    69.0 + 12.0 * libm::log2f(freq / 440.0)
}

/// A pitch, as a frequency or a MIDI note number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Note {
    /// Frequency in Hz.
    Frequency(f32),
    /// MIDI note number (60 = C4, 69 = A4).
    Midi(u8),
}

impl Note {
    /// Frequency in Hz.
    pub fn frequency(self) -> f32 {
        match self {
            Note::Frequency(hz) => hz,
            Note::Midi(n) => midi_to_freq(n),
        }
    }

    /// MIDI note number, fractional for frequencies between semitones.
    pub fn midi(self) -> f32 {
        match self {
            Note::Frequency(hz) => freq_to_midi(hz),
            Note::Midi(n) => f32::from(n),
        }
    }
}

impl From<f32> for Note {
    fn from(hz: f32) -> Self {
        Note::Frequency(hz)
    }
}

impl From<u8> for Note {
    fn from(midi: u8) -> Self {
        Note::Midi(midi)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Note::Frequency(hz) => write!(f, "{hz}hz"),
            Note::Midi(n) => {
                let octave = i32::from(n) / 12 - 1;
                write!(f, "{}{}", NAMES[usize::from(n % 12)], octave)
            }
        }
    }
}

impl FromStr for Note {
    type Err = NoteError;

    /// Parse "C4", "A#3", "Eb5", "C-1", "440", or "440hz".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || NoteError::Invalid(s.to_string());

        let numeric = text
            .strip_suffix("hz")
            .or_else(|| text.strip_suffix("Hz"))
            .unwrap_or(text);
        if let Ok(hz) = numeric.trim().parse::<f32>() {
            return if hz.is_finite() && hz >= 0.0 {
                Ok(Note::Frequency(hz))
            } else {
                Err(invalid())
            };
        }

        let mut chars = text.chars();
        let letter = chars.next().ok_or_else(invalid)?;
        let base = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return Err(invalid()),
        };

        let rest = chars.as_str();
        let accidentals = rest.len() - rest.trim_start_matches(['#', 'b']).len();
        let (accidental, octave) = rest.split_at(accidentals);
        let shift: i32 = accidental
            .chars()
            .map(|c| if c == '#' { 1 } else { -1 })
            .sum();
        let octave: i32 = octave.parse().map_err(|_| invalid())?;

        let midi = (octave + 1) * 12 + base + shift;
        u8::try_from(midi)
            .ok()
            .filter(|&n| n <= 127)
            .map(Note::Midi)
            .ok_or(NoteError::OutOfRange(midi))
    }
}
