//! # touch_midi
//!
//! The musical vocabulary of the keyboard exhibit:
//!
//! * [`Note`] — scientific pitch names (`C4`, `C#4`, `Db4`) ⇄ MIDI numbers,
//! * [`NoteValue`] — Tone-style durations (`32n`, `8n.`, `4t`) → milliseconds,
//! * [`KeyboardLayout`] — white keys per octave with their sharps on top,
//! * [`GeneralMidi`] — the program numbers worth offering on a kiosk,
//! * [`ChannelMessage`] — raw note-on / note-off / program-change bytes.
//!
//! MIDI bytes are produced directly; the host decides where to send them.
//!
//! ## Quick start
//!
//! ```rust
//! use touch_midi::{KeyboardLayout, Note, NoteValue};
//!
//! let kb = KeyboardLayout::new(4..=4);
//! assert_eq!(kb.white_keys().len(), 7);
//! assert_eq!(kb.black_keys().len(), 5);
//!
//! let n: Note = "C#4".parse().unwrap();
//! assert_eq!(n.midi(), Some(61));
//! assert_eq!(NoteValue::parse("32n").unwrap().duration_ms(120.0), 62.5);
//! ```

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteParseError {
    #[error("empty note name")]
    Empty,
    #[error("unknown note letter {0:?}")]
    BadLetter(char),
    #[error("{0} has no such accidental")]
    NoSuchAccidental(String),
    #[error("bad octave in {0:?}")]
    BadOctave(String),
    #[error("bad note value {0:?} (expected e.g. 4n, 8n., 16t)")]
    BadValue(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Letter — the seven white keys
// ════════════════════════════════════════════════════════════════════════════

/// Natural note letters in keyboard order, starting from C.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Letter { C, D, E, F, G, A, B }

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C, Letter::D, Letter::E, Letter::F, Letter::G, Letter::A, Letter::B,
    ];

    /// Semitones above C.
    pub fn semitone(self) -> u8 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// True for the letters that carry a black key to their right.
    pub fn has_sharp(self) -> bool {
        !matches!(self, Letter::E | Letter::B)
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _   => None,
        }
    }

    fn previous(self) -> Letter {
        match self {
            Letter::C => Letter::B,
            Letter::D => Letter::C,
            Letter::E => Letter::D,
            Letter::F => Letter::E,
            Letter::G => Letter::F,
            Letter::A => Letter::G,
            Letter::B => Letter::A,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Note — scientific pitch notation
// ════════════════════════════════════════════════════════════════════════════

/// A pitch spelled with sharps only, e.g. `C4`, `F#3`.
///
/// Octave numbering follows the MIDI convention: `C4` = 60, `A4` = 69.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Note {
    pub letter: Letter,
    pub sharp:  bool,
    pub octave: i8,
}

impl Note {
    pub fn natural(letter: Letter, octave: i8) -> Self {
        Note { letter, sharp: false, octave }
    }

    /// The sharp above `letter`, or `None` for E and B.
    pub fn sharp(letter: Letter, octave: i8) -> Option<Self> {
        if letter.has_sharp() {
            Some(Note { letter, sharp: true, octave })
        } else {
            None
        }
    }

    pub fn is_black(&self) -> bool { self.sharp }

    /// MIDI note number, or `None` outside 0–127.
    pub fn midi(&self) -> Option<u8> {
        let n = (self.octave as i16 + 1) * 12
            + self.letter.semitone() as i16
            + self.sharp as i16;
        if (0..=127).contains(&n) { Some(n as u8) } else { None }
    }

    /// Spell a MIDI note number with sharps.
    pub fn from_midi(n: u8) -> Self {
        let octave = (n / 12) as i8 - 1;
        let (letter, sharp) = match n % 12 {
            0  => (Letter::C, false),
            1  => (Letter::C, true),
            2  => (Letter::D, false),
            3  => (Letter::D, true),
            4  => (Letter::E, false),
            5  => (Letter::F, false),
            6  => (Letter::F, true),
            7  => (Letter::G, false),
            8  => (Letter::G, true),
            9  => (Letter::A, false),
            10 => (Letter::A, true),
            _  => (Letter::B, false),
        };
        Note { letter, sharp, octave }
    }

    /// Parse `C4`, `c#3`, `Bb2`, `A-1`.  Flats are respelled as sharps.
    pub fn parse(s: &str) -> Result<Self, NoteParseError> {
        let s = s.trim();
        let mut chars = s.chars();
        let first = chars.next().ok_or(NoteParseError::Empty)?;
        let letter = Letter::from_char(first).ok_or(NoteParseError::BadLetter(first))?;

        let rest = chars.as_str();
        let (accidental, octave_str) = match rest.chars().next() {
            Some('#') => (Some('#'), &rest[1..]),
            Some('b') => (Some('b'), &rest[1..]),
            _         => (None, rest),
        };
        let octave: i8 = octave_str.parse()
            .map_err(|_| NoteParseError::BadOctave(s.to_string()))?;

        match accidental {
            None      => Ok(Note::natural(letter, octave)),
            Some('#') => Note::sharp(letter, octave)
                .ok_or_else(|| NoteParseError::NoSuchAccidental(s.to_string())),
            _ => {
                // Db = C#, Eb = D#, …; Cb and Fb are not on the keyboard as black keys
                let below = letter.previous();
                if !below.has_sharp() || letter == Letter::C {
                    return Err(NoteParseError::NoSuchAccidental(s.to_string()));
                }
                Ok(Note { letter: below, sharp: true, octave })
            }
        }
    }

    /// `C4` / `C#4`.
    pub fn name(&self) -> String { self.to_string() }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.letter.as_char(), if self.sharp { "#" } else { "" }, self.octave)
    }
}

impl FromStr for Note {
    type Err = NoteParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Note::parse(s) }
}

// ════════════════════════════════════════════════════════════════════════════
// NoteValue — Tone-style durations
// ════════════════════════════════════════════════════════════════════════════

/// A rhythmic value written the Tone.js way: `4n` quarter, `32n`
/// thirty-second, `8n.` dotted eighth, `8t` eighth triplet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteValue {
    /// 1 = whole, 4 = quarter, 32 = thirty-second, …
    pub division: u16,
    pub dotted:   bool,
    pub triplet:  bool,
}

impl NoteValue {
    pub const THIRTY_SECOND: NoteValue = NoteValue { division: 32, dotted: false, triplet: false };

    pub fn parse(s: &str) -> Result<Self, NoteParseError> {
        let bad = || NoteParseError::BadValue(s.to_string());
        let s_trim = s.trim();
        let (body, dotted) = match s_trim.strip_suffix('.') {
            Some(b) => (b, true),
            None    => (s_trim, false),
        };
        let (digits, triplet) = if let Some(d) = body.strip_suffix('n') {
            (d, false)
        } else if let Some(d) = body.strip_suffix('t') {
            (d, true)
        } else {
            return Err(bad());
        };
        let division: u16 = digits.parse().map_err(|_| bad())?;
        if division == 0 || !division.is_power_of_two() || (dotted && triplet) {
            return Err(bad());
        }
        Ok(NoteValue { division, dotted, triplet })
    }

    /// Length in milliseconds at `bpm` quarter notes per minute.
    pub fn duration_ms(&self, bpm: f64) -> f64 {
        let quarter = 60_000.0 / bpm.max(1.0);
        let mut ms = quarter * 4.0 / self.division as f64;
        if self.dotted  { ms *= 1.5; }
        if self.triplet { ms *= 2.0 / 3.0; }
        ms
    }
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.division,
               if self.triplet { "t" } else { "n" },
               if self.dotted { "." } else { "" })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// KeyboardLayout — octaves of white keys with sharps on top
// ════════════════════════════════════════════════════════════════════════════

/// One physical key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeySpec {
    pub note:        Note,
    /// Index of the white key this key is (white) or sits on (black),
    /// counted left to right across the whole keyboard.
    pub white_index: usize,
}

impl KeySpec {
    pub fn is_black(&self) -> bool { self.note.is_black() }
}

/// A keyboard spanning whole octaves, C to B.
///
/// Each white key whose letter has a sharp carries that black key on its
/// right edge, so a keyboard of `n` octaves has `7n` white and `5n` black
/// keys.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardLayout {
    white: Vec<KeySpec>,
    black: Vec<KeySpec>,
}

impl KeyboardLayout {
    pub fn new(octaves: RangeInclusive<i8>) -> Self {
        let mut white = Vec::new();
        let mut black = Vec::new();
        for octave in octaves {
            for &letter in Letter::ALL.iter() {
                let white_index = white.len();
                white.push(KeySpec { note: Note::natural(letter, octave), white_index });
                if let Some(note) = Note::sharp(letter, octave) {
                    black.push(KeySpec { note, white_index });
                }
            }
        }
        KeyboardLayout { white, black }
    }

    pub fn white_keys(&self) -> &[KeySpec] { &self.white }
    pub fn black_keys(&self) -> &[KeySpec] { &self.black }
    pub fn key_count(&self) -> usize { self.white.len() + self.black.len() }
}

// ════════════════════════════════════════════════════════════════════════════
// General MIDI programs offered by the exhibit
// ════════════════════════════════════════════════════════════════════════════

/// General MIDI programs (0-indexed, as sent in Program Change) that sound
/// good on short 32nd-note strikes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum GeneralMidi {
    AcousticGrandPiano = 0,
    BrightPiano        = 1,
    ElectricPiano      = 4,
    Harpsichord        = 6,
    Celesta            = 8,
    Glockenspiel       = 9,
    MusicBox           = 10,
    Vibraphone         = 11,
    Marimba            = 12,
    Xylophone          = 13,
    TubularBells       = 14,
    PizzicatoStrings   = 45,
    OrchestralHarp     = 46,
    SquareLead         = 80,
    Kalimba            = 108,
    SteelDrums         = 114,
}

impl GeneralMidi {
    pub const ALL: [GeneralMidi; 16] = [
        GeneralMidi::AcousticGrandPiano,
        GeneralMidi::BrightPiano,
        GeneralMidi::ElectricPiano,
        GeneralMidi::Harpsichord,
        GeneralMidi::Celesta,
        GeneralMidi::Glockenspiel,
        GeneralMidi::MusicBox,
        GeneralMidi::Vibraphone,
        GeneralMidi::Marimba,
        GeneralMidi::Xylophone,
        GeneralMidi::TubularBells,
        GeneralMidi::PizzicatoStrings,
        GeneralMidi::OrchestralHarp,
        GeneralMidi::SquareLead,
        GeneralMidi::Kalimba,
        GeneralMidi::SteelDrums,
    ];

    pub fn program(self) -> u8 { self as u8 }

    /// The instrument after this one in [`GeneralMidi::ALL`], wrapping.
    pub fn next(self) -> Self {
        let i = GeneralMidi::ALL.iter().position(|&g| g == self).unwrap_or(0);
        GeneralMidi::ALL[(i + 1) % GeneralMidi::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            GeneralMidi::AcousticGrandPiano => "Acoustic Grand Piano",
            GeneralMidi::BrightPiano        => "Bright Acoustic Piano",
            GeneralMidi::ElectricPiano      => "Electric Piano 1",
            GeneralMidi::Harpsichord        => "Harpsichord",
            GeneralMidi::Celesta            => "Celesta",
            GeneralMidi::Glockenspiel       => "Glockenspiel",
            GeneralMidi::MusicBox           => "Music Box",
            GeneralMidi::Vibraphone         => "Vibraphone",
            GeneralMidi::Marimba            => "Marimba",
            GeneralMidi::Xylophone          => "Xylophone",
            GeneralMidi::TubularBells       => "Tubular Bells",
            GeneralMidi::PizzicatoStrings   => "Pizzicato Strings",
            GeneralMidi::OrchestralHarp     => "Orchestral Harp",
            GeneralMidi::Kalimba            => "Kalimba",
            GeneralMidi::SteelDrums         => "Steel Drums",
            GeneralMidi::SquareLead         => "Lead 1 (Square)",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ChannelMessage — raw MIDI bytes
// ════════════════════════════════════════════════════════════════════════════

/// The channel-voice messages the exhibit sends.  Channels are 0–15 and
/// data bytes are masked to 7 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelMessage {
    NoteOn        { channel: u8, note: u8, velocity: u8 },
    NoteOff       { channel: u8, note: u8 },
    ProgramChange { channel: u8, program: u8 },
    AllNotesOff   { channel: u8 },
}

impl ChannelMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            ChannelMessage::NoteOn { channel, note, velocity } =>
                vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            ChannelMessage::NoteOff { channel, note } =>
                vec![0x80 | (channel & 0x0F), note & 0x7F, 0],
            ChannelMessage::ProgramChange { channel, program } =>
                vec![0xC0 | (channel & 0x0F), program & 0x7F],
            ChannelMessage::AllNotesOff { channel } =>
                vec![0xB0 | (channel & 0x0F), 123, 0],
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    // ── Note ─────────────────────────────────────────────────────────────
    #[test]
    fn middle_c_and_a440() {
        assert_eq!(Note::natural(Letter::C, 4).midi(), Some(60));
        assert_eq!(Note::natural(Letter::A, 4).midi(), Some(69));
    }

    #[test]
    fn sharp_names() {
        let n = Note::sharp(Letter::C, 4).unwrap();
        assert_eq!(n.to_string(), "C#4");
        assert_eq!(n.midi(), Some(61));
        assert!(Note::sharp(Letter::E, 4).is_none());
        assert!(Note::sharp(Letter::B, 4).is_none());
    }

    #[test]
    fn parse_names() {
        assert_eq!("C4".parse::<Note>().unwrap().midi(), Some(60));
        assert_eq!("c#3".parse::<Note>().unwrap().midi(), Some(49));
        assert_eq!("A-1".parse::<Note>().unwrap().midi(), Some(9));
        // flats respell as sharps
        assert_eq!("Bb2".parse::<Note>().unwrap(), Note::sharp(Letter::A, 2).unwrap());
        assert_eq!("Db5".parse::<Note>().unwrap().to_string(), "C#5");
    }

    #[test]
    fn parse_rejects_junk() {
        assert_eq!(Note::parse(""), Err(NoteParseError::Empty));
        assert_eq!(Note::parse("H4"), Err(NoteParseError::BadLetter('H')));
        assert!(matches!(Note::parse("E#4"), Err(NoteParseError::NoSuchAccidental(_))));
        assert!(matches!(Note::parse("Fb4"), Err(NoteParseError::NoSuchAccidental(_))));
        assert!(matches!(Note::parse("Cb4"), Err(NoteParseError::NoSuchAccidental(_))));
        assert!(matches!(Note::parse("C"),   Err(NoteParseError::BadOctave(_))));
    }

    #[test]
    fn midi_spelling_round_trips_over_full_range() {
        for n in 0..=127u8 {
            let note = Note::from_midi(n);
            assert_eq!(note.midi(), Some(n));
            assert_eq!(note.to_string().parse::<Note>().unwrap(), note);
        }
    }

    #[test]
    fn out_of_range_has_no_midi() {
        assert_eq!(Note::natural(Letter::C, -2).midi(), None);
        assert_eq!(Note::natural(Letter::A, 9).midi(), None);
    }

    // ── NoteValue ────────────────────────────────────────────────────────
    #[test]
    fn thirty_second_at_120() {
        assert_eq!(NoteValue::parse("32n").unwrap(), NoteValue::THIRTY_SECOND);
        assert_eq!(NoteValue::THIRTY_SECOND.duration_ms(120.0), 62.5);
    }

    #[test]
    fn dotted_and_triplet() {
        assert_eq!(NoteValue::parse("4n.").unwrap().duration_ms(120.0), 750.0);
        assert!((NoteValue::parse("4t").unwrap().duration_ms(120.0) - 1000.0 / 3.0).abs() < 1e-9);
        assert_eq!(NoteValue::parse("8n.").unwrap().to_string(), "8n.");
    }

    #[test]
    fn bad_note_values() {
        for s in ["", "n", "0n", "3n", "8x", "8t."] {
            assert!(NoteValue::parse(s).is_err(), "{:?} should be rejected", s);
        }
    }

    // ── KeyboardLayout ───────────────────────────────────────────────────
    #[test]
    fn two_octave_counts() {
        let kb = KeyboardLayout::new(4..=5);
        assert_eq!(kb.white_keys().len(), 14);
        assert_eq!(kb.black_keys().len(), 10);
        assert_eq!(kb.key_count(), 24);
    }

    #[test]
    fn black_keys_sit_on_their_white_key() {
        let kb = KeyboardLayout::new(4..=4);
        let cs = kb.black_keys()[0];
        assert_eq!(cs.note.to_string(), "C#4");
        assert_eq!(cs.white_index, 0);
        // F# rides on F, the fourth white key
        let fs = kb.black_keys()[2];
        assert_eq!(fs.note.to_string(), "F#4");
        assert_eq!(kb.white_keys()[fs.white_index].note.to_string(), "F4");
    }

    // ── GeneralMidi / ChannelMessage ─────────────────────────────────────
    #[test]
    fn gm_program_lookup() {
        assert_eq!(GeneralMidi::Vibraphone.program(), 11);
    }

    #[test]
    fn next_instrument_cycles_through_all() {
        assert_eq!(GeneralMidi::AcousticGrandPiano.next(), GeneralMidi::ALL[1]);
        let last = GeneralMidi::ALL[GeneralMidi::ALL.len() - 1];
        assert_eq!(last.next(), GeneralMidi::AcousticGrandPiano);
        let mut g = GeneralMidi::Vibraphone;
        for _ in 0..GeneralMidi::ALL.len() { g = g.next(); }
        assert_eq!(g, GeneralMidi::Vibraphone);
    }

    #[test]
    fn channel_message_bytes() {
        assert_eq!(ChannelMessage::NoteOn { channel: 1, note: 60, velocity: 100 }.to_bytes(),
                   vec![0x91, 60, 100]);
        assert_eq!(ChannelMessage::NoteOff { channel: 0, note: 61 }.to_bytes(),
                   vec![0x80, 61, 0]);
        assert_eq!(ChannelMessage::ProgramChange { channel: 17, program: 200 }.to_bytes(),
                   vec![0xC1, 200 & 0x7F]);
        assert_eq!(ChannelMessage::AllNotesOff { channel: 2 }.to_bytes(),
                   vec![0xB2, 123, 0]);
    }
}
