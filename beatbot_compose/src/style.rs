// Style tags: part roles, genres and moods.
//
// Requests name their genre and mood as free-form tags ("deep house",
// "dark", "drum and bass"). Resolution is deterministic substring matching
// in a fixed order, so overlapping tags always resolve the same way
// ("drum" before "house" in "drum house"). Unrecognized tags are never an
// error: genre falls back to House and mood to Neutral, with a debug log
// line and a `fallback` flag the caller can surface.
//
// Each genre carries the performance choices the other generators key off:
// tempo hint, bass rhythm cell, chord part style, and whether the bassline
// swings. Progression style and the default key are picked from mood
// first, then genre.

use crate::harmony::{ArpDirection, BassCell, ChordStyle};
use crate::scale::{PitchClass, ProgressionStyle, ScaleKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which part of an arrangement a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Kick,
    Snare,
    Hat,
    Bass,
    Chord,
    Melody,
    Percussion,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Kick,
        Role::Snare,
        Role::Hat,
        Role::Bass,
        Role::Chord,
        Role::Melody,
        Role::Percussion,
    ];

    /// Drum roles come from groove templates; the rest are pitched.
    pub fn is_percussive(self) -> bool {
        matches!(self, Role::Kick | Role::Snare | Role::Hat | Role::Percussion)
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Kick => "kick",
            Role::Snare => "snare",
            Role::Hat => "hat",
            Role::Bass => "bass",
            Role::Chord => "chord",
            Role::Melody => "melody",
            Role::Percussion => "percussion",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Genre
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    House,
    Techno,
    DrumAndBass,
    Dubstep,
    Trap,
    Garage,
    Ambient,
    Trance,
    HipHop,
    Jazz,
}

/// A resolved tag plus whether resolution had to fall back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub fallback: bool,
}

/// Substrings checked in order; the first hit wins.
const GENRE_TAGS: &[(&str, Genre)] = &[
    ("dnb", Genre::DrumAndBass),
    ("drum", Genre::DrumAndBass),
    ("jungle", Genre::DrumAndBass),
    ("dubstep", Genre::Dubstep),
    ("trap", Genre::Trap),
    ("garage", Genre::Garage),
    ("techno", Genre::Techno),
    ("trance", Genre::Trance),
    ("ambient", Genre::Ambient),
    ("hip hop", Genre::HipHop),
    ("hiphop", Genre::HipHop),
    ("hip-hop", Genre::HipHop),
    ("boom bap", Genre::HipHop),
    ("jazz", Genre::Jazz),
    ("house", Genre::House),
];

impl Genre {
    pub const ALL: [Genre; 10] = [
        Genre::House,
        Genre::Techno,
        Genre::DrumAndBass,
        Genre::Dubstep,
        Genre::Trap,
        Genre::Garage,
        Genre::Ambient,
        Genre::Trance,
        Genre::HipHop,
        Genre::Jazz,
    ];

    pub fn resolve(tag: &str) -> Resolved<Genre> {
        let tag = tag.trim().to_lowercase();
        match GENRE_TAGS.iter().find(|(needle, _)| tag.contains(needle)) {
            Some(&(_, genre)) => Resolved {
                value: genre,
                fallback: false,
            },
            None => {
                log::debug!("unrecognized genre '{tag}', using house");
                Resolved {
                    value: Genre::House,
                    fallback: true,
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Genre::House => "house",
            Genre::Techno => "techno",
            Genre::DrumAndBass => "dnb",
            Genre::Dubstep => "dubstep",
            Genre::Trap => "trap",
            Genre::Garage => "garage",
            Genre::Ambient => "ambient",
            Genre::Trance => "trance",
            Genre::HipHop => "hiphop",
            Genre::Jazz => "jazz",
        }
    }

    /// Suggested tempo in BPM.
    pub fn tempo_hint(self) -> u32 {
        match self {
            Genre::House => 125,
            Genre::Techno => 130,
            Genre::DrumAndBass => 174,
            Genre::Dubstep => 140,
            Genre::Trap => 140,
            Genre::Garage => 130,
            Genre::Ambient => 90,
            Genre::Trance => 138,
            Genre::HipHop => 90,
            Genre::Jazz => 120,
        }
    }

    pub fn bass_cell(self) -> BassCell {
        match self {
            Genre::House | Genre::Trance => BassCell::Rolling,
            Genre::Techno => BassCell::Driving,
            Genre::DrumAndBass | Genre::Ambient => BassCell::Reese,
            Genre::Jazz => BassCell::Walking,
            Genre::Trap | Genre::Garage | Genre::HipHop => BassCell::Syncopated,
            Genre::Dubstep => BassCell::Bouncing,
        }
    }

    pub fn chord_style(self) -> ChordStyle {
        match self {
            Genre::Trance => ChordStyle::Arpeggio(ArpDirection::UpDown),
            Genre::House | Genre::Techno | Genre::Garage | Genre::Dubstep => ChordStyle::Stabs,
            Genre::Ambient | Genre::DrumAndBass | Genre::Trap | Genre::HipHop | Genre::Jazz => {
                ChordStyle::Pad
            }
        }
    }

    /// Jazz voices its chords as sevenths.
    pub fn uses_sevenths(self) -> bool {
        self == Genre::Jazz
    }

    /// Genres whose bassline gets extra swing on top of humanization.
    pub fn swung_bass(self) -> bool {
        matches!(self, Genre::House | Genre::Garage | Genre::Jazz)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Mood
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Dark,
    Happy,
    Uplifting,
    Sad,
    Emotional,
    Exotic,
    Neutral,
}

const MOOD_TAGS: &[(&str, Mood)] = &[
    ("dark", Mood::Dark),
    ("happy", Mood::Happy),
    ("uplifting", Mood::Uplifting),
    ("sad", Mood::Sad),
    ("emotional", Mood::Emotional),
    ("exotic", Mood::Exotic),
];

impl Mood {
    /// A missing mood is Neutral without counting as a fallback.
    pub fn resolve(tag: Option<&str>) -> Resolved<Mood> {
        let Some(tag) = tag else {
            return Resolved {
                value: Mood::Neutral,
                fallback: false,
            };
        };
        let tag = tag.trim().to_lowercase();
        match MOOD_TAGS.iter().find(|(needle, _)| tag.contains(needle)) {
            Some(&(_, mood)) => Resolved {
                value: mood,
                fallback: false,
            },
            None if tag.is_empty() || tag == "neutral" => Resolved {
                value: Mood::Neutral,
                fallback: false,
            },
            None => {
                log::debug!("unrecognized mood '{tag}', using neutral");
                Resolved {
                    value: Mood::Neutral,
                    fallback: true,
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mood::Dark => "dark",
            Mood::Happy => "happy",
            Mood::Uplifting => "uplifting",
            Mood::Sad => "sad",
            Mood::Emotional => "emotional",
            Mood::Exotic => "exotic",
            Mood::Neutral => "neutral",
        }
    }

    /// Scale used when the request does not name one.
    pub fn default_scale(self) -> ScaleKind {
        match self {
            Mood::Dark | Mood::Sad | Mood::Emotional | Mood::Neutral => ScaleKind::Minor,
            Mood::Happy | Mood::Uplifting => ScaleKind::Major,
            Mood::Exotic => ScaleKind::Arabian,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mood decides first; otherwise the genre's habitual shape; otherwise pop.
pub fn progression_style(genre: Genre, mood: Mood) -> ProgressionStyle {
    match mood {
        Mood::Dark => return ProgressionStyle::Minimal,
        Mood::Sad | Mood::Emotional => return ProgressionStyle::Sad,
        Mood::Uplifting => return ProgressionStyle::Epic,
        _ => {}
    }
    match genre {
        Genre::House => ProgressionStyle::Pop,
        Genre::Techno => ProgressionStyle::Minimal,
        Genre::Jazz => ProgressionStyle::Jazz,
        _ => ProgressionStyle::Pop,
    }
}

// Candidate key roots as pitch-class indices (0 = C).
const DARK_KEYS: &[u8] = &[9, 2, 6, 1];
const BRIGHT_KEYS: &[u8] = &[0, 7, 2, 5];
const MELANCHOLY_KEYS: &[u8] = &[9, 4, 11, 6];
const HOUSE_KEYS: &[u8] = &[0, 5, 7, 9];
const TECHNO_KEYS: &[u8] = &[9, 2, 4, 0];
const DNB_KEYS: &[u8] = &[6, 2, 9, 4];
const TRAP_KEYS: &[u8] = &[0, 5, 10, 3];
const TRANCE_KEYS: &[u8] = &[9, 4, 2, 7];
const FALLBACK_KEYS: &[u8] = &[0];

/// Roots a request without a key may be given: mood decides first, then
/// genre, otherwise C.
pub fn key_candidates(genre: Genre, mood: Mood) -> &'static [u8] {
    match mood {
        Mood::Dark => return DARK_KEYS,
        Mood::Happy | Mood::Uplifting => return BRIGHT_KEYS,
        Mood::Sad | Mood::Emotional => return MELANCHOLY_KEYS,
        Mood::Exotic | Mood::Neutral => {}
    }
    match genre {
        Genre::House => HOUSE_KEYS,
        Genre::Techno => TECHNO_KEYS,
        Genre::DrumAndBass => DNB_KEYS,
        Genre::Trap => TRAP_KEYS,
        Genre::Trance => TRANCE_KEYS,
        _ => FALLBACK_KEYS,
    }
}

/// Draw a key root from `key_candidates()`.
pub fn default_key(genre: Genre, mood: Mood, rng: &mut impl Rng) -> PitchClass {
    let candidates = key_candidates(genre, mood);
    PitchClass::new(candidates[rng.random_range(0..candidates.len())])
}
