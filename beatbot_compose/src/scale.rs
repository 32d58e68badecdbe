// Keys, scales, chords and progressions.
//
// This module is pure data plus lookups, with no randomness:
// - `PitchClass` parses and names the twelve roots (sharps preferred for
//   names, flats accepted on input).
// - `ScaleKind` is the closed set of nineteen scales with their interval
//   sets; `Scale` pairs one with a root and answers membership and
//   quantization queries.
// - `ChordQuality` / `Chord` / `ChordDegree` model triads and extended
//   chords; `diatonic_chords()` derives the seven chords of a key and
//   `chord_progression()` resolves a curated degree sequence against them.
//
// Every pitched generator (`harmony.rs`, `melody.rs`) quantizes through
// `Scale::quantize` before emitting, which is what guarantees key
// conformance of the engine's output.

use crate::error::{ComposeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Pitch classes
// ---------------------------------------------------------------------------

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A pitch modulo the octave: 0 = C, 1 = C#, ... 11 = B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    pub fn new(pc: u8) -> Self {
        PitchClass(pc % 12)
    }

    pub fn of_pitch(pitch: u8) -> Self {
        PitchClass(pitch % 12)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Parse a note name such as `"C"`, `"f#"`, `"Bb"` or `"E♭"`.
    pub fn parse(name: &str) -> Result<PitchClass> {
        let trimmed = name.trim();
        let mut chars = trimmed.chars();
        let base: i32 = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(ComposeError::UnknownKey(name.to_string())),
        };
        let mut offset = 0i32;
        for c in chars {
            match c {
                '#' | '♯' => offset += 1,
                'b' | '♭' => offset -= 1,
                _ => return Err(ComposeError::UnknownKey(name.to_string())),
            }
        }
        Ok(PitchClass((base + offset).rem_euclid(12) as u8))
    }

    pub fn name(self) -> &'static str {
        SHARP_NAMES[self.0 as usize]
    }

    /// Transpose up by `semitones`.
    pub fn plus(self, semitones: u8) -> PitchClass {
        PitchClass((self.0 + semitones % 12) % 12)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Scales
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    Major,
    Minor,
    HarmonicMinor,
    MelodicMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
    PentatonicMajor,
    PentatonicMinor,
    Blues,
    Chromatic,
    WholeTone,
    Diminished,
    Arabian,
    Japanese,
    HungarianMinor,
}

impl ScaleKind {
    pub const ALL: [ScaleKind; 19] = [
        ScaleKind::Major,
        ScaleKind::Minor,
        ScaleKind::HarmonicMinor,
        ScaleKind::MelodicMinor,
        ScaleKind::Dorian,
        ScaleKind::Phrygian,
        ScaleKind::Lydian,
        ScaleKind::Mixolydian,
        ScaleKind::Aeolian,
        ScaleKind::Locrian,
        ScaleKind::PentatonicMajor,
        ScaleKind::PentatonicMinor,
        ScaleKind::Blues,
        ScaleKind::Chromatic,
        ScaleKind::WholeTone,
        ScaleKind::Diminished,
        ScaleKind::Arabian,
        ScaleKind::Japanese,
        ScaleKind::HungarianMinor,
    ];

    /// Semitone offsets from the root, unique and ascending within 0..=11.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleKind::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Minor | ScaleKind::Aeolian => &[0, 2, 3, 5, 7, 8, 10],
            ScaleKind::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleKind::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            ScaleKind::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleKind::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleKind::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleKind::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleKind::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            ScaleKind::PentatonicMajor => &[0, 2, 4, 7, 9],
            ScaleKind::PentatonicMinor => &[0, 3, 5, 7, 10],
            ScaleKind::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleKind::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            ScaleKind::WholeTone => &[0, 2, 4, 6, 8, 10],
            ScaleKind::Diminished => &[0, 2, 3, 5, 6, 8, 9, 11],
            ScaleKind::Arabian => &[0, 2, 4, 5, 6, 8, 10],
            ScaleKind::Japanese => &[0, 1, 5, 7, 8],
            ScaleKind::HungarianMinor => &[0, 2, 3, 6, 7, 8, 11],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleKind::Major => "major",
            ScaleKind::Minor => "minor",
            ScaleKind::HarmonicMinor => "harmonic_minor",
            ScaleKind::MelodicMinor => "melodic_minor",
            ScaleKind::Dorian => "dorian",
            ScaleKind::Phrygian => "phrygian",
            ScaleKind::Lydian => "lydian",
            ScaleKind::Mixolydian => "mixolydian",
            ScaleKind::Aeolian => "aeolian",
            ScaleKind::Locrian => "locrian",
            ScaleKind::PentatonicMajor => "pentatonic_major",
            ScaleKind::PentatonicMinor => "pentatonic_minor",
            ScaleKind::Blues => "blues",
            ScaleKind::Chromatic => "chromatic",
            ScaleKind::WholeTone => "whole_tone",
            ScaleKind::Diminished => "diminished",
            ScaleKind::Arabian => "arabian",
            ScaleKind::Japanese => "japanese",
            ScaleKind::HungarianMinor => "hungarian_minor",
        }
    }

    /// Parse a scale name. Case, spaces and hyphens are ignored, so
    /// `"Harmonic Minor"` and `"harmonic-minor"` both work. `ionian` and
    /// `natural_minor` are accepted as aliases.
    pub fn parse(name: &str) -> Result<ScaleKind> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        match normalized.as_str() {
            "ionian" => return Ok(ScaleKind::Major),
            "natural_minor" => return Ok(ScaleKind::Minor),
            _ => {}
        }
        ScaleKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == normalized)
            .ok_or_else(|| ComposeError::UnknownScale(name.to_string()))
    }

    /// Which diatonic chord pattern applies. Only major and the natural
    /// minor spellings have their own; everything else borrows major's.
    fn chord_family(self) -> ChordFamily {
        match self {
            ScaleKind::Minor | ScaleKind::Aeolian => ChordFamily::Minor,
            _ => ChordFamily::Major,
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scale rooted on a pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub root: PitchClass,
    pub kind: ScaleKind,
}

impl Scale {
    pub fn new(root: PitchClass, kind: ScaleKind) -> Self {
        Scale { root, kind }
    }

    /// Parse a key name and a scale name together.
    pub fn parse(key: &str, scale: &str) -> Result<Scale> {
        Ok(Scale::new(PitchClass::parse(key)?, ScaleKind::parse(scale)?))
    }

    pub fn contains(&self, pitch: u8) -> bool {
        let rel = (pitch % 12 + 12 - self.root.0) % 12;
        self.kind.intervals().contains(&rel)
    }

    /// Nearest in-scale pitch; ties go to the lower candidate. The search
    /// stays inside 0..=127.
    pub fn quantize(&self, pitch: u8) -> u8 {
        let pitch = pitch.min(127);
        if self.contains(pitch) {
            return pitch;
        }
        for offset in 1u8..12 {
            if pitch >= offset && self.contains(pitch - offset) {
                return pitch - offset;
            }
            if pitch as u16 + offset as u16 <= 127 && self.contains(pitch + offset) {
                return pitch + offset;
            }
        }
        pitch
    }

    /// All in-scale pitches in `low..=high`, ascending.
    pub fn notes_in_range(&self, low: u8, high: u8) -> Vec<u8> {
        (low..=high.min(127)).filter(|&p| self.contains(p)).collect()
    }

    /// Lowest tonic at or above `low`, if one fits under `high`.
    pub fn tonic_in_range(&self, low: u8, high: u8) -> Option<u8> {
        (low..=high.min(127)).find(|&p| p % 12 == self.root.0)
    }

    /// Pitch of a 0-based scale degree counted from the tonic at
    /// `octave_base + root`. Degrees past the scale length wrap into higher
    /// octaves; negative degrees go down. `None` outside 0..=127.
    pub fn degree_pitch(&self, degree: i32, octave_base: u8) -> Option<u8> {
        let intervals = self.kind.intervals();
        let len = intervals.len() as i32;
        let octave = degree.div_euclid(len);
        let step = intervals[degree.rem_euclid(len) as usize] as i32;
        let pitch = octave_base as i32 + self.root.0 as i32 + octave * 12 + step;
        u8::try_from(pitch).ok().filter(|&p| p <= 127)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.kind)
    }
}

/// Snap `pitch` to the nearest member of `kind` rooted at `root`.
pub fn quantize_to_scale(pitch: u8, root: PitchClass, kind: ScaleKind) -> u8 {
    Scale::new(root, kind).quantize(pitch)
}

// ---------------------------------------------------------------------------
// Chords
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7,
    Minor7,
    Dominant7,
    Major9,
    Minor9,
    Sus2,
    Sus4,
    Add9,
    Sixth,
    Minor6,
}

impl ChordQuality {
    /// Semitones above the chord root. Ninths extend past the octave.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major9 => &[0, 4, 7, 11, 14],
            ChordQuality::Minor9 => &[0, 3, 7, 10, 14],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
            ChordQuality::Add9 => &[0, 4, 7, 14],
            ChordQuality::Sixth => &[0, 4, 7, 9],
            ChordQuality::Minor6 => &[0, 3, 7, 9],
        }
    }

    /// Suffix used in chord symbols (`""` for a plain major triad).
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major9 => "maj9",
            ChordQuality::Minor9 => "m9",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Add9 => "add9",
            ChordQuality::Sixth => "6",
            ChordQuality::Minor6 => "m6",
        }
    }
}

/// A chord described relative to a key: 1-based scale degree, semitone
/// offset of its root from the key root, and quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordDegree {
    pub degree: u8,
    pub root_offset: u8,
    pub quality: ChordQuality,
}

/// A chord resolved against a concrete key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub root: PitchClass,
    pub quality: ChordQuality,
    /// 1-based degree within the key it was derived from.
    pub degree: u8,
}

impl Chord {
    pub fn symbol(&self) -> String {
        format!("{}{}", self.root.name(), self.quality.suffix())
    }

    /// Pitch of the chord root in the octave starting at `octave_base`
    /// (a multiple of 12, e.g. 36 for the bass register).
    pub fn root_pitch(&self, octave_base: u8) -> u8 {
        octave_base.saturating_add(self.root.0).min(127)
    }

    /// Chord tones stacked upward from the root in the octave at
    /// `octave_base`, dropping anything above 127.
    pub fn tones(&self, octave_base: u8) -> Vec<u8> {
        let root = self.root_pitch(octave_base) as u16;
        self.quality
            .intervals()
            .iter()
            .map(|&i| root + i as u16)
            .filter(|&p| p <= 127)
            .map(|p| p as u8)
            .collect()
    }

    pub fn contains_pitch_class(&self, pitch: u8) -> bool {
        let rel = (pitch % 12 + 12 - self.root.0) % 12;
        self.quality.intervals().iter().any(|&i| i % 12 == rel)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChordFamily {
    Major,
    Minor,
}

impl ChordFamily {
    fn pattern(self) -> [(ChordQuality, u8); 7] {
        use ChordQuality::{Diminished, Major, Minor};
        match self {
            // I ii iii IV V vi vii°
            ChordFamily::Major => [
                (Major, 0),
                (Minor, 2),
                (Minor, 4),
                (Major, 5),
                (Major, 7),
                (Minor, 9),
                (Diminished, 11),
            ],
            // i ii° III iv v VI VII
            ChordFamily::Minor => [
                (Minor, 0),
                (Diminished, 2),
                (Major, 3),
                (Minor, 5),
                (Minor, 7),
                (Major, 8),
                (Major, 10),
            ],
        }
    }
}

/// The seven diatonic chord degrees of a scale kind.
pub fn diatonic_degrees(kind: ScaleKind) -> [ChordDegree; 7] {
    let pattern = kind.chord_family().pattern();
    std::array::from_fn(|i| ChordDegree {
        degree: i as u8 + 1,
        root_offset: pattern[i].1,
        quality: pattern[i].0,
    })
}

/// The seven diatonic chords of `root` in `kind`, in degree order.
pub fn diatonic_chords(root: PitchClass, kind: ScaleKind) -> Vec<Chord> {
    diatonic_degrees(kind)
        .iter()
        .map(|d| Chord {
            root: root.plus(d.root_offset),
            quality: d.quality,
            degree: d.degree,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Progressions
// ---------------------------------------------------------------------------

/// Curated progression shapes, as 0-based indices into the diatonic chords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionStyle {
    Pop,
    Rock,
    Blues,
    Jazz,
    Sad,
    Epic,
    Minimal,
    Tension,
    Spanish,
    Gospel,
}

impl ProgressionStyle {
    pub const ALL: [ProgressionStyle; 10] = [
        ProgressionStyle::Pop,
        ProgressionStyle::Rock,
        ProgressionStyle::Blues,
        ProgressionStyle::Jazz,
        ProgressionStyle::Sad,
        ProgressionStyle::Epic,
        ProgressionStyle::Minimal,
        ProgressionStyle::Tension,
        ProgressionStyle::Spanish,
        ProgressionStyle::Gospel,
    ];

    pub fn degrees(self) -> &'static [usize] {
        match self {
            ProgressionStyle::Pop => &[0, 5, 3, 4],
            ProgressionStyle::Rock => &[0, 3, 4, 3],
            ProgressionStyle::Blues => &[0, 0, 0, 0, 3, 3, 0, 0, 4, 3, 0, 4],
            ProgressionStyle::Jazz => &[1, 4, 0, 0],
            ProgressionStyle::Sad => &[5, 3, 0, 4],
            ProgressionStyle::Epic => &[0, 6, 3, 4],
            ProgressionStyle::Minimal => &[0, 0, 0, 0],
            ProgressionStyle::Tension => &[0, 1, 4, 0],
            ProgressionStyle::Spanish => &[5, 4, 3, 5],
            ProgressionStyle::Gospel => &[0, 2, 3, 0],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProgressionStyle::Pop => "pop",
            ProgressionStyle::Rock => "rock",
            ProgressionStyle::Blues => "blues",
            ProgressionStyle::Jazz => "jazz",
            ProgressionStyle::Sad => "sad",
            ProgressionStyle::Epic => "epic",
            ProgressionStyle::Minimal => "minimal",
            ProgressionStyle::Tension => "tension",
            ProgressionStyle::Spanish => "spanish",
            ProgressionStyle::Gospel => "gospel",
        }
    }

    /// Look up a style tag; unknown tags fall back to `Pop`.
    pub fn resolve(tag: &str) -> ProgressionStyle {
        let tag = tag.trim().to_ascii_lowercase();
        match ProgressionStyle::ALL.iter().find(|s| s.name() == tag) {
            Some(&style) => style,
            None => {
                log::debug!("unknown progression style '{tag}', using pop");
                ProgressionStyle::Pop
            }
        }
    }
}

/// Resolve a progression style against the diatonic chords of a key.
pub fn chord_progression(root: PitchClass, kind: ScaleKind, style: ProgressionStyle) -> Vec<Chord> {
    let diatonic = diatonic_chords(root, kind);
    style
        .degrees()
        .iter()
        .filter_map(|&i| diatonic.get(i).copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(chords: &[Chord]) -> Vec<String> {
        chords.iter().map(Chord::symbol).collect()
    }

    #[test]
    fn test_degree_pitch_wraps_octaves() {
        let c_major = Scale::new(PitchClass::C, ScaleKind::Major);
        assert_eq!(c_major.degree_pitch(0, 60), Some(60));
        assert_eq!(c_major.degree_pitch(4, 60), Some(67));
        assert_eq!(c_major.degree_pitch(7, 60), Some(72));
        assert_eq!(c_major.degree_pitch(-1, 60), Some(59));
        assert_eq!(c_major.degree_pitch(-100, 0), None);
        let a_minor = Scale::parse("A", "minor").unwrap();
        assert_eq!(a_minor.degree_pitch(2, 48), Some(60));
    }

    #[test]
    fn test_parse_pitch_class() {
        assert_eq!(PitchClass::parse("C").unwrap().index(), 0);
        assert_eq!(PitchClass::parse("c#").unwrap().index(), 1);
        assert_eq!(PitchClass::parse("Db").unwrap().index(), 1);
        assert_eq!(PitchClass::parse("Bb").unwrap().index(), 10);
        assert_eq!(PitchClass::parse("Cb").unwrap().index(), 11);
        assert_eq!(PitchClass::parse(" F# ").unwrap().name(), "F#");
        assert!(matches!(
            PitchClass::parse("H"),
            Err(ComposeError::UnknownKey(_))
        ));
        assert!(PitchClass::parse("").is_err());
        assert!(PitchClass::parse("Cx").is_err());
    }

    #[test]
    fn test_parse_scale_kind() {
        assert_eq!(ScaleKind::parse("minor").unwrap(), ScaleKind::Minor);
        assert_eq!(
            ScaleKind::parse("Harmonic Minor").unwrap(),
            ScaleKind::HarmonicMinor
        );
        assert_eq!(
            ScaleKind::parse("whole-tone").unwrap(),
            ScaleKind::WholeTone
        );
        assert_eq!(ScaleKind::parse("ionian").unwrap(), ScaleKind::Major);
        assert!(matches!(
            ScaleKind::parse("bebop"),
            Err(ComposeError::UnknownScale(_))
        ));
        for kind in ScaleKind::ALL {
            assert_eq!(ScaleKind::parse(kind.name()).unwrap(), kind);
        }
    }

    #[test]
    fn test_intervals_unique_ascending_within_octave() {
        for kind in ScaleKind::ALL {
            let iv = kind.intervals();
            assert_eq!(iv[0], 0, "{kind} should start on the root");
            assert!(iv.windows(2).all(|w| w[0] < w[1]), "{kind} not ascending");
            assert!(iv.iter().all(|&i| i <= 11), "{kind} leaves the octave");
        }
    }

    #[test]
    fn test_quantize_membership_all_scales_roots_pitches() {
        for kind in ScaleKind::ALL {
            for root in 0..12 {
                let scale = Scale::new(PitchClass::new(root), kind);
                for pitch in 0..=127u8 {
                    let q = scale.quantize(pitch);
                    assert!(q <= 127);
                    assert!(
                        scale.contains(q),
                        "{pitch} -> {q} not in {scale}"
                    );
                    assert!((q as i32 - pitch as i32).abs() <= 6);
                }
            }
        }
    }

    #[test]
    fn test_quantize_ties_go_down() {
        let c_major = Scale::new(PitchClass::C, ScaleKind::Major);
        // C# sits between C and D.
        assert_eq!(c_major.quantize(61), 60);
        // F# sits between F and G.
        assert_eq!(c_major.quantize(66), 65);
        assert_eq!(c_major.quantize(64), 64);
        assert_eq!(quantize_to_scale(61, PitchClass::C, ScaleKind::Major), 60);
    }

    #[test]
    fn test_quantize_preserves_octave_region() {
        let a_minor = Scale::new(PitchClass::parse("A").unwrap(), ScaleKind::Minor);
        // G# (68) is equidistant from G (67) and A (69); lower wins.
        assert_eq!(a_minor.quantize(68), 67);
        assert_eq!(a_minor.quantize(21), 21);
    }

    #[test]
    fn test_c_major_diatonic_chords() {
        let chords = diatonic_chords(PitchClass::C, ScaleKind::Major);
        assert_eq!(
            symbols(&chords),
            vec!["C", "Dm", "Em", "F", "G", "Am", "Bdim"]
        );
        let degrees: Vec<u8> = chords.iter().map(|c| c.degree).collect();
        assert_eq!(degrees, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_a_minor_diatonic_chords() {
        let a = PitchClass::parse("A").unwrap();
        assert_eq!(
            symbols(&diatonic_chords(a, ScaleKind::Minor)),
            vec!["Am", "Bdim", "C", "Dm", "Em", "F", "G"]
        );
        assert_eq!(
            diatonic_chords(a, ScaleKind::Aeolian),
            diatonic_chords(a, ScaleKind::Minor)
        );
    }

    #[test]
    fn test_other_scales_use_major_pattern() {
        let d = PitchClass::parse("D").unwrap();
        let dorian = diatonic_chords(d, ScaleKind::Dorian);
        let major = diatonic_chords(d, ScaleKind::Major);
        assert_eq!(dorian, major);
    }

    #[test]
    fn test_a_minor_pop_progression() {
        let a = PitchClass::parse("A").unwrap();
        let prog = chord_progression(a, ScaleKind::Minor, ProgressionStyle::Pop);
        assert_eq!(symbols(&prog), vec!["Am", "F", "Dm", "Em"]);
    }

    #[test]
    fn test_blues_is_twelve_bars() {
        let prog = chord_progression(PitchClass::C, ScaleKind::Major, ProgressionStyle::Blues);
        assert_eq!(prog.len(), 12);
        assert_eq!(prog[4].symbol(), "F");
        assert_eq!(prog[8].symbol(), "G");
    }

    #[test]
    fn test_unknown_style_falls_back_to_pop() {
        assert_eq!(ProgressionStyle::resolve("vaporwave"), ProgressionStyle::Pop);
        assert_eq!(ProgressionStyle::resolve(" Jazz "), ProgressionStyle::Jazz);
    }

    #[test]
    fn test_chord_tones() {
        let c = diatonic_chords(PitchClass::C, ScaleKind::Major)[0];
        assert_eq!(c.tones(48), vec![48, 52, 55]);
        let g7 = Chord {
            root: PitchClass::new(7),
            quality: ChordQuality::Dominant7,
            degree: 5,
        };
        assert_eq!(g7.symbol(), "G7");
        assert_eq!(g7.tones(120), vec![127]);
        assert!(g7.contains_pitch_class(65));
        assert!(!g7.contains_pitch_class(64));
    }

    #[test]
    fn test_notes_in_range_and_tonic() {
        let c_minor = Scale::parse("C", "minor").unwrap();
        assert_eq!(
            c_minor.notes_in_range(60, 72),
            vec![60, 62, 63, 65, 67, 68, 70, 72]
        );
        assert_eq!(c_minor.tonic_in_range(61, 84), Some(72));
        assert_eq!(c_minor.tonic_in_range(61, 70), None);
    }
}
