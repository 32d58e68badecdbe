// Bassline and chord-part generation.
//
// Both parts follow the chord progression one chord per bar, cycling the
// progression when the part is longer than it. Every pitch is quantized to
// the request's scale before it is emitted.
//
// The bassline is a fixed rhythmic cell per genre (`BassCell`), a short list
// of (tick, chord tone, length, velocity) hits. The root always lands on the
// downbeat; the other hits take the third, fifth, octave, or an approach
// tone a semitone below the next bar's root.
//
// The chord part has three styles:
// - stabs: the triad on ticks 0, 18 and 36 of each bar,
// - pads: one sustained voicing per bar with a small random offset,
// - arpeggios: one chord tone per step in a chosen direction, with rests.

use crate::note::{NoteEvent, TICKS_PER_BAR};
use crate::scale::{Chord, ChordQuality, Scale};
use rand::Rng;
use serde::{Deserialize, Serialize};

const BASS_OCTAVE: u8 = 36;
const STAB_OCTAVE: u8 = 48;
const PAD_OCTAVE: u8 = 60;
const ARP_OCTAVE: u8 = 72;

const STAB_POSITIONS: [u32; 3] = [0, 18, 36];

/// Which chord tone a bass hit plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Root,
    Third,
    Fifth,
    Octave,
    /// One semitone below the next bar's root.
    Approach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BassHit {
    pub tick: u32,
    pub tone: Tone,
    pub length: u32,
    pub velocity: u8,
}

const fn hit(tick: u32, tone: Tone, length: u32, velocity: u8) -> BassHit {
    BassHit {
        tick,
        tone,
        length,
        velocity,
    }
}

const ROLLING: &[BassHit] = &[
    hit(0, Tone::Root, 10, 100),
    hit(12, Tone::Root, 10, 90),
    hit(24, Tone::Octave, 10, 85),
    hit(36, Tone::Root, 10, 95),
];
const DRIVING: &[BassHit] = &[
    hit(0, Tone::Root, 6, 100),
    hit(6, Tone::Root, 6, 85),
    hit(12, Tone::Root, 6, 100),
    hit(18, Tone::Root, 6, 85),
    hit(24, Tone::Root, 6, 100),
    hit(30, Tone::Root, 6, 85),
    hit(36, Tone::Root, 6, 100),
    hit(42, Tone::Root, 6, 85),
];
const REESE: &[BassHit] = &[hit(0, Tone::Root, 48, 100)];
const WALKING: &[BassHit] = &[
    hit(0, Tone::Root, 12, 100),
    hit(12, Tone::Third, 12, 85),
    hit(24, Tone::Fifth, 12, 90),
    hit(36, Tone::Approach, 12, 80),
];
const SYNCOPATED: &[BassHit] = &[
    hit(0, Tone::Root, 18, 100),
    hit(18, Tone::Root, 6, 80),
    hit(30, Tone::Fifth, 18, 90),
];
const BOUNCING: &[BassHit] = &[
    hit(0, Tone::Root, 9, 110),
    hit(12, Tone::Octave, 3, 80),
    hit(24, Tone::Root, 9, 100),
    hit(42, Tone::Fifth, 6, 85),
];
const ROOT_FIFTH: &[BassHit] = &[hit(0, Tone::Root, 20, 100), hit(24, Tone::Fifth, 20, 90)];

/// One-bar bass rhythm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BassCell {
    Rolling,
    Driving,
    Reese,
    Walking,
    Syncopated,
    Bouncing,
    RootFifth,
}

impl BassCell {
    pub fn hits(self) -> &'static [BassHit] {
        match self {
            BassCell::Rolling => ROLLING,
            BassCell::Driving => DRIVING,
            BassCell::Reese => REESE,
            BassCell::Walking => WALKING,
            BassCell::Syncopated => SYNCOPATED,
            BassCell::Bouncing => BOUNCING,
            BassCell::RootFifth => ROOT_FIFTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArpDirection {
    Up,
    Down,
    UpDown,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordStyle {
    Stabs,
    Pad,
    Arpeggio(ArpDirection),
}

/// Chord for bar `bar`, cycling the progression.
fn chord_for_bar(progression: &[Chord], bar: u32) -> Option<&Chord> {
    if progression.is_empty() {
        return None;
    }
    progression.get(bar as usize % progression.len())
}

fn tone_pitch(chord: &Chord, next: &Chord, tone: Tone) -> i32 {
    let root = chord.root_pitch(BASS_OCTAVE) as i32;
    let intervals = chord.quality.intervals();
    match tone {
        Tone::Root => root,
        Tone::Third => root + intervals.get(1).copied().unwrap_or(4) as i32,
        Tone::Fifth => root + intervals.get(2).copied().unwrap_or(7) as i32,
        Tone::Octave => root + 12,
        Tone::Approach => next.root_pitch(BASS_OCTAVE) as i32 - 1,
    }
}

/// Render the bass cell over `bars` bars of `progression`.
pub fn generate_bassline(progression: &[Chord], scale: &Scale, bars: u32, cell: BassCell) -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    for bar in 0..bars {
        let (Some(chord), Some(next)) = (
            chord_for_bar(progression, bar),
            chord_for_bar(progression, bar + 1),
        ) else {
            break;
        };
        let start = bar * TICKS_PER_BAR;
        for h in cell.hits() {
            let pitch = scale.quantize(tone_pitch(chord, next, h.tone).clamp(0, 127) as u8);
            notes.push(NoteEvent::new(
                pitch as i32,
                start + h.tick,
                h.length,
                h.velocity as i32,
            ));
        }
    }
    notes
}

/// Seventh-chord version of a triad, for jazz voicings. The dominant (V)
/// of a major key becomes a dominant seventh.
pub fn with_seventh(chord: &Chord) -> Chord {
    let quality = match chord.quality {
        ChordQuality::Major if chord.degree == 5 => ChordQuality::Dominant7,
        ChordQuality::Major => ChordQuality::Major7,
        ChordQuality::Minor => ChordQuality::Minor7,
        other => other,
    };
    Chord { quality, ..*chord }
}

fn voicing(chord: &Chord, scale: &Scale, octave: u8) -> Vec<u8> {
    chord.tones(octave).into_iter().map(|p| scale.quantize(p)).collect()
}

/// Render the chord part over `bars` bars.
pub fn generate_chords(
    progression: &[Chord],
    scale: &Scale,
    bars: u32,
    steps_per_bar: u32,
    style: ChordStyle,
    sevenths: bool,
    rng: &mut impl Rng,
) -> Vec<NoteEvent> {
    let mut notes = Vec::new();
    for bar in 0..bars {
        let Some(chord) = chord_for_bar(progression, bar) else {
            break;
        };
        let chord = if sevenths { with_seventh(chord) } else { *chord };
        let start = bar * TICKS_PER_BAR;
        match style {
            ChordStyle::Stabs => {
                let tones = voicing(&chord, scale, STAB_OCTAVE);
                for &pos in &STAB_POSITIONS {
                    for &p in &tones {
                        let velocity = 70 + rng.random_range(-10..=10);
                        notes.push(NoteEvent::new(p as i32, start + pos, 12, velocity));
                    }
                }
            }
            ChordStyle::Pad => {
                let offset = rng.random_range(0..=2);
                let length = TICKS_PER_BAR - rng.random_range(1..=3);
                for p in voicing(&chord, scale, PAD_OCTAVE) {
                    let velocity = 50 + rng.random_range(-5..=5);
                    notes.push(NoteEvent::new(p as i32, start + offset, length - offset, velocity));
                }
            }
            ChordStyle::Arpeggio(direction) => {
                let tones = voicing(&chord, scale, ARP_OCTAVE);
                let order = arp_order(&tones, direction);
                let steps = steps_per_bar.max(1);
                let step = TICKS_PER_BAR / steps;
                for i in 0..steps {
                    if rng.random_bool(0.1) {
                        continue;
                    }
                    let pitch = match direction {
                        ArpDirection::Random => tones[rng.random_range(0..tones.len())],
                        _ => order[i as usize % order.len()],
                    };
                    let velocity = 50 + rng.random_range(-10..=20);
                    notes.push(NoteEvent::new(
                        pitch as i32,
                        start + i * step,
                        step.saturating_sub(1).max(1),
                        velocity,
                    ));
                }
            }
        }
    }
    notes
}

/// Cycle of tones an arpeggio walks through. Up-down does not repeat the
/// top and bottom notes at the turnarounds.
fn arp_order(tones: &[u8], direction: ArpDirection) -> Vec<u8> {
    match direction {
        ArpDirection::Up | ArpDirection::Random => tones.to_vec(),
        ArpDirection::Down => tones.iter().rev().copied().collect(),
        ArpDirection::UpDown => {
            let mut order = tones.to_vec();
            if tones.len() > 2 {
                order.extend(tones[1..tones.len() - 1].iter().rev());
            }
            order
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{ProgressionStyle, ScaleKind, chord_progression};
    use beatbot_prng::PatternRng;

    fn a_minor() -> (Scale, Vec<Chord>) {
        let scale = Scale::parse("A", "minor").unwrap();
        let prog = chord_progression(scale.root, ScaleKind::Minor, ProgressionStyle::Pop);
        (scale, prog)
    }

    #[test]
    fn test_bass_root_on_every_downbeat() {
        let (scale, prog) = a_minor();
        for cell in [
            BassCell::Rolling,
            BassCell::Driving,
            BassCell::Reese,
            BassCell::Walking,
            BassCell::Syncopated,
            BassCell::Bouncing,
            BassCell::RootFifth,
        ] {
            let notes = generate_bassline(&prog, &scale, 8, cell);
            for bar in 0..8u32 {
                let chord = &prog[bar as usize % prog.len()];
                let down = notes
                    .iter()
                    .find(|n| n.position == bar * TICKS_PER_BAR)
                    .unwrap();
                assert_eq!(down.pitch % 12, chord.root.index(), "{cell:?} bar {bar}");
            }
            assert!(notes.iter().all(|n| scale.contains(n.pitch)));
        }
    }

    #[test]
    fn test_walking_bass_approaches_next_root() {
        let scale = Scale::parse("C", "major").unwrap();
        let prog = chord_progression(scale.root, ScaleKind::Major, ProgressionStyle::Pop);
        let notes = generate_bassline(&prog, &scale, 1, BassCell::Walking);
        // C -> Am: approach is G# quantized to the lower neighbour G.
        let approach = notes.iter().find(|n| n.position == 36).unwrap();
        assert_eq!(approach.pitch, 43);
    }

    #[test]
    fn test_empty_progression_gives_empty_part() {
        let scale = Scale::parse("C", "major").unwrap();
        let mut rng = PatternRng::new(1);
        assert!(generate_bassline(&[], &scale, 4, BassCell::Rolling).is_empty());
        assert!(generate_chords(&[], &scale, 4, 16, ChordStyle::Pad, false, &mut rng).is_empty());
    }

    #[test]
    fn test_stabs_positions_and_velocity() {
        let (scale, prog) = a_minor();
        let mut rng = PatternRng::new(42);
        let notes = generate_chords(&prog, &scale, 2, 16, ChordStyle::Stabs, false, &mut rng);
        assert_eq!(notes.len(), 2 * 3 * 3);
        for n in &notes {
            assert!([0, 18, 36].contains(&(n.position % TICKS_PER_BAR)));
            assert!((60..=80).contains(&n.velocity));
            assert!(scale.contains(n.pitch));
        }
    }

    #[test]
    fn test_pads_fit_inside_bar() {
        let (scale, prog) = a_minor();
        let mut rng = PatternRng::new(7);
        let notes = generate_chords(&prog, &scale, 4, 16, ChordStyle::Pad, true, &mut rng);
        for n in &notes {
            let bar_end = (n.position / TICKS_PER_BAR + 1) * TICKS_PER_BAR;
            assert!(n.end() <= bar_end);
            assert!((45..=55).contains(&n.velocity));
        }
        // Seventh voicings have four tones.
        assert_eq!(notes.len(), 4 * 4);
    }

    #[test]
    fn test_arpeggio_steps() {
        let (scale, prog) = a_minor();
        let mut rng = PatternRng::new(3);
        let notes = generate_chords(
            &prog,
            &scale,
            1,
            16,
            ChordStyle::Arpeggio(ArpDirection::Up),
            false,
            &mut rng,
        );
        assert!(notes.len() <= 16);
        assert!(notes.iter().all(|n| n.length == 2 && n.position % 3 == 0));
        assert!(notes.iter().all(|n| scale.contains(n.pitch)));
    }

    #[test]
    fn test_arp_order_updown() {
        assert_eq!(arp_order(&[60, 64, 67], ArpDirection::UpDown), vec![60, 64, 67, 64]);
        assert_eq!(arp_order(&[60, 64, 67], ArpDirection::Down), vec![67, 64, 60]);
        assert_eq!(arp_order(&[60, 64], ArpDirection::UpDown), vec![60, 64]);
    }

    #[test]
    fn test_with_seventh() {
        let scale = Scale::parse("C", "major").unwrap();
        let chords = crate::scale::diatonic_chords(scale.root, ScaleKind::Major);
        let symbols: Vec<String> = chords.iter().map(|c| with_seventh(c).symbol()).collect();
        assert_eq!(symbols, vec!["Cmaj7", "Dm7", "Em7", "Fmaj7", "G7", "Am7", "Bdim"]);
    }
}
