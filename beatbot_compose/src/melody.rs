// Melody generation.
//
// A melody is a walk over the in-scale pitches of a fixed register
// (`MelodyParams::low_pitch..=high_pitch`), one slot per step. Movement is
// counted in scale degrees, i.e. indices into that pitch list:
//
// - strong slots (on a beat) usually land on a tone of the bar's chord,
//   otherwise move up to two degrees;
// - weak slots mostly step by one degree, sometimes skip by two, and
//   occasionally leap three to five degrees.
//
// Any slot but the last may rest. The last slot is always played and is
// resolved to the tonic at cadence velocity, which is at least as loud as
// every other note in the part. `resolve_cadence()` enforces that rule and
// is re-run by the orchestrator after humanization, since timing jitter
// can change which note sorts last.

use crate::config::MelodyParams;
use crate::error::{ComposeError, Result};
use crate::note::{NoteEvent, TICKS_PER_BAR, TICKS_PER_BEAT, sort_notes};
use crate::scale::{Chord, Scale};
use rand::Rng;

const LEAPS: [i32; 6] = [-5, -4, -3, 3, 4, 5];

/// Generate `bars` bars of melody over `progression` (one chord per bar,
/// cycled).
pub fn generate_melody(
    progression: &[Chord],
    scale: &Scale,
    bars: u32,
    steps_per_bar: u32,
    params: &MelodyParams,
    rng: &mut impl Rng,
) -> Result<Vec<NoteEvent>> {
    if bars == 0 {
        return Err(ComposeError::ZeroBars);
    }
    if steps_per_bar == 0 || TICKS_PER_BAR % steps_per_bar != 0 {
        return Err(ComposeError::InvalidStepsPerBar {
            steps: steps_per_bar,
            ticks: TICKS_PER_BAR,
        });
    }
    let pitches = scale.notes_in_range(params.low_pitch, params.high_pitch);
    if pitches.is_empty() {
        return Err(ComposeError::OutOfRange {
            name: "melody range",
            value: params.low_pitch as f64,
            expected: "a range containing at least one scale note",
        });
    }
    let top = pitches.len() as i32 - 1;
    let slot = TICKS_PER_BAR / steps_per_bar;

    // Start on the lowest tonic in range if there is one.
    let mut idx = scale
        .tonic_in_range(params.low_pitch, params.high_pitch)
        .and_then(|t| pitches.iter().position(|&p| p == t))
        .unwrap_or(pitches.len() / 2) as i32;

    let mut notes = Vec::new();
    for bar in 0..bars {
        let chord = (!progression.is_empty()).then(|| progression[bar as usize % progression.len()]);
        let bar_start = bar * TICKS_PER_BAR;
        let bar_end = bar_start + TICKS_PER_BAR;
        for s in 0..steps_per_bar {
            let position = bar_start + s * slot;
            let is_last = bar == bars - 1 && s == steps_per_bar - 1;
            if !is_last && rng.random_bool(params.rest_probability.clamp(0.0, 1.0)) {
                continue;
            }
            let strong = position % TICKS_PER_BEAT == 0;

            let next = if strong {
                let chord_tones: Vec<i32> = chord
                    .map(|c| {
                        (0..=top)
                            .filter(|&i| c.contains_pitch_class(pitches[i as usize]))
                            .collect()
                    })
                    .unwrap_or_default();
                if !chord_tones.is_empty()
                    && rng.random_bool(params.chord_tone_probability.clamp(0.0, 1.0))
                {
                    chord_tones[rng.random_range(0..chord_tones.len())]
                } else {
                    idx + rng.random_range(-2..=2)
                }
            } else if rng.random_bool(params.step_probability.clamp(0.0, 1.0)) {
                idx + if rng.random_bool(0.5) { 1 } else { -1 }
            } else if rng.random_bool(params.skip_probability.clamp(0.0, 1.0)) {
                idx + if rng.random_bool(0.5) { 2 } else { -2 }
            } else {
                idx + LEAPS[rng.random_range(0..LEAPS.len())]
            };
            idx = next.clamp(0, top);

            let length = if rng.random_bool(0.7) {
                slot
            } else if rng.random_bool(0.8) {
                slot * 2
            } else {
                (slot / 2).max(1)
            };
            let length = length.min(bar_end - position);

            let velocity = if strong {
                params.strong_velocity as i32 + rng.random_range(-5..=10)
            } else {
                params.weak_velocity as i32 + rng.random_range(-10..=10)
            };
            notes.push(NoteEvent::new(
                pitches[idx as usize] as i32,
                position,
                length,
                velocity,
            ));
        }
    }
    Ok(resolve_cadence(&notes, scale, params.cadence_velocity))
}

/// Nearest tonic to `pitch`; ties resolve downward.
pub fn nearest_tonic(pitch: u8, scale: &Scale) -> u8 {
    let p = pitch as i32;
    let rel = (p - scale.root.index() as i32).rem_euclid(12);
    let down = p - rel;
    let up = down + 12;
    let pick = if down < 0 {
        up
    } else if up > 127 || rel <= 12 - rel {
        down
    } else {
        up
    };
    pick.clamp(0, 127) as u8
}

/// Sort the part and make its final note the tonic, at least as loud as
/// `cadence_velocity` and every other note.
pub fn resolve_cadence(notes: &[NoteEvent], scale: &Scale, cadence_velocity: u8) -> Vec<NoteEvent> {
    let mut out = notes.to_vec();
    sort_notes(&mut out);
    let loudest = out.iter().map(|n| n.velocity).max().unwrap_or(0);
    if let Some(last) = out.last_mut() {
        let velocity = cadence_velocity.max(loudest);
        *last = last
            .with_pitch(nearest_tonic(last.pitch, scale))
            .with_velocity(velocity as i32);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::{ProgressionStyle, ScaleKind, chord_progression};
    use beatbot_prng::PatternRng;

    fn c_minor() -> (Scale, Vec<Chord>) {
        let scale = Scale::parse("C", "minor").unwrap();
        let prog = chord_progression(scale.root, ScaleKind::Minor, ProgressionStyle::Pop);
        (scale, prog)
    }

    #[test]
    fn test_one_bar_ends_on_loud_tonic() {
        let (scale, prog) = c_minor();
        let params = MelodyParams::default();
        for seed in 0..100 {
            let mut rng = PatternRng::new(seed);
            let notes = generate_melody(&prog, &scale, 1, 8, &params, &mut rng).unwrap();
            let last = notes.last().unwrap();
            assert_eq!(last.pitch % 12, 0, "seed {seed}");
            assert_eq!(last.position, 42);
            let avg = notes.iter().map(|n| n.velocity as f64).sum::<f64>() / notes.len() as f64;
            assert!(last.velocity as f64 >= avg);
            assert!(notes.iter().all(|n| n.velocity <= last.velocity));
        }
    }

    #[test]
    fn test_notes_in_scale_and_register() {
        let (scale, prog) = c_minor();
        let params = MelodyParams::default();
        let mut rng = PatternRng::new(42);
        let notes = generate_melody(&prog, &scale, 8, 16, &params, &mut rng).unwrap();
        for n in &notes {
            assert!(scale.contains(n.pitch));
            assert!((params.low_pitch..=params.high_pitch).contains(&n.pitch));
            let bar_end = (n.position / TICKS_PER_BAR + 1) * TICKS_PER_BAR;
            assert!(n.end() <= bar_end);
        }
        assert!(notes.len() <= 8 * 16);
    }

    #[test]
    fn test_rests_everywhere_but_last() {
        let (scale, prog) = c_minor();
        let params = MelodyParams {
            rest_probability: 1.0,
            ..MelodyParams::default()
        };
        let mut rng = PatternRng::new(5);
        let notes = generate_melody(&prog, &scale, 2, 16, &params, &mut rng).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].position, 48 + 45);
        assert_eq!(notes[0].velocity, params.cadence_velocity);
    }

    #[test]
    fn test_invalid_requests() {
        let (scale, prog) = c_minor();
        let params = MelodyParams::default();
        let mut rng = PatternRng::new(1);
        assert!(matches!(
            generate_melody(&prog, &scale, 0, 16, &params, &mut rng),
            Err(ComposeError::ZeroBars)
        ));
        assert!(matches!(
            generate_melody(&prog, &scale, 1, 5, &params, &mut rng),
            Err(ComposeError::InvalidStepsPerBar { steps: 5, .. })
        ));
        let narrow = MelodyParams {
            low_pitch: 61,
            high_pitch: 61,
            ..MelodyParams::default()
        };
        assert!(generate_melody(&prog, &scale, 1, 16, &narrow, &mut rng).is_err());
    }

    #[test]
    fn test_nearest_tonic() {
        let c = Scale::parse("C", "major").unwrap();
        assert_eq!(nearest_tonic(60, &c), 60);
        assert_eq!(nearest_tonic(65, &c), 60);
        assert_eq!(nearest_tonic(66, &c), 60);
        assert_eq!(nearest_tonic(67, &c), 72);
        assert_eq!(nearest_tonic(127, &c), 120);
        let a = Scale::parse("A", "minor").unwrap();
        assert_eq!(nearest_tonic(2, &a), 9);
    }

    #[test]
    fn test_resolve_cadence_after_reordering() {
        let c = Scale::parse("C", "major").unwrap();
        let notes = vec![
            NoteEvent::new(64, 40, 3, 100),
            NoteEvent::new(67, 12, 3, 70),
        ];
        let out = resolve_cadence(&notes, &c, 90);
        assert_eq!(out[0].position, 12);
        assert_eq!(out[1].pitch, 60);
        assert_eq!(out[1].velocity, 100);
        assert!(resolve_cadence(&[], &c, 90).is_empty());
    }
}
