// Timing and velocity humanization, and swing.
//
// All three functions take a part and return a new one; the input is left
// untouched. Jitter is drawn from the caller's RNG so humanized output is as
// reproducible as the rest of the engine.
//
// Timing jitter is smaller on beat positions (multiples of 12 ticks) so the
// downbeats stay tight while the in-between notes loosen up.
//
// Swing delays round to the nearest tick rather than truncating, so 0.5 of
// a sixteenth is 2 ticks, not 1.

use crate::error::{Result, check_range};
use crate::note::{NoteEvent, TICKS_PER_BAR, TICKS_PER_BEAT, TICKS_PER_SIXTEENTH};
use rand::Rng;

/// Convert a timing amount (fraction of a bar) into a tick bound.
pub fn jitter_ticks(amount: f64) -> u32 {
    (TICKS_PER_BAR as f64 * amount.clamp(0.0, 1.0)).floor() as u32
}

/// Move each note by up to `jitter` ticks either way, or `jitter / 4` for
/// notes on a beat. Positions stop at 0.
pub fn humanize_timing(notes: &[NoteEvent], jitter: u32, rng: &mut impl Rng) -> Vec<NoteEvent> {
    notes
        .iter()
        .map(|n| {
            let bound = i64::from(if n.position % TICKS_PER_BEAT == 0 {
                jitter / 4
            } else {
                jitter
            });
            if bound == 0 {
                return *n;
            }
            n.shifted(rng.random_range(-bound..=bound))
        })
        .collect()
}

/// Scale each velocity by up to `fraction` of full range either way,
/// clamped to 1..=127.
pub fn humanize_velocity(notes: &[NoteEvent], fraction: f64, rng: &mut impl Rng) -> Result<Vec<NoteEvent>> {
    check_range("velocity jitter", fraction, 0.0, 1.0, "[0, 1]")?;
    let bound = (fraction * 127.0).floor() as i32;
    Ok(notes
        .iter()
        .map(|n| {
            if bound == 0 {
                return *n;
            }
            n.with_velocity(n.velocity as i32 + rng.random_range(-bound..=bound))
        })
        .collect())
}

/// Delay notes on odd sixteenths by `round(amount * 3)` ticks, half away
/// from zero.
pub fn add_swing(notes: &[NoteEvent], amount: f64) -> Result<Vec<NoteEvent>> {
    check_range("swing", amount, 0.0, 1.0, "[0, 1]")?;
    let delay = (amount * TICKS_PER_SIXTEENTH as f64).round() as i64;
    Ok(notes
        .iter()
        .map(|n| {
            let sixteenth = n.position / TICKS_PER_SIXTEENTH;
            if n.position % TICKS_PER_SIXTEENTH == 0 && sixteenth % 2 == 1 {
                n.shifted(delay)
            } else {
                *n
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComposeError;
    use beatbot_prng::PatternRng;

    fn grid() -> Vec<NoteEvent> {
        (0..16).map(|i| NoteEvent::new(60, i * 3, 3, 80)).collect()
    }

    #[test]
    fn test_timing_bounds() {
        let notes = grid();
        for seed in 0..50 {
            let mut rng = PatternRng::new(seed);
            let out = humanize_timing(&notes, 8, &mut rng);
            for (before, after) in notes.iter().zip(&out) {
                let moved = (after.position as i64 - before.position as i64).abs();
                let bound = if before.position % 12 == 0 { 2 } else { 8 };
                assert!(moved <= bound, "{} -> {}", before.position, after.position);
                assert_eq!(after.pitch, before.pitch);
            }
        }
    }

    #[test]
    fn test_timing_clamps_at_zero() {
        let notes = vec![NoteEvent::new(60, 1, 3, 80)];
        for seed in 0..50 {
            let mut rng = PatternRng::new(seed);
            let out = humanize_timing(&notes, 20, &mut rng);
            assert!(out[0].position <= 21);
        }
    }

    #[test]
    fn test_velocity_bounds() {
        let notes = vec![NoteEvent::new(60, 0, 3, 2), NoteEvent::new(60, 3, 3, 126)];
        for seed in 0..50 {
            let mut rng = PatternRng::new(seed);
            let out = humanize_velocity(&notes, 0.1, &mut rng).unwrap();
            for (before, after) in notes.iter().zip(&out) {
                assert!((1..=127).contains(&after.velocity));
                assert!((after.velocity as i32 - before.velocity as i32).abs() <= 12);
            }
        }
    }

    #[test]
    fn test_velocity_rejects_bad_fraction() {
        let mut rng = PatternRng::new(1);
        assert!(matches!(
            humanize_velocity(&grid(), 1.5, &mut rng),
            Err(ComposeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_swing_moves_odd_sixteenths_only() {
        let out = add_swing(&grid(), 0.5).unwrap();
        for (i, n) in out.iter().enumerate() {
            let expected = i as u32 * 3 + if i % 2 == 1 { 2 } else { 0 };
            assert_eq!(n.position, expected);
        }
        assert_eq!(add_swing(&grid(), 0.0).unwrap(), grid());
        assert!(add_swing(&grid(), -0.1).is_err());
    }

    #[test]
    fn test_swing_rounds_to_nearest_tick() {
        let odd = vec![NoteEvent::new(60, 3, 3, 80)];
        for (amount, ticks) in [(0.1, 0), (0.15, 0), (0.2, 1), (0.4, 1), (0.5, 2), (0.84, 3), (1.0, 3)] {
            let out = add_swing(&odd, amount).unwrap();
            assert_eq!(out[0].position, 3 + ticks, "swing {amount}");
        }
    }

    #[test]
    fn test_swing_ignores_off_grid_notes() {
        let notes = vec![NoteEvent::new(60, 4, 3, 80)];
        assert_eq!(add_swing(&notes, 1.0).unwrap(), notes);
    }

    #[test]
    fn test_jitter_ticks() {
        assert_eq!(jitter_ticks(0.05), 2);
        assert_eq!(jitter_ticks(0.0), 0);
        assert_eq!(jitter_ticks(0.25), 12);
    }
}
