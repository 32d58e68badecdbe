// Note events and the tick grid.
//
// Every part the engine produces is a `Vec<NoteEvent>`. Positions are in
// ticks relative to the start of the part: 48 ticks per 4/4 bar, 12 per
// beat, 3 per sixteenth. Events are plain `Copy` values; the builders here
// return new events with the result clamped back into MIDI range, so no
// transformation can produce an out-of-range pitch or velocity.

use serde::{Deserialize, Serialize};

pub const TICKS_PER_BAR: u32 = 48;
pub const TICKS_PER_BEAT: u32 = 12;
pub const TICKS_PER_SIXTEENTH: u32 = 3;

/// A single note: MIDI pitch, start tick, duration in ticks, velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI pitch, 0..=127.
    pub pitch: u8,
    /// Start in ticks from the beginning of the part.
    pub position: u32,
    /// Duration in ticks, at least 1.
    pub length: u32,
    /// MIDI velocity, 1..=127.
    pub velocity: u8,
}

impl NoteEvent {
    /// Build an event from unclamped arithmetic results.
    pub fn new(pitch: i32, position: u32, length: u32, velocity: i32) -> Self {
        NoteEvent {
            pitch: clamp_pitch(pitch),
            position,
            length: length.max(1),
            velocity: clamp_velocity(velocity),
        }
    }

    /// Tick at which the note stops sounding.
    pub fn end(&self) -> u32 {
        self.position + self.length
    }

    pub fn transposed(&self, semitones: i32) -> Self {
        NoteEvent {
            pitch: clamp_pitch(self.pitch as i32 + semitones),
            ..*self
        }
    }

    pub fn with_pitch(&self, pitch: u8) -> Self {
        NoteEvent {
            pitch: pitch.min(127),
            ..*self
        }
    }

    pub fn with_position(&self, position: u32) -> Self {
        NoteEvent { position, ..*self }
    }

    pub fn with_velocity(&self, velocity: i32) -> Self {
        NoteEvent {
            velocity: clamp_velocity(velocity),
            ..*self
        }
    }

    /// Move the note by a signed tick offset, stopping at tick 0.
    pub fn shifted(&self, ticks: i64) -> Self {
        let position = (self.position as i64 + ticks).max(0) as u32;
        self.with_position(position)
    }
}

pub fn clamp_pitch(pitch: i32) -> u8 {
    pitch.clamp(0, 127) as u8
}

pub fn clamp_velocity(velocity: i32) -> u8 {
    velocity.clamp(1, 127) as u8
}

/// Sort events by position, then pitch, so part output has a stable order.
pub fn sort_notes(notes: &mut [NoteEvent]) {
    notes.sort_by_key(|n| (n.position, n.pitch));
}

/// Tick length of one step at the given resolution.
pub fn step_ticks(steps_per_bar: u32) -> u32 {
    TICKS_PER_BAR / steps_per_bar.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        let n = NoteEvent::new(200, 5, 0, 0);
        assert_eq!(n.pitch, 127);
        assert_eq!(n.length, 1);
        assert_eq!(n.velocity, 1);

        let n = NoteEvent::new(-4, 0, 3, 300);
        assert_eq!(n.pitch, 0);
        assert_eq!(n.velocity, 127);
    }

    #[test]
    fn test_transposed_returns_new_value() {
        let n = NoteEvent::new(60, 12, 6, 90);
        let up = n.transposed(7);
        assert_eq!(up.pitch, 67);
        assert_eq!(n.pitch, 60);
        assert_eq!(up.position, 12);
        assert_eq!(n.transposed(100).pitch, 127);
    }

    #[test]
    fn test_shifted_stops_at_zero() {
        let n = NoteEvent::new(36, 2, 3, 100);
        assert_eq!(n.shifted(-5).position, 0);
        assert_eq!(n.shifted(4).position, 6);
    }

    #[test]
    fn test_sort_notes() {
        let mut notes = vec![
            NoteEvent::new(64, 12, 3, 80),
            NoteEvent::new(60, 12, 3, 80),
            NoteEvent::new(67, 0, 3, 80),
        ];
        sort_notes(&mut notes);
        let order: Vec<(u32, u8)> = notes.iter().map(|n| (n.position, n.pitch)).collect();
        assert_eq!(order, vec![(0, 67), (12, 60), (12, 64)]);
    }

    #[test]
    fn test_step_ticks() {
        assert_eq!(step_ticks(16), 3);
        assert_eq!(step_ticks(8), 6);
        assert_eq!(step_ticks(12), 4);
    }
}
