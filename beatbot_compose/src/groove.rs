// Groove template library and drum rendering.
//
// A groove template is one 16-step bar of per-step velocities for a single
// drum voice (zero means no hit) plus a swing amount. Templates are static
// tables selected by (genre, role); genres without an entry for a role use
// that role's default, so lookup never fails for a percussive role.
//
// Rendering a percussive part is three steps:
//
// 1. `GrooveTemplate::resample()` adapts the 16-step table to the request's
//    step resolution.
// 2. `blend()` mixes a generated onset vector into the template. Anchor
//    steps (quarter-note positions) always keep the template so the part
//    stays locked to the beat; other steps take the generated value with
//    probability `algorithm_share`.
// 3. `render_drums()` turns the blended bar into note events, repeated for
//    every bar. Every `variation_every`-th bar gets a variation: the snare
//    fills its last four steps with a crescendo and hats may open on the
//    step before each half-bar.
//
// Swing and humanization are applied afterwards by the orchestrator.

use crate::config::BlendParams;
use crate::note::{NoteEvent, TICKS_PER_BAR, TICKS_PER_BEAT};
use crate::onset::OnsetVector;
use crate::style::{Genre, Role};
use rand::Rng;
use serde::Serialize;

// General MIDI drum map pitches.
pub const KICK_PITCH: u8 = 36;
pub const SIDE_STICK_PITCH: u8 = 37;
pub const SNARE_PITCH: u8 = 38;
pub const CLOSED_HAT_PITCH: u8 = 42;
pub const OPEN_HAT_PITCH: u8 = 46;

const TEMPLATE_STEPS: usize = 16;

/// One bar of a drum voice at sixteenth-note resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrooveTemplate {
    pub name: &'static str,
    /// Velocity per step; 0 is a rest.
    pub velocities: [u8; TEMPLATE_STEPS],
    /// Fraction of a sixteenth by which off-beat sixteenths are delayed.
    pub swing: f64,
}

/// A template adapted to a particular step count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Groove {
    pub name: &'static str,
    pub velocities: Vec<u8>,
    pub swing: f64,
}

impl GrooveTemplate {
    pub fn onsets(&self) -> OnsetVector {
        OnsetVector::new(self.velocities.iter().map(|&v| v > 0).collect())
    }

    /// Map onto `steps` per bar. Hits that collapse onto one coarse step
    /// keep the loudest velocity.
    pub fn resample(&self, steps: usize) -> Groove {
        let steps = steps.max(1);
        let mut velocities = vec![0u8; steps];
        for (i, &v) in self.velocities.iter().enumerate() {
            if v > 0 {
                let j = i * steps / TEMPLATE_STEPS;
                velocities[j] = velocities[j].max(v);
            }
        }
        Groove {
            name: self.name,
            velocities,
            swing: self.swing,
        }
    }
}

impl Groove {
    pub fn len(&self) -> usize {
        self.velocities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }

    pub fn onsets(&self) -> OnsetVector {
        OnsetVector::new(self.velocities.iter().map(|&v| v > 0).collect())
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub static HOUSE_4X4: GrooveTemplate = GrooveTemplate {
    name: "house_4x4",
    velocities: [127, 0, 0, 0, 110, 0, 0, 0, 120, 0, 0, 0, 110, 0, 0, 0],
    swing: 0.0,
};
pub static HOUSE_GARAGE: GrooveTemplate = GrooveTemplate {
    name: "house_garage",
    velocities: [120, 0, 0, 0, 0, 0, 0, 90, 115, 0, 0, 0, 0, 0, 0, 0],
    swing: 0.15,
};
pub static TECHNO_DRIVING: GrooveTemplate = GrooveTemplate {
    name: "techno_driving",
    velocities: [127, 0, 0, 70, 120, 0, 0, 0, 125, 0, 0, 70, 120, 0, 0, 0],
    swing: 0.0,
};
pub static TECHNO_MINIMAL: GrooveTemplate = GrooveTemplate {
    name: "techno_minimal",
    velocities: [120, 0, 0, 0, 0, 0, 0, 0, 115, 0, 0, 0, 0, 0, 80, 0],
    swing: 0.0,
};
pub static DNB_CLASSIC: GrooveTemplate = GrooveTemplate {
    name: "dnb_classic",
    velocities: [120, 0, 0, 0, 0, 0, 0, 0, 0, 0, 110, 0, 0, 0, 0, 0],
    swing: 0.0,
};
pub static TRAP_MINIMAL: GrooveTemplate = GrooveTemplate {
    name: "trap_minimal",
    velocities: [127, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 100, 0, 0, 0],
    swing: 0.0,
};
pub static HIP_HOP_BOOM_BAP: GrooveTemplate = GrooveTemplate {
    name: "hip_hop_boom_bap",
    velocities: [120, 0, 0, 0, 0, 0, 60, 0, 0, 0, 100, 0, 0, 0, 0, 0],
    swing: 0.25,
};

pub static BACKBEAT: GrooveTemplate = GrooveTemplate {
    name: "backbeat",
    velocities: [0, 0, 0, 0, 100, 0, 0, 0, 0, 0, 0, 0, 100, 0, 0, 0],
    swing: 0.0,
};
pub static GARAGE_SNARE: GrooveTemplate = GrooveTemplate {
    name: "garage_snare",
    velocities: [0, 0, 0, 0, 100, 0, 0, 0, 0, 0, 0, 0, 100, 0, 0, 60],
    swing: 0.1,
};
pub static DNB_SNARE: GrooveTemplate = GrooveTemplate {
    name: "dnb_snare",
    velocities: [0, 0, 0, 0, 0, 0, 0, 0, 120, 0, 0, 0, 0, 0, 0, 0],
    swing: 0.0,
};
pub static TRAP_SNARE: GrooveTemplate = GrooveTemplate {
    name: "trap_snare",
    velocities: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 110, 0, 0, 0],
    swing: 0.0,
};
pub static TECHNO_CLAP: GrooveTemplate = GrooveTemplate {
    name: "techno_clap",
    velocities: [0, 0, 0, 0, 90, 0, 0, 50, 0, 0, 0, 0, 90, 0, 0, 0],
    swing: 0.0,
};

pub static STRAIGHT_16THS: GrooveTemplate = GrooveTemplate {
    name: "straight_16ths",
    velocities: [70, 50, 60, 50, 70, 50, 60, 50, 70, 50, 60, 50, 70, 50, 60, 50],
    swing: 0.0,
};
pub static HOUSE_HATS: GrooveTemplate = GrooveTemplate {
    name: "house_hats",
    velocities: [0, 70, 0, 60, 0, 70, 0, 60, 0, 70, 0, 60, 0, 70, 0, 60],
    swing: 0.0,
};
pub static GARAGE_SKIP: GrooveTemplate = GrooveTemplate {
    name: "garage_skip",
    velocities: [70, 0, 50, 60, 0, 65, 55, 0, 70, 0, 50, 60, 0, 65, 55, 0],
    swing: 0.2,
};
pub static TRAP_HATS: GrooveTemplate = GrooveTemplate {
    name: "trap_hats",
    velocities: [80, 0, 60, 0, 70, 70, 0, 60, 80, 0, 60, 0, 70, 60, 50, 40],
    swing: 0.0,
};
pub static TECHNO_MINIMAL_HATS: GrooveTemplate = GrooveTemplate {
    name: "techno_minimal_hats",
    velocities: [0, 0, 60, 0, 0, 0, 60, 0, 0, 0, 60, 0, 0, 0, 60, 0],
    swing: 0.0,
};
pub static DNB_RIDE: GrooveTemplate = GrooveTemplate {
    name: "dnb_ride",
    velocities: [60, 55, 58, 55, 60, 55, 58, 55, 60, 55, 58, 55, 60, 55, 58, 55],
    swing: 0.0,
};

pub static PERC_TRESILLO: GrooveTemplate = GrooveTemplate {
    name: "perc_tresillo",
    velocities: [90, 0, 0, 70, 0, 0, 80, 0, 90, 0, 0, 70, 0, 0, 80, 0],
    swing: 0.0,
};
pub static PERC_OFFBEAT: GrooveTemplate = GrooveTemplate {
    name: "perc_offbeat",
    velocities: [0, 0, 80, 0, 0, 0, 70, 0, 0, 0, 80, 0, 0, 0, 70, 0],
    swing: 0.0,
};

/// Template for a percussive role in a genre; `None` for pitched roles.
pub fn template(genre: Genre, role: Role) -> Option<&'static GrooveTemplate> {
    let t = match (role, genre) {
        (Role::Kick, Genre::House) => &HOUSE_4X4,
        (Role::Kick, Genre::Techno) => &TECHNO_DRIVING,
        (Role::Kick, Genre::DrumAndBass) => &DNB_CLASSIC,
        (Role::Kick, Genre::Trap) => &TRAP_MINIMAL,
        (Role::Kick, Genre::Garage) => &HOUSE_GARAGE,
        (Role::Kick, Genre::HipHop) => &HIP_HOP_BOOM_BAP,
        (Role::Kick, Genre::Ambient) => &TECHNO_MINIMAL,
        (Role::Kick, _) => &HOUSE_4X4,

        (Role::Snare, Genre::Techno) => &TECHNO_CLAP,
        (Role::Snare, Genre::DrumAndBass) => &DNB_SNARE,
        (Role::Snare, Genre::Trap) => &TRAP_SNARE,
        (Role::Snare, Genre::Garage) => &GARAGE_SNARE,
        (Role::Snare, _) => &BACKBEAT,

        (Role::Hat, Genre::House) => &HOUSE_HATS,
        (Role::Hat, Genre::Techno) => &TECHNO_MINIMAL_HATS,
        (Role::Hat, Genre::DrumAndBass) => &DNB_RIDE,
        (Role::Hat, Genre::Trap) => &TRAP_HATS,
        (Role::Hat, Genre::Garage) => &GARAGE_SKIP,
        (Role::Hat, _) => &STRAIGHT_16THS,

        (Role::Percussion, Genre::Techno) => &PERC_OFFBEAT,
        (Role::Percussion, _) => &PERC_TRESILLO,

        (Role::Bass | Role::Chord | Role::Melody, _) => return None,
    };
    Some(t)
}

// ---------------------------------------------------------------------------
// Blending and rendering
// ---------------------------------------------------------------------------

/// Steps that fall on a quarter-note boundary.
pub fn is_anchor(step: usize, steps_per_bar: usize) -> bool {
    let ticks = TICKS_PER_BAR as usize / steps_per_bar.max(1);
    (step * ticks) % TICKS_PER_BEAT as usize == 0
}

/// Mix `generated` into the groove. Anchor steps keep the template; other
/// steps take the generated value with probability `share`.
pub fn blend(groove: &Groove, generated: &OnsetVector, share: f64, rng: &mut impl Rng) -> OnsetVector {
    let steps = groove.len();
    let template = groove.onsets();
    let share = share.clamp(0.0, 1.0);
    OnsetVector::new(
        (0..steps)
            .map(|i| {
                if is_anchor(i, steps) {
                    template.get(i)
                } else if rng.random_bool(share) {
                    generated.get(i)
                } else {
                    template.get(i)
                }
            })
            .collect(),
    )
}

fn voice_pitch(role: Role) -> u8 {
    match role {
        Role::Kick => KICK_PITCH,
        Role::Snare => SNARE_PITCH,
        Role::Hat => CLOSED_HAT_PITCH,
        _ => SIDE_STICK_PITCH,
    }
}

fn voice_length(role: Role, step_ticks: u32) -> u32 {
    match role {
        Role::Kick => TICKS_PER_BEAT,
        Role::Snare => step_ticks * 3,
        _ => step_ticks,
    }
}

/// Render `bars` bars of `pattern` for a drum voice. Steps the template
/// leaves silent but the pattern hits play at the ghost velocity.
pub fn render_drums(
    role: Role,
    groove: &Groove,
    pattern: &OnsetVector,
    bars: u32,
    params: &BlendParams,
    rng: &mut impl Rng,
) -> Vec<NoteEvent> {
    let steps = pattern.len();
    if steps == 0 {
        return Vec::new();
    }
    let step_ticks = TICKS_PER_BAR / steps as u32;
    let pitch = voice_pitch(role);
    let length = voice_length(role, step_ticks);
    let velocity_at = |i: usize| match groove.velocities.get(i).copied().unwrap_or(0) {
        0 => params.ghost_velocity as i32,
        v => v as i32,
    };
    let every = params.variation_every.max(1);
    let fill_from = steps.saturating_sub(4);
    let half = (steps / 2).max(1);

    let mut notes = Vec::new();
    for bar in 0..bars {
        let start = bar * TICKS_PER_BAR;
        let variation = bar % every == every - 1;
        for i in 0..steps {
            let position = start + i as u32 * step_ticks;
            if role == Role::Snare && variation && i >= fill_from {
                let rank = (i - fill_from) as i32;
                notes.push(NoteEvent::new(
                    SNARE_PITCH as i32,
                    position,
                    step_ticks,
                    80 + rank * 10,
                ));
                continue;
            }
            if !pattern.get(i) {
                continue;
            }
            let mut note = NoteEvent::new(pitch as i32, position, length, velocity_at(i));
            if role == Role::Hat {
                let open = variation
                    && i % half == half - 1
                    && rng.random_bool(params.open_hat_probability.clamp(0.0, 1.0));
                let jitter = rng.random_range(-5..=5);
                note = NoteEvent::new(
                    (if open { OPEN_HAT_PITCH } else { CLOSED_HAT_PITCH }) as i32,
                    position,
                    if open { step_ticks * 2 } else { step_ticks },
                    note.velocity as i32 + jitter,
                );
            }
            notes.push(note);
        }
    }
    notes
}
