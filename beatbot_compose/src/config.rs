// Data-driven engine configuration.
//
// Every tunable number the generators read lives in `EngineConfig`: genetic
// search sizes and fitness weights, uniqueness retry bounds, humanization
// amounts per part family, melodic motion probabilities and the
// template/algorithm blend used for percussive parts. Algorithms never
// carry magic numbers of their own; they take the relevant parameter group.
//
// `EngineConfig::default()` reproduces the engine's stock behaviour.
// `EngineConfig::from_json()` accepts partial JSON: every struct is
// `#[serde(default)]`, so `{"melody": {"rest_probability": 0.3}}` overrides
// one value and keeps the rest.
//
// See also: `genetic.rs` (reads `GeneticParams` and `FitnessWeights`),
// `melody.rs` (`MelodyParams`), `compose.rs` (owns the config for a
// `Composer` and hands parameter groups to each generator).

use crate::error::Result;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Genetic search
// ---------------------------------------------------------------------------

/// Population and variation settings for the genetic rhythm evolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticParams {
    /// Individuals per generation.
    pub population_size: usize,
    /// Pattern length used when `evolve()` has to seed an empty population.
    pub default_steps: usize,
    /// Lower/upper bound of the random onset density of seeded individuals.
    pub min_seed_density: f64,
    pub max_seed_density: f64,
    /// Per-gene mutation probability carried by seeded individuals.
    pub mutation_rate: f64,
    /// Cut points used by crossover.
    pub crossover_points: usize,
    /// Generations without improvement after which `run()` stops.
    pub stall_limit: usize,
    /// Generation count range used when the genetic algorithm is picked at
    /// random for a percussive part.
    pub min_generations: usize,
    pub max_generations: usize,
}

impl Default for GeneticParams {
    fn default() -> Self {
        GeneticParams {
            population_size: 20,
            default_steps: 16,
            min_seed_density: 0.1,
            max_seed_density: 0.8,
            mutation_rate: 0.3,
            crossover_points: 2,
            stall_limit: 6,
            min_generations: 5,
            max_generations: 20,
        }
    }
}

/// Weights of the four fitness terms.
///
/// These are empirical tuning values with no derivation behind them; they
/// are kept together so they can be re-tuned without touching the scoring
/// code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Weight of `1 / (1 + stddev(onset spacings))`.
    pub consistency: f64,
    /// Weight of `1 - |density - ideal_density|`.
    pub density: f64,
    /// Density the density term rewards most.
    pub ideal_density: f64,
    /// Weight of the off-beat onset fraction.
    pub syncopation: f64,
    /// Subtracted once per repeating period in `repetition_periods`.
    pub repetition_penalty: f64,
    /// Sub-pattern lengths checked for excessive repetition.
    pub repetition_periods: Vec<usize>,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        FitnessWeights {
            consistency: 2.0,
            density: 1.0,
            ideal_density: 0.4,
            syncopation: 2.0,
            repetition_penalty: 1.0,
            repetition_periods: vec![2, 4],
        }
    }
}

// ---------------------------------------------------------------------------
// Uniqueness
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniquenessParams {
    /// Transform-and-recheck attempts before a duplicate is accepted.
    pub max_attempts: usize,
    /// Fingerprints remembered by the process-wide cache. `Composer::new()`
    /// applies it; a composer built with `with_cache()` leaves its cache
    /// alone.
    pub capacity: usize,
}

impl Default for UniquenessParams {
    fn default() -> Self {
        UniquenessParams {
            max_attempts: 10,
            capacity: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// Humanization
// ---------------------------------------------------------------------------

/// Timing/velocity variation for one family of parts.
///
/// `timing` is a fraction of the 48-tick bar (0.05 => 2 ticks of jitter),
/// `velocity` a fraction of the full 0..127 velocity range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanizeAmount {
    pub timing: f64,
    pub velocity: f64,
}

impl Default for HumanizeAmount {
    fn default() -> Self {
        HumanizeAmount {
            timing: 0.05,
            velocity: 0.15,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanizeParams {
    pub drums: HumanizeAmount,
    pub bass: HumanizeAmount,
    pub chords: HumanizeAmount,
    pub melody: HumanizeAmount,
    /// Swing applied to bass parts in swung genres (house, garage, jazz).
    pub bass_swing: f64,
}

impl Default for HumanizeParams {
    fn default() -> Self {
        HumanizeParams {
            drums: HumanizeAmount {
                timing: 0.05,
                velocity: 0.15,
            },
            bass: HumanizeAmount {
                timing: 0.03,
                velocity: 0.1,
            },
            chords: HumanizeAmount {
                timing: 0.03,
                velocity: 0.08,
            },
            melody: HumanizeAmount {
                timing: 0.08,
                velocity: 0.2,
            },
            bass_swing: 0.15,
        }
    }
}

// ---------------------------------------------------------------------------
// Melody
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyParams {
    /// Probability that a slot is left silent.
    pub rest_probability: f64,
    /// Probability that a strong-beat slot takes a chord tone.
    pub chord_tone_probability: f64,
    /// Probability that a weak-beat slot moves by at most one degree.
    pub step_probability: f64,
    /// Of the remaining weak-beat slots, probability of a move of at most
    /// two degrees instead of a leap.
    pub skip_probability: f64,
    /// Lowest and highest pitch the line may use.
    pub low_pitch: u8,
    pub high_pitch: u8,
    /// Velocity centre and spread on strong and weak beats.
    pub strong_velocity: u8,
    pub weak_velocity: u8,
    /// Velocity given to the closing tonic (raised to the loudest note if
    /// that is higher).
    pub cadence_velocity: u8,
}

impl Default for MelodyParams {
    fn default() -> Self {
        MelodyParams {
            rest_probability: 0.15,
            chord_tone_probability: 0.7,
            step_probability: 0.6,
            skip_probability: 0.85,
            low_pitch: 60,
            high_pitch: 84,
            strong_velocity: 80,
            weak_velocity: 60,
            cadence_velocity: 90,
        }
    }
}

// ---------------------------------------------------------------------------
// Percussive blending
// ---------------------------------------------------------------------------

/// How algorithmic onsets are folded into a genre's groove template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendParams {
    /// Probability that a non-anchor step follows the generated pattern
    /// instead of the template.
    pub algorithm_share: f64,
    /// Velocity of onsets the template doesn't supply.
    pub ghost_velocity: u8,
    /// Every n-th bar gets a fill variation (snare roll, open hats).
    pub variation_every: u32,
    /// Chance that an eligible closed hat opens in a variation bar.
    pub open_hat_probability: f64,
}

impl Default for BlendParams {
    fn default() -> Self {
        BlendParams {
            algorithm_share: 0.35,
            ghost_velocity: 70,
            variation_every: 4,
            open_hat_probability: 0.3,
        }
    }
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// All tunables of the engine, grouped by consumer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub genetic: GeneticParams,
    pub fitness: FitnessWeights,
    pub uniqueness: UniquenessParams,
    pub humanize: HumanizeParams,
    pub melody: MelodyParams,
    pub blend: BlendParams,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration. Missing fields keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<EngineConfig> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
