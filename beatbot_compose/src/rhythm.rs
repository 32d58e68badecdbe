// Rhythm algorithm library.
//
// Turns a step count plus algorithm parameters into an `OnsetVector`. The
// algorithm set is closed: `RhythmAlgorithm` has one variant per generator,
// each carrying its own parameter struct, and `generate()` dispatches with
// a single match. Generators:
//
// - Euclidean (Bjorklund): pulses spread as evenly as possible, rotated.
// - Logistic map: `x = r x (1 - x)` in the chaotic regime, hit when x > 0.5.
//   `LogisticChaos` keeps `x` between calls for a continuing stream.
// - Lorenz attractor: Euler-integrated, 10x oversampled, |z| against its
//   mean.
// - Cellular automaton: elementary rule on a ring of cells.
// - Markov chain: order-2 binary transition table.
// - Fractal: self-similar doubling (mirror with gap / invert / reverse).
// - Wave interference: two sines against a moving threshold.
// - Golden ratio: hits placed by stepping phi * steps / 2 around the bar.
// - Probability field: shaped random 2-D field sampled along one row.
// - Fibonacci: hits on Fibonacci-numbered steps, rotated.
// - Genetic: runs the evolver in `genetic.rs` and takes the best rhythm.
//
// All randomness comes from the caller's RNG, so identical parameters and
// RNG state give identical output. Out-of-range parameters are rejected
// with `ComposeError`, never clamped silently (Euclidean pulses above the
// step count are the one documented clamp).
//
// `AlgorithmKind::random_excluding()` and `RhythmAlgorithm::random()` pick
// an algorithm and musically useful parameters for the orchestrator;
// `complement()` derives a companion part (interlocking, call-and-response,
// polyrhythmic, phasing, contrasting) from an existing pattern.

use crate::config::{EngineConfig, FitnessWeights, GeneticParams};
use crate::error::{ComposeError, Result, check_range};
use crate::genetic::GeneticRhythm;
use crate::onset::OnsetVector;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Golden ratio.
const PHI: f64 = 1.618_033_988_749_895;

// Lorenz system constants and integration step.
const LORENZ_SIGMA: f64 = 10.0;
const LORENZ_RHO: f64 = 28.0;
const LORENZ_BETA: f64 = 8.0 / 3.0;
const LORENZ_DT: f64 = 0.01;
const LORENZ_OVERSAMPLE: usize = 10;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EuclideanParams {
    pub pulses: u32,
    pub rotation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Growth rate, 3.57..=4.0 (chaotic regime).
    pub r: f64,
    /// Starting value, strictly between 0 and 1.
    pub x0: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LorenzParams {
    /// Initial state is `(x0, 2 x0, 3 x0)`.
    pub x0: f64,
}

/// Elementary automaton rules that stay lively on small rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaRule {
    Rule30,
    Rule90,
    Rule110,
    Rule150,
}

impl CaRule {
    pub const ALL: [CaRule; 4] = [CaRule::Rule30, CaRule::Rule90, CaRule::Rule110, CaRule::Rule150];

    pub fn number(self) -> u8 {
        match self {
            CaRule::Rule30 => 30,
            CaRule::Rule90 => 90,
            CaRule::Rule110 => 110,
            CaRule::Rule150 => 150,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellularParams {
    pub rule: CaRule,
    /// Rule applications, 1..=16.
    pub generations: u32,
}

/// Probability of a hit given the previous two steps, indexed by
/// `prev2 * 2 + prev1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkovParams {
    pub p_hit: [f64; 4],
}

impl Default for MarkovParams {
    fn default() -> Self {
        // after 00, 01, 10, 11
        MarkovParams {
            p_hit: [0.3, 0.6, 0.7, 0.2],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    pub freq1: f64,
    pub freq2: f64,
    pub phase: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoldenRatioParams {
    /// Placements as a fraction of the step count, 0..=1.
    pub fill: f64,
}

/// Shaping applied to the random probability field before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldShape {
    Sine,
    Exponential,
    PerlinLike,
    Spiral,
}

impl FieldShape {
    pub const ALL: [FieldShape; 4] = [
        FieldShape::Sine,
        FieldShape::Exponential,
        FieldShape::PerlinLike,
        FieldShape::Spiral,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityFieldParams {
    pub rows: usize,
    /// Row to sample (taken mod `rows`).
    pub row: usize,
    /// Cells above this probability become hits, 0..=1.
    pub threshold: f64,
    pub shape: FieldShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciParams {
    pub rotation: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticRunParams {
    pub generations: usize,
    pub search: GeneticParams,
    pub weights: FitnessWeights,
}

// ---------------------------------------------------------------------------
// Algorithm enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RhythmAlgorithm {
    Euclidean(EuclideanParams),
    Logistic(LogisticParams),
    Lorenz(LorenzParams),
    Cellular(CellularParams),
    Markov(MarkovParams),
    Fractal,
    Wave(WaveParams),
    GoldenRatio(GoldenRatioParams),
    ProbabilityField(ProbabilityFieldParams),
    Fibonacci(FibonacciParams),
    Genetic(GeneticRunParams),
}

/// Parameterless tag for each `RhythmAlgorithm` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    Euclidean,
    Logistic,
    Lorenz,
    Cellular,
    Markov,
    Fractal,
    Wave,
    GoldenRatio,
    ProbabilityField,
    Fibonacci,
    Genetic,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 11] = [
        AlgorithmKind::Euclidean,
        AlgorithmKind::Logistic,
        AlgorithmKind::Lorenz,
        AlgorithmKind::Cellular,
        AlgorithmKind::Markov,
        AlgorithmKind::Fractal,
        AlgorithmKind::Wave,
        AlgorithmKind::GoldenRatio,
        AlgorithmKind::ProbabilityField,
        AlgorithmKind::Fibonacci,
        AlgorithmKind::Genetic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::Euclidean => "euclidean",
            AlgorithmKind::Logistic => "logistic",
            AlgorithmKind::Lorenz => "lorenz",
            AlgorithmKind::Cellular => "cellular",
            AlgorithmKind::Markov => "markov",
            AlgorithmKind::Fractal => "fractal",
            AlgorithmKind::Wave => "wave",
            AlgorithmKind::GoldenRatio => "golden_ratio",
            AlgorithmKind::ProbabilityField => "probability_field",
            AlgorithmKind::Fibonacci => "fibonacci",
            AlgorithmKind::Genetic => "genetic",
        }
    }

    /// Uniform choice among all kinds other than `last`.
    pub fn random_excluding(last: Option<AlgorithmKind>, rng: &mut impl Rng) -> AlgorithmKind {
        let candidates: Vec<AlgorithmKind> = AlgorithmKind::ALL
            .iter()
            .copied()
            .filter(|&k| Some(k) != last)
            .collect();
        candidates[rng.random_range(0..candidates.len())]
    }
}

impl RhythmAlgorithm {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            RhythmAlgorithm::Euclidean(_) => AlgorithmKind::Euclidean,
            RhythmAlgorithm::Logistic(_) => AlgorithmKind::Logistic,
            RhythmAlgorithm::Lorenz(_) => AlgorithmKind::Lorenz,
            RhythmAlgorithm::Cellular(_) => AlgorithmKind::Cellular,
            RhythmAlgorithm::Markov(_) => AlgorithmKind::Markov,
            RhythmAlgorithm::Fractal => AlgorithmKind::Fractal,
            RhythmAlgorithm::Wave(_) => AlgorithmKind::Wave,
            RhythmAlgorithm::GoldenRatio(_) => AlgorithmKind::GoldenRatio,
            RhythmAlgorithm::ProbabilityField(_) => AlgorithmKind::ProbabilityField,
            RhythmAlgorithm::Fibonacci(_) => AlgorithmKind::Fibonacci,
            RhythmAlgorithm::Genetic(_) => AlgorithmKind::Genetic,
        }
    }

    /// Pick musically useful parameters for `kind` at `steps` resolution.
    pub fn random(kind: AlgorithmKind, steps: usize, config: &EngineConfig, rng: &mut impl Rng) -> Self {
        let steps = steps.max(1);
        match kind {
            AlgorithmKind::Euclidean => {
                let hi = (steps * 3 / 4).max(1);
                let lo = 3.min(hi);
                RhythmAlgorithm::Euclidean(EuclideanParams {
                    pulses: rng.random_range(lo..=hi) as u32,
                    rotation: rng.random_range(0..steps) as u32,
                })
            }
            AlgorithmKind::Logistic => RhythmAlgorithm::Logistic(LogisticParams {
                r: rng.random_range(3.57..4.0),
                x0: rng.random_range(0.01..0.99),
            }),
            AlgorithmKind::Lorenz => RhythmAlgorithm::Lorenz(LorenzParams {
                x0: rng.random_range(0.01..1.0),
            }),
            AlgorithmKind::Cellular => RhythmAlgorithm::Cellular(CellularParams {
                rule: CaRule::ALL[rng.random_range(0..CaRule::ALL.len())],
                generations: rng.random_range(3..=8),
            }),
            AlgorithmKind::Markov => RhythmAlgorithm::Markov(MarkovParams::default()),
            AlgorithmKind::Fractal => RhythmAlgorithm::Fractal,
            AlgorithmKind::Wave => RhythmAlgorithm::Wave(WaveParams {
                freq1: rng.random_range(0.5..3.0),
                freq2: rng.random_range(0.3..2.0),
                phase: rng.random_range(0.0..TAU),
            }),
            AlgorithmKind::GoldenRatio => {
                RhythmAlgorithm::GoldenRatio(GoldenRatioParams { fill: 0.4 })
            }
            AlgorithmKind::ProbabilityField => {
                RhythmAlgorithm::ProbabilityField(ProbabilityFieldParams {
                    rows: 4,
                    row: rng.random_range(0..4),
                    threshold: rng.random_range(0.3..0.7),
                    shape: FieldShape::ALL[rng.random_range(0..FieldShape::ALL.len())],
                })
            }
            AlgorithmKind::Fibonacci => RhythmAlgorithm::Fibonacci(FibonacciParams {
                rotation: rng.random_range(0..steps) as u32,
            }),
            AlgorithmKind::Genetic => {
                let lo = config.genetic.min_generations.max(1);
                let hi = config.genetic.max_generations.max(lo);
                RhythmAlgorithm::Genetic(GeneticRunParams {
                    generations: rng.random_range(lo..=hi),
                    search: config.genetic.clone(),
                    weights: config.fitness.clone(),
                })
            }
        }
    }

    /// Produce a `steps`-long onset vector.
    pub fn generate(&self, steps: usize, rng: &mut impl Rng) -> Result<OnsetVector> {
        if steps == 0 {
            return Err(ComposeError::ZeroSteps);
        }
        match self {
            RhythmAlgorithm::Euclidean(p) => euclidean(p.pulses as usize, steps, p.rotation as usize),
            RhythmAlgorithm::Logistic(p) => LogisticChaos::new(p.x0)?.next_pattern(p.r, steps),
            RhythmAlgorithm::Lorenz(p) => lorenz(p, steps),
            RhythmAlgorithm::Cellular(p) => cellular(p, steps, rng),
            RhythmAlgorithm::Markov(p) => markov(p, steps, rng),
            RhythmAlgorithm::Fractal => Ok(fractal(steps, rng)),
            RhythmAlgorithm::Wave(p) => wave(p, steps),
            RhythmAlgorithm::GoldenRatio(p) => golden_ratio(p, steps),
            RhythmAlgorithm::ProbabilityField(p) => probability_field(p, steps, rng),
            RhythmAlgorithm::Fibonacci(p) => Ok(fibonacci(steps, p.rotation as usize)),
            RhythmAlgorithm::Genetic(p) => {
                let mut ga = GeneticRhythm::new(p.search.clone(), p.weights.clone());
                ga.initialize_population(steps, rng)?;
                Ok(ga.run(p.generations, rng).pattern())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Euclidean
// ---------------------------------------------------------------------------

/// Spread `pulses` hits over `steps` and rotate left by `rotation`.
///
/// `pulses > steps` is clamped to `steps`. Before rotation the pattern
/// always starts with a hit (unless it is empty).
pub fn euclidean(pulses: usize, steps: usize, rotation: usize) -> Result<OnsetVector> {
    if steps == 0 {
        return Err(ComposeError::ZeroSteps);
    }
    let pulses = pulses.min(steps);
    if pulses == 0 {
        return Ok(OnsetVector::zeros(steps));
    }
    Ok(OnsetVector::new(bjorklund(pulses, steps)).rotate_left(rotation))
}

/// Bjorklund's algorithm as group merging: start with `pulses` groups
/// `[1]` and `steps - pulses` groups `[0]`, repeatedly append one remainder
/// group to each leading group until at most one remainder is left.
fn bjorklund(pulses: usize, steps: usize) -> Vec<bool> {
    let mut front: Vec<Vec<bool>> = vec![vec![true]; pulses];
    let mut back: Vec<Vec<bool>> = vec![vec![false]; steps - pulses];
    while back.len() > 1 {
        let n = front.len().min(back.len());
        let rest = if front.len() > n {
            front.split_off(n)
        } else {
            back.split_off(n)
        };
        for (group, tail) in front.iter_mut().zip(back) {
            group.extend(tail);
        }
        back = rest;
    }
    front.into_iter().chain(back).flatten().collect()
}

// ---------------------------------------------------------------------------
// Chaos
// ---------------------------------------------------------------------------

/// Logistic-map generator whose state carries over between patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticChaos {
    x: f64,
}

impl LogisticChaos {
    pub fn new(x0: f64) -> Result<Self> {
        if !(x0 > 0.0 && x0 < 1.0) {
            return Err(ComposeError::OutOfRange {
                name: "x0",
                value: x0,
                expected: "(0, 1)",
            });
        }
        Ok(LogisticChaos { x: x0 })
    }

    pub fn state(&self) -> f64 {
        self.x
    }

    pub fn next_pattern(&mut self, r: f64, steps: usize) -> Result<OnsetVector> {
        if steps == 0 {
            return Err(ComposeError::ZeroSteps);
        }
        check_range("r", r, 3.57, 4.0, "[3.57, 4.0]")?;
        let mut out = Vec::with_capacity(steps);
        for _ in 0..steps {
            self.x = r * self.x * (1.0 - self.x);
            out.push(self.x > 0.5);
        }
        Ok(OnsetVector::new(out))
    }
}

fn lorenz(p: &LorenzParams, steps: usize) -> Result<OnsetVector> {
    check_range("x0", p.x0, -50.0, 50.0, "[-50, 50]")?;
    let (mut x, mut y, mut z) = (p.x0, p.x0 * 2.0, p.x0 * 3.0);
    let samples = steps * LORENZ_OVERSAMPLE;
    let mut zs = Vec::with_capacity(samples);
    for _ in 0..samples {
        let dx = LORENZ_SIGMA * (y - x) * LORENZ_DT;
        let dy = (x * (LORENZ_RHO - z) - y) * LORENZ_DT;
        let dz = (x * y - LORENZ_BETA * z) * LORENZ_DT;
        x += dx;
        y += dy;
        z += dz;
        zs.push(z);
    }
    let threshold = zs.iter().map(|v| v.abs()).sum::<f64>() / zs.len() as f64;
    Ok(OnsetVector::new(
        (0..steps)
            .map(|i| zs[i * LORENZ_OVERSAMPLE].abs() > threshold)
            .collect(),
    ))
}

// ---------------------------------------------------------------------------
// Cellular automaton / Markov / fractal
// ---------------------------------------------------------------------------

fn cellular(p: &CellularParams, steps: usize, rng: &mut impl Rng) -> Result<OnsetVector> {
    check_range("generations", p.generations as f64, 1.0, 16.0, "1..=16")?;
    let rule = p.rule.number();
    let mut cells: Vec<bool> = (0..steps).map(|_| rng.random_bool(0.5)).collect();
    for _ in 0..p.generations {
        cells = (0..steps)
            .map(|i| {
                let left = cells[(i + steps - 1) % steps] as u8;
                let center = cells[i] as u8;
                let right = cells[(i + 1) % steps] as u8;
                (rule >> (left << 2 | center << 1 | right)) & 1 == 1
            })
            .collect();
    }
    Ok(OnsetVector::new(cells))
}

fn markov(p: &MarkovParams, steps: usize, rng: &mut impl Rng) -> Result<OnsetVector> {
    for &prob in &p.p_hit {
        check_range("p_hit", prob, 0.0, 1.0, "[0, 1]")?;
    }
    let mut out = vec![rng.random_bool(0.5), rng.random_bool(0.5)];
    while out.len() < steps {
        let n = out.len();
        let state = (out[n - 2] as usize) << 1 | out[n - 1] as usize;
        out.push(rng.random_bool(p.p_hit[state]));
    }
    out.truncate(steps);
    Ok(OnsetVector::new(out))
}

fn fractal(steps: usize, rng: &mut impl Rng) -> OnsetVector {
    let mut pattern = vec![true];
    while pattern.len() < steps {
        let mut next = pattern.clone();
        match rng.random_range(0..3) {
            0 => {
                next.push(false);
                next.extend_from_slice(&pattern);
            }
            1 => next.extend(pattern.iter().map(|&b| !b)),
            _ => next.extend(pattern.iter().rev()),
        }
        pattern = next;
    }
    pattern.truncate(steps);
    OnsetVector::new(pattern)
}

// ---------------------------------------------------------------------------
// Wave / golden ratio / probability field / Fibonacci
// ---------------------------------------------------------------------------

fn wave(p: &WaveParams, steps: usize) -> Result<OnsetVector> {
    check_range("freq1", p.freq1, 0.0, 16.0, "[0, 16]")?;
    check_range("freq2", p.freq2, 0.0, 16.0, "[0, 16]")?;
    check_range("phase", p.phase, 0.0, TAU, "[0, 2π]")?;
    Ok(OnsetVector::new(
        (0..steps)
            .map(|i| {
                let t = i as f64;
                let w1 = (t * p.freq1 * PI / 8.0).sin();
                let w2 = (t * p.freq2 * PI / 8.0 + p.phase).sin();
                let threshold = (t * 0.5).sin() * 0.3;
                (w1 + w2) / 2.0 > threshold
            })
            .collect(),
    ))
}

fn golden_ratio(p: &GoldenRatioParams, steps: usize) -> Result<OnsetVector> {
    check_range("fill", p.fill, 0.0, 1.0, "[0, 1]")?;
    let mut out = vec![false; steps];
    let stride = PHI * steps as f64 / 2.0;
    let mut pos = 0.0;
    for _ in 0..(steps as f64 * p.fill) as usize {
        pos = (pos + stride) % steps as f64;
        out[(pos as usize).min(steps - 1)] = true;
    }
    Ok(OnsetVector::new(out))
}

fn probability_field(
    p: &ProbabilityFieldParams,
    steps: usize,
    rng: &mut impl Rng,
) -> Result<OnsetVector> {
    if p.rows == 0 {
        return Err(ComposeError::OutOfRange {
            name: "rows",
            value: 0.0,
            expected: ">= 1",
        });
    }
    check_range("threshold", p.threshold, 0.0, 1.0, "[0, 1]")?;

    let rows = p.rows;
    let mut field: Vec<Vec<f64>> = (0..rows)
        .map(|_| (0..steps).map(|_| rng.random::<f64>()).collect())
        .collect();
    let (cy, cx) = ((rows / 2) as f64, (steps / 2) as f64);
    for (i, row) in field.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let (fi, fj) = (i as f64, j as f64);
            let shaped = match p.shape {
                FieldShape::Sine => ((fj * PI / 8.0).sin() + 1.0) / 2.0 * *cell,
                FieldShape::Exponential => *cell * (-fj / steps as f64 * 3.0).exp(),
                FieldShape::PerlinLike => {
                    let noise = (fi * 4.0).sin() * (fj * 2.0).cos();
                    (*cell + noise) / 2.0
                }
                FieldShape::Spiral => {
                    let (dy, dx) = (fi - cy, fj - cx);
                    let dist = (dy * dy + dx * dx).sqrt();
                    let angle = dy.atan2(dx);
                    *cell * ((dist / 2.0 + angle * 2.0).sin() + 1.0) / 2.0
                }
            };
            *cell = shaped.clamp(0.0, 1.0);
        }
    }
    let row = &field[p.row % rows];
    Ok(OnsetVector::new(row.iter().map(|&v| v > p.threshold).collect()))
}

/// Hits on the Fibonacci-numbered steps below `steps`, rotated left.
pub fn fibonacci(steps: usize, rotation: usize) -> OnsetVector {
    let mut out = vec![false; steps];
    let (mut a, mut b) = (1usize, 1usize);
    while a < steps {
        out[a] = true;
        (a, b) = (b, a + b);
    }
    OnsetVector::new(out).rotate_left(rotation)
}

// ---------------------------------------------------------------------------
// Complementary patterns
// ---------------------------------------------------------------------------

/// How a companion pattern relates to its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// Hits only where the base rests (half of those gaps).
    Interlocking,
    /// Answers the step after each base hit, 60% of the time.
    CallResponse,
    /// A 3, 5 or 7 step cycle against the bar.
    Polyrhythmic,
    /// The base shifted by a random offset.
    Phasing,
    /// Random pattern at the inverse density of the base.
    Contrasting,
}

pub fn complement(base: &OnsetVector, relationship: Relationship, rng: &mut impl Rng) -> OnsetVector {
    let n = base.len();
    match relationship {
        Relationship::Interlocking => {
            OnsetVector::new(base.iter().map(|b| !b && rng.random_bool(0.5)).collect())
        }
        Relationship::CallResponse => OnsetVector::new(
            (0..n)
                .map(|i| i > 0 && base.get(i - 1) && rng.random_bool(0.6))
                .collect(),
        ),
        Relationship::Polyrhythmic => {
            let cycle = [3, 5, 7][rng.random_range(0..3)];
            OnsetVector::new((0..n).map(|i| i % cycle == 0).collect())
        }
        Relationship::Phasing => {
            if n < 2 {
                return base.clone();
            }
            base.rotate_left(rng.random_range(1..n))
        }
        Relationship::Contrasting => {
            let target = 1.0 - base.density();
            OnsetVector::new((0..n).map(|_| rng.random_bool(target)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatbot_prng::PatternRng;

    #[test]
    fn test_euclidean_four_on_sixteen() {
        let p = euclidean(4, 16, 0).unwrap();
        assert_eq!(p.positions(), vec![0, 4, 8, 12]);
    }

    #[test]
    fn test_euclidean_known_patterns() {
        assert_eq!(euclidean(3, 8, 0).unwrap().to_string(), "x..x..x.");
        assert_eq!(euclidean(5, 8, 0).unwrap().to_string(), "x.xx.xx.");
        assert_eq!(euclidean(1, 4, 0).unwrap().to_string(), "x...");
    }

    #[test]
    fn test_euclidean_onset_count_invariant() {
        for steps in 1..=32 {
            for pulses in 0..=steps {
                let p = euclidean(pulses, steps, 0).unwrap();
                assert_eq!(p.len(), steps);
                assert_eq!(p.onset_count(), pulses, "E({pulses},{steps})");
                if pulses > 0 {
                    assert!(p.get(0), "E({pulses},{steps}) should start with a hit");
                }
            }
        }
    }

    #[test]
    fn test_euclidean_clamps_and_rotates() {
        assert_eq!(euclidean(20, 16, 0).unwrap().onset_count(), 16);
        assert_eq!(euclidean(0, 16, 5).unwrap().onset_count(), 0);
        let base = euclidean(5, 16, 0).unwrap();
        assert_eq!(euclidean(5, 16, 16).unwrap(), base);
        assert_eq!(euclidean(5, 16, 3).unwrap(), base.rotate_left(3));
        assert!(matches!(euclidean(3, 0, 0), Err(ComposeError::ZeroSteps)));
    }

    #[test]
    fn test_logistic_state_persists() {
        let mut a = LogisticChaos::new(0.3).unwrap();
        let first = a.next_pattern(3.9, 16).unwrap();
        let after_first = a.state();
        let second = a.next_pattern(3.9, 16).unwrap();

        let mut b = LogisticChaos::new(0.3).unwrap();
        let joined = b.next_pattern(3.9, 32).unwrap();
        let mut expected = first.as_slice().to_vec();
        expected.extend_from_slice(second.as_slice());
        assert_eq!(joined.as_slice(), expected.as_slice());
        assert_ne!(after_first, 0.3);
    }

    #[test]
    fn test_logistic_rejects_out_of_range() {
        assert!(LogisticChaos::new(0.0).is_err());
        assert!(LogisticChaos::new(1.0).is_err());
        let mut c = LogisticChaos::new(0.5).unwrap();
        assert!(matches!(
            c.next_pattern(2.0, 16),
            Err(ComposeError::OutOfRange { name: "r", .. })
        ));
        assert!(c.next_pattern(4.0, 16).is_ok());
    }

    #[test]
    fn test_lorenz_deterministic() {
        let p = LorenzParams { x0: 0.5 };
        let a = lorenz(&p, 16).unwrap();
        assert_eq!(a, lorenz(&p, 16).unwrap());
        assert_eq!(a.len(), 16);
        assert!(a.onset_count() > 0);
    }

    #[test]
    fn test_cellular_length_and_generation_bounds() {
        let mut rng = PatternRng::new(5);
        let p = CellularParams {
            rule: CaRule::Rule90,
            generations: 3,
        };
        let out = cellular(&p, 16, &mut rng).unwrap();
        assert_eq!(out.len(), 16);
        let bad = CellularParams {
            rule: CaRule::Rule30,
            generations: 0,
        };
        assert!(cellular(&bad, 16, &mut rng).is_err());
    }

    #[test]
    fn test_markov_length_and_extremes() {
        let mut rng = PatternRng::new(9);
        let never = MarkovParams { p_hit: [0.0; 4] };
        let p = markov(&never, 16, &mut rng).unwrap();
        assert_eq!(p.len(), 16);
        assert!(p.positions().iter().all(|&i| i < 2));
        assert_eq!(markov(&never, 1, &mut rng).unwrap().len(), 1);
        let bad = MarkovParams {
            p_hit: [0.1, 1.5, 0.2, 0.2],
        };
        assert!(markov(&bad, 16, &mut rng).is_err());
    }

    #[test]
    fn test_fractal_starts_with_hit() {
        for seed in 0..20 {
            let mut rng = PatternRng::new(seed);
            let p = fractal(16, &mut rng);
            assert_eq!(p.len(), 16);
            assert!(p.get(0));
        }
    }

    #[test]
    fn test_golden_ratio_hit_budget() {
        let p = golden_ratio(&GoldenRatioParams { fill: 0.4 }, 16).unwrap();
        // Six placements, collisions allowed.
        assert!(p.onset_count() >= 1 && p.onset_count() <= 6);
        assert_eq!(
            golden_ratio(&GoldenRatioParams { fill: 0.0 }, 16)
                .unwrap()
                .onset_count(),
            0
        );
    }

    #[test]
    fn test_probability_field_threshold_extremes() {
        let mut rng = PatternRng::new(21);
        for shape in FieldShape::ALL {
            let all = ProbabilityFieldParams {
                rows: 4,
                row: 1,
                threshold: 1.0,
                shape,
            };
            assert_eq!(probability_field(&all, 16, &mut rng).unwrap().onset_count(), 0);
        }
        let bad = ProbabilityFieldParams {
            rows: 0,
            row: 0,
            threshold: 0.5,
            shape: FieldShape::Sine,
        };
        assert!(probability_field(&bad, 16, &mut rng).is_err());
    }

    #[test]
    fn test_fibonacci() {
        assert_eq!(fibonacci(16, 0).positions(), vec![1, 2, 3, 5, 8, 13]);
        assert_eq!(fibonacci(16, 1).positions(), vec![0, 1, 2, 4, 7, 12]);
        assert_eq!(fibonacci(1, 0).onset_count(), 0);
    }

    #[test]
    fn test_every_kind_generates_requested_length() {
        let config = EngineConfig::default();
        for steps in [4, 8, 12, 16, 32] {
            for kind in AlgorithmKind::ALL {
                let mut rng = PatternRng::new(steps as u64 * 100 + kind as u64);
                let algo = RhythmAlgorithm::random(kind, steps, &config, &mut rng);
                assert_eq!(algo.kind(), kind);
                let p = algo.generate(steps, &mut rng).unwrap();
                assert_eq!(p.len(), steps, "{} at {steps}", kind.name());
            }
        }
    }

    #[test]
    fn test_generate_is_reproducible() {
        let config = EngineConfig::default();
        for kind in AlgorithmKind::ALL {
            let run = || {
                let mut rng = PatternRng::new(77);
                let algo = RhythmAlgorithm::random(kind, 16, &config, &mut rng);
                algo.generate(16, &mut rng).unwrap()
            };
            assert_eq!(run(), run(), "{}", kind.name());
        }
    }

    #[test]
    fn test_zero_steps_rejected_for_all() {
        let config = EngineConfig::default();
        let mut rng = PatternRng::new(1);
        for kind in AlgorithmKind::ALL {
            let algo = RhythmAlgorithm::random(kind, 16, &config, &mut rng);
            assert!(matches!(
                algo.generate(0, &mut rng),
                Err(ComposeError::ZeroSteps)
            ));
        }
    }

    #[test]
    fn test_random_excluding_never_repeats() {
        let mut rng = PatternRng::new(4);
        let mut last = None;
        for _ in 0..200 {
            let k = AlgorithmKind::random_excluding(last, &mut rng);
            assert_ne!(Some(k), last);
            last = Some(k);
        }
    }

    #[test]
    fn test_complement_relationships() {
        let mut rng = PatternRng::new(8);
        let base = euclidean(4, 16, 0).unwrap();

        let inter = complement(&base, Relationship::Interlocking, &mut rng);
        assert!(inter.positions().iter().all(|&i| !base.get(i)));

        let answer = complement(&base, Relationship::CallResponse, &mut rng);
        assert!(answer.positions().iter().all(|&i| i > 0 && base.get(i - 1)));

        let poly = complement(&base, Relationship::Polyrhythmic, &mut rng);
        assert!(poly.get(0));
        assert!([6, 4, 3].contains(&poly.onset_count()));

        let phased = complement(&base, Relationship::Phasing, &mut rng);
        assert_eq!(phased.onset_count(), 4);

        let contrast = complement(&base, Relationship::Contrasting, &mut rng);
        assert_eq!(contrast.len(), 16);
    }
}
