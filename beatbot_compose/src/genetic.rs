// Genetic rhythm evolver.
//
// Searches over whole-bar rhythms with a small generational GA. Each
// individual (`PatternDna`) carries one gene per step for onset, velocity
// scale and micro-timing. A generation is:
//
//   rank by fitness (descending, stable so equal scores keep population
//   order) -> keep the top half -> refill with multi-point crossover of two
//   random survivors -> per-gene mutation.
//
// Fitness rewards even onset spacing, density near an ideal target and
// off-beat onsets, and penalises patterns whose short leading sub-pattern
// simply repeats. The weights come from `FitnessWeights` in `config.rs`.
//
// Lifecycle is explicit in `EvolverPhase`: `Uninitialized` until a
// population exists, `Seeded` after `initialize_population()`, `Evolving`
// while generations run, and `Converged` or `Exhausted` once `run()` stops
// (stalled improvement vs. generation budget spent). `evolve()` never fails:
// it seeds a default-length population itself when called first.
//
// Used by `rhythm.rs` for the `Genetic` algorithm variant.

use crate::config::{FitnessWeights, GeneticParams};
use crate::error::{ComposeError, Result};
use crate::onset::OnsetVector;
use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// One candidate rhythm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDna {
    pub rhythm_genes: Vec<bool>,
    /// Velocity scale per step, 0.0..=1.0.
    pub velocity_genes: Vec<f64>,
    /// Micro-timing offset per step as a fraction of a step.
    pub timing_genes: Vec<f64>,
    pub mutation_rate: f64,
    pub crossover_points: usize,
}

impl PatternDna {
    pub fn len(&self) -> usize {
        self.rhythm_genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhythm_genes.is_empty()
    }

    pub fn pattern(&self) -> OnsetVector {
        OnsetVector::new(self.rhythm_genes.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolverPhase {
    Uninitialized,
    Seeded,
    Evolving { generation: usize },
    /// Best fitness stopped improving for `stall_limit` generations.
    Converged { generation: usize },
    /// `run()` used its whole generation budget.
    Exhausted { generation: usize },
}

pub struct GeneticRhythm {
    params: GeneticParams,
    weights: FitnessWeights,
    population: Vec<PatternDna>,
    generation: usize,
    phase: EvolverPhase,
    best_fitness: Option<f64>,
    stalled_for: usize,
}

impl GeneticRhythm {
    pub fn new(params: GeneticParams, weights: FitnessWeights) -> Self {
        GeneticRhythm {
            params,
            weights,
            population: Vec::new(),
            generation: 0,
            phase: EvolverPhase::Uninitialized,
            best_fitness: None,
            stalled_for: 0,
        }
    }

    pub fn phase(&self) -> EvolverPhase {
        self.phase
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &[PatternDna] {
        &self.population
    }

    fn population_size(&self) -> usize {
        self.params.population_size.max(1)
    }

    /// Replace the population with random individuals of `steps` genes.
    pub fn initialize_population(&mut self, steps: usize, rng: &mut impl Rng) -> Result<()> {
        if steps == 0 {
            return Err(ComposeError::ZeroSteps);
        }
        self.seed_population(steps, rng);
        Ok(())
    }

    // `steps` must be nonzero.
    fn seed_population(&mut self, steps: usize, rng: &mut impl Rng) {
        let lo = self.params.min_seed_density.clamp(0.0, 1.0);
        let hi = self.params.max_seed_density.clamp(lo, 1.0);
        let mutation_rate = self.params.mutation_rate.clamp(0.0, 1.0);

        self.population = (0..self.population_size())
            .map(|_| {
                let density = rng.random_range(lo..=hi);
                PatternDna {
                    rhythm_genes: (0..steps).map(|_| rng.random_bool(density)).collect(),
                    velocity_genes: (0..steps).map(|_| rng.random_range(0.5..=1.0)).collect(),
                    timing_genes: (0..steps).map(|_| rng.random_range(-0.1..=0.1)).collect(),
                    mutation_rate,
                    crossover_points: self.params.crossover_points,
                }
            })
            .collect();
        self.generation = 0;
        self.best_fitness = None;
        self.stalled_for = 0;
        self.phase = EvolverPhase::Seeded;
    }

    /// Musicality score, higher is better, never negative.
    pub fn fitness(&self, dna: &PatternDna) -> f64 {
        fitness(&dna.rhythm_genes, &self.weights)
    }

    /// Run one generation and return the best individual of the new
    /// population.
    pub fn evolve(&mut self, rng: &mut impl Rng) -> PatternDna {
        if self.population.is_empty() {
            self.seed_population(self.params.default_steps.max(1), rng);
        }

        let scores: Vec<f64> = self.population.iter().map(|d| self.fitness(d)).collect();
        let mut order: Vec<usize> = (0..self.population.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let keep = (self.population_size() / 2).max(1);
        let survivors: Vec<PatternDna> = order
            .iter()
            .take(keep)
            .map(|&i| self.population[i].clone())
            .collect();

        let mut next = survivors.clone();
        while next.len() < self.population_size() {
            let a = &survivors[rng.random_range(0..survivors.len())];
            let b = &survivors[rng.random_range(0..survivors.len())];
            let child = crossover(a, b, rng);
            next.push(mutate(&child, rng));
        }

        self.population = next;
        self.generation += 1;

        let (best, best_score) = self.best_with_score();
        match self.best_fitness {
            Some(prev) if best_score <= prev => self.stalled_for += 1,
            _ => {
                self.best_fitness = Some(best_score);
                self.stalled_for = 0;
            }
        }
        self.phase = EvolverPhase::Evolving {
            generation: self.generation,
        };
        log::trace!(
            "genetic generation {} best fitness {:.3}",
            self.generation,
            best_score
        );
        best
    }

    /// Evolve for up to `generations` generations, stopping early once the
    /// best score has not improved for `stall_limit` generations.
    pub fn run(&mut self, generations: usize, rng: &mut impl Rng) -> PatternDna {
        let mut best = self.evolve(rng);
        for _ in 1..generations.max(1) {
            if self.stalled_for >= self.params.stall_limit.max(1) {
                break;
            }
            best = self.evolve(rng);
        }
        self.phase = if self.stalled_for >= self.params.stall_limit.max(1) {
            EvolverPhase::Converged {
                generation: self.generation,
            }
        } else {
            EvolverPhase::Exhausted {
                generation: self.generation,
            }
        };
        log::debug!("genetic search stopped: {:?}", self.phase);
        best
    }

    /// Fittest individual of the current population (first one on ties).
    pub fn best(&self) -> Option<PatternDna> {
        if self.population.is_empty() {
            return None;
        }
        Some(self.best_with_score().0)
    }

    fn best_with_score(&self) -> (PatternDna, f64) {
        let mut best_idx = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, dna) in self.population.iter().enumerate() {
            let s = self.fitness(dna);
            if s > best_score {
                best_idx = i;
                best_score = s;
            }
        }
        (self.population[best_idx].clone(), best_score)
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Fitness of a bare rhythm under the given weights.
pub fn fitness(genes: &[bool], weights: &FitnessWeights) -> f64 {
    let len = genes.len();
    if len == 0 {
        return 0.0;
    }
    let mut score = 0.0;

    let hits: Vec<usize> = (0..len).filter(|&i| genes[i]).collect();
    if hits.len() > 1 {
        let spacings: Vec<f64> = hits.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
        let mean = spacings.iter().sum::<f64>() / spacings.len() as f64;
        let variance =
            spacings.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / spacings.len() as f64;
        score += weights.consistency / (1.0 + variance.sqrt());
    }

    let density = hits.len() as f64 / len as f64;
    score += weights.density * (1.0 - (density - weights.ideal_density).abs());

    let offbeat = (1..len).step_by(2).filter(|&i| genes[i]).count();
    score += weights.syncopation * offbeat as f64 / len as f64;

    for &period in &weights.repetition_periods {
        if period == 0 || period >= len {
            continue;
        }
        let occurrences = count_non_overlapping(genes, &genes[..period]);
        if occurrences > len / period - 1 {
            score -= weights.repetition_penalty;
        }
    }

    score.max(0.0)
}

/// Occurrences of `needle` in `haystack`, scanning left to right and
/// skipping past each match.
fn count_non_overlapping(haystack: &[bool], needle: &[bool]) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if &haystack[i..i + needle.len()] == needle {
            count += 1;
            i += needle.len();
        } else {
            i += 1;
        }
    }
    count
}

// ---------------------------------------------------------------------------
// Variation operators
// ---------------------------------------------------------------------------

/// Multi-point crossover: segments alternate between the parents at
/// `a.crossover_points` random cut points.
pub fn crossover(a: &PatternDna, b: &PatternDna, rng: &mut impl Rng) -> PatternDna {
    let len = a.len().min(b.len());
    let mutation_rate = (a.mutation_rate + b.mutation_rate) / 2.0;
    if len < 2 {
        return PatternDna {
            mutation_rate,
            ..a.clone()
        };
    }

    let cuts = a.crossover_points.min(len - 1);
    let mut points: Vec<usize> = index::sample(rng, len - 1, cuts)
        .into_iter()
        .map(|p| p + 1)
        .collect();
    points.sort_unstable();
    points.push(len);

    let mut child = PatternDna {
        rhythm_genes: Vec::with_capacity(len),
        velocity_genes: Vec::with_capacity(len),
        timing_genes: Vec::with_capacity(len),
        mutation_rate,
        crossover_points: a.crossover_points,
    };
    let mut start = 0;
    for (segment, &end) in points.iter().enumerate() {
        let parent = if segment % 2 == 0 { a } else { b };
        child
            .rhythm_genes
            .extend_from_slice(&parent.rhythm_genes[start..end]);
        child
            .velocity_genes
            .extend_from_slice(&parent.velocity_genes[start..end]);
        child
            .timing_genes
            .extend_from_slice(&parent.timing_genes[start..end]);
        start = end;
    }
    child
}

/// Per-gene mutation. Each gene mutates with probability `mutation_rate`
/// by one of: flip the onset, swap it with its left neighbour, re-roll the
/// velocity gene, re-roll the timing gene.
pub fn mutate(dna: &PatternDna, rng: &mut impl Rng) -> PatternDna {
    let mut out = dna.clone();
    let rate = dna.mutation_rate.clamp(0.0, 1.0);
    for i in 0..out.rhythm_genes.len() {
        if !rng.random_bool(rate) {
            continue;
        }
        match rng.random_range(0..4) {
            0 => out.rhythm_genes[i] = !out.rhythm_genes[i],
            1 => {
                if i > 0 {
                    out.rhythm_genes.swap(i, i - 1);
                }
            }
            2 => {
                if let Some(v) = out.velocity_genes.get_mut(i) {
                    *v = rng.random_range(0.3..=1.0);
                }
            }
            _ => {
                if let Some(t) = out.timing_genes.get_mut(i) {
                    *t = rng.random_range(-0.2..=0.2);
                }
            }
        }
    }
    out
}
