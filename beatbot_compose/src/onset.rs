// Binary onset vectors and the pure transforms over them.
//
// An `OnsetVector` is one bar (or any fixed span) of steps, each either a
// hit or a rest. The rhythm algorithms in `rhythm.rs` produce them, the
// genetic evolver in `genetic.rs` evolves them, and `uniqueness.rs`
// fingerprints them to avoid repeating recent output. Every operation here
// returns a new vector; nothing mutates a pattern another caller holds.
//
// `PatternTransform` is the closed set of variations the uniqueness retry
// loop draws from when a fresh pattern collides with history.

use rand::Rng;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Content hash of an onset vector, used for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub u64);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Fixed-length sequence of hit/rest steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OnsetVector(Vec<bool>);

impl OnsetVector {
    pub fn new(steps: Vec<bool>) -> Self {
        OnsetVector(steps)
    }

    pub fn zeros(len: usize) -> Self {
        OnsetVector(vec![false; len])
    }

    /// Build from 0/1 digits; any nonzero value is a hit.
    pub fn from_bits(bits: &[u8]) -> Self {
        OnsetVector(bits.iter().map(|&b| b != 0).collect())
    }

    /// Build a vector of `len` steps with hits at `positions` (taken mod `len`).
    pub fn from_positions(len: usize, positions: &[usize]) -> Self {
        let mut steps = vec![false; len];
        if len > 0 {
            for &p in positions {
                steps[p % len] = true;
            }
        }
        OnsetVector(steps)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    pub fn onset_count(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    /// Indices of the hit steps, ascending.
    pub fn positions(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .map(|(i, _)| i)
            .collect()
    }

    /// Fraction of steps that are hits.
    pub fn density(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.onset_count() as f64 / self.0.len() as f64
    }

    /// Hits on odd (off-beat) steps.
    pub fn offbeat_count(&self) -> usize {
        self.0.iter().skip(1).step_by(2).filter(|&&b| b).count()
    }

    /// Share of hits that fall on off-beat steps, 0.0 for an empty pattern.
    pub fn syncopation(&self) -> f64 {
        let total = self.onset_count();
        if total == 0 {
            return 0.0;
        }
        self.offbeat_count() as f64 / total as f64
    }

    /// Rotate left by `n mod len` steps.
    pub fn rotate_left(&self, n: usize) -> Self {
        let mut steps = self.0.clone();
        if !steps.is_empty() {
            let k = n % steps.len();
            steps.rotate_left(k);
        }
        OnsetVector(steps)
    }

    pub fn reverse(&self) -> Self {
        OnsetVector(self.0.iter().rev().copied().collect())
    }

    pub fn invert(&self) -> Self {
        OnsetVector(self.0.iter().map(|&b| !b).collect())
    }

    /// Swap the two halves.
    pub fn rotate_half(&self) -> Self {
        self.rotate_left(self.0.len() / 2)
    }

    /// Invert odd steps only.
    pub fn alternate_invert(&self) -> Self {
        OnsetVector(
            self.0
                .iter()
                .enumerate()
                .map(|(i, &b)| if i % 2 == 1 { !b } else { b })
                .collect(),
        )
    }

    /// Each step OR its right-hand neighbour (wrapping).
    pub fn or_neighbor(&self) -> Self {
        self.zip_neighbor(|a, b| a || b)
    }

    /// Each step AND its right-hand neighbour (wrapping).
    pub fn and_neighbor(&self) -> Self {
        self.zip_neighbor(|a, b| a && b)
    }

    fn zip_neighbor(&self, f: impl Fn(bool, bool) -> bool) -> Self {
        let n = self.0.len();
        OnsetVector((0..n).map(|i| f(self.0[i], self.0[(i + 1) % n])).collect())
    }

    /// Step-wise OR of two patterns of the same length. Extra steps of the
    /// longer one are ignored.
    pub fn union(&self, other: &OnsetVector) -> Self {
        OnsetVector(
            self.0
                .iter()
                .zip(other.0.iter())
                .map(|(&a, &b)| a || b)
                .collect(),
        )
    }

    /// Map onto a grid of `len` steps, keeping each hit at the same relative
    /// position in the span. Hits that land on the same coarse step merge.
    pub fn resample(&self, len: usize) -> Self {
        if len == self.0.len() || self.0.is_empty() {
            return OnsetVector(if self.0.is_empty() {
                vec![false; len]
            } else {
                self.0.clone()
            });
        }
        let mut steps = vec![false; len];
        for i in self.positions() {
            steps[i * len / self.0.len()] = true;
        }
        OnsetVector(steps)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = FxHasher::default();
        self.0.hash(&mut hasher);
        Fingerprint(hasher.finish())
    }
}

impl From<Vec<bool>> for OnsetVector {
    fn from(steps: Vec<bool>) -> Self {
        OnsetVector(steps)
    }
}

/// `x` for a hit, `.` for a rest.
impl fmt::Display for OnsetVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            f.write_str(if b { "x" } else { "." })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// Variation applied to a pattern that collided with recent output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternTransform {
    Reverse,
    Invert,
    RotateHalf,
    AlternateInvert,
    OrNeighbor,
    AndNeighbor,
}

impl PatternTransform {
    pub const ALL: [PatternTransform; 6] = [
        PatternTransform::Reverse,
        PatternTransform::Invert,
        PatternTransform::RotateHalf,
        PatternTransform::AlternateInvert,
        PatternTransform::OrNeighbor,
        PatternTransform::AndNeighbor,
    ];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn apply(self, pattern: &OnsetVector) -> OnsetVector {
        match self {
            PatternTransform::Reverse => pattern.reverse(),
            PatternTransform::Invert => pattern.invert(),
            PatternTransform::RotateHalf => pattern.rotate_half(),
            PatternTransform::AlternateInvert => pattern.alternate_invert(),
            PatternTransform::OrNeighbor => pattern.or_neighbor(),
            PatternTransform::AndNeighbor => pattern.and_neighbor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beatbot_prng::PatternRng;

    fn bits(s: &str) -> OnsetVector {
        OnsetVector::new(s.chars().map(|c| c == 'x').collect())
    }

    #[test]
    fn test_counts_and_density() {
        let p = bits("x...x...x...x...");
        assert_eq!(p.onset_count(), 4);
        assert_eq!(p.positions(), vec![0, 4, 8, 12]);
        assert_eq!(p.density(), 0.25);
        assert_eq!(p.syncopation(), 0.0);
        assert_eq!(bits(".x.x").syncopation(), 1.0);
        assert_eq!(OnsetVector::zeros(8).syncopation(), 0.0);
    }

    #[test]
    fn test_rotate_by_len_is_identity() {
        let p = bits("x..x..x.x.x.....");
        assert_eq!(p.rotate_left(p.len()), p);
        assert_eq!(p.rotate_left(3 * p.len()), p);
        assert_eq!(p.rotate_left(1).to_string(), "..x..x.x.x.....x");
    }

    #[test]
    fn test_transforms() {
        let p = bits("xx..x...");
        assert_eq!(p.reverse().to_string(), "...x..xx");
        assert_eq!(p.invert().to_string(), "..xx.xxx");
        assert_eq!(p.rotate_half().to_string(), "x...xx..");
        assert_eq!(p.alternate_invert().to_string(), "x..xxx.x");
        assert_eq!(p.or_neighbor().to_string(), "xx.xx..x");
        assert_eq!(p.and_neighbor().to_string(), "x.......");
    }

    #[test]
    fn test_transforms_preserve_length() {
        let mut rng = PatternRng::new(3);
        let p = bits("x.x..xx.x...x.x.");
        for _ in 0..50 {
            let t = PatternTransform::random(&mut rng);
            assert_eq!(t.apply(&p).len(), p.len());
        }
    }

    #[test]
    fn test_resample() {
        let p = bits("x...x...x...x...");
        assert_eq!(p.resample(8).to_string(), "x.x.x.x.");
        assert_eq!(p.resample(32).onset_count(), 4);
        assert_eq!(p.resample(32).positions(), vec![0, 8, 16, 24]);
        assert_eq!(OnsetVector::zeros(0).resample(4).len(), 4);
    }

    #[test]
    fn test_fingerprint_distinguishes_patterns() {
        let a = bits("x...x...");
        let b = bits("x...x..x");
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(
            OnsetVector::zeros(8).fingerprint(),
            OnsetVector::zeros(16).fingerprint()
        );
    }

    #[test]
    fn test_from_positions_wraps() {
        let p = OnsetVector::from_positions(8, &[0, 9]);
        assert_eq!(p.positions(), vec![0, 1]);
        assert_eq!(OnsetVector::from_bits(&[1, 0, 2]).positions(), vec![0, 2]);
    }
}
