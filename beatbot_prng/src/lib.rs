// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding,
// exposed through the `rand` traits so every generator in
// `beatbot_compose` can take `rng: &mut impl Rng` and draw ranges, floats
// and booleans with the ecosystem's sampling code.
//
// This crate is the single PRNG used by the composition engine. A request
// either names a seed (reproducible output) or asks for one to be drawn
// from OS entropy via `entropy_seed()`; in both cases the orchestrator
// reports the seed it used so any generated part can be regenerated.
//
// **Critical constraint: determinism.** The core step function must produce
// identical output given the same prior state, regardless of platform,
// compiler version, or optimization level. No floating-point arithmetic in
// the core generator.

use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG: the engine's sole source of randomness.
///
/// Each composition request owns one `PatternRng`. Parts that must not
/// perturb each other (the roles of a multi-part arrangement) each get a
/// child stream from `fork()`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRng {
    s: [u64; 4],
}

impl PatternRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    /// Two instances created with the same seed produce identical streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Draw a fresh seed from the thread-local OS-seeded generator.
    ///
    /// This is the only non-deterministic entry point in the crate; callers
    /// record the returned value so the run can be replayed.
    pub fn entropy_seed() -> u64 {
        rand::rng().random()
    }

    /// Derive an independent child generator, advancing this one by one step.
    pub fn fork(&mut self) -> PatternRng {
        PatternRng::new(self.step())
    }

    fn step(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }
}

impl RngCore for PatternRng {
    /// Upper 32 bits of the next `u64`; the low bits of xoshiro256++ are
    /// the weaker ones.
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        let mut chunks = dst.chunks_exact_mut(8);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.step().to_le_bytes());
        }
        let rest = chunks.into_remainder();
        if !rest.is_empty() {
            let bytes = self.step().to_le_bytes();
            rest.copy_from_slice(&bytes[..rest.len()]);
        }
    }
}

impl SeedableRng for PatternRng {
    type Seed = [u8; 32];

    /// Build directly from 256 bits of state. The all-zero state is a fixed
    /// point of xoshiro, so it is remapped through SplitMix64.
    fn from_seed(seed: [u8; 32]) -> Self {
        let mut s = [0u64; 4];
        for (word, bytes) in s.iter_mut().zip(seed.chunks_exact(8)) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(bytes);
            *word = u64::from_le_bytes(buf);
        }
        if s.iter().all(|&w| w == 0) {
            return PatternRng::new(0);
        }
        PatternRng { s }
    }

    fn seed_from_u64(state: u64) -> Self {
        PatternRng::new(state)
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
