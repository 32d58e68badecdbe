// Beatbot composition engine
//
// Procedural beat, bass, chord and melody generation for electronic music
// production. Given a declarative request (role, genre tag, mood tag, key,
// scale, bar count, step resolution, optional seed) the engine returns an
// ordered list of note events plus advisory mix metadata. It knows nothing
// about project files, audio, or host applications.
//
// Architecture:
// - note.rs: NoteEvent and the 48-ticks-per-bar grid
// - onset.rs: OnsetVector (binary step patterns), transforms, fingerprints
// - rhythm.rs: rhythm algorithm library (Euclidean, chaos, cellular,
//   Markov, fractal, wave, golden ratio, probability field, Fibonacci,
//   genetic) and complementary patterns
// - genetic.rs: genetic rhythm evolver (selection, crossover, mutation)
// - uniqueness.rs: bounded fingerprint cache and the retry-with-transform
//   loop that keeps output from repeating
// - scale.rs: pitch classes, scales, quantization, chords, progressions
// - harmony.rs: basslines and chord parts (stabs, pads, arpeggios)
// - melody.rs: scale-degree melody walk with tonic cadence
// - groove.rs: drum groove templates, blending and drum rendering
// - humanize.rs: timing/velocity jitter and swing
// - mix.rs: EQ/compression/sidechain hints (metadata only)
// - style.rs: roles, genre and mood tag resolution
// - compose.rs: the Composer facade (single parts and arrangements)
// - config.rs: EngineConfig, all tunables with JSON loading
// - error.rs: ComposeError
//
// All randomness flows through an explicit `Rng` handle (PatternRng from
// beatbot_prng in practice), so a request with a seed is reproducible. The
// only process-wide state is the uniqueness cache.

pub mod compose;
pub mod config;
pub mod error;
pub mod genetic;
pub mod groove;
pub mod harmony;
pub mod humanize;
pub mod melody;
pub mod mix;
pub mod note;
pub mod onset;
pub mod rhythm;
pub mod scale;
pub mod style;
pub mod uniqueness;

pub use compose::{Arrangement, Composer, Request, Response, compose};
pub use config::EngineConfig;
pub use error::{ComposeError, Result};
pub use note::NoteEvent;
pub use onset::{Fingerprint, OnsetVector};
pub use style::Role;
