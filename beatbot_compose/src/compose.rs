// Composition orchestrator: request in, part out.
//
// `Composer` is the entry point. It resolves a `Request` (tags, key, scale,
// progression, tempo, seed) into a `Plan`, builds an RNG from the seed, and
// dispatches on the role:
//
// - percussive roles (kick, snare, hat, percussion): genre groove template
//   blended with an onset vector from a randomly chosen rhythm algorithm,
//   passed through the uniqueness cache, rendered over the bars, swung and
//   humanized (see `groove.rs`);
// - bass: the genre's bass cell over the progression, swung in swung genres;
// - chord: stabs, pads or arpeggios per genre;
// - melody: scale-degree walk with a tonic cadence, re-resolved after
//   humanization.
//
// `compose_arrangement()` renders several roles over one shared plan. Each
// role gets its own RNG forked from the arrangement seed in role order, and
// consecutive percussive parts never use the same rhythm algorithm. The
// arrangement also carries a song-section layout derived from the bar count
// and a genre master mix.
//
// A request without a key gets one drawn from the mood's (else the genre's)
// candidate roots, on a stream forked from the seed so the draw doesn't
// shift the parts.
//
// Reproducibility: a request with an explicit seed always produces the same
// notes. Its fingerprint is still registered with the uniqueness cache (so
// later unseeded requests steer away from it) but a collision only sets
// `duplicate_accepted`; the pattern is never transformed. Unseeded requests
// draw a seed from OS entropy, report it in the response, and get the full
// transform-and-retry treatment.
//
// The uniqueness cache is the process-wide one, resized to
// `config.uniqueness.capacity`, unless the composer was built with
// `with_cache()`.

use crate::config::EngineConfig;
use crate::error::{ComposeError, Result};
use crate::groove::{self, blend, render_drums};
use crate::harmony::{generate_bassline, generate_chords};
use crate::humanize::{add_swing, humanize_timing, humanize_velocity, jitter_ticks};
use crate::melody::{generate_melody, resolve_cadence};
use crate::mix::{MasterMix, MixHints};
use crate::note::{NoteEvent, TICKS_PER_BAR, sort_notes};
use crate::onset::{Fingerprint, OnsetVector};
use crate::rhythm::{AlgorithmKind, RhythmAlgorithm};
use crate::scale::{Chord, PitchClass, Scale, ScaleKind, chord_progression};
use crate::style::{Genre, Mood, Resolved, Role, default_key, progression_style};
use crate::uniqueness::{self, UniquenessCache, generate_unique_pattern};
use beatbot_prng::PatternRng;
use serde::{Deserialize, Serialize};

fn default_genre() -> String {
    "house".to_string()
}

fn default_bars() -> u32 {
    4
}

fn default_steps_per_bar() -> u32 {
    16
}

/// A generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub role: Role,
    /// Free-form genre tag; unrecognized tags fall back to house.
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default)]
    pub mood: Option<String>,
    /// Pitch-class name; drawn per mood and genre when absent.
    #[serde(default)]
    pub key: Option<String>,
    /// Scale name, the mood's default scale when absent.
    #[serde(default)]
    pub scale: Option<String>,
    #[serde(default = "default_bars")]
    pub bars: u32,
    /// Must divide the 48-tick bar.
    #[serde(default = "default_steps_per_bar")]
    pub steps_per_bar: u32,
    /// Overrides the genre's tempo hint.
    #[serde(default)]
    pub tempo: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Request {
    pub fn new(role: Role, genre: &str) -> Self {
        Request {
            role,
            genre: genre.to_string(),
            mood: None,
            key: None,
            scale: None,
            bars: default_bars(),
            steps_per_bar: default_steps_per_bar(),
            tempo: None,
            seed: None,
        }
    }

    pub fn with_mood(mut self, mood: &str) -> Self {
        self.mood = Some(mood.to_string());
        self
    }

    pub fn with_key(mut self, key: &str, scale: &str) -> Self {
        self.key = Some(key.to_string());
        self.scale = Some(scale.to_string());
        self
    }

    pub fn with_bars(mut self, bars: u32, steps_per_bar: u32) -> Self {
        self.bars = bars;
        self.steps_per_bar = steps_per_bar;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One generated part.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub role: Role,
    pub genre: Genre,
    /// The genre tag was not recognized and house was used.
    pub genre_fallback: bool,
    pub mood: Mood,
    pub mood_fallback: bool,
    pub tempo_hint: u32,
    pub key: PitchClass,
    pub scale: ScaleKind,
    /// Chord symbols, one per bar, cycled over the part.
    pub progression: Vec<String>,
    /// Sorted by position, then pitch.
    pub notes: Vec<NoteEvent>,
    pub mix_hints: MixHints,
    /// Rhythm algorithm blended into a percussive part.
    pub algorithm: Option<AlgorithmKind>,
    pub fingerprint: Option<Fingerprint>,
    /// Uniqueness transforms applied to the part's pattern.
    pub attempts: usize,
    /// The uniqueness cache had already seen this part's pattern.
    pub duplicate_accepted: bool,
    /// Seed that reproduces this part.
    pub seed: u64,
}

/// Song-section bar counts around the generated loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrangementSections {
    pub intro: u32,
    /// The generated parts themselves.
    pub main: u32,
    pub breakdown: u32,
    pub outro: u32,
    pub total_bars: u32,
}

impl ArrangementSections {
    /// Loops longer than eight bars get four-bar intro, breakdown and
    /// outro; shorter ones a two-bar intro and outro and no breakdown.
    /// The breakdown sits inside the main section, so `total_bars` counts
    /// only intro, main and outro.
    pub fn for_bars(bars: u32) -> Self {
        let (intro, breakdown, outro) = if bars > 8 { (4, 4, 4) } else { (2, 0, 2) };
        ArrangementSections {
            intro,
            main: bars,
            breakdown,
            outro,
            total_bars: intro + bars + outro,
        }
    }
}

/// Several parts sharing key, scale, progression and tempo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrangement {
    pub seed: u64,
    pub tempo_hint: u32,
    pub key: PitchClass,
    pub scale: ScaleKind,
    pub progression: Vec<String>,
    pub sections: ArrangementSections,
    pub master_mix: MasterMix,
    pub parts: Vec<Response>,
}

/// A request with every tag and default resolved.
#[derive(Debug, Clone)]
struct Plan {
    genre: Resolved<Genre>,
    mood: Resolved<Mood>,
    scale: Scale,
    progression: Vec<Chord>,
    tempo: u32,
    bars: u32,
    steps_per_bar: u32,
    seed: u64,
    seeded: bool,
}

impl Plan {
    fn from_request(request: &Request) -> Result<Plan> {
        if request.bars == 0 {
            return Err(ComposeError::ZeroBars);
        }
        if request.steps_per_bar == 0 || TICKS_PER_BAR % request.steps_per_bar != 0 {
            return Err(ComposeError::InvalidStepsPerBar {
                steps: request.steps_per_bar,
                ticks: TICKS_PER_BAR,
            });
        }
        let genre = Genre::resolve(&request.genre);
        let mood = Mood::resolve(request.mood.as_deref());
        let (seed, seeded) = match request.seed {
            Some(seed) => (seed, true),
            None => (PatternRng::entropy_seed(), false),
        };
        let root = match request.key.as_deref() {
            Some(name) => PitchClass::parse(name)?,
            None => default_key(genre.value, mood.value, &mut PatternRng::new(seed).fork()),
        };
        let kind = match request.scale.as_deref() {
            Some(name) => ScaleKind::parse(name)?,
            None => mood.value.default_scale(),
        };
        let style = progression_style(genre.value, mood.value);
        let progression = chord_progression(root, kind, style);
        Ok(Plan {
            genre,
            mood,
            scale: Scale::new(root, kind),
            progression,
            tempo: request.tempo.unwrap_or(genre.value.tempo_hint()),
            bars: request.bars,
            steps_per_bar: request.steps_per_bar,
            seed,
            seeded,
        })
    }

    fn symbols(&self) -> Vec<String> {
        self.progression.iter().map(Chord::symbol).collect()
    }
}

/// The pattern and metadata of a rendered part before it is wrapped in a
/// `Response`.
struct Part {
    notes: Vec<NoteEvent>,
    algorithm: Option<AlgorithmKind>,
    fingerprint: Fingerprint,
    attempts: usize,
    duplicate_accepted: bool,
}

pub struct Composer<'a> {
    config: EngineConfig,
    cache: &'a UniquenessCache,
}

impl Composer<'static> {
    /// A composer backed by the process-wide uniqueness cache, resized to
    /// `config.uniqueness.capacity`.
    pub fn new(config: EngineConfig) -> Self {
        let cache = uniqueness::global();
        cache.set_capacity(config.uniqueness.capacity);
        Composer { config, cache }
    }
}

impl<'a> Composer<'a> {
    pub fn with_cache(config: EngineConfig, cache: &'a UniquenessCache) -> Self {
        Composer { config, cache }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compose(&self, request: &Request) -> Result<Response> {
        let plan = Plan::from_request(request)?;
        log::debug!(
            "composing {} for {} ({} bars x {} steps, seed {})",
            request.role,
            plan.genre.value,
            plan.bars,
            plan.steps_per_bar,
            plan.seed
        );
        let mut rng = PatternRng::new(plan.seed);
        let part = self.render(request.role, &plan, None, &mut rng)?;
        Ok(self.respond(request.role, &plan, part))
    }

    /// Render `roles` in order over one shared plan. `request.role` is
    /// ignored.
    pub fn compose_arrangement(&self, request: &Request, roles: &[Role]) -> Result<Arrangement> {
        let plan = Plan::from_request(request)?;
        log::debug!(
            "composing {}-part arrangement for {} (seed {})",
            roles.len(),
            plan.genre.value,
            plan.seed
        );
        let mut master = PatternRng::new(plan.seed);
        let mut last_algorithm = None;
        let mut parts = Vec::with_capacity(roles.len());
        for &role in roles {
            let mut rng = master.fork();
            let part = self.render(role, &plan, last_algorithm, &mut rng)?;
            if part.algorithm.is_some() {
                last_algorithm = part.algorithm;
            }
            parts.push(self.respond(role, &plan, part));
        }
        Ok(Arrangement {
            seed: plan.seed,
            tempo_hint: plan.tempo,
            key: plan.scale.root,
            scale: plan.scale.kind,
            progression: plan.symbols(),
            sections: ArrangementSections::for_bars(plan.bars),
            master_mix: MasterMix::for_genre(plan.genre.value),
            parts,
        })
    }

    fn respond(&self, role: Role, plan: &Plan, part: Part) -> Response {
        Response {
            role,
            genre: plan.genre.value,
            genre_fallback: plan.genre.fallback,
            mood: plan.mood.value,
            mood_fallback: plan.mood.fallback,
            tempo_hint: plan.tempo,
            key: plan.scale.root,
            scale: plan.scale.kind,
            progression: plan.symbols(),
            notes: part.notes,
            mix_hints: MixHints::for_role(role),
            algorithm: part.algorithm,
            fingerprint: Some(part.fingerprint),
            attempts: part.attempts,
            duplicate_accepted: part.duplicate_accepted,
            seed: plan.seed,
        }
    }

    /// Transforms allowed on a uniqueness collision.
    fn retry_budget(&self, plan: &Plan) -> usize {
        if plan.seeded {
            0
        } else {
            self.config.uniqueness.max_attempts
        }
    }

    fn render(
        &self,
        role: Role,
        plan: &Plan,
        last_algorithm: Option<AlgorithmKind>,
        rng: &mut PatternRng,
    ) -> Result<Part> {
        if role.is_percussive() {
            self.render_percussion(role, plan, last_algorithm, rng)
        } else {
            self.render_pitched(role, plan, rng)
        }
    }

    fn render_percussion(
        &self,
        role: Role,
        plan: &Plan,
        last_algorithm: Option<AlgorithmKind>,
        rng: &mut PatternRng,
    ) -> Result<Part> {
        let steps = plan.steps_per_bar as usize;
        let template = groove::template(plan.genre.value, role).unwrap_or(&groove::PERC_TRESILLO);
        let groove = template.resample(steps);

        let kind = AlgorithmKind::random_excluding(last_algorithm, rng);
        let algorithm = RhythmAlgorithm::random(kind, steps, &self.config, rng);
        let generated = algorithm.generate(steps, rng)?;
        log::trace!("{role}: {} blended into {}: {generated}", kind.name(), groove.name);

        let blended = blend(&groove, &generated, self.config.blend.algorithm_share, rng);
        let unique = generate_unique_pattern(blended, self.cache, self.retry_budget(plan), rng);

        let notes = render_drums(role, &groove, &unique.pattern, plan.bars, &self.config.blend, rng);
        let notes = add_swing(&notes, groove.swing)?;
        let amount = self.config.humanize.drums;
        let notes = humanize_timing(&notes, jitter_ticks(amount.timing), rng);
        let mut notes = humanize_velocity(&notes, amount.velocity, rng)?;
        sort_notes(&mut notes);

        Ok(Part {
            notes,
            algorithm: Some(kind),
            fingerprint: unique.fingerprint,
            attempts: unique.attempts,
            duplicate_accepted: unique.duplicate_accepted,
        })
    }

    fn render_pitched(&self, role: Role, plan: &Plan, rng: &mut PatternRng) -> Result<Part> {
        let genre = plan.genre.value;
        let humanize = &self.config.humanize;
        let (raw, amount) = match role {
            Role::Bass => {
                let mut notes = generate_bassline(&plan.progression, &plan.scale, plan.bars, genre.bass_cell());
                if genre.swung_bass() {
                    notes = add_swing(&notes, humanize.bass_swing)?;
                }
                (notes, humanize.bass)
            }
            Role::Chord => (
                generate_chords(
                    &plan.progression,
                    &plan.scale,
                    plan.bars,
                    plan.steps_per_bar,
                    genre.chord_style(),
                    genre.uses_sevenths(),
                    rng,
                ),
                humanize.chords,
            ),
            _ => (
                generate_melody(
                    &plan.progression,
                    &plan.scale,
                    plan.bars,
                    plan.steps_per_bar,
                    &self.config.melody,
                    rng,
                )?,
                humanize.melody,
            ),
        };

        // Pitched parts can't be varied without breaking harmony, so the
        // cache only records them.
        let grid = onset_grid(&raw, plan.bars, plan.steps_per_bar);
        let unique = generate_unique_pattern(grid, self.cache, 0, rng);

        let notes = humanize_timing(&raw, jitter_ticks(amount.timing), rng);
        let notes = humanize_velocity(&notes, amount.velocity, rng)?;
        let notes = if role == Role::Melody {
            resolve_cadence(&notes, &plan.scale, self.config.melody.cadence_velocity)
        } else {
            let mut notes = notes;
            sort_notes(&mut notes);
            notes
        };

        Ok(Part {
            notes,
            algorithm: None,
            fingerprint: unique.fingerprint,
            attempts: unique.attempts,
            duplicate_accepted: unique.duplicate_accepted,
        })
    }
}

/// Hit grid of a part at step resolution, one entry per step of every bar.
fn onset_grid(notes: &[NoteEvent], bars: u32, steps_per_bar: u32) -> OnsetVector {
    let len = (bars * steps_per_bar) as usize;
    let step = TICKS_PER_BAR / steps_per_bar.max(1);
    let positions: Vec<usize> = notes
        .iter()
        .map(|n| (n.position / step) as usize)
        .filter(|&i| i < len)
        .collect();
    OnsetVector::from_positions(len, &positions)
}

/// Compose with the default configuration and the process-wide cache.
pub fn compose(request: &Request) -> Result<Response> {
    Composer::new(EngineConfig::default()).compose(request)
}
