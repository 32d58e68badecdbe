// Advisory mix metadata attached to each generated part.
//
// Nothing here touches audio. A response carries `MixHints` for its role:
// an EQ preset, a compression preset and, for parts that should duck under
// the kick, a sidechain hint. The numbers are the starting points a host
// DAW integration applies to the track it creates for the part.
//
// An arrangement additionally carries a `MasterMix` for the whole track:
// master EQ shelves chosen by genre, master bus compression, and reverb and
// delay send levels.

use crate::style::{Genre, Role};
use serde::{Deserialize, Serialize};
use BandKind::{Air, Boost, Notch, Presence, Shelf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandKind {
    Boost,
    Notch,
    Shelf,
    Presence,
    Air,
}

/// One parametric band: frequency in Hz, gain in dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBand {
    pub kind: BandKind,
    pub freq: f64,
    pub gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EqSettings {
    /// High-pass corner, Hz.
    pub hp_freq: f64,
    /// Low-pass corner, Hz.
    pub lp_freq: f64,
    pub bands: &'static [EqBand],
}

const fn band(kind: BandKind, freq: f64, gain: f64) -> EqBand {
    EqBand { kind, freq, gain }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqPreset {
    Kick,
    Bass,
    Snare,
    Hat,
    Lead,
    Pad,
}

const KICK_BANDS: &[EqBand] = &[band(Boost, 60.0, 3.0), band(Notch, 250.0, -2.0)];
const BASS_BANDS: &[EqBand] = &[band(Boost, 100.0, 2.0), band(Notch, 60.0, -3.0)];
const SNARE_BANDS: &[EqBand] = &[band(Boost, 200.0, 2.0), band(Boost, 5000.0, 3.0)];
const HAT_BANDS: &[EqBand] = &[band(Boost, 8000.0, 2.0), band(Shelf, 10000.0, 1.0)];
const LEAD_BANDS: &[EqBand] = &[band(Boost, 2000.0, 2.0), band(Presence, 5000.0, 1.0)];
const PAD_BANDS: &[EqBand] = &[band(Notch, 500.0, -2.0), band(Air, 12000.0, 1.0)];

impl EqPreset {
    pub fn settings(self) -> EqSettings {
        let (hp_freq, lp_freq, bands) = match self {
            EqPreset::Kick => (30.0, 8000.0, KICK_BANDS),
            EqPreset::Bass => (40.0, 3000.0, BASS_BANDS),
            EqPreset::Snare => (150.0, 12000.0, SNARE_BANDS),
            EqPreset::Hat => (500.0, 18000.0, HAT_BANDS),
            EqPreset::Lead => (200.0, 12000.0, LEAD_BANDS),
            EqPreset::Pad => (100.0, 10000.0, PAD_BANDS),
        };
        EqSettings {
            hp_freq,
            lp_freq,
            bands,
        }
    }
}

/// Compressor starting point. Times in milliseconds, threshold and knee
/// in dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressionSettings {
    pub threshold: f64,
    pub ratio: f64,
    pub attack: f64,
    pub release: f64,
    pub knee: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionPreset {
    Kick,
    Bass,
    Snare,
    Hat,
    Master,
}

impl CompressionPreset {
    pub fn settings(self) -> CompressionSettings {
        let (threshold, ratio, attack, release, knee) = match self {
            CompressionPreset::Kick => (-12.0, 4.0, 5.0, 50.0, 2.0),
            CompressionPreset::Bass => (-15.0, 3.0, 10.0, 100.0, 2.0),
            CompressionPreset::Snare => (-10.0, 3.0, 2.0, 80.0, 1.0),
            CompressionPreset::Hat => (-18.0, 2.0, 0.5, 30.0, 1.0),
            CompressionPreset::Master => (-6.0, 2.0, 10.0, 100.0, 3.0),
        };
        CompressionSettings {
            threshold,
            ratio,
            attack,
            release,
            knee,
        }
    }
}

/// Duck the part under the kick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SidechainHint {
    /// Always the kick for now.
    pub source: Role,
    pub threshold: f64,
    pub ratio: f64,
    pub attack: f64,
    pub release: f64,
    /// Depth of the duck, 0..=1.
    pub amount: f64,
}

impl SidechainHint {
    fn under_kick(threshold: f64, ratio: f64, release: f64, amount: f64) -> Self {
        SidechainHint {
            source: Role::Kick,
            threshold,
            ratio,
            attack: 0.1,
            release,
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MixHints {
    pub eq: EqPreset,
    pub eq_settings: EqSettings,
    pub compression: CompressionPreset,
    pub compression_settings: CompressionSettings,
    pub sidechain: Option<SidechainHint>,
}

impl MixHints {
    pub fn for_role(role: Role) -> Self {
        let (eq, compression, sidechain) = match role {
            Role::Kick => (EqPreset::Kick, CompressionPreset::Kick, None),
            Role::Snare => (EqPreset::Snare, CompressionPreset::Snare, None),
            Role::Hat => (EqPreset::Hat, CompressionPreset::Hat, None),
            Role::Percussion => (EqPreset::Hat, CompressionPreset::Snare, None),
            Role::Bass => (
                EqPreset::Bass,
                CompressionPreset::Bass,
                Some(SidechainHint::under_kick(-20.0, 8.0, 100.0, 0.7)),
            ),
            Role::Chord => (
                EqPreset::Pad,
                CompressionPreset::Master,
                Some(SidechainHint::under_kick(-15.0, 4.0, 150.0, 0.5)),
            ),
            Role::Melody => (
                EqPreset::Lead,
                CompressionPreset::Master,
                Some(SidechainHint::under_kick(-15.0, 4.0, 150.0, 0.5)),
            ),
        };
        MixHints {
            eq,
            eq_settings: eq.settings(),
            compression,
            compression_settings: compression.settings(),
            sidechain,
        }
    }
}

/// Master bus EQ: full-range corners plus shelf boosts in dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MasterEq {
    pub hp_freq: f64,
    pub lp_freq: f64,
    pub low_shelf: f64,
    pub high_shelf: f64,
}

/// Reverb send level and room character, all 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReverbSend {
    pub amount: f64,
    pub size: f64,
    pub damping: f64,
}

/// Tempo-synced delay time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelayTime {
    #[serde(rename = "1/8")]
    Eighth,
    #[serde(rename = "1/4")]
    Quarter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelaySend {
    pub amount: f64,
    pub time: DelayTime,
    pub feedback: f64,
}

/// Track-level mix starting point for an arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MasterMix {
    pub eq: MasterEq,
    pub compression: CompressionSettings,
    pub reverb: ReverbSend,
    pub delay: DelaySend,
}

impl MasterMix {
    /// Four-on-the-floor genres get low-end weight, a drier reverb and
    /// eighth-note delays; trance and drum and bass get top-end air.
    pub fn for_genre(genre: Genre) -> Self {
        let club = matches!(genre, Genre::House | Genre::Techno);
        let bright = matches!(genre, Genre::Trance | Genre::DrumAndBass);
        MasterMix {
            eq: MasterEq {
                hp_freq: 20.0,
                lp_freq: 20000.0,
                low_shelf: if club { 1.0 } else { 0.0 },
                high_shelf: if bright { 1.0 } else { 0.0 },
            },
            compression: CompressionPreset::Master.settings(),
            reverb: ReverbSend {
                amount: if club { 0.2 } else { 0.3 },
                size: 0.4,
                damping: 0.5,
            },
            delay: DelaySend {
                amount: 0.15,
                time: if club { DelayTime::Eighth } else { DelayTime::Quarter },
                feedback: 0.3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_mix_by_genre() {
        let techno = MasterMix::for_genre(Genre::Techno);
        assert_eq!(techno.eq.low_shelf, 1.0);
        assert_eq!(techno.eq.high_shelf, 0.0);
        assert_eq!(techno.reverb.amount, 0.2);
        assert_eq!(techno.delay.time, DelayTime::Eighth);

        let dnb = MasterMix::for_genre(Genre::DrumAndBass);
        assert_eq!(dnb.eq.low_shelf, 0.0);
        assert_eq!(dnb.eq.high_shelf, 1.0);
        assert_eq!(dnb.reverb.amount, 0.3);
        assert_eq!(dnb.compression, CompressionPreset::Master.settings());

        let json = serde_json::to_value(MixHints::for_role(Role::Kick)).unwrap();
        assert_eq!(json["eq"], "kick");
        let json = serde_json::to_value(MasterMix::for_genre(Genre::Jazz)).unwrap();
        assert_eq!(json["delay"]["time"], "1/4");
    }

    #[test]
    fn test_bass_ducks_harder_than_pads() {
        let bass = MixHints::for_role(Role::Bass).sidechain.unwrap();
        let pad = MixHints::for_role(Role::Chord).sidechain.unwrap();
        assert_eq!(bass.amount, 0.7);
        assert_eq!(pad.amount, 0.5);
        assert!(bass.ratio > pad.ratio);
        assert_eq!(bass.source, Role::Kick);
    }

    #[test]
    fn test_drums_have_no_sidechain() {
        for role in [Role::Kick, Role::Snare, Role::Hat, Role::Percussion] {
            assert!(MixHints::for_role(role).sidechain.is_none());
        }
    }

    #[test]
    fn test_eq_corners_ordered() {
        for preset in [
            EqPreset::Kick,
            EqPreset::Bass,
            EqPreset::Snare,
            EqPreset::Hat,
            EqPreset::Lead,
            EqPreset::Pad,
        ] {
            let s = preset.settings();
            assert!(s.hp_freq < s.lp_freq, "{preset:?}");
            assert_eq!(s.bands.len(), 2);
        }
        assert_eq!(EqPreset::Kick.settings().bands[0].freq, 60.0);
        let kinds: Vec<BandKind> = EqPreset::Pad.settings().bands.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![Notch, Air]);
    }

    #[test]
    fn test_hints_serialize() {
        let json = serde_json::to_value(MixHints::for_role(Role::Melody)).unwrap();
        assert_eq!(json["eq"], "lead");
        assert_eq!(json["compression_settings"]["ratio"], 2.0);
        assert_eq!(json["sidechain"]["amount"], 0.5);
    }
}
