// Scoring configuration: the event vocabulary, weight tables, and the
// catalog of named league presets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

// ---------------------------------------------------------------------------
// Event vocabulary
// ---------------------------------------------------------------------------

/// Offensive events a league may score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BattingEvent {
    Single,
    Double,
    Triple,
    HomeRun,
    Walk,
    IntentionalWalk,
    HitByPitch,
    Run,
    RunBattedIn,
    StolenBase,
    CaughtStealing,
    Strikeout,
    GroundedIntoDoublePlay,
    Error,
}

impl BattingEvent {
    pub const ALL: [BattingEvent; 14] = [
        BattingEvent::Single,
        BattingEvent::Double,
        BattingEvent::Triple,
        BattingEvent::HomeRun,
        BattingEvent::Walk,
        BattingEvent::IntentionalWalk,
        BattingEvent::HitByPitch,
        BattingEvent::Run,
        BattingEvent::RunBattedIn,
        BattingEvent::StolenBase,
        BattingEvent::CaughtStealing,
        BattingEvent::Strikeout,
        BattingEvent::GroundedIntoDoublePlay,
        BattingEvent::Error,
    ];

    /// Short code used as the key in preset files and JSON payloads.
    pub fn code(self) -> &'static str {
        match self {
            BattingEvent::Single => "S",
            BattingEvent::Double => "D",
            BattingEvent::Triple => "T",
            BattingEvent::HomeRun => "HR",
            BattingEvent::Walk => "BB",
            BattingEvent::IntentionalWalk => "IBB",
            BattingEvent::HitByPitch => "HBP",
            BattingEvent::Run => "R",
            BattingEvent::RunBattedIn => "RBI",
            BattingEvent::StolenBase => "SB",
            BattingEvent::CaughtStealing => "CS",
            BattingEvent::Strikeout => "SO",
            BattingEvent::GroundedIntoDoublePlay => "GIDP",
            BattingEvent::Error => "E",
        }
    }
}

impl fmt::Display for BattingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BattingEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BattingEvent::ALL
            .iter()
            .copied()
            .find(|e| e.code() == s.trim())
            .ok_or_else(|| format!("unknown batting event `{s}`"))
    }
}

/// Pitching events a league may score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PitchingEvent {
    Walk,
    IntentionalWalk,
    EarnedRun,
    HitAllowed,
    HitBatter,
    HomeRunAllowed,
    Inning,
    Strikeout,
    Win,
    Loss,
    Save,
    BlownSave,
    QualityStart,
    TotalBases,
    Hold,
    WildPitch,
    Balk,
}

impl PitchingEvent {
    pub const ALL: [PitchingEvent; 17] = [
        PitchingEvent::Walk,
        PitchingEvent::IntentionalWalk,
        PitchingEvent::EarnedRun,
        PitchingEvent::HitAllowed,
        PitchingEvent::HitBatter,
        PitchingEvent::HomeRunAllowed,
        PitchingEvent::Inning,
        PitchingEvent::Strikeout,
        PitchingEvent::Win,
        PitchingEvent::Loss,
        PitchingEvent::Save,
        PitchingEvent::BlownSave,
        PitchingEvent::QualityStart,
        PitchingEvent::TotalBases,
        PitchingEvent::Hold,
        PitchingEvent::WildPitch,
        PitchingEvent::Balk,
    ];

    pub fn code(self) -> &'static str {
        match self {
            PitchingEvent::Walk => "BB",
            PitchingEvent::IntentionalWalk => "IBB",
            PitchingEvent::EarnedRun => "ER",
            PitchingEvent::HitAllowed => "HA",
            PitchingEvent::HitBatter => "HB",
            PitchingEvent::HomeRunAllowed => "HRA",
            PitchingEvent::Inning => "INN",
            PitchingEvent::Strikeout => "K",
            PitchingEvent::Win => "W",
            PitchingEvent::Loss => "L",
            PitchingEvent::Save => "S",
            PitchingEvent::BlownSave => "BS",
            PitchingEvent::QualityStart => "QS",
            PitchingEvent::TotalBases => "TB",
            PitchingEvent::Hold => "Hold",
            PitchingEvent::WildPitch => "WP",
            PitchingEvent::Balk => "BK",
        }
    }
}

impl fmt::Display for PitchingEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PitchingEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PitchingEvent::ALL
            .iter()
            .copied()
            .find(|e| e.code() == s.trim())
            .ok_or_else(|| format!("unknown pitching event `{s}`"))
    }
}

// ---------------------------------------------------------------------------
// Weight tables
// ---------------------------------------------------------------------------

/// Point value per unit of each scored event, split by category.
///
/// Absent keys stay absent: a lookup for an event the table does not carry
/// fails with `ProjectionError::MissingWeight` instead of reading as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights", into = "RawWeights")]
pub struct ScoringWeights {
    batting: BTreeMap<BattingEvent, f64>,
    pitching: BTreeMap<PitchingEvent, f64>,
}

/// Serialized shape: event codes as plain string keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawWeights {
    #[serde(default)]
    batting: BTreeMap<String, f64>,
    #[serde(default)]
    pitching: BTreeMap<String, f64>,
}

impl TryFrom<RawWeights> for ScoringWeights {
    type Error = String;

    fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
        let mut weights = ScoringWeights::default();
        for (code, value) in raw.batting {
            let event: BattingEvent = code.parse()?;
            if !value.is_finite() {
                return Err(format!("batting weight `{code}` is not finite"));
            }
            weights.batting.insert(event, value);
        }
        for (code, value) in raw.pitching {
            let event: PitchingEvent = code.parse()?;
            if !value.is_finite() {
                return Err(format!("pitching weight `{code}` is not finite"));
            }
            weights.pitching.insert(event, value);
        }
        Ok(weights)
    }
}

impl From<ScoringWeights> for RawWeights {
    fn from(weights: ScoringWeights) -> Self {
        RawWeights {
            batting: weights
                .batting
                .into_iter()
                .map(|(e, v)| (e.code().to_string(), v))
                .collect(),
            pitching: weights
                .pitching
                .into_iter()
                .map(|(e, v)| (e.code().to_string(), v))
                .collect(),
        }
    }
}

impl ScoringWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for a pitching weight.
    pub fn with_pitching(mut self, event: PitchingEvent, value: f64) -> Self {
        self.pitching.insert(event, value);
        self
    }

    /// Builder-style setter for a batting weight.
    pub fn with_batting(mut self, event: BattingEvent, value: f64) -> Self {
        self.batting.insert(event, value);
        self
    }

    pub fn set_pitching(&mut self, event: PitchingEvent, value: f64) {
        self.pitching.insert(event, value);
    }

    /// Required pitching weight. Must be present and finite.
    pub fn pitching(&self, event: PitchingEvent) -> Result<f64, ProjectionError> {
        required_weight(self.pitching.get(&event), "pitching", event.code())
    }

    /// Required batting weight. Must be present and finite.
    pub fn batting(&self, event: BattingEvent) -> Result<f64, ProjectionError> {
        required_weight(self.batting.get(&event), "batting", event.code())
    }

    pub fn pitching_weights(&self) -> &BTreeMap<PitchingEvent, f64> {
        &self.pitching
    }

    pub fn batting_weights(&self) -> &BTreeMap<BattingEvent, f64> {
        &self.batting
    }
}

fn required_weight(
    value: Option<&f64>,
    category: &'static str,
    event: &'static str,
) -> Result<f64, ProjectionError> {
    match value.copied() {
        None => Err(ProjectionError::MissingWeight { category, event }),
        Some(v) if !v.is_finite() => Err(ProjectionError::InvalidWeight {
            category,
            event,
            value: v.to_string(),
        }),
        Some(v) => Ok(v),
    }
}

// ---------------------------------------------------------------------------
// League identity
// ---------------------------------------------------------------------------

/// Which league a weight table belongs to: a league-type tag plus the
/// user-chosen name of a saved custom league, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueLabel {
    pub league_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LeagueLabel {
    pub fn preset(league_type: impl Into<String>) -> Self {
        LeagueLabel {
            league_type: league_type.into(),
            name: None,
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        LeagueLabel {
            league_type: PresetCatalog::CUSTOM.to_string(),
            name: Some(name.into()),
        }
    }
}

impl fmt::Display for LeagueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name})", self.league_type),
            None => f.write_str(&self.league_type),
        }
    }
}

// ---------------------------------------------------------------------------
// Preset catalog
// ---------------------------------------------------------------------------

/// Read-only set of named league presets, built once at startup and shared
/// by reference across requests.
#[derive(Debug, Clone, Default)]
pub struct PresetCatalog {
    presets: BTreeMap<String, ScoringWeights>,
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    presets: BTreeMap<String, ScoringWeights>,
}

impl PresetCatalog {
    /// League type whose preset is the editable starting point.
    pub const CUSTOM: &'static str = "Custom";

    pub fn new(presets: BTreeMap<String, ScoringWeights>) -> Self {
        PresetCatalog { presets }
    }

    /// Parse a catalog from a TOML document of `[presets.<NAME>.batting]`
    /// and `[presets.<NAME>.pitching]` tables.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let file: PresetFile = toml::from_str(text)?;
        Ok(PresetCatalog::new(file.presets))
    }

    /// Look up a preset by league type, ignoring ASCII case.
    pub fn get(&self, league_type: &str) -> Result<&ScoringWeights, ProjectionError> {
        let wanted = league_type.trim();
        self.presets
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, weights)| weights)
            .ok_or_else(|| ProjectionError::UnknownLeague(wanted.to_string()))
    }

    /// Canonical spelling of a preset name, if present.
    pub fn canonical_name(&self, league_type: &str) -> Option<&str> {
        let wanted = league_type.trim();
        self.presets
            .keys()
            .find(|name| name.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScoringWeights)> {
        self.presets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
