// Team pitching statistics split by the opposing batters' handedness.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

/// Plate appearances per inning assumed when no season totals are known.
pub const DEFAULT_PA_PER_INNING: f64 = 1.0;

/// Which side of the plate the opposing batters hit from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    /// Facing left-handed batters.
    Lefty,
    /// Facing right-handed batters.
    Righty,
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handedness::Lefty => f.write_str("Lefty"),
            Handedness::Righty => f.write_str("Righty"),
        }
    }
}

impl FromStr for Handedness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lefty" | "left" | "l" | "lhb" => Ok(Handedness::Lefty),
            "righty" | "right" | "r" | "rhb" => Ok(Handedness::Righty),
            other => Err(format!("unknown handedness `{other}`")),
        }
    }
}

/// Observed per-9-inning rates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerNineRates {
    pub hits: f64,
    pub walks: f64,
    pub strikeouts: f64,
    pub home_runs: f64,
}

/// Observed per-plate-appearance rates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerPaRates {
    pub hits: f64,
    pub walks: f64,
    pub strikeouts: f64,
    pub home_runs: f64,
}

/// Raw season totals for one split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitTotals {
    pub hits: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub home_runs: u32,
    pub plate_appearances: u32,
    pub games_played: u32,
}

impl SplitTotals {
    /// Per-PA rates derived from totals; `None` without plate appearances.
    pub fn per_pa(&self) -> Option<PerPaRates> {
        if self.plate_appearances == 0 {
            return None;
        }
        let pa = self.plate_appearances as f64;
        Some(PerPaRates {
            hits: self.hits as f64 / pa,
            walks: self.walks as f64 / pa,
            strikeouts: self.strikeouts as f64 / pa,
            home_runs: self.home_runs as f64 / pa,
        })
    }
}

/// Win/loss decisions recorded against this split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub wins: u32,
    pub losses: u32,
}

/// Everything known about one team against one handedness.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitStats {
    pub era: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whip: Option<f64>,
    pub per_nine: PerNineRates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_pa: Option<PerPaRates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<SplitTotals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<DecisionRecord>,
}

/// One team's splits plus optional team-level season volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSplitStats {
    pub abbreviation: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_plate_appearances: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games_played: Option<u32>,
    pub vs_lefty: SplitStats,
    pub vs_righty: SplitStats,
}

impl TeamSplitStats {
    pub fn split(&self, handedness: Handedness) -> &SplitStats {
        match handedness {
            Handedness::Lefty => &self.vs_lefty,
            Handedness::Righty => &self.vs_righty,
        }
    }

    /// Batters faced per inning: `PA / games / 9`.
    ///
    /// Prefers the split's own totals, then the team-level totals, then
    /// `DEFAULT_PA_PER_INNING`. Never returns zero for missing data.
    pub fn pa_per_inning(&self, handedness: Handedness) -> f64 {
        let split = self.split(handedness);
        if let Some(totals) = &split.totals {
            if let Some(v) = per_inning(totals.plate_appearances, totals.games_played) {
                return v;
            }
        }
        if let (Some(pa), Some(games)) = (self.total_plate_appearances, self.games_played) {
            if let Some(v) = per_inning(pa, games) {
                return v;
            }
        }
        DEFAULT_PA_PER_INNING
    }

    /// Reject negative or non-finite rates in either split.
    pub fn validate(&self) -> Result<(), ProjectionError> {
        validate_split(&self.abbreviation, "vs_lefty", &self.vs_lefty)?;
        validate_split(&self.abbreviation, "vs_righty", &self.vs_righty)
    }
}

fn per_inning(plate_appearances: u32, games: u32) -> Option<f64> {
    if plate_appearances == 0 || games == 0 {
        return None;
    }
    Some(plate_appearances as f64 / games as f64 / 9.0)
}

fn validate_split(team: &str, split: &str, stats: &SplitStats) -> Result<(), ProjectionError> {
    let mut fields: Vec<(&str, f64)> = vec![
        ("era", stats.era),
        ("hits_per_9", stats.per_nine.hits),
        ("walks_per_9", stats.per_nine.walks),
        ("strikeouts_per_9", stats.per_nine.strikeouts),
        ("home_runs_per_9", stats.per_nine.home_runs),
    ];
    if let Some(whip) = stats.whip {
        fields.push(("whip", whip));
    }
    if let Some(pa) = &stats.per_pa {
        fields.extend([
            ("hits_per_pa", pa.hits),
            ("walks_per_pa", pa.walks),
            ("strikeouts_per_pa", pa.strikeouts),
            ("home_runs_per_pa", pa.home_runs),
        ]);
    }

    for (name, value) in fields {
        if !value.is_finite() {
            return Err(ProjectionError::InvalidStats {
                team: team.to_string(),
                field: format!("{split}.{name}"),
                message: format!("must be finite, got {value}"),
            });
        }
        if value < 0.0 {
            return Err(ProjectionError::InvalidStats {
                team: team.to_string(),
                field: format!("{split}.{name}"),
                message: format!("must be non-negative, got {value}"),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
