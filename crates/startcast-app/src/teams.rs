// Team split data loading.
//
// One CSV row per team and split. Required columns:
//   Team,Split,ERA,H9,BB9,K9,HR9
// Optional column groups (a group is used only when every column in it is
// filled in):
//   Name, WHIP
//   H_PA,BB_PA,K_PA,HR_PA        explicit per-PA rates
//   H,BB,SO,HR,PA,G              season totals for the split
//   W,L                          decisions
//   TeamPA,TeamG                 team-level season volume
// Unknown columns are ignored.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use startcast_engine::stats::{DecisionRecord, PerNineRates, PerPaRates, SplitTotals};
use startcast_engine::{Handedness, SplitStats, TeamSplitStats};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TeamDataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawSplitRow {
    Team: String,
    #[serde(default)]
    Name: String,
    Split: String,
    ERA: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    WHIP: Option<f64>,
    #[serde(alias = "H/9")]
    H9: f64,
    #[serde(alias = "BB/9")]
    BB9: f64,
    #[serde(alias = "K/9", alias = "SO9")]
    K9: f64,
    #[serde(alias = "HR/9")]
    HR9: f64,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    H_PA: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    BB_PA: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option", alias = "SO_PA")]
    K_PA: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HR_PA: Option<f64>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    H: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    BB: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option", alias = "K")]
    SO: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HR: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    PA: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    G: Option<f64>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    W: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    L: Option<f64>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    TeamPA: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    TeamG: Option<f64>,
}

impl RawSplitRow {
    /// Every numeric value present in the row, with its column name.
    fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        let mut fields = vec![
            ("ERA", self.ERA),
            ("H9", self.H9),
            ("BB9", self.BB9),
            ("K9", self.K9),
            ("HR9", self.HR9),
        ];
        let optional = [
            ("WHIP", self.WHIP),
            ("H_PA", self.H_PA),
            ("BB_PA", self.BB_PA),
            ("K_PA", self.K_PA),
            ("HR_PA", self.HR_PA),
            ("H", self.H),
            ("BB", self.BB),
            ("SO", self.SO),
            ("HR", self.HR),
            ("PA", self.PA),
            ("G", self.G),
            ("W", self.W),
            ("L", self.L),
            ("TeamPA", self.TeamPA),
            ("TeamG", self.TeamG),
        ];
        fields.extend(optional.into_iter().filter_map(|(n, v)| v.map(|v| (n, v))));
        fields
    }

    fn per_pa(&self) -> Option<PerPaRates> {
        match (self.H_PA, self.BB_PA, self.K_PA, self.HR_PA) {
            (Some(hits), Some(walks), Some(strikeouts), Some(home_runs)) => Some(PerPaRates {
                hits,
                walks,
                strikeouts,
                home_runs,
            }),
            (None, None, None, None) => None,
            _ => {
                warn!(
                    "team '{}' {}: incomplete per-PA columns, using per-9 rates",
                    self.Team.trim(),
                    self.Split.trim()
                );
                None
            }
        }
    }

    fn totals(&self) -> Option<SplitTotals> {
        Some(SplitTotals {
            hits: self.H?.round() as u32,
            walks: self.BB?.round() as u32,
            strikeouts: self.SO?.round() as u32,
            home_runs: self.HR?.round() as u32,
            plate_appearances: self.PA?.round() as u32,
            games_played: self.G?.round() as u32,
        })
    }

    fn record(&self) -> Option<DecisionRecord> {
        Some(DecisionRecord {
            wins: self.W?.round() as u32,
            losses: self.L?.round() as u32,
        })
    }

    fn split_stats(&self) -> SplitStats {
        SplitStats {
            era: self.ERA,
            whip: self.WHIP,
            per_nine: PerNineRates {
                hits: self.H9,
                walks: self.BB9,
                strikeouts: self.K9,
                home_runs: self.HR9,
            },
            per_pa: self.per_pa(),
            totals: self.totals(),
            record: self.record(),
        }
    }
}

/// Accepts `Lefty`, `L`, `vs L`, `vsLHB` and the like.
fn parse_split(raw: &str) -> Option<Handedness> {
    let lower = raw.trim().to_ascii_lowercase();
    let stripped = lower
        .strip_prefix("vs.")
        .or_else(|| lower.strip_prefix("vs"))
        .unwrap_or(&lower);
    stripped.parse().ok()
}

// ---------------------------------------------------------------------------
// Merging rows into teams
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct PartialTeam {
    name: String,
    total_plate_appearances: Option<u32>,
    games_played: Option<u32>,
    vs_lefty: Option<SplitStats>,
    vs_righty: Option<SplitStats>,
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_teams_from_reader<R: Read>(rdr: R) -> Result<Vec<TeamSplitStats>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut order: Vec<String> = Vec::new();
    let mut partial: HashMap<String, PartialTeam> = HashMap::new();

    for result in reader.deserialize::<RawSplitRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed team split row: {}", e);
                continue;
            }
        };

        let abbr = raw.Team.trim().to_ascii_uppercase();
        if abbr.is_empty() {
            warn!("skipping team split row with empty Team column");
            continue;
        }
        let Some(handedness) = parse_split(&raw.Split) else {
            warn!("skipping team '{}': unknown split '{}'", abbr, raw.Split);
            continue;
        };
        if let Some((column, value)) = raw
            .numeric_fields()
            .into_iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
        {
            warn!(
                "skipping team '{}' {}: {} must be finite and non-negative, got {}",
                abbr, handedness, column, value
            );
            continue;
        }

        let entry = partial.entry(abbr.clone()).or_insert_with(|| {
            order.push(abbr.clone());
            PartialTeam::default()
        });
        if entry.name.is_empty() && !raw.Name.trim().is_empty() {
            entry.name = raw.Name.trim().to_string();
        }
        if let (Some(pa), Some(g)) = (raw.TeamPA, raw.TeamG) {
            entry.total_plate_appearances = Some(pa.round() as u32);
            entry.games_played = Some(g.round() as u32);
        }

        let slot = match handedness {
            Handedness::Lefty => &mut entry.vs_lefty,
            Handedness::Righty => &mut entry.vs_righty,
        };
        if slot.is_some() {
            warn!("duplicate {} split for team '{}', using latest row", handedness, abbr);
        }
        *slot = Some(raw.split_stats());
    }

    let mut teams = Vec::with_capacity(order.len());
    for abbr in order {
        let Some(team) = partial.remove(&abbr) else {
            continue;
        };
        match (team.vs_lefty, team.vs_righty) {
            (Some(vs_lefty), Some(vs_righty)) => {
                let name = if team.name.is_empty() {
                    abbr.clone()
                } else {
                    team.name
                };
                teams.push(TeamSplitStats {
                    abbreviation: abbr,
                    name,
                    total_plate_appearances: team.total_plate_appearances,
                    games_played: team.games_played,
                    vs_lefty,
                    vs_righty,
                });
            }
            (lefty, _) => {
                let missing = if lefty.is_none() { "Lefty" } else { "Righty" };
                warn!("dropping team '{}': missing {} split", abbr, missing);
            }
        }
    }

    debug!("parsed {} teams from split CSV", teams.len());
    Ok(teams)
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load team split statistics from a CSV file. Fails if no complete team
/// survives parsing.
pub fn load_teams(path: &Path) -> Result<Vec<TeamSplitStats>, TeamDataError> {
    let file = std::fs::File::open(path).map_err(|e| TeamDataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let teams = load_teams_from_reader(file).map_err(|e| TeamDataError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;

    if teams.is_empty() {
        return Err(TeamDataError::Validation(format!(
            "{} produced zero complete teams",
            path.display()
        )));
    }

    Ok(teams)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
