// Rate projection: observed per-9 or per-PA rates scaled to the expected
// counting stats of a single outing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProjectionError;
use crate::stats::{Handedness, PerPaRates, SplitStats, TeamSplitStats};
use crate::{round_to, MAX_APPEARANCE_LENGTH, MIN_APPEARANCE_LENGTH};

/// Fixed share of expected hits that go for singles, doubles, triples and
/// home runs.
pub const HIT_MIX: HitMixShares = HitMixShares {
    singles: 0.75,
    doubles: 0.20,
    triples: 0.03,
    home_runs: 0.02,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitMixShares {
    pub singles: f64,
    pub doubles: f64,
    pub triples: f64,
    pub home_runs: f64,
}

/// How a split's rates are turned into counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    /// Per-PA rates when the split has them (explicit or derivable from
    /// totals), per-9 otherwise.
    #[default]
    PreferPerPlateAppearance,
    /// Always per-9, ignoring any per-PA data.
    PerNine,
}

/// The basis actually used for one split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    PerPlateAppearance,
    PerNine,
}

/// Expected hits by type.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HitMix {
    pub singles: f64,
    pub doubles: f64,
    pub triples: f64,
    pub home_runs: f64,
}

/// Expected counting stats for one team over one projected outing.
/// Counts are rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedCounts {
    pub team: String,
    pub team_name: String,
    pub handedness: Handedness,
    pub appearance_length: u8,
    pub rate_source: RateSource,
    pub pa_per_inning: f64,
    pub plate_appearances: f64,
    pub hits: f64,
    pub hit_mix: HitMix,
    pub home_runs: f64,
    pub walks: f64,
    pub strikeouts: f64,
    pub runs: f64,
    pub rbi: f64,
    pub wins: f64,
    pub losses: f64,
    /// Whether the split carries a win/loss record; W and L are only
    /// scored when it does.
    pub has_decisions: bool,
}

/// Stateless projector configured with a `RateBasis`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateProjector {
    basis: RateBasis,
}

impl RateProjector {
    pub fn new(basis: RateBasis) -> Self {
        RateProjector { basis }
    }

    /// Project one team's outing of `appearance_length` innings against
    /// batters of the given handedness.
    pub fn project(
        &self,
        team: &TeamSplitStats,
        handedness: Handedness,
        appearance_length: u8,
    ) -> Result<ExpectedCounts, ProjectionError> {
        check_appearance_length(appearance_length)?;
        team.validate()?;

        let split = team.split(handedness);
        let pa_per_inning = team.pa_per_inning(handedness);
        let innings = appearance_length as f64;
        let factor = innings / 9.0;

        let (rate_source, hits, walks, strikeouts, home_runs) =
            match self.per_pa_rates(split) {
                Some(rates) => {
                    let batters_faced = innings * pa_per_inning;
                    (
                        RateSource::PerPlateAppearance,
                        rates.hits * batters_faced,
                        rates.walks * batters_faced,
                        rates.strikeouts * batters_faced,
                        rates.home_runs * batters_faced,
                    )
                }
                // Per-9 rates already account for batters per inning.
                None => (
                    RateSource::PerNine,
                    split.per_nine.hits * factor,
                    split.per_nine.walks * factor,
                    split.per_nine.strikeouts * factor,
                    split.per_nine.home_runs * factor,
                ),
            };

        let runs = split.era * factor;
        let (wins, losses) = decisions_per_appearance(split, factor);

        let counts = ExpectedCounts {
            team: team.abbreviation.clone(),
            team_name: team.name.clone(),
            handedness,
            appearance_length,
            rate_source,
            pa_per_inning: round_to(pa_per_inning, 3),
            plate_appearances: round_to(innings * pa_per_inning, 3),
            hits: round_to(hits, 3),
            hit_mix: HitMix {
                singles: round_to(hits * HIT_MIX.singles, 3),
                doubles: round_to(hits * HIT_MIX.doubles, 3),
                triples: round_to(hits * HIT_MIX.triples, 3),
                home_runs: round_to(hits * HIT_MIX.home_runs, 3),
            },
            home_runs: round_to(home_runs, 3),
            walks: round_to(walks, 3),
            strikeouts: round_to(strikeouts, 3),
            runs: round_to(runs, 3),
            rbi: round_to(runs, 3),
            wins: round_to(wins, 3),
            losses: round_to(losses, 3),
            has_decisions: split.record.is_some(),
        };

        debug!(
            team = %counts.team,
            handedness = %handedness,
            innings = appearance_length,
            source = ?counts.rate_source,
            pa_per_inning = counts.pa_per_inning,
            hits = counts.hits,
            walks = counts.walks,
            strikeouts = counts.strikeouts,
            home_runs = counts.home_runs,
            runs = counts.runs,
            "projected expected counts"
        );

        Ok(counts)
    }

    fn per_pa_rates(&self, split: &SplitStats) -> Option<PerPaRates> {
        match self.basis {
            RateBasis::PerNine => None,
            RateBasis::PreferPerPlateAppearance => split
                .per_pa
                .or_else(|| split.totals.as_ref().and_then(|t| t.per_pa())),
        }
    }
}

/// Project with the default `RateBasis`.
pub fn project(
    team: &TeamSplitStats,
    handedness: Handedness,
    appearance_length: u8,
) -> Result<ExpectedCounts, ProjectionError> {
    RateProjector::default().project(team, handedness, appearance_length)
}

pub(crate) fn check_appearance_length(appearance_length: u8) -> Result<(), ProjectionError> {
    if !(MIN_APPEARANCE_LENGTH..=MAX_APPEARANCE_LENGTH).contains(&appearance_length) {
        return Err(ProjectionError::InvalidAppearanceLength(appearance_length));
    }
    Ok(())
}

/// Share of decisions won and lost, scaled by the outing length. Zero when
/// there is no record or no decisions.
fn decisions_per_appearance(split: &SplitStats, factor: f64) -> (f64, f64) {
    let Some(record) = split.record else {
        return (0.0, 0.0);
    };
    let decisions = record.wins + record.losses;
    if decisions == 0 {
        return (0.0, 0.0);
    }
    let total = decisions as f64;
    (
        record.wins as f64 / total * factor,
        record.losses as f64 / total * factor,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{DecisionRecord, PerNineRates, SplitTotals};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn per_nine_split() -> SplitStats {
        SplitStats {
            era: 4.0,
            whip: Some(1.33),
            per_nine: PerNineRates {
                hits: 9.0,
                walks: 3.0,
                strikeouts: 9.0,
                home_runs: 1.0,
            },
            ..SplitStats::default()
        }
    }

    fn team_with(split: SplitStats) -> TeamSplitStats {
        TeamSplitStats {
            abbreviation: "BOS".into(),
            name: "Boston Red Sox".into(),
            total_plate_appearances: None,
            games_played: None,
            vs_lefty: split.clone(),
            vs_righty: split,
        }
    }

    // ---- Per-9 path ----

    #[test]
    fn per_nine_six_innings_scenario() {
        let counts = project(&team_with(per_nine_split()), Handedness::Lefty, 6).unwrap();
        assert_eq!(counts.rate_source, RateSource::PerNine);
        assert!(approx_eq(counts.hits, 6.0, 1e-9));
        assert!(approx_eq(counts.walks, 2.0, 1e-9));
        assert!(approx_eq(counts.strikeouts, 6.0, 1e-9));
        assert!(approx_eq(counts.home_runs, 0.667, 1e-9));
        assert!(approx_eq(counts.runs, 2.667, 1e-9));
        assert!(approx_eq(counts.rbi, counts.runs, 1e-12));
        assert!(approx_eq(counts.pa_per_inning, 1.0, 1e-12));
    }

    #[test]
    fn hit_mix_follows_fixed_distribution() {
        let counts = project(&team_with(per_nine_split()), Handedness::Righty, 6).unwrap();
        assert!(approx_eq(counts.hit_mix.singles, 4.5, 1e-9));
        assert!(approx_eq(counts.hit_mix.doubles, 1.2, 1e-9));
        assert!(approx_eq(counts.hit_mix.triples, 0.18, 1e-9));
        assert!(approx_eq(counts.hit_mix.home_runs, 0.12, 1e-9));
    }

    #[test]
    fn full_game_equals_per_nine_rate() {
        let counts = project(&team_with(per_nine_split()), Handedness::Lefty, 9).unwrap();
        assert!(approx_eq(counts.hits, 9.0, 1e-9));
        assert!(approx_eq(counts.runs, 4.0, 1e-9));
    }

    // ---- Per-PA path ----

    #[test]
    fn explicit_per_pa_rates_take_precedence() {
        let mut split = per_nine_split();
        split.per_pa = Some(PerPaRates {
            hits: 0.25,
            walks: 0.08,
            strikeouts: 0.2,
            home_runs: 0.03,
        });
        let mut team = team_with(split);
        team.total_plate_appearances = Some(6075);
        team.games_played = Some(162);

        // 6075 / 162 / 9 = 4.1666..., 6 innings -> 25 batters faced
        let counts = project(&team, Handedness::Lefty, 6).unwrap();
        assert_eq!(counts.rate_source, RateSource::PerPlateAppearance);
        assert!(approx_eq(counts.plate_appearances, 25.0, 1e-9));
        assert!(approx_eq(counts.hits, 6.25, 1e-9));
        assert!(approx_eq(counts.walks, 2.0, 1e-9));
        assert!(approx_eq(counts.strikeouts, 5.0, 1e-9));
        assert!(approx_eq(counts.home_runs, 0.75, 1e-9));
        // Runs always come from ERA.
        assert!(approx_eq(counts.runs, 2.667, 1e-9));
    }

    #[test]
    fn per_pa_rates_derived_from_totals() {
        let mut split = per_nine_split();
        split.totals = Some(SplitTotals {
            hits: 450,
            walks: 180,
            strikeouts: 405,
            home_runs: 45,
            plate_appearances: 1800,
            games_played: 50,
        });
        // 1800 / 50 / 9 = 4.0 PA per inning; 3 innings -> 12 batters faced
        let counts = project(&team_with(split), Handedness::Lefty, 3).unwrap();
        assert_eq!(counts.rate_source, RateSource::PerPlateAppearance);
        assert!(approx_eq(counts.pa_per_inning, 4.0, 1e-12));
        assert!(approx_eq(counts.hits, 3.0, 1e-9));
        assert!(approx_eq(counts.walks, 1.2, 1e-9));
        assert!(approx_eq(counts.strikeouts, 2.7, 1e-9));
        assert!(approx_eq(counts.home_runs, 0.3, 1e-9));
    }

    #[test]
    fn per_nine_counts_do_not_scale_with_team_pa_per_inning() {
        let mut team = team_with(per_nine_split());
        team.total_plate_appearances = Some(6156);
        team.games_played = Some(162);

        let counts = RateProjector::new(RateBasis::PerNine)
            .project(&team, Handedness::Lefty, 9)
            .unwrap();
        assert_eq!(counts.rate_source, RateSource::PerNine);
        // 6156 / 162 / 9 = 4.222 PA per inning, reported but not applied
        assert!(approx_eq(counts.pa_per_inning, 4.222, 1e-9));
        assert!(approx_eq(counts.hits, 9.0, 1e-9));
        assert!(approx_eq(counts.strikeouts, 9.0, 1e-9));
        assert!(approx_eq(counts.walks, 3.0, 1e-9));
        assert!(approx_eq(counts.runs, 4.0, 1e-9));
    }

    #[test]
    fn per_nine_basis_ignores_per_pa_data() {
        let mut split = per_nine_split();
        split.per_pa = Some(PerPaRates {
            hits: 0.5,
            walks: 0.5,
            strikeouts: 0.5,
            home_runs: 0.5,
        });
        let counts = RateProjector::new(RateBasis::PerNine)
            .project(&team_with(split), Handedness::Lefty, 6)
            .unwrap();
        assert_eq!(counts.rate_source, RateSource::PerNine);
        assert!(approx_eq(counts.hits, 6.0, 1e-9));
    }

    #[test]
    fn totals_without_plate_appearances_fall_back_to_per_nine() {
        let mut split = per_nine_split();
        split.totals = Some(SplitTotals::default());
        let counts = project(&team_with(split), Handedness::Lefty, 6).unwrap();
        assert_eq!(counts.rate_source, RateSource::PerNine);
    }

    // ---- Decisions ----

    #[test]
    fn no_decisions_means_zero_wins_and_losses() {
        let mut split = per_nine_split();
        split.record = Some(DecisionRecord { wins: 0, losses: 0 });
        for length in 1..=9 {
            let counts = project(&team_with(split.clone()), Handedness::Lefty, length).unwrap();
            assert_eq!(counts.wins, 0.0);
            assert_eq!(counts.losses, 0.0);
            assert!(counts.has_decisions);
        }
    }

    #[test]
    fn decisions_scaled_by_outing_length() {
        let mut split = per_nine_split();
        split.record = Some(DecisionRecord { wins: 30, losses: 10 });
        let counts = project(&team_with(split), Handedness::Lefty, 6).unwrap();
        // 0.75 * 6/9 = 0.5, 0.25 * 6/9 = 0.1667
        assert!(approx_eq(counts.wins, 0.5, 1e-9));
        assert!(approx_eq(counts.losses, 0.167, 1e-9));
    }

    #[test]
    fn missing_record_is_not_scored() {
        let counts = project(&team_with(per_nine_split()), Handedness::Lefty, 6).unwrap();
        assert!(!counts.has_decisions);
        assert_eq!(counts.wins, 0.0);
    }

    // ---- Validation ----

    #[test]
    fn rejects_out_of_range_lengths() {
        let team = team_with(per_nine_split());
        assert_eq!(
            project(&team, Handedness::Lefty, 0).unwrap_err(),
            ProjectionError::InvalidAppearanceLength(0)
        );
        assert_eq!(
            project(&team, Handedness::Lefty, 10).unwrap_err(),
            ProjectionError::InvalidAppearanceLength(10)
        );
    }

    #[test]
    fn rejects_invalid_stats() {
        let mut split = per_nine_split();
        split.era = f64::INFINITY;
        let err = project(&team_with(split), Handedness::Lefty, 5).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidStats { .. }));
    }

    #[test]
    fn counts_are_rounded_to_three_places() {
        let mut split = per_nine_split();
        split.per_nine.hits = 8.123456;
        let counts = project(&team_with(split), Handedness::Lefty, 7).unwrap();
        assert_eq!(counts.hits, round_to(8.123456 * 7.0 / 9.0, 3));
    }
}
