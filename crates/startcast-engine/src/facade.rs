// Projection facade: one request (handedness, outing length, scoring table)
// across every team, classified and summarized.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::{
    sort_results, ClassifiedResult, ClassifierPolicy, CohortClassifier, SortOrder,
};
use crate::error::ProjectionError;
use crate::evaluator::{BattingPolicy, Evaluator};
use crate::projector::{check_appearance_length, RateBasis, RateProjector};
use crate::round_to;
use crate::scoring::{LeagueLabel, ScoringWeights};
use crate::stats::{Handedness, TeamSplitStats};

/// Strategy choices fixed when the engine is built.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectionModel {
    pub rate_basis: RateBasis,
    pub batting: BattingPolicy,
    pub classifier: ClassifierPolicy,
    pub sort: SortOrder,
}

/// One projection request. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRequest {
    pub handedness: Handedness,
    pub appearance_length: u8,
    pub weights: ScoringWeights,
    pub label: LeagueLabel,
}

impl ProjectionRequest {
    pub fn new(
        handedness: Handedness,
        appearance_length: u8,
        weights: ScoringWeights,
        label: LeagueLabel,
    ) -> Self {
        ProjectionRequest {
            handedness,
            appearance_length,
            weights,
            label,
        }
    }
}

/// Aggregate of the cohort's totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub count: usize,
}

impl Summary {
    fn from_results(results: &[ClassifiedResult]) -> Summary {
        let totals: Vec<f64> = results.iter().map(|r| r.result.total_points).collect();
        let count = totals.len();
        let min = totals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = totals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = totals.iter().sum::<f64>() / count as f64;
        Summary {
            min,
            max,
            avg: round_to(avg, 2),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionOutcome {
    pub results: Vec<ClassifiedResult>,
    pub summary: Summary,
}

/// The assembled pipeline: projector, evaluator, classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionEngine {
    model: ProjectionModel,
    projector: RateProjector,
    evaluator: Evaluator,
    classifier: CohortClassifier,
}

impl ProjectionEngine {
    pub fn new(model: ProjectionModel) -> Self {
        ProjectionEngine {
            model,
            projector: RateProjector::new(model.rate_basis),
            evaluator: Evaluator::new(model.batting),
            classifier: CohortClassifier::new(model.classifier),
        }
    }

    /// Project, score, and classify every team.
    ///
    /// Fails before doing any work on an empty team list or an out-of-range
    /// outing length; any per-team failure aborts the whole request.
    pub fn project_all(
        &self,
        request: &ProjectionRequest,
        teams: &[TeamSplitStats],
    ) -> Result<ProjectionOutcome, ProjectionError> {
        if teams.is_empty() {
            return Err(ProjectionError::EmptyCohort);
        }
        check_appearance_length(request.appearance_length)?;

        let scored = teams
            .iter()
            .map(|team| {
                let counts =
                    self.projector
                        .project(team, request.handedness, request.appearance_length)?;
                self.evaluator.evaluate(counts, &request.weights)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = self.classifier.classify(scored);
        sort_results(&mut results, self.model.sort);
        let summary = Summary::from_results(&results);

        info!(
            league = %request.label,
            handedness = %request.handedness,
            innings = request.appearance_length,
            teams = summary.count,
            min = summary.min,
            max = summary.max,
            avg = summary.avg,
            "projection complete"
        );

        Ok(ProjectionOutcome { results, summary })
    }
}

/// Run a request with the default model.
pub fn project_all(
    request: &ProjectionRequest,
    teams: &[TeamSplitStats],
) -> Result<ProjectionOutcome, ProjectionError> {
    ProjectionEngine::default().project_all(request, teams)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Tier;
    use crate::scoring::PitchingEvent;
    use crate::stats::{DecisionRecord, PerNineRates, SplitStats};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn split(h9: f64, bb9: f64, k9: f64, hr9: f64, era: f64) -> SplitStats {
        SplitStats {
            era,
            per_nine: PerNineRates {
                hits: h9,
                walks: bb9,
                strikeouts: k9,
                home_runs: hr9,
            },
            ..SplitStats::default()
        }
    }

    fn team(abbr: &str, lefty: SplitStats, righty: SplitStats) -> TeamSplitStats {
        TeamSplitStats {
            abbreviation: abbr.into(),
            name: format!("{abbr} Club"),
            total_plate_appearances: None,
            games_played: None,
            vs_lefty: lefty,
            vs_righty: righty,
        }
    }

    fn league() -> Vec<TeamSplitStats> {
        vec![
            team("SEA", split(9.0, 3.0, 9.0, 1.0, 4.0), split(8.0, 3.0, 10.0, 1.0, 3.5)),
            team("COL", split(10.5, 4.0, 7.0, 1.6, 5.4), split(11.0, 4.2, 6.5, 1.8, 5.9)),
            team("LAD", split(8.1, 2.7, 9.9, 0.9, 3.2), split(7.5, 2.5, 10.4, 0.8, 2.9)),
        ]
    }

    fn weights() -> ScoringWeights {
        ScoringWeights::new()
            .with_pitching(PitchingEvent::Inning, 3.0)
            .with_pitching(PitchingEvent::Walk, -1.0)
            .with_pitching(PitchingEvent::EarnedRun, -1.0)
            .with_pitching(PitchingEvent::HitAllowed, -1.0)
            .with_pitching(PitchingEvent::HomeRunAllowed, -1.0)
            .with_pitching(PitchingEvent::Strikeout, 1.0)
    }

    fn request(handedness: Handedness, innings: u8) -> ProjectionRequest {
        ProjectionRequest::new(handedness, innings, weights(), LeagueLabel::preset("Custom"))
    }

    #[test]
    fn scenario_team_scores_twelve_sixty_seven() {
        let outcome = project_all(&request(Handedness::Lefty, 6), &league()).unwrap();
        let sea = outcome
            .results
            .iter()
            .find(|r| r.result.team() == "SEA")
            .unwrap();
        assert!(approx_eq(sea.result.total_points, 12.67, 1e-9));
        assert!(approx_eq(sea.result.counts.hits, 6.0, 1e-9));
        assert!(approx_eq(sea.result.counts.runs, 2.667, 1e-9));
    }

    #[test]
    fn results_sorted_by_points_with_ranks() {
        let outcome = project_all(&request(Handedness::Righty, 7), &league()).unwrap();
        let totals: Vec<f64> = outcome.results.iter().map(|r| r.result.total_points).collect();
        assert!(totals.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(outcome.results[0].rank, 1);
        assert_eq!(outcome.results[0].tier, Tier::Excellent);
        assert_eq!(outcome.results[2].tier, Tier::Poor);
        assert_eq!(outcome.results[0].result.team(), "LAD");
        assert_eq!(outcome.results[2].result.team(), "COL");
    }

    #[test]
    fn summary_matches_results() {
        let outcome = project_all(&request(Handedness::Lefty, 5), &league()).unwrap();
        let totals: Vec<f64> = outcome.results.iter().map(|r| r.result.total_points).collect();
        let min = totals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = totals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = totals.iter().sum::<f64>() / 3.0;
        assert_eq!(outcome.summary.count, 3);
        assert_eq!(outcome.summary.min, min);
        assert_eq!(outcome.summary.max, max);
        assert!(approx_eq(outcome.summary.avg, avg, 0.005 + 1e-9));
    }

    #[test]
    fn empty_cohort_rejected() {
        assert_eq!(
            project_all(&request(Handedness::Lefty, 6), &[]).unwrap_err(),
            ProjectionError::EmptyCohort
        );
    }

    #[test]
    fn invalid_length_rejected_before_projection() {
        assert_eq!(
            project_all(&request(Handedness::Lefty, 0), &league()).unwrap_err(),
            ProjectionError::InvalidAppearanceLength(0)
        );
    }

    #[test]
    fn one_bad_team_fails_the_whole_request() {
        let mut teams = league();
        teams[1].vs_lefty.per_nine.hits = -1.0;
        let err = project_all(&request(Handedness::Lefty, 6), &teams).unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidStats { ref team, .. } if team == "COL"));
    }

    #[test]
    fn missing_weight_fails_the_whole_request() {
        let mut req = request(Handedness::Lefty, 6);
        req.weights = ScoringWeights::new().with_pitching(PitchingEvent::Inning, 3.0);
        assert!(matches!(
            project_all(&req, &league()),
            Err(ProjectionError::MissingWeight { .. })
        ));
    }

    #[test]
    fn non_finite_weight_fails_the_whole_request() {
        let mut req = request(Handedness::Lefty, 6);
        req.weights.set_pitching(PitchingEvent::Strikeout, f64::NAN);
        assert!(matches!(
            project_all(&req, &league()),
            Err(ProjectionError::InvalidWeight { event: "K", .. })
        ));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let teams = league();
        let req = request(Handedness::Righty, 4);
        let first = project_all(&req, &teams).unwrap();
        let second = project_all(&req, &teams).unwrap();
        assert_eq!(first, second);
        for (a, b) in first.results.iter().zip(&second.results) {
            assert_eq!(a.result.total_points.to_bits(), b.result.total_points.to_bits());
        }
    }

    #[test]
    fn single_team_cohort_is_average() {
        let teams = vec![league().remove(0)];
        let outcome = project_all(&request(Handedness::Lefty, 6), &teams).unwrap();
        assert_eq!(outcome.results[0].tier, Tier::Average);
        assert_eq!(outcome.summary.min, outcome.summary.max);
    }

    #[test]
    fn flat_cohort_is_average_under_zero_threshold() {
        let engine = ProjectionEngine::new(ProjectionModel {
            classifier: ClassifierPolicy::Deviation { threshold: 0.0 },
            ..ProjectionModel::default()
        });
        let same = split(9.0, 3.0, 9.0, 1.0, 4.0);
        let teams = vec![
            team("SEA", same.clone(), same.clone()),
            team("TEX", same.clone(), same),
        ];
        let outcome = engine
            .project_all(&request(Handedness::Lefty, 6), &teams)
            .unwrap();
        for r in &outcome.results {
            assert_eq!(r.tier, Tier::Average);
            assert_eq!(r.score, 0.5);
        }
    }

    #[test]
    fn raising_strikeout_weight_raises_every_total() {
        let teams = league();
        let base = project_all(&request(Handedness::Lefty, 6), &teams).unwrap();
        let mut req = request(Handedness::Lefty, 6);
        req.weights.set_pitching(PitchingEvent::Strikeout, 2.0);
        let boosted = project_all(&req, &teams).unwrap();
        for r in &base.results {
            let b = boosted
                .results
                .iter()
                .find(|x| x.result.team() == r.result.team())
                .unwrap();
            assert!(b.result.total_points > r.result.total_points);
        }
    }

    #[test]
    fn team_sort_and_deviation_model() {
        let engine = ProjectionEngine::new(ProjectionModel {
            sort: SortOrder::TeamAscending,
            classifier: ClassifierPolicy::Deviation { threshold: 1.0 },
            ..ProjectionModel::default()
        });
        let outcome = engine
            .project_all(&request(Handedness::Lefty, 6), &league())
            .unwrap();
        let teams: Vec<&str> = outcome.results.iter().map(|r| r.result.team()).collect();
        assert_eq!(teams, vec!["COL", "LAD", "SEA"]);
        assert!(outcome.results.iter().all(|r| r.deviation.is_some()));
    }

    #[test]
    fn decisions_flow_through_when_weighted() {
        let mut teams = league();
        for t in &mut teams {
            t.vs_lefty.record = Some(DecisionRecord { wins: 0, losses: 0 });
        }
        let mut req = request(Handedness::Lefty, 6);
        req.weights.set_pitching(PitchingEvent::Win, 5.0);
        req.weights.set_pitching(PitchingEvent::Loss, -3.0);
        let outcome = project_all(&req, &teams).unwrap();
        let sea = outcome
            .results
            .iter()
            .find(|r| r.result.team() == "SEA")
            .unwrap();
        // No decisions: W/L lines present but worth nothing.
        assert_eq!(sea.result.counts.wins, 0.0);
        assert!(approx_eq(sea.result.total_points, 12.67, 1e-9));
    }
}
