// Scoring evaluation: expected counts times league weights.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProjectionError;
use crate::projector::{check_appearance_length, ExpectedCounts};
use crate::round_to;
use crate::scoring::{BattingEvent, PitchingEvent, ScoringWeights};

/// Whether offensive (batting) points count toward the total.
///
/// The projection is from the pitcher's side, so the default scores pitching
/// only; the batting subtotal is then not computed and its weights are not
/// required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattingPolicy {
    #[default]
    PitchingOnly,
    PitchingAndBatting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Pitching,
    Batting,
}

/// One scored term: `count * weight = points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub category: ScoreCategory,
    pub event: String,
    pub count: f64,
    pub weight: f64,
    pub points: f64,
}

/// Expected counts with their fantasy-point valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub counts: ExpectedCounts,
    pub pitching_points: f64,
    /// `None` under `BattingPolicy::PitchingOnly`.
    pub batting_points: Option<f64>,
    pub total_points: f64,
    pub breakdown: Vec<ScoreLine>,
}

impl ScoredResult {
    pub fn team(&self) -> &str {
        &self.counts.team
    }

    pub fn pitching_line(&self, event: PitchingEvent) -> Option<&ScoreLine> {
        self.breakdown
            .iter()
            .find(|l| l.category == ScoreCategory::Pitching && l.event == event.code())
    }

    pub fn batting_line(&self, event: BattingEvent) -> Option<&ScoreLine> {
        self.breakdown
            .iter()
            .find(|l| l.category == ScoreCategory::Batting && l.event == event.code())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    batting: BattingPolicy,
}

impl Evaluator {
    pub fn new(batting: BattingPolicy) -> Self {
        Evaluator { batting }
    }

    pub fn evaluate(
        &self,
        counts: ExpectedCounts,
        weights: &ScoringWeights,
    ) -> Result<ScoredResult, ProjectionError> {
        check_appearance_length(counts.appearance_length)?;

        let mut breakdown = Vec::with_capacity(16);

        let mut pitching_terms = vec![
            (PitchingEvent::Inning, counts.appearance_length as f64),
            (PitchingEvent::Walk, counts.walks),
            (PitchingEvent::EarnedRun, counts.runs),
            (PitchingEvent::HitAllowed, counts.hits),
            (PitchingEvent::HomeRunAllowed, counts.home_runs),
            (PitchingEvent::Strikeout, counts.strikeouts),
        ];
        if counts.has_decisions {
            pitching_terms.push((PitchingEvent::Win, counts.wins));
            pitching_terms.push((PitchingEvent::Loss, counts.losses));
        }

        let mut pitching_raw = 0.0;
        for (event, count) in pitching_terms {
            let weight = weights.pitching(event)?;
            let points = count * weight;
            pitching_raw += points;
            breakdown.push(ScoreLine {
                category: ScoreCategory::Pitching,
                event: event.code().to_string(),
                count,
                weight,
                points,
            });
        }

        let batting_raw = match self.batting {
            BattingPolicy::PitchingOnly => None,
            BattingPolicy::PitchingAndBatting => {
                let terms = [
                    (BattingEvent::Single, counts.hit_mix.singles),
                    (BattingEvent::Double, counts.hit_mix.doubles),
                    (BattingEvent::Triple, counts.hit_mix.triples),
                    (BattingEvent::HomeRun, counts.home_runs),
                    (BattingEvent::Walk, counts.walks),
                    (BattingEvent::Run, counts.runs),
                    (BattingEvent::Strikeout, counts.strikeouts),
                    (BattingEvent::RunBattedIn, counts.rbi),
                ];
                let mut sum = 0.0;
                for (event, count) in terms {
                    let weight = weights.batting(event)?;
                    let points = count * weight;
                    sum += points;
                    breakdown.push(ScoreLine {
                        category: ScoreCategory::Batting,
                        event: event.code().to_string(),
                        count,
                        weight,
                        points,
                    });
                }
                Some(sum)
            }
        };

        let total_raw = pitching_raw + batting_raw.unwrap_or(0.0);

        debug!(
            team = %counts.team,
            pitching = pitching_raw,
            batting = ?batting_raw,
            total = total_raw,
            "scored expected counts"
        );

        Ok(ScoredResult {
            counts,
            pitching_points: round_to(pitching_raw, 2),
            batting_points: batting_raw.map(|b| round_to(b, 2)),
            total_points: round_to(total_raw, 2),
            breakdown,
        })
    }
}

/// Evaluate with the default pitching-only policy.
pub fn evaluate(
    counts: ExpectedCounts,
    weights: &ScoringWeights,
) -> Result<ScoredResult, ProjectionError> {
    Evaluator::default().evaluate(counts, weights)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
