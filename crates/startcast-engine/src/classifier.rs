// Cohort classification: relative standing of every team in one request and
// the display tier derived from it.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evaluator::ScoredResult;

/// Spread below which a cohort is treated as all-equal.
const SPREAD_EPSILON: f64 = 1e-9;

/// Range-normalized tier cutoffs. `Good` is strictly above the midpoint so a
/// team exactly in the middle of the cohort reads as `Average`.
pub const EXCELLENT_CUTOFF: f64 = 0.7;
pub const GOOD_CUTOFF: f64 = 0.5;
pub const AVERAGE_CUTOFF: f64 = 0.3;

/// Deviation cutoff (in standard deviations) used when none is configured.
pub const DEFAULT_DEVIATION_THRESHOLD: f64 = 1.5;

/// Display tier. Range-normalized classification uses
/// `Excellent/Good/Average/Poor`; deviation classification uses
/// `Good/Average/Bad`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Excellent,
    Good,
    Average,
    Poor,
    Bad,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Excellent => "excellent",
            Tier::Good => "good",
            Tier::Average => "average",
            Tier::Poor => "poor",
            Tier::Bad => "bad",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ClassifierPolicy {
    /// `(points - min) / (max - min)` with fixed cutoffs.
    #[default]
    RangeNormalized,
    /// Population z-score against the cohort, `Good`/`Bad` beyond
    /// `threshold` standard deviations.
    Deviation { threshold: f64 },
}

impl ClassifierPolicy {
    /// Tags this policy can produce, best first.
    pub fn tiers(&self) -> &'static [Tier] {
        match self {
            ClassifierPolicy::RangeNormalized => {
                &[Tier::Excellent, Tier::Good, Tier::Average, Tier::Poor]
            }
            ClassifierPolicy::Deviation { .. } => &[Tier::Good, Tier::Average, Tier::Bad],
        }
    }
}

/// Presentation order of a classified result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Highest total first; ties by team abbreviation.
    #[default]
    PointsDescending,
    TeamAscending,
}

/// A scored team with its standing in the cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedResult {
    #[serde(flatten)]
    pub result: ScoredResult,
    /// Display score in `[0, 1]`.
    pub score: f64,
    /// Signed standard deviations from the cohort mean (deviation policy only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deviation: Option<f64>,
    pub tier: Tier,
    /// 1-based position after sorting; 0 until `sort_results` runs.
    #[serde(default)]
    pub rank: usize,
}

// ---------------------------------------------------------------------------
// Cohort statistics
// ---------------------------------------------------------------------------

/// Mean and population standard deviation of the cohort's totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CohortStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Population statistics (N denominator): the cohort is every team in the
/// request, not a sample. Zeroes for an empty slice.
pub fn compute_cohort_stats(values: &[f64]) -> CohortStats {
    if values.is_empty() {
        return CohortStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    CohortStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// Z-score guarded against a degenerate cohort: 0.0 when the spread is ~0.
pub fn compute_deviation(value: f64, stats: &CohortStats) -> f64 {
    if stats.stdev < SPREAD_EPSILON {
        return 0.0;
    }
    (value - stats.mean) / stats.stdev
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct CohortClassifier {
    policy: ClassifierPolicy,
}

impl CohortClassifier {
    pub fn new(policy: ClassifierPolicy) -> Self {
        CohortClassifier { policy }
    }

    /// Classify every result against the whole set. Order is preserved.
    pub fn classify(&self, results: Vec<ScoredResult>) -> Vec<ClassifiedResult> {
        let totals: Vec<f64> = results.iter().map(|r| r.total_points).collect();
        match self.policy {
            ClassifierPolicy::RangeNormalized => classify_by_range(results, &totals),
            ClassifierPolicy::Deviation { threshold } => {
                classify_by_deviation(results, &totals, threshold)
            }
        }
    }
}

/// Classify with the default range-normalized policy.
pub fn classify(results: Vec<ScoredResult>) -> Vec<ClassifiedResult> {
    CohortClassifier::default().classify(results)
}

fn classify_by_range(results: Vec<ScoredResult>, totals: &[f64]) -> Vec<ClassifiedResult> {
    let min = totals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = totals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;

    results
        .into_iter()
        .map(|result| {
            let (score, tier) = if spread < SPREAD_EPSILON {
                (0.5, Tier::Average)
            } else {
                let score = ((result.total_points - min) / spread).clamp(0.0, 1.0);
                (score, range_tier(score))
            };
            ClassifiedResult {
                result,
                score,
                deviation: None,
                tier,
                rank: 0,
            }
        })
        .collect()
}

fn range_tier(score: f64) -> Tier {
    if score >= EXCELLENT_CUTOFF {
        Tier::Excellent
    } else if score > GOOD_CUTOFF {
        Tier::Good
    } else if score >= AVERAGE_CUTOFF {
        Tier::Average
    } else {
        Tier::Poor
    }
}

fn classify_by_deviation(
    results: Vec<ScoredResult>,
    totals: &[f64],
    threshold: f64,
) -> Vec<ClassifiedResult> {
    let stats = compute_cohort_stats(totals);

    results
        .into_iter()
        .map(|result| {
            let deviation = compute_deviation(result.total_points, &stats);
            let (score, tier) = if stats.stdev < SPREAD_EPSILON {
                (0.5, Tier::Average)
            } else if deviation >= threshold {
                (1.0, Tier::Good)
            } else if deviation <= -threshold {
                (0.0, Tier::Bad)
            } else {
                (0.5, Tier::Average)
            };
            ClassifiedResult {
                result,
                score,
                deviation: Some(deviation),
                tier,
                rank: 0,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Sort in place and assign 1-based ranks in the resulting order.
pub fn sort_results(results: &mut [ClassifiedResult], order: SortOrder) {
    match order {
        SortOrder::PointsDescending => results.sort_by(|a, b| {
            b.result
                .total_points
                .partial_cmp(&a.result.total_points)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.result.team().cmp(b.result.team()))
        }),
        SortOrder::TeamAscending => {
            results.sort_by(|a, b| a.result.team().cmp(b.result.team()))
        }
    }
    for (i, r) in results.iter_mut().enumerate() {
        r.rank = i + 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
