// Projection engine: per-team expected outing stats, fantasy scoring, and
// cohort classification for a hypothetical start of a given length.

pub mod classifier;
pub mod error;
pub mod evaluator;
pub mod facade;
pub mod projector;
pub mod scoring;
pub mod stats;

pub use classifier::{ClassifiedResult, ClassifierPolicy, SortOrder, Tier};
pub use error::ProjectionError;
pub use evaluator::{BattingPolicy, ScoredResult};
pub use facade::{
    project_all, ProjectionEngine, ProjectionModel, ProjectionOutcome, ProjectionRequest, Summary,
};
pub use projector::{ExpectedCounts, RateBasis, RateSource};
pub use scoring::{BattingEvent, LeagueLabel, PitchingEvent, PresetCatalog, ScoringWeights};
pub use stats::{Handedness, SplitStats, TeamSplitStats};

/// Shortest projected outing, in innings.
pub const MIN_APPEARANCE_LENGTH: u8 = 1;
/// Longest projected outing, in innings.
pub const MAX_APPEARANCE_LENGTH: u8 = 9;

/// Round to `places` decimal places, half away from zero.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
