// Validation failures raised by the projection engine.

use thiserror::Error;

/// Every way a projection request can be rejected.
///
/// All variants are detected before any result is produced; the engine
/// never returns partial output alongside one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("scoring table has no {category} weight for `{event}`")]
    MissingWeight {
        category: &'static str,
        event: &'static str,
    },

    #[error("{category} weight for `{event}` must be finite, got {value}")]
    InvalidWeight {
        category: &'static str,
        event: &'static str,
        value: String,
    },

    #[error("appearance length must be between 1 and 9 innings, got {0}")]
    InvalidAppearanceLength(u8),

    #[error("cannot project an empty set of teams")]
    EmptyCohort,

    #[error("invalid stats for {team} ({field}): {message}")]
    InvalidStats {
        team: String,
        field: String,
        message: String,
    },

    #[error("unknown league type `{0}`")]
    UnknownLeague(String),
}
