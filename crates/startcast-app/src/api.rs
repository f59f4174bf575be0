// Request/response bodies for a projection and the league-type resolution
// that turns a request into engine input.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use startcast_engine::{
    ClassifiedResult, Handedness, LeagueLabel, PresetCatalog, ProjectionEngine, ProjectionError,
    ProjectionOutcome, ProjectionRequest, ScoringWeights, TeamSplitStats,
};

use crate::leagues::{LeagueStore, LeagueStoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    LeagueStore(#[from] LeagueStoreError),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequestBody {
    pub handedness: Handedness,
    pub inning: u8,
    #[serde(default = "default_league_type")]
    pub league_type: String,
    /// Inline table, honored only when `league_type` is `Custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_scoring: Option<ScoringWeights>,
}

fn default_league_type() -> String {
    PresetCatalog::CUSTOM.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub min_points: f64,
    pub max_points: f64,
    pub avg_points: f64,
    pub total_teams: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub handedness: Handedness,
    pub inning: u8,
    pub league_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResponseBody {
    pub results: Vec<ClassifiedResult>,
    pub analysis: Analysis,
    pub parameters: Parameters,
}

impl ProjectionResponseBody {
    fn from_outcome(outcome: ProjectionOutcome, request: &ProjectionRequest) -> Self {
        ProjectionResponseBody {
            analysis: Analysis {
                min_points: outcome.summary.min,
                max_points: outcome.summary.max,
                avg_points: outcome.summary.avg,
                total_teams: outcome.summary.count,
            },
            parameters: Parameters {
                handedness: request.handedness,
                inning: request.appearance_length,
                league_type: request.label.to_string(),
            },
            results: outcome.results,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Pick the weight table for `league_type`: inline custom scoring, then a
/// saved custom league of that name, then a preset (case-insensitive).
pub fn resolve_weights(
    body: &ProjectionRequestBody,
    presets: &PresetCatalog,
    store: Option<&LeagueStore>,
) -> Result<(ScoringWeights, LeagueLabel), ApiError> {
    let league_type = body.league_type.trim();

    if league_type.eq_ignore_ascii_case(PresetCatalog::CUSTOM) {
        if let Some(weights) = &body.custom_scoring {
            debug!("using inline custom scoring");
            return Ok((weights.clone(), LeagueLabel::preset(PresetCatalog::CUSTOM)));
        }
    }

    if let Some(store) = store {
        if let Some(league) = store.get(league_type)? {
            debug!("using saved custom league '{}'", league.name);
            let label = LeagueLabel {
                league_type: league.league_type,
                name: Some(league.name),
            };
            return Ok((league.scoring, label));
        }
    }

    let weights = presets.get(league_type)?.clone();
    let canonical = presets.canonical_name(league_type).unwrap_or(league_type);
    Ok((weights, LeagueLabel::preset(canonical)))
}

/// Build the engine request for a body.
pub fn build_request(
    body: &ProjectionRequestBody,
    presets: &PresetCatalog,
    store: Option<&LeagueStore>,
) -> Result<ProjectionRequest, ApiError> {
    let (weights, label) = resolve_weights(body, presets, store)?;
    Ok(ProjectionRequest::new(
        body.handedness,
        body.inning,
        weights,
        label,
    ))
}

/// Resolve, project every team, and shape the response.
pub fn handle_projection(
    body: &ProjectionRequestBody,
    engine: &ProjectionEngine,
    presets: &PresetCatalog,
    store: Option<&LeagueStore>,
    teams: &[TeamSplitStats],
) -> Result<ProjectionResponseBody, ApiError> {
    let request = build_request(body, presets, store)?;
    let outcome = engine.project_all(&request, teams)?;
    Ok(ProjectionResponseBody::from_outcome(outcome, &request))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
