//! Team endpoints. Every handler delegates to [`TeamService`], which owns the
//! membership rules; the handlers only parse ids and wrap the outcome.
//!
//! [`TeamService`]: crate::services::TeamService

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_team_id;
use super::{ApiError, ApiResponse, AppState, RenameTeamRequest};
use crate::models::team::{Team, TeamDetail, TeamSummary};
use crate::models::user::Actor;
use crate::services::{TeamOutcome, TeamRegistration};

fn outcome_response(outcome: TeamOutcome) -> Json<ApiResponse<Team>> {
    Json(ApiResponse::with_message(outcome.team, outcome.message))
}

/// GET /teams
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TeamSummary>>>, ApiError> {
    let teams = state.team_service().list().await?;
    Ok(Json(ApiResponse::success(teams)))
}

/// GET /teams/joinable
pub async fn joinable_teams(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TeamSummary>>>, ApiError> {
    let teams = state.team_service().joinable().await?;
    Ok(Json(ApiResponse::success(teams)))
}

/// GET /teams/{id}
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TeamDetail>>, ApiError> {
    let team_id = validate_team_id(id)?;
    let detail = state.team_service().detail(team_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// POST /teams/register
/// Create a new team, or join the one named in `select_name`.
pub async fn register_team(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<TeamRegistration>,
) -> Result<Json<ApiResponse<Team>>, ApiError> {
    let outcome = state
        .team_service()
        .create_or_join(&actor, payload)
        .await?;
    Ok(outcome_response(outcome))
}

/// POST /teams/{id}/leave
pub async fn leave_team(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Team>>, ApiError> {
    let team_id = validate_team_id(id)?;
    let outcome = state.team_service().leave(&actor, team_id).await?;
    Ok(outcome_response(outcome))
}

/// PUT /teams/{id}/name
pub async fn rename_team(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<RenameTeamRequest>,
) -> Result<Json<ApiResponse<Team>>, ApiError> {
    let team_id = validate_team_id(id)?;
    let outcome = state
        .team_service()
        .rename(&actor, team_id, &payload.name)
        .await?;
    Ok(outcome_response(outcome))
}

/// DELETE /teams/{id}
pub async fn delete_team(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Team>>, ApiError> {
    let team_id = validate_team_id(id)?;
    let outcome = state.team_service().delete(&actor, team_id).await?;
    Ok(outcome_response(outcome))
}
