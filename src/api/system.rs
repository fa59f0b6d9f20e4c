//! Health and site statistics.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, HealthDto, StatsDto};

/// `GET /api/health`
///
/// Reports 503 when the database does not answer a ping.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.store().ping().await.is_ok();
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthDto {
        status: if database { "ok" } else { "degraded" },
        database,
        uptime_seconds: state.start_time.elapsed().as_secs(),
    };
    (status, Json(ApiResponse::success(body))).into_response()
}

/// `GET /api/stats`
pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatsDto>>, ApiError> {
    let (user_count, team_count) = tokio::try_join!(
        state.auth_service().count_users(),
        state.team_service().count(),
    )?;

    Ok(Json(ApiResponse::success(StatsDto {
        user_count,
        team_count,
    })))
}
