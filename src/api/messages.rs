use axum::{
    Extension, Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::validation::validate_limit;
use super::{ApiError, ApiResponse, AppState, PostMessageRequest, TimelineQuery};
use crate::models::message::Message;
use crate::models::user::Actor;

/// GET /messages?limit=
pub async fn timeline(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<ApiResponse<Vec<Message>>>, ApiError> {
    let limit = validate_limit(query.limit)?;
    let messages = state.message_service().timeline(limit).await?;
    Ok(Json(ApiResponse::success(messages)))
}

/// POST /messages
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<PostMessageRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let message = state.message_service().post(&actor, &payload.text).await?;
    Ok(Json(ApiResponse::message(message)))
}
