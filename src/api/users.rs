use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::validation::validate_user_id;
use super::{ApiError, ApiResponse, AppState, ProfileDto, ShirtSizeRequest, UserDto};
use crate::models::user::{Actor, User};

fn can_see_private(actor: &Actor, user: &User) -> bool {
    actor.is_admin || actor.id == user.id
}

fn user_view(actor: &Actor, user: User) -> UserDto {
    if can_see_private(actor, &user) {
        UserDto::private(user)
    } else {
        UserDto::public(user)
    }
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state.auth_service().list_users().await?;
    let users = users.into_iter().map(|u| user_view(&actor, u)).collect();
    Ok(Json(ApiResponse::success(users)))
}

/// GET /users/{id}
/// Profile page: the user plus the team they are on.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let user_id = validate_user_id(id)?;
    let user = state.auth_service().get_user(user_id).await?;

    let team = match user.team_id {
        Some(team_id) => Some(state.team_service().detail(team_id).await?.summary),
        None => None,
    };
    let message_count = state.message_service().count_by_author(user.id).await?;

    Ok(Json(ApiResponse::success(ProfileDto {
        user: user_view(&actor, user),
        team,
        message_count,
    })))
}

/// PUT /users/{id}/shirt-size
pub async fn update_shirt_size(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
    Json(payload): Json<ShirtSizeRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user_id = validate_user_id(id)?;
    let user = state
        .auth_service()
        .update_shirt_size(&actor, user_id, &payload.shirt_size)
        .await?;

    Ok(Json(ApiResponse::with_message(
        UserDto::private(user),
        "Your shirt size was updated",
    )))
}

/// DELETE /users/{id}
/// Site admins only.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user_id = validate_user_id(id)?;
    let message = state.auth_service().delete_user(&actor, user_id).await?;
    Ok(Json(ApiResponse::message(message)))
}
